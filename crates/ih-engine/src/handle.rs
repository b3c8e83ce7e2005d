//! Decoded image state carried through an action chain.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, RgbImage};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use ih_core::{Error, ImageFormat, Result};

use crate::DEFAULT_QUALITY;

/// Dimensions and format of the image as it currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// The format the image will be encoded to.
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    /// Size in bytes of the encoded image this metadata describes.
    pub size: usize,
}

/// Output of [`ImageHandle::encode`].
#[derive(Debug, Clone)]
pub struct Encoded {
    pub bytes: Bytes,
    pub info: Metadata,
}

/// A decoded image plus the settings its final encode will use.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    image: DynamicImage,
    source_format: ImageFormat,
    output_format: ImageFormat,
    quality: Option<u8>,
    source_size: usize,
    /// Blocking work that has not started yet is skipped once this fires.
    cancellation: Option<CancellationToken>,
}

impl ImageHandle {
    /// Decode `bytes` on the blocking pool.
    ///
    /// # Errors
    ///
    /// [`Error::Engine`] when the format is not recognised or the data is
    /// corrupt.
    pub async fn decode(bytes: Bytes) -> Result<Self> {
        crate::blocking(move || Self::decode_sync(&bytes)).await
    }

    /// Synchronous form of [`decode`](Self::decode).
    pub fn decode_sync(bytes: &[u8]) -> Result<Self> {
        let format = ImageFormat::sniff(bytes)
            .ok_or_else(|| Error::engine("unsupported or unrecognised image format"))?;
        let image = image::load_from_memory_with_format(bytes, format.to_image())?;
        tracing::trace!(
            "Decoded {format} {}x{} ({} bytes)",
            image.width(),
            image.height(),
            bytes.len()
        );
        Ok(Self {
            image,
            source_format: format,
            output_format: format,
            quality: None,
            source_size: bytes.len(),
            cancellation: None,
        })
    }

    /// Wrap already decoded pixels, as if they had been read as `format`.
    pub fn from_image(image: DynamicImage, format: ImageFormat) -> Self {
        Self {
            image,
            source_format: format,
            output_format: format,
            quality: None,
            source_size: 0,
            cancellation: None,
        }
    }

    /// Builder: tie later pixel work and the final encode to `token`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn check_cancelled(token: Option<&CancellationToken>) -> Result<()> {
        match token {
            Some(t) if t.is_cancelled() => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            format: self.output_format,
            width: self.image.width(),
            height: self.image.height(),
            has_alpha: self.image.color().has_alpha(),
            size: self.source_size,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_pixels(self) -> DynamicImage {
        self.image
    }

    pub fn replace(&mut self, image: DynamicImage) {
        self.image = image;
    }

    /// Run a pixel transform on the blocking pool.
    ///
    /// If `f` fails the handle is left holding an empty image and must be
    /// discarded.
    pub async fn map<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(DynamicImage) -> Result<DynamicImage> + Send + 'static,
    {
        let token = self.cancellation.clone();
        let image = std::mem::replace(&mut self.image, DynamicImage::new_rgba8(0, 0));
        self.image = crate::blocking(move || {
            Self::check_cancelled(token.as_ref())?;
            f(image)
        })
        .await?;
        Ok(())
    }

    pub fn source_format(&self) -> ImageFormat {
        self.source_format
    }

    pub fn output_format(&self) -> ImageFormat {
        self.output_format
    }

    pub fn set_output_format(&mut self, format: ImageFormat) {
        self.output_format = format;
    }

    pub fn quality(&self) -> Option<u8> {
        self.quality
    }

    /// Encoder quality, clamped to 1..=100.
    pub fn set_quality(&mut self, quality: u8) {
        self.quality = Some(quality.clamp(1, 100));
    }

    /// Encode to the output format on the blocking pool, consuming the handle.
    pub async fn encode(self) -> Result<Encoded> {
        crate::blocking(move || {
            Self::check_cancelled(self.cancellation.as_ref())?;
            self.encode_sync()
        })
        .await
    }

    /// Synchronous form of [`encode`](Self::encode).
    pub fn encode_sync(self) -> Result<Encoded> {
        let format = self.output_format;
        let image = prepare_for(self.image, format);

        let mut buf = Vec::new();
        match format {
            ImageFormat::Jpeg => {
                let quality = self.quality.unwrap_or(DEFAULT_QUALITY);
                image.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
            }
            // The WebP encoder is lossless only; quality has no effect.
            _ => {
                let mut cursor = Cursor::new(&mut buf);
                image.write_to(&mut cursor, format.to_image())?;
            }
        }

        let (width, height) = image.dimensions();
        let info = Metadata {
            format,
            width,
            height,
            has_alpha: image.color().has_alpha(),
            size: buf.len(),
        };
        tracing::trace!("Encoded {format} {width}x{height} ({} bytes)", buf.len());
        Ok(Encoded {
            bytes: Bytes::from(buf),
            info,
        })
    }
}

/// Convert pixels into a layout the target encoder accepts.
fn prepare_for(image: DynamicImage, format: ImageFormat) -> DynamicImage {
    let has_alpha = image.color().has_alpha();
    match format {
        ImageFormat::Jpeg => {
            if has_alpha {
                DynamicImage::ImageRgb8(flatten_on_white(&image))
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            }
        }
        ImageFormat::Png => match image {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                DynamicImage::ImageRgba16(image.to_rgba16())
            }
            other => other,
        },
        ImageFormat::WebP | ImageFormat::Gif => DynamicImage::ImageRgba8(image.to_rgba8()),
        ImageFormat::Bmp | ImageFormat::Tiff => {
            if has_alpha {
                DynamicImage::ImageRgba8(image.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            }
        }
    }
}

/// Composite onto an opaque white background.
fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}
