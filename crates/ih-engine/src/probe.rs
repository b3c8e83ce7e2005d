//! Header-only inspection of encoded images.

use std::io::Cursor;

use bytes::Bytes;
use serde::Serialize;

use ih_core::{Error, ImageFormat, Result};

use crate::quality::estimate_jpeg_quality;

/// What can be learned about an encoded image without decoding its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Probe {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Estimated encoder quality; only known for JPEG.
    pub quality: Option<u8>,
}

/// Inspect `bytes` on the blocking pool.
pub async fn identify(bytes: Bytes) -> Result<Probe> {
    crate::blocking(move || identify_sync(&bytes)).await
}

/// Synchronous form of [`identify`].
pub fn identify_sync(bytes: &[u8]) -> Result<Probe> {
    let format = ImageFormat::sniff(bytes)
        .ok_or_else(|| Error::engine("unsupported or unrecognised image format"))?;
    let (width, height) = image::ImageReader::with_format(Cursor::new(bytes), format.to_image())
        .into_dimensions()?;
    let quality = match format {
        ImageFormat::Jpeg => estimate_jpeg_quality(bytes),
        _ => None,
    };
    Ok(Probe {
        format,
        width,
        height,
        quality,
    })
}
