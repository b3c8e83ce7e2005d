//! Image formats understood by the handler.
//!
//! [`ImageFormat`] serializes in lowercase and implements `Display` manually
//! for a consistent string representation. It converts to and from
//! [`image::ImageFormat`] so the engine adapter can hand it to the codecs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raster formats the handler can decode and encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Parse a user-facing format name (`jpg`, `jpeg`, `png`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Detect the format from the leading bytes of an encoded image.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        image::guess_format(bytes).ok().and_then(Self::from_image)
    }

    /// Map from the codec library's format, if it is one we handle.
    pub fn from_image(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::WebP => Some(Self::WebP),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            image::ImageFormat::Tiff => Some(Self::Tiff),
            _ => None,
        }
    }

    /// The codec library's equivalent format.
    pub fn to_image(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::WebP => image::ImageFormat::WebP,
            Self::Gif => image::ImageFormat::Gif,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Tiff => image::ImageFormat::Tiff,
        }
    }

    /// MIME type used for the `Content-Type` response header.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }

    /// Whether the encoded form can carry an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jpeg => write!(f, "jpg"),
            Self::Png => write!(f, "png"),
            Self::WebP => write!(f, "webp"),
            Self::Gif => write!(f, "gif"),
            Self::Bmp => write!(f, "bmp"),
            Self::Tiff => write!(f, "tiff"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_accepts_aliases() {
        assert_eq!(ImageFormat::from_name("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_name("JPEG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_name("tif"), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::from_name("heic"), None);
    }

    #[test]
    fn sniff_magic_bytes() {
        assert_eq!(
            ImageFormat::sniff(b"\x89PNG\r\n\x1a\n rest"),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::sniff(b"\xFF\xD8\xFF\xE0"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"plain text"), None);
    }

    #[test]
    fn display_and_mime() {
        assert_eq!(ImageFormat::Jpeg.to_string(), "jpg");
        assert_eq!(ImageFormat::WebP.mime(), "image/webp");
        assert!(!ImageFormat::Jpeg.supports_alpha());
        assert!(ImageFormat::Png.supports_alpha());
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&ImageFormat::WebP).unwrap();
        assert_eq!(json, "\"webp\"");
        let back: ImageFormat = serde_json::from_str("\"png\"").unwrap();
        assert_eq!(back, ImageFormat::Png);
    }

    #[test]
    fn image_round_trip() {
        for f in [
            ImageFormat::Jpeg,
            ImageFormat::Png,
            ImageFormat::WebP,
            ImageFormat::Gif,
            ImageFormat::Bmp,
            ImageFormat::Tiff,
        ] {
            assert_eq!(ImageFormat::from_image(f.to_image()), Some(f));
        }
    }
}
