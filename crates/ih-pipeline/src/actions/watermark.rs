//! `watermark,image_<base64 key>,t_,g_,x_,y_,P_`
//!
//! The overlay is another object in the same store, named by its URL-safe
//! base64 key. Text watermarks are not supported.

use async_trait::async_trait;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use image::imageops::FilterType;
use image::DynamicImage;

use ih_core::{Error, Result};
use ih_engine::ImageHandle;

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{split_kv, tokens, u32_in_range, unknown_param, Gravity};

/// URL-safe alphabet, padding optional.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkOptions {
    /// Object key of the overlay image.
    pub key: String,
    /// 0-100.
    pub opacity: u8,
    pub gravity: Gravity,
    pub x: u32,
    pub y: u32,
    /// Overlay width as a percentage of the base image width.
    pub percent: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
pub struct WatermarkAction;

#[async_trait]
impl Action for WatermarkAction {
    type Options = WatermarkOptions;

    fn name(&self) -> &'static str {
        "watermark"
    }

    fn validate(&self, params: &[&str]) -> Result<WatermarkOptions> {
        let mut key = None;
        let mut opts = WatermarkOptions {
            key: String::new(),
            opacity: 100,
            gravity: Gravity::SouthEast,
            x: 10,
            y: 10,
            percent: None,
        };
        for token in tokens(self.name(), params) {
            let (k, value) = split_kv(token);
            match k {
                "image" => key = Some(decode_key(value)?),
                "text" => return Err(Error::invalid("Text watermarks are not supported")),
                "t" => opts.opacity = u32_in_range("Transparency", value, 0, 100)? as u8,
                "g" => opts.gravity = Gravity::parse(value)?,
                "x" => opts.x = u32_in_range("X", value, 0, 4096)?,
                "y" => opts.y = u32_in_range("Y", value, 0, 4096)?,
                "P" => opts.percent = Some(u32_in_range("Percent", value, 1, 100)?),
                _ => return Err(unknown_param(k)),
            }
        }
        opts.key = key.ok_or_else(|| Error::invalid("Watermark requires image"))?;
        Ok(opts)
    }

    async fn apply(&self, ctx: &mut ImageContext, opts: WatermarkOptions) -> Result<()> {
        let overlay = ctx.store.fetch(&opts.key).await?;
        let mark = ImageHandle::decode(overlay.buffer).await?.into_pixels();
        tracing::debug!("Watermark {} ({}x{})", opts.key, mark.width(), mark.height());
        ctx.image
            .map(move |base| Ok(composite(&base, mark, &opts)))
            .await
    }
}

fn decode_key(value: &str) -> Result<String> {
    let bad = || Error::invalid(format!("Watermark image must be URL-safe base64, got \"{value}\""));
    let bytes = KEY_ENGINE.decode(value).map_err(|_| bad())?;
    let key = String::from_utf8(bytes).map_err(|_| bad())?;
    let key = key.trim_start_matches('/').to_string();
    if key.is_empty() || key.split('/').any(|s| s == "..") {
        return Err(bad());
    }
    Ok(key)
}

fn composite(base: &DynamicImage, mark: DynamicImage, opts: &WatermarkOptions) -> DynamicImage {
    let mark = match opts.percent {
        Some(p) if mark.width() > 0 => {
            let w = (u64::from(base.width()) * u64::from(p) / 100).max(1);
            let h = (u64::from(mark.height()) * w / u64::from(mark.width())).max(1);
            mark.resize_exact(w as u32, h as u32, FilterType::Lanczos3)
        }
        _ => mark,
    };

    let mut mark = mark.to_rgba8();
    if opts.opacity < 100 {
        for px in mark.pixels_mut() {
            px.0[3] = (u16::from(px.0[3]) * u16::from(opts.opacity) / 100) as u8;
        }
    }

    let (x, y) = opts.gravity.origin(
        (base.width(), base.height()),
        mark.dimensions(),
        (opts.x, opts.y),
    );
    let mut canvas = base.to_rgba8();
    image::imageops::overlay(&mut canvas, &mark, x, y);
    DynamicImage::ImageRgba8(canvas)
}
