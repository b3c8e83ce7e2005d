//! `circle,r_<1-4096>`

use async_trait::async_trait;
use image::{DynamicImage, Rgba};

use ih_core::{Error, Result};

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{split_kv, tokens, u32_in_range, unknown_param};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircleOptions {
    pub radius: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct CircleAction;

#[async_trait]
impl Action for CircleAction {
    type Options = CircleOptions;

    fn name(&self) -> &'static str {
        "circle"
    }

    fn validate(&self, params: &[&str]) -> Result<CircleOptions> {
        let mut radius = None;
        for token in tokens(self.name(), params) {
            match split_kv(token) {
                ("r", value) => radius = Some(u32_in_range("Radius", value, 1, 4096)?),
                (key, _) => return Err(unknown_param(key)),
            }
        }
        let radius = radius.ok_or_else(|| Error::invalid("Circle requires r"))?;
        Ok(CircleOptions { radius })
    }

    async fn apply(&self, ctx: &mut ImageContext, opts: CircleOptions) -> Result<()> {
        ctx.image.map(move |img| Ok(circle(&img, opts.radius))).await
    }
}

/// Crop the square around the centre and clear everything outside the
/// inscribed circle.
fn circle(img: &DynamicImage, radius: u32) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    let r = radius.min(w.min(h) / 2).max(1);
    let side = (2 * r).min(w).min(h);
    let x0 = (w - side) / 2;
    let y0 = (h - side) / 2;

    let mut out = img.crop_imm(x0, y0, side, side).to_rgba8();
    let c = f64::from(side) / 2.0;
    let r2 = f64::from(r) * f64::from(r);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let dx = f64::from(x) + 0.5 - c;
        let dy = f64::from(y) + 0.5 - c;
        if dx * dx + dy * dy > r2 {
            *px = Rgba([0, 0, 0, 0]);
        }
    }
    DynamicImage::ImageRgba8(out)
}
