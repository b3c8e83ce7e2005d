//! `rounded-corners,r_<1-4096>`

use async_trait::async_trait;
use image::{DynamicImage, Rgba};

use ih_core::{Error, Result};

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{split_kv, tokens, u32_in_range, unknown_param};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundedCornersOptions {
    pub radius: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct RoundedCornersAction;

#[async_trait]
impl Action for RoundedCornersAction {
    type Options = RoundedCornersOptions;

    fn name(&self) -> &'static str {
        "rounded-corners"
    }

    fn validate(&self, params: &[&str]) -> Result<RoundedCornersOptions> {
        let mut radius = None;
        for token in tokens(self.name(), params) {
            match split_kv(token) {
                ("r", value) => radius = Some(u32_in_range("Radius", value, 1, 4096)?),
                (key, _) => return Err(unknown_param(key)),
            }
        }
        let radius = radius.ok_or_else(|| Error::invalid("Rounded corners requires r"))?;
        Ok(RoundedCornersOptions { radius })
    }

    async fn apply(&self, ctx: &mut ImageContext, opts: RoundedCornersOptions) -> Result<()> {
        ctx.image.map(move |img| Ok(round_corners(&img, opts.radius))).await
    }
}

fn round_corners(img: &DynamicImage, radius: u32) -> DynamicImage {
    let mut out = img.to_rgba8();
    let (w, h) = out.dimensions();
    let r = f64::from(radius.min(w.min(h) / 2));
    if r == 0.0 {
        return DynamicImage::ImageRgba8(out);
    }

    let (fw, fh) = (f64::from(w), f64::from(h));
    for (x, y, px) in out.enumerate_pixels_mut() {
        let px_x = f64::from(x) + 0.5;
        let px_y = f64::from(y) + 0.5;
        // Nearest corner centre, if the pixel lies in a corner square.
        let cx = if px_x < r { r } else if px_x > fw - r { fw - r } else { continue };
        let cy = if px_y < r { r } else if px_y > fh - r { fh - r } else { continue };
        let (dx, dy) = (px_x - cx, px_y - cy);
        if dx * dx + dy * dy > r * r {
            *px = Rgba([0, 0, 0, 0]);
        }
    }
    DynamicImage::ImageRgba8(out)
}
