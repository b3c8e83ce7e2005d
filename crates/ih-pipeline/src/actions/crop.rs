//! `crop,w_,h_,x_,y_,g_`

use async_trait::async_trait;

use ih_core::{Error, Result};

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{split_kv, tokens, u32_in_range, unknown_param, Gravity};

const MAX_SIDE: u32 = 16384;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropOptions {
    /// Region size; defaults to the whole remaining image.
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub x: u32,
    pub y: u32,
    pub gravity: Gravity,
}

impl CropOptions {
    /// The clipped `(x, y, w, h)` region within an image of `size`.
    pub fn region(&self, size: (u32, u32)) -> Result<(u32, u32, u32, u32)> {
        let inner = (
            self.width.unwrap_or(size.0).min(size.0),
            self.height.unwrap_or(size.1).min(size.1),
        );
        let (ox, oy) = self.gravity.origin(size, inner, (self.x, self.y));

        let (w, h) = (i64::from(size.0), i64::from(size.1));
        if ox >= w || oy >= h {
            return Err(Error::invalid("Crop origin is outside the image"));
        }
        let left = ox.max(0);
        let top = oy.max(0);
        let right = (ox + i64::from(inner.0)).min(w);
        let bottom = (oy + i64::from(inner.1)).min(h);
        if right <= left || bottom <= top {
            return Err(Error::invalid("Crop region is empty"));
        }
        Ok((
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CropAction;

#[async_trait]
impl Action for CropAction {
    type Options = CropOptions;

    fn name(&self) -> &'static str {
        "crop"
    }

    fn validate(&self, params: &[&str]) -> Result<CropOptions> {
        let mut opts = CropOptions::default();
        for token in tokens(self.name(), params) {
            let (key, value) = split_kv(token);
            match key {
                "w" => opts.width = Some(u32_in_range("Width", value, 1, MAX_SIDE)?),
                "h" => opts.height = Some(u32_in_range("Height", value, 1, MAX_SIDE)?),
                "x" => opts.x = u32_in_range("X", value, 0, MAX_SIDE)?,
                "y" => opts.y = u32_in_range("Y", value, 0, MAX_SIDE)?,
                "g" => opts.gravity = Gravity::parse(value)?,
                _ => return Err(unknown_param(key)),
            }
        }
        Ok(opts)
    }

    async fn apply(&self, ctx: &mut ImageContext, opts: CropOptions) -> Result<()> {
        let (x, y, w, h) = opts.region((ctx.image.width(), ctx.image.height()))?;
        ctx.image.map(move |img| Ok(img.crop_imm(x, y, w, h))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(params: &[&str], size: (u32, u32)) -> Result<(u32, u32, u32, u32)> {
        CropAction.validate(params)?.region(size)
    }

    #[test]
    fn anchored_regions() {
        assert_eq!(region(&["crop", "w_10", "h_10"], (100, 50)).unwrap(), (0, 0, 10, 10));
        assert_eq!(
            region(&["crop", "w_10", "h_10", "g_center"], (100, 50)).unwrap(),
            (45, 20, 10, 10)
        );
        assert_eq!(
            region(&["crop", "w_10", "h_10", "x_5", "y_5", "g_se"], (100, 50)).unwrap(),
            (85, 35, 10, 10)
        );
    }

    #[test]
    fn clipped_to_image() {
        assert_eq!(
            region(&["crop", "x_90", "y_40", "w_50", "h_50"], (100, 50)).unwrap(),
            (90, 40, 10, 10)
        );
        assert_eq!(region(&["crop", "x_10"], (100, 50)).unwrap(), (10, 0, 90, 50));
    }

    #[test]
    fn origin_outside_fails() {
        let err = region(&["crop", "x_100", "w_10"], (100, 50)).unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn bad_params() {
        assert!(CropAction.validate(&["crop", "w_0"]).is_err());
        assert!(CropAction.validate(&["crop", "g_middle"]).is_err());
        assert!(CropAction.validate(&["crop", "r_5"]).is_err());
    }
}
