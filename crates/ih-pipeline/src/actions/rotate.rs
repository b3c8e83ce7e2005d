//! `rotate,<0-360>`: clockwise, right angles only.

use async_trait::async_trait;

use ih_core::{Error, Result};

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{single_value, u32_in_range};

#[derive(Debug, Clone, Copy)]
pub struct RotateAction;

#[async_trait]
impl Action for RotateAction {
    /// Clockwise degrees, normalised to 0, 90, 180 or 270.
    type Options = u32;

    fn name(&self) -> &'static str {
        "rotate"
    }

    fn validate(&self, params: &[&str]) -> Result<u32> {
        let degrees = u32_in_range("Rotate angle", single_value(self.name(), params)?, 0, 360)?;
        if degrees % 90 != 0 {
            return Err(Error::invalid("Rotate angle must be a multiple of 90"));
        }
        Ok(degrees % 360)
    }

    async fn apply(&self, ctx: &mut ImageContext, degrees: u32) -> Result<()> {
        match degrees {
            90 => ctx.image.map(|img| Ok(img.rotate90())).await,
            180 => ctx.image.map(|img| Ok(img.rotate180())).await,
            270 => ctx.image.map(|img| Ok(img.rotate270())).await,
            _ => Ok(()),
        }
    }
}
