//! `bright,<-100-100>`

use async_trait::async_trait;

use ih_core::Result;

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{int_in_range, single_value};

#[derive(Debug, Clone, Copy)]
pub struct BrightAction;

#[async_trait]
impl Action for BrightAction {
    /// Per-channel shift, already scaled to 0..=255 units.
    type Options = i32;

    fn name(&self) -> &'static str {
        "bright"
    }

    fn validate(&self, params: &[&str]) -> Result<i32> {
        let v = int_in_range("Bright", single_value(self.name(), params)?, -100, 100)?;
        // round(v * 2.55), half away from zero, in integers
        let scaled = v * 255;
        Ok(((scaled.abs() + 50) / 100 * scaled.signum()) as i32)
    }

    async fn apply(&self, ctx: &mut ImageContext, shift: i32) -> Result<()> {
        ctx.image.map(move |img| Ok(img.brighten(shift))).await
    }
}
