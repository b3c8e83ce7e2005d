//! `sharpen,<50-399>`

use async_trait::async_trait;

use ih_core::Result;

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{int_in_range, single_value};

#[derive(Debug, Clone, Copy)]
pub struct SharpenAction;

#[async_trait]
impl Action for SharpenAction {
    /// Unsharp-mask sigma.
    type Options = f32;

    fn name(&self) -> &'static str {
        "sharpen"
    }

    fn validate(&self, params: &[&str]) -> Result<f32> {
        let v = int_in_range("Sharpen", single_value(self.name(), params)?, 50, 399)?;
        Ok(v as f32 / 100.0)
    }

    async fn apply(&self, ctx: &mut ImageContext, sigma: f32) -> Result<()> {
        ctx.image.map(move |img| Ok(img.unsharpen(sigma, 0))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigma_from_value() {
        assert_eq!(SharpenAction.validate(&["sharpen", "100"]).unwrap(), 1.0);
        assert!(SharpenAction.validate(&["sharpen", "49"]).is_err());
        assert!(SharpenAction.validate(&["sharpen", "400"]).is_err());
    }
}
