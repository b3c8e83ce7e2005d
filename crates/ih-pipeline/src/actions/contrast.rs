//! `contrast,<-100-100>`

use async_trait::async_trait;

use ih_core::Result;

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{int_in_range, single_value};

#[derive(Debug, Clone, Copy)]
pub struct ContrastAction;

#[async_trait]
impl Action for ContrastAction {
    type Options = f32;

    fn name(&self) -> &'static str {
        "contrast"
    }

    fn validate(&self, params: &[&str]) -> Result<f32> {
        Ok(int_in_range("Contrast", single_value(self.name(), params)?, -100, 100)? as f32)
    }

    async fn apply(&self, ctx: &mut ImageContext, contrast: f32) -> Result<()> {
        ctx.image.map(move |img| Ok(img.adjust_contrast(contrast))).await
    }
}
