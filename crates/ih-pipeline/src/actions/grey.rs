//! `grey,<0|1>`

use async_trait::async_trait;

use ih_core::Result;

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{int_in_range, single_value};

#[derive(Debug, Clone, Copy)]
pub struct GreyAction;

#[async_trait]
impl Action for GreyAction {
    type Options = bool;

    fn name(&self) -> &'static str {
        "grey"
    }

    fn validate(&self, params: &[&str]) -> Result<bool> {
        Ok(int_in_range("Grey", single_value(self.name(), params)?, 0, 1)? == 1)
    }

    async fn apply(&self, ctx: &mut ImageContext, grey: bool) -> Result<()> {
        if !grey {
            return Ok(());
        }
        ctx.image.map(|img| Ok(img.grayscale())).await
    }
}
