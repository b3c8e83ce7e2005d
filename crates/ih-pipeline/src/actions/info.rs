//! `info`: answer with image metadata instead of pixels.

use async_trait::async_trait;

use ih_core::{Error, Result};

use crate::action::Action;
use crate::context::{ImageContext, RETURN_INFO};
use crate::params::tokens;

#[derive(Debug, Clone, Copy)]
pub struct InfoAction;

#[async_trait]
impl Action for InfoAction {
    type Options = ();

    fn name(&self) -> &'static str {
        "info"
    }

    fn validate(&self, params: &[&str]) -> Result<()> {
        match tokens(self.name(), params).next() {
            None => Ok(()),
            Some(_) => Err(Error::invalid("Info takes no parameters")),
        }
    }

    async fn apply(&self, ctx: &mut ImageContext, _options: ()) -> Result<()> {
        ctx.features.set(RETURN_INFO, true);
        Ok(())
    }
}
