//! `blur,r_<1-50>,s_<1-50>`

use async_trait::async_trait;

use ih_core::{Error, Result};

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{split_kv, tokens, u32_in_range, unknown_param};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlurOptions {
    pub radius: Option<u32>,
    pub sigma: Option<u32>,
}

impl BlurOptions {
    /// Gaussian sigma: `s` if given, otherwise half the radius.
    pub fn sigma(&self) -> f32 {
        match (self.sigma, self.radius) {
            (Some(s), _) => s as f32,
            (None, Some(r)) => r as f32 / 2.0,
            (None, None) => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BlurAction;

#[async_trait]
impl Action for BlurAction {
    type Options = BlurOptions;

    fn name(&self) -> &'static str {
        "blur"
    }

    fn validate(&self, params: &[&str]) -> Result<BlurOptions> {
        let mut opts = BlurOptions::default();
        for token in tokens(self.name(), params) {
            let (key, value) = split_kv(token);
            match key {
                "r" => opts.radius = Some(u32_in_range("Blur radius", value, 1, 50)?),
                "s" => opts.sigma = Some(u32_in_range("Blur sigma", value, 1, 50)?),
                _ => return Err(unknown_param(key)),
            }
        }
        if opts.radius.is_none() && opts.sigma.is_none() {
            return Err(Error::invalid("Blur requires r or s"));
        }
        Ok(opts)
    }

    async fn apply(&self, ctx: &mut ImageContext, opts: BlurOptions) -> Result<()> {
        let sigma = opts.sigma();
        ctx.image.map(move |img| Ok(img.blur(sigma))).await
    }
}
