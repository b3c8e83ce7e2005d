//! `format,<jpg|png|webp|...>`

use async_trait::async_trait;

use ih_core::{Error, ImageFormat, Result};

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::single_value;

#[derive(Debug, Clone, Copy)]
pub struct FormatAction;

#[async_trait]
impl Action for FormatAction {
    type Options = ImageFormat;

    fn name(&self) -> &'static str {
        "format"
    }

    fn validate(&self, params: &[&str]) -> Result<ImageFormat> {
        let value = single_value(self.name(), params)?;
        ImageFormat::from_name(value)
            .ok_or_else(|| Error::invalid(format!("Unsupported format: \"{value}\"")))
    }

    async fn apply(&self, ctx: &mut ImageContext, format: ImageFormat) -> Result<()> {
        ctx.image.set_output_format(format);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_names() {
        assert_eq!(FormatAction.validate(&["format", "jpg"]).unwrap(), ImageFormat::Jpeg);
        assert_eq!(FormatAction.validate(&["format", "webp"]).unwrap(), ImageFormat::WebP);
        assert!(FormatAction.validate(&["format", "heic"]).is_err());
        assert!(FormatAction.validate(&["format"]).is_err());
    }
}
