//! Sequential dispatch of a directive chain.

use std::sync::Arc;

use ih_core::{Error, Result};

use crate::context::ImageContext;
use crate::registry::ActionRegistry;
use crate::request::ActionDirective;

/// Namespace marker that opens every image chain.
pub const NAMESPACE: &str = "image";

/// Resolves directives against a registry and runs them in order.
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    registry: Arc<ActionRegistry>,
}

impl ImageProcessor {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self { registry }
    }

    /// Processor over [`ActionRegistry::builtin`].
    pub fn builtin() -> Self {
        Self::new(Arc::new(ActionRegistry::builtin()))
    }

    pub fn name(&self) -> &'static str {
        NAMESPACE
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Admission check for a whole chain. Pure; performs no I/O.
    ///
    /// # Errors
    ///
    /// The first [`Error::UnknownAction`] or [`Error::InvalidArgument`] in
    /// chain order.
    pub fn validate(&self, directives: &[ActionDirective]) -> Result<()> {
        for directive in directives.iter().filter(|d| d.is_transform()) {
            let action = self
                .registry
                .resolve(directive.name())
                .ok_or_else(|| Error::UnknownAction(directive.name().to_string()))?;
            action.check(&directive.params())?;
        }
        Ok(())
    }

    /// Apply every directive to `ctx`, strictly in order.
    ///
    /// On error the chain stops; transforms already applied stay applied.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] if the context's token fires between steps, or
    /// the first action error.
    pub async fn process(&self, ctx: &mut ImageContext, directives: &[ActionDirective]) -> Result<()> {
        for directive in directives.iter().filter(|d| d.is_transform()) {
            if ctx.cancellation.is_cancelled() {
                tracing::debug!("Chain cancelled before {}", directive.name());
                return Err(Error::Cancelled);
            }

            let action = self
                .registry
                .resolve(directive.name())
                .ok_or_else(|| Error::UnknownAction(directive.name().to_string()))?;

            tracing::debug!("Applying {}", directive.raw());
            action.process(ctx, &directive.params()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::parse_chain;
    use ih_core::ImageFormat;
    use ih_engine::ImageHandle;
    use ih_store::MemoryStore;
    use image::DynamicImage;
    use tokio_util::sync::CancellationToken;

    fn ctx(w: u32, h: u32) -> ImageContext {
        let image = ImageHandle::from_image(DynamicImage::new_rgb8(w, h), ImageFormat::Png);
        ImageContext::new(image, Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn order_matters() {
        let processor = ImageProcessor::builtin();

        let mut a = ctx(200, 100);
        let resize_then_crop = parse_chain("image/resize,w_100/crop,w_80,h_80").unwrap();
        processor.process(&mut a, &resize_then_crop).await.unwrap();
        assert_eq!((a.image.width(), a.image.height()), (80, 50));

        let mut b = ctx(200, 100);
        let crop_then_resize = parse_chain("image/crop,w_80,h_80/resize,w_100").unwrap();
        processor.process(&mut b, &crop_then_resize).await.unwrap();
        // 80x80 is never enlarged under the default limit.
        assert_eq!((b.image.width(), b.image.height()), (80, 80));
    }

    #[tokio::test]
    async fn unknown_action_aborts_chain() {
        let processor = ImageProcessor::builtin();
        let mut c = ctx(100, 100);
        let chain = parse_chain("image/rotate,90/sepia,1/format,jpg").unwrap();

        let err = processor.validate(&chain).unwrap_err();
        assert!(matches!(err, Error::UnknownAction(ref n) if n == "sepia"));

        let err = processor.process(&mut c, &chain).await.unwrap_err();
        assert!(matches!(err, Error::UnknownAction(_)));
        // format,jpg after the unknown action never ran.
        assert_eq!(c.image.output_format(), ImageFormat::Png);
    }

    #[tokio::test]
    async fn invalid_argument_stops_before_later_steps() {
        let processor = ImageProcessor::builtin();
        let mut c = ctx(100, 60);
        let chain = parse_chain("image/rotate,90/quality,q_0/format,jpg").unwrap();

        let err = processor.process(&mut c, &chain).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: Quality must be between 1 and 100");
        // The rotate before it stays applied.
        assert_eq!((c.image.width(), c.image.height()), (60, 100));
        assert_eq!(c.image.output_format(), ImageFormat::Png);
    }

    #[tokio::test]
    async fn cancelled_before_first_step() {
        let processor = ImageProcessor::builtin();
        let token = CancellationToken::new();
        token.cancel();
        let mut c = ctx(10, 10).with_cancellation(token);

        let chain = parse_chain("image/rotate,90").unwrap();
        let err = processor.process(&mut c, &chain).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn validate_is_repeatable() {
        let processor = ImageProcessor::builtin();
        let good = parse_chain("image/resize,w_10/quality,Q_90").unwrap();
        let bad = parse_chain("image/quality,x_1").unwrap();
        for _ in 0..3 {
            assert!(processor.validate(&good).is_ok());
            let err = processor.validate(&bad).unwrap_err();
            assert_eq!(err.to_string(), "Invalid argument: Unknown param: \"x\"");
        }
    }

    #[test]
    fn validate_yields_equal_options() {
        use crate::action::Action;
        use crate::actions::{CropAction, QualityAction, ResizeAction};

        let quality = ["quality", "q_50", "Q_90"];
        assert_eq!(
            QualityAction.validate(&quality).unwrap(),
            QualityAction.validate(&quality).unwrap()
        );

        let resize = ["resize", "m_pad", "w_100", "h_50", "color_00FF00"];
        assert_eq!(
            ResizeAction.validate(&resize).unwrap(),
            ResizeAction.validate(&resize).unwrap()
        );

        let crop = ["crop", "x_5", "y_5", "w_10", "h_10", "g_center"];
        assert_eq!(
            CropAction.validate(&crop).unwrap(),
            CropAction.validate(&crop).unwrap()
        );
    }

    #[tokio::test]
    async fn namespace_and_empty_directives_skipped() {
        let processor = ImageProcessor::builtin();
        let mut c = ctx(10, 10);
        let chain = vec![
            ActionDirective::parse("image"),
            ActionDirective::parse(""),
            ActionDirective::parse("format,jpg"),
        ];
        processor.process(&mut c, &chain).await.unwrap();
        assert_eq!(c.image.output_format(), ImageFormat::Jpeg);
    }
}
