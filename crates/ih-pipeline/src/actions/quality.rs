//! `quality,q_<1-100>` / `quality,Q_<1-100>`

use async_trait::async_trait;

use ih_core::{ImageFormat, Result};
use ih_engine::DEFAULT_QUALITY;

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{int_in_range, split_kv, tokens, unknown_param};

/// Quality used when the directive names neither `q` nor `Q`.
pub const DEFAULT_OUTPUT_QUALITY: u8 = 72;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityOptions {
    /// `q`: percentage of the source's estimated quality.
    pub relative: Option<u8>,
    /// `Q`: quality to encode at.
    pub absolute: Option<u8>,
}

impl QualityOptions {
    /// The encoder quality these options resolve to, given the source
    /// estimate. An absolute `Q` beats a relative `q`.
    pub fn effective(&self, estimate: Option<u8>) -> u8 {
        match (self.absolute, self.relative) {
            (Some(q), _) => q,
            (None, Some(percent)) => {
                let base = u32::from(estimate.unwrap_or(DEFAULT_QUALITY));
                // round half up
                let q = (base * u32::from(percent) + 50) / 100;
                q.clamp(1, 100) as u8
            }
            (None, None) => DEFAULT_OUTPUT_QUALITY,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QualityAction;

#[async_trait]
impl Action for QualityAction {
    type Options = QualityOptions;

    fn name(&self) -> &'static str {
        "quality"
    }

    fn validate(&self, params: &[&str]) -> Result<QualityOptions> {
        let mut opts = QualityOptions::default();
        for token in tokens(self.name(), params) {
            let (key, value) = split_kv(token);
            let slot = match key {
                "q" => &mut opts.relative,
                "Q" => &mut opts.absolute,
                _ => return Err(unknown_param(key)),
            };
            *slot = Some(int_in_range("Quality", value, 1, 100)? as u8);
        }
        Ok(opts)
    }

    async fn apply(&self, ctx: &mut ImageContext, opts: QualityOptions) -> Result<()> {
        let format = ctx.image.output_format();
        if !matches!(format, ImageFormat::Jpeg | ImageFormat::WebP) {
            tracing::debug!("Quality has no effect on {format} output");
            return Ok(());
        }

        let estimate = match (&ctx.source, opts.absolute, opts.relative) {
            (Some(source), None, Some(_)) => ih_engine::identify(source.clone()).await?.quality,
            _ => None,
        };
        let quality = opts.effective(estimate);
        tracing::debug!("Output quality {quality} (source estimate {estimate:?})");
        ctx.image.set_quality(quality);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bytes::Bytes;
    use ih_engine::ImageHandle;
    use ih_store::MemoryStore;
    use image::codecs::jpeg::JpegEncoder;
    use image::DynamicImage;

    fn jpeg(quality: u8) -> Bytes {
        let mut buf = Vec::new();
        DynamicImage::new_rgb8(20, 20)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
            .unwrap();
        Bytes::from(buf)
    }

    async fn ctx_from(bytes: Bytes) -> ImageContext {
        let image = ImageHandle::decode(bytes.clone()).await.unwrap();
        ImageContext::new(image, Arc::new(MemoryStore::new())).with_source(bytes)
    }

    #[test]
    fn range_is_enforced() {
        for bad in ["q_0", "q_-1", "q_101", "q_1111", "Q_0", "q_abc", "q"] {
            let err = QualityAction.validate(&["quality", bad]).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid argument: Quality must be between 1 and 100",
                "{bad}"
            );
        }
        for good in ["q_1", "q_100", "Q_1", "Q_100"] {
            assert!(QualityAction.validate(&["quality", good]).is_ok(), "{good}");
        }
    }

    #[test]
    fn unknown_key_is_named() {
        let err = QualityAction.validate(&["quality", "z_50"]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: Unknown param: \"z\"");
    }

    #[test]
    fn name_and_empty_tokens_skipped() {
        let opts = QualityAction
            .validate(&["quality", "", "quality", "q_30"])
            .unwrap();
        assert_eq!(opts.relative, Some(30));
    }

    #[test]
    fn effective_quality() {
        let rel = |q| QualityOptions {
            relative: Some(q),
            absolute: None,
        };
        assert_eq!(rel(50).effective(Some(82)), 41);
        assert_eq!(rel(50).effective(None), 40);
        assert_eq!(rel(1).effective(Some(10)), 1);
        assert_eq!(rel(100).effective(Some(82)), 82);

        let both = QualityOptions {
            relative: Some(50),
            absolute: Some(1),
        };
        assert_eq!(both.effective(Some(82)), 1);
        assert_eq!(QualityOptions::default().effective(Some(82)), 72);
    }

    #[tokio::test]
    async fn relative_uses_source_estimate() {
        let mut ctx = ctx_from(jpeg(82)).await;
        let opts = QualityAction.validate(&["quality", "q_50"]).unwrap();
        QualityAction.apply(&mut ctx, opts).await.unwrap();

        let estimate = ih_engine::estimate_jpeg_quality(ctx.source.as_ref().unwrap()).unwrap();
        assert_eq!(ctx.image.quality(), Some(opts.effective(Some(estimate))));
        assert!(matches!(ctx.image.quality(), Some(40..=42)));
    }

    #[tokio::test]
    async fn absolute_one_forces_one() {
        let mut ctx = ctx_from(jpeg(90)).await;
        let opts = QualityAction.validate(&["quality", "Q_1"]).unwrap();
        QualityAction.apply(&mut ctx, opts).await.unwrap();
        assert_eq!(ctx.image.quality(), Some(1));
    }

    #[tokio::test]
    async fn png_output_untouched() {
        let image = ImageHandle::from_image(DynamicImage::new_rgb8(4, 4), ImageFormat::Png);
        let mut ctx = ImageContext::new(image, Arc::new(MemoryStore::new()));
        QualityAction
            .apply(&mut ctx, QualityOptions::default())
            .await
            .unwrap();
        assert_eq!(ctx.image.quality(), None);
    }

    #[tokio::test]
    async fn default_without_params() {
        let mut ctx = ctx_from(jpeg(90)).await;
        let opts = QualityAction.validate(&["quality"]).unwrap();
        QualityAction.apply(&mut ctx, opts).await.unwrap();
        assert_eq!(ctx.image.quality(), Some(DEFAULT_OUTPUT_QUALITY));
    }
}
