//! End-to-end rendering of a parsed request.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use ih_core::{Error, ImageFormat, Result};
use ih_engine::{ImageHandle, Metadata};
use ih_store::{FetchOutcome, FetchPolicy, ObjectStore, StoredObject};

use crate::context::{ImageContext, RETURN_INFO};
use crate::processor::ImageProcessor;
use crate::request::ParsedRequest;

/// What the HTTP layer should send back.
#[derive(Debug)]
pub enum Rendered {
    /// No transform was asked for and the store wants the client to go to
    /// origin itself.
    DirectAccess,
    /// No transform was asked for; the stored bytes as they are.
    Original(StoredObject),
    Image { bytes: Bytes, format: ImageFormat },
    Info(ImageInfo),
}

/// `{"value": ...}` wrapper used by every [`ImageInfo`] field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoValue {
    pub value: String,
}

impl InfoValue {
    fn new(value: impl ToString) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

/// Response body of the `info` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageInfo {
    pub file_size: InfoValue,
    pub format: InfoValue,
    pub image_height: InfoValue,
    pub image_width: InfoValue,
}

impl From<Metadata> for ImageInfo {
    fn from(meta: Metadata) -> Self {
        Self {
            file_size: InfoValue::new(meta.size),
            format: InfoValue::new(meta.format),
            image_height: InfoValue::new(meta.height),
            image_width: InfoValue::new(meta.width),
        }
    }
}

/// Fetch → decode → process → encode, with the bypass short-cut.
#[derive(Clone)]
pub struct ImageService {
    store: Arc<dyn ObjectStore>,
    processor: ImageProcessor,
}

impl ImageService {
    pub fn new(store: Arc<dyn ObjectStore>, processor: ImageProcessor) -> Self {
        Self { store, processor }
    }

    /// Service over the built-in actions.
    pub fn with_builtin(store: Arc<dyn ObjectStore>) -> Self {
        Self::new(store, ImageProcessor::builtin())
    }

    pub fn processor(&self) -> &ImageProcessor {
        &self.processor
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Render `request`. The chain is validated before any store access.
    pub async fn render(&self, request: &ParsedRequest, cancel: CancellationToken) -> Result<Rendered> {
        self.processor.validate(&request.actions)?;

        let key = request.object_key.as_str();
        if !request.has_transforms() {
            return match self.store.get(key, FetchPolicy::Bypass).await? {
                FetchOutcome::DirectAccessRequested => {
                    tracing::debug!("No transforms for {key}; directing client to origin");
                    Ok(Rendered::DirectAccess)
                }
                FetchOutcome::Fetched(object) => Ok(Rendered::Original(object)),
            };
        }

        let source = self.store.fetch(key).await?;
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let image = ImageHandle::decode(source.buffer.clone())
            .await?
            .with_cancellation(cancel.clone());

        let mut ctx = ImageContext::new(image, Arc::clone(&self.store))
            .with_source(source.buffer)
            .with_cancellation(cancel)
            .with_query(request.query.clone());
        self.processor.process(&mut ctx, &request.actions).await?;

        if ctx.features.enabled(RETURN_INFO) {
            return Ok(Rendered::Info(ctx.image.metadata().into()));
        }

        let encoded = ctx.into_image().encode().await?;
        Ok(Rendered::Image {
            format: encoded.info.format,
            bytes: encoded.bytes,
        })
    }
}

impl std::fmt::Debug for ImageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageService")
            .field("store", &self.store.name())
            .field("processor", &self.processor)
            .finish()
    }
}
