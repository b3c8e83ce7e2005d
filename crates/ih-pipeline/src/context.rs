//! Per-request state handed to every action in a chain.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use ih_engine::ImageHandle;
use ih_store::ObjectStore;

/// Feature flag set by the `info` action: answer with metadata, not pixels.
pub const RETURN_INFO: &str = "return_info";

/// String-keyed flags actions use to steer the response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Features(BTreeMap<String, bool>);

impl Features {
    pub fn set(&mut self, name: impl Into<String>, enabled: bool) {
        self.0.insert(name.into(), enabled);
    }

    pub fn enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }
}

/// Everything an action may touch while it runs.
///
/// One context belongs to exactly one request. Actions borrow it mutably for
/// the duration of their own `apply` and nothing keeps it afterwards.
pub struct ImageContext {
    /// The image being transformed.
    pub image: ImageHandle,
    /// Store used for secondary fetches (watermark overlays).
    pub store: Arc<dyn ObjectStore>,
    pub features: Features,
    /// Checked by the processor before each directive.
    pub cancellation: CancellationToken,
    /// The encoded bytes the image was decoded from, if known.
    pub source: Option<Bytes>,
    /// Request query parameters other than the chain.
    pub query: BTreeMap<String, String>,
}

impl ImageContext {
    pub fn new(image: ImageHandle, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            image,
            store,
            features: Features::default(),
            cancellation: CancellationToken::new(),
            source: None,
            query: BTreeMap::new(),
        }
    }

    /// Builder: attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Builder: remember the encoded source bytes.
    pub fn with_source(mut self, source: Bytes) -> Self {
        self.source = Some(source);
        self
    }

    /// Builder: expose request query parameters to actions.
    pub fn with_query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Builder: start from a preset feature set.
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Give up the context, keeping only the image for the final encode.
    pub fn into_image(self) -> ImageHandle {
        self.image
    }
}

impl std::fmt::Debug for ImageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageContext")
            .field("image", &self.image.metadata())
            .field("store", &self.store.name())
            .field("features", &self.features)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
