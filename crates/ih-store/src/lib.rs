//! # ih-store
//!
//! Object-store abstraction the image handler fetches source bytes from.
//!
//! - **[`ObjectStore`]** trait -- `get(key, policy)` returning a
//!   [`FetchOutcome`].
//! - **[`FetchPolicy::Bypass`]** -- the caller has no transform to apply, so a
//!   store fronting a directly reachable origin may answer
//!   [`FetchOutcome::DirectAccessRequested`] instead of moving the bytes.
//! - Implementations: [`LocalStore`] (filesystem), [`HttpStore`]
//!   (S3-compatible HTTP origin) and [`MemoryStore`] (tests and demos).
//! - **[`store_from_config`]** -- factory from [`StoreConfig`].

pub mod http;
pub mod local;
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use ih_core::config::StoreConfig;
use ih_core::ImageFormat;

pub use http::HttpStore;
pub use local::LocalStore;
pub use memory::MemoryStore;

/// Content type used when the bytes are not a recognised image.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Raw bytes of an object together with its content type.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub buffer: Bytes,
    pub content_type: String,
}

impl StoredObject {
    /// Wrap `buffer`, detecting the content type from its magic bytes.
    pub fn sniffed(buffer: Bytes) -> Self {
        let content_type = ImageFormat::sniff(&buffer)
            .map(|f| f.mime())
            .unwrap_or(OCTET_STREAM)
            .to_string();
        Self {
            buffer,
            content_type,
        }
    }
}

/// How the caller wants a `get` to behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Always return the bytes.
    Fetch,
    /// No transform is requested; the store may skip the fetch and ask the
    /// edge to read the object from origin itself.
    Bypass,
}

/// Result of a [`ObjectStore::get`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fetched(StoredObject),
    /// The store declined to fetch; the edge should go to origin directly.
    DirectAccessRequested,
}

impl FetchOutcome {
    /// Unwrap the fetched object.
    ///
    /// # Errors
    ///
    /// Returns [`ih_core::Error::Internal`] for `DirectAccessRequested`, which
    /// a store must only produce under [`FetchPolicy::Bypass`].
    pub fn into_object(self) -> ih_core::Result<StoredObject> {
        match self {
            FetchOutcome::Fetched(obj) => Ok(obj),
            FetchOutcome::DirectAccessRequested => Err(ih_core::Error::Internal(
                "store requested direct access for a required fetch".into(),
            )),
        }
    }
}

/// Fetch capability over object keys.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short name used in logs (e.g. "local").
    fn name(&self) -> &'static str;

    /// Fetch the object stored under `key`.
    ///
    /// # Errors
    ///
    /// [`ih_core::Error::NotFound`] when the key does not exist,
    /// [`ih_core::Error::Store`] for any other origin failure.
    async fn get(&self, key: &str, policy: FetchPolicy) -> ih_core::Result<FetchOutcome>;

    /// Fetch `key`, never bypassing.
    async fn fetch(&self, key: &str) -> ih_core::Result<StoredObject> {
        self.get(key, FetchPolicy::Fetch).await?.into_object()
    }
}

/// Build the configured object store.
///
/// # Errors
///
/// Returns [`ih_core::Error::Internal`] if the HTTP client cannot be built.
pub fn store_from_config(config: &StoreConfig) -> ih_core::Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config {
        StoreConfig::Local { root } => Arc::new(LocalStore::new(root.clone())),
        StoreConfig::Http {
            base_url,
            bypass,
            timeout_secs,
        } => Arc::new(
            HttpStore::new(base_url.clone(), Duration::from_secs(*timeout_secs))?
                .with_bypass(*bypass),
        ),
    };
    tracing::debug!("Object store: {}", store.name());
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn sniffed_content_type() {
        let png = StoredObject::sniffed(Bytes::from_static(b"\x89PNG\r\n\x1a\n...."));
        assert_eq!(png.content_type, "image/png");

        let other = StoredObject::sniffed(Bytes::from_static(b"hello"));
        assert_eq!(other.content_type, OCTET_STREAM);
    }

    #[test]
    fn direct_access_is_not_an_object() {
        let err = FetchOutcome::DirectAccessRequested.into_object().unwrap_err();
        assert!(matches!(err, ih_core::Error::Internal(_)));
    }

    #[test]
    fn factory_builds_each_kind() {
        let local = store_from_config(&StoreConfig::Local {
            root: PathBuf::from("/tmp"),
        })
        .unwrap();
        assert_eq!(local.name(), "local");

        let http = store_from_config(&StoreConfig::Http {
            base_url: "http://127.0.0.1:9".into(),
            bypass: true,
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(http.name(), "http");
    }
}
