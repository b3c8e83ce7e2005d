//! Filesystem-backed object store.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{FetchOutcome, FetchPolicy, ObjectStore, StoredObject};

/// Serves objects from files below `root`.
///
/// There is no origin the edge could reach on its own, so [`FetchPolicy::Bypass`]
/// is ignored and the bytes are always returned.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key below the root, refusing anything that could escape it.
    fn resolve(&self, key: &str) -> ih_core::Result<PathBuf> {
        let rel = Path::new(key);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || escapes {
            return Err(ih_core::Error::MalformedRequest(format!(
                "object key '{key}' is not a relative path"
            )));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn get(&self, key: &str, _policy: FetchPolicy) -> ih_core::Result<FetchOutcome> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => {
                tracing::trace!("Read {} bytes from {}", data.len(), path.display());
                Ok(FetchOutcome::Fetched(StoredObject::sniffed(Bytes::from(data))))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ih_core::Error::not_found(key))
            }
            Err(e) => Err(ih_core::Error::store(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }
}
