//! In-memory object store.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::{FetchOutcome, FetchPolicy, ObjectStore, StoredObject};

/// Concurrent key/value store that counts how it was used.
///
/// With `bypass` enabled it behaves like an origin the edge can reach
/// directly: [`FetchPolicy::Bypass`] requests are answered with
/// [`FetchOutcome::DirectAccessRequested`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: DashMap<String, StoredObject>,
    bypass: bool,
    fetches: AtomicUsize,
    bypasses: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: answer bypass requests with a direct-access signal.
    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }

    /// Store `data` under `key`, sniffing its content type.
    pub fn insert(&self, key: impl Into<String>, data: impl Into<Bytes>) {
        self.objects
            .insert(key.into(), StoredObject::sniffed(data.into()));
    }

    /// Number of `get` calls that returned bytes.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `get` calls answered with a direct-access signal.
    pub fn bypass_count(&self) -> usize {
        self.bypasses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str, policy: FetchPolicy) -> ih_core::Result<FetchOutcome> {
        if policy == FetchPolicy::Bypass && self.bypass {
            self.bypasses.fetch_add(1, Ordering::SeqCst);
            return Ok(FetchOutcome::DirectAccessRequested);
        }

        let object = self
            .objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ih_core::Error::not_found(key))?;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(FetchOutcome::Fetched(object))
    }
}
