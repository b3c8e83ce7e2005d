//! S3-compatible HTTP origin store.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::StatusCode;

use crate::{FetchOutcome, FetchPolicy, ObjectStore, StoredObject};

/// Bytes escaped inside one key segment. `/` stays a separator.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Fetches objects with plain `GET {base_url}/{key}` requests.
///
/// The origin is assumed to be reachable by the edge as well, so by default a
/// [`FetchPolicy::Bypass`] request is answered with
/// [`FetchOutcome::DirectAccessRequested`] without touching the network.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    bypass: bool,
}

impl HttpStore {
    /// Create a store for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ih_core::Error::Internal`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ih_core::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ih_core::Error::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bypass: true,
        })
    }

    /// Builder: whether untransformed requests are sent straight to origin.
    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }

    fn url_for(&self, key: &str) -> String {
        let path = key
            .trim_start_matches('/')
            .split('/')
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl ObjectStore for HttpStore {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get(&self, key: &str, policy: FetchPolicy) -> ih_core::Result<FetchOutcome> {
        if policy == FetchPolicy::Bypass && self.bypass {
            tracing::debug!("Bypassing fetch of {key}; origin is directly reachable");
            return Ok(FetchOutcome::DirectAccessRequested);
        }

        let url = self.url_for(key);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ih_core::Error::store(format!("GET {url} failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ih_core::Error::not_found(key));
        }
        if !status.is_success() {
            return Err(ih_core::Error::store(format!("GET {url} returned {status}")));
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let buffer = resp
            .bytes()
            .await
            .map_err(|e| ih_core::Error::store(format!("reading body of {url} failed: {e}")))?;

        let object = match content_type {
            Some(content_type) => StoredObject {
                buffer,
                content_type,
            },
            None => StoredObject::sniffed(buffer),
        };
        Ok(FetchOutcome::Fetched(object))
    }
}
