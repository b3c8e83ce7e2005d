//! # ih-engine
//!
//! Adapter over the [`image`] crate. Everything that touches pixels or codecs
//! lives here, and every CPU-heavy call runs on tokio's blocking pool.
//!
//! - [`ImageHandle`]: decode, inspect, mutate, encode.
//! - [`identify`]: header-only [`Probe`], including JPEG quality estimation.

pub mod handle;
pub mod probe;
pub mod quality;

pub use handle::{Encoded, ImageHandle, Metadata};
pub use probe::{identify, identify_sync, Probe};
pub use quality::estimate_jpeg_quality;

/// Quality the JPEG encoder uses when none was set.
pub const DEFAULT_QUALITY: u8 = 80;

/// Run `f` on the blocking pool and flatten the join error.
pub(crate) async fn blocking<T, F>(f: F) -> ih_core::Result<T>
where
    F: FnOnce() -> ih_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ih_core::Error::Internal(format!("image task failed: {e}")))?
}
