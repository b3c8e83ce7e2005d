//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires an in-memory object store into a full
//! [`AppContext`]. The [`TestHarness::with_server`] constructor starts Axum
//! on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;

use ih_core::config::Config;
use ih_server::context::AppContext;
use ih_server::router::build_router;
use ih_store::MemoryStore;
use image::{DynamicImage, Rgb, RgbImage};

/// Test harness wrapping an [`AppContext`] backed by a [`MemoryStore`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub store: Arc<MemoryStore>,
}

impl TestHarness {
    /// Harness over an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let ctx = AppContext::new(Config::default(), store.clone());
        Self { ctx, store }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::serve(Self::new()).await
    }

    /// Start an Axum server over `store` on a random port.
    pub async fn with_server_store(store: MemoryStore) -> (Self, SocketAddr) {
        Self::serve(Self::with_store(store)).await
    }

    async fn serve(harness: Self) -> (Self, SocketAddr) {
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }
}

/// Encode a solid-colour RGB image.
pub fn encode(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, format)
        .expect("failed to encode test image");
    buf.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageFormat::Jpeg)
}
