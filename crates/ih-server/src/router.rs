//! Axum router construction.

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::health::ping))
        .route("/ping", get(routes::health::ping))
        .route("/{*key}", get(routes::images::serve_image))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use ih_core::config::Config;
    use ih_store::MemoryStore;
    use image::DynamicImage;
    use tower::ServiceExt;

    fn app(store: MemoryStore) -> Router {
        build_router(AppContext::new(Config::default(), Arc::new(store)))
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(w, h)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn ping() {
        let response = get(app(MemoryStore::new()), "/ping").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn bypass_is_forbidden() {
        let store = MemoryStore::new().with_bypass(true);
        store.insert("a.png", png(2, 2));
        let response = get(app(store), "/a.png").await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Please visit the origin directly");
    }

    #[tokio::test]
    async fn transform_sets_content_type() {
        let store = MemoryStore::new();
        store.insert("a.png", png(20, 10));
        let response = get(app(store), "/a.png?x-oss-process=image/resize,w_10/format,webp").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/webp");
    }

    #[tokio::test]
    async fn unknown_action_is_bad_request() {
        let store = MemoryStore::new();
        store.insert("a.png", png(2, 2));
        let response = get(app(store), "/a.png/@image/sepia,1").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let request_id = response.headers()["x-request-id"].to_str().unwrap().to_string();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "unknown_action");
        assert_eq!(json["request_id"], request_id.as_str());
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let response = get(app(MemoryStore::new()), "/nope.png/@image/rotate,90").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
