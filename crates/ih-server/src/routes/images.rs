//! Image serving.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use tokio_util::sync::CancellationToken;

use ih_pipeline::{parse_request, Rendered};

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;

/// Body of the 403 sent when the client should read from origin.
pub const DIRECT_ACCESS_MESSAGE: &str = "Please visit the origin directly";

/// GET /{*key}
pub async fn serve_image(
    State(ctx): State<AppContext>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let fail = |e: ih_core::Error| AppError::new(e).with_request_id(request_id.clone());

    let parsed = parse_request(uri.path(), &query).map_err(fail)?;
    tracing::debug!(
        "Rendering {} with {} directive(s)",
        parsed.object_key,
        parsed.actions.len()
    );

    let cancel = CancellationToken::new();
    let timeout = ctx.config.server.request_timeout();
    let rendered = match tokio::time::timeout(timeout, ctx.service.render(&parsed, cancel.clone())).await
    {
        Ok(result) => result.map_err(fail)?,
        Err(_) => {
            // Pixel work already running on the blocking pool finishes; queued
            // work sees the token and is skipped.
            cancel.cancel();
            tracing::warn!("Rendering {} exceeded {timeout:?}", parsed.object_key);
            return Err(fail(ih_core::Error::Timeout));
        }
    };

    Ok(match rendered {
        Rendered::DirectAccess => (StatusCode::FORBIDDEN, DIRECT_ACCESS_MESSAGE).into_response(),
        Rendered::Original(object) => (
            [(header::CONTENT_TYPE, object.content_type)],
            object.buffer,
        )
            .into_response(),
        Rendered::Image { bytes, format } => {
            ([(header::CONTENT_TYPE, format.mime())], bytes).into_response()
        }
        Rendered::Info(info) => Json(info).into_response(),
    })
}
