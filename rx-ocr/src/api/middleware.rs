//! Rewrites transport-level body-limit rejections into the service's
//! `{detail}` 400, so an oversized upload gets the same answer whether it is
//! caught by the handler or by the request body cap.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractors::too_large;
use super::state::AppState;

pub async fn upload_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::debug!("Request body exceeded transport cap");
        return too_large(state.config.upload.max_upload_bytes).into_response();
    }

    response
}
