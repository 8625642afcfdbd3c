use axum::extract::State;
use axum::Json;

use crate::api::dto::{GeminiTestResponse, HealthResponse, RootResponse, SERVICE_NAME};
use crate::api::state::AppState;

/// `GET /`
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = RootResponse),
    )
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{SERVICE_NAME} is running"),
        status: "healthy".to_string(),
    })
}

/// `GET /health`
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health and credential status", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        gemini_configured: state.config.gemini.is_configured(),
        service: SERVICE_NAME.to_string(),
    })
}

/// `GET /test-gemini`
///
/// Round trip against the diagnostic model. Always answers 200; failures are
/// reported in the body.
#[utoipa::path(
    get,
    path = "/test-gemini",
    tag = "diagnostics",
    responses(
        (status = 200, description = "Outcome of a trivial Gemini call", body = GeminiTestResponse),
    )
)]
pub async fn test_gemini(State(state): State<AppState>) -> Json<GeminiTestResponse> {
    match state.extractor.say_hello().await {
        Ok(text) => Json(GeminiTestResponse::ok(text)),
        Err(e) => {
            tracing::warn!(error = %e, "Gemini connectivity check failed");
            Json(GeminiTestResponse::failed(e.to_string()))
        }
    }
}
