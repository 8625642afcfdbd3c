use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OCR Prescription Service",
        version = "1.0.0",
        description = "Extracts text from prescription images using image cleanup and Google Gemini.",
    ),
    paths(
        handlers::health::root,
        handlers::health::health_check,
        handlers::health::test_gemini,
        handlers::extract::extract_text,
    ),
    components(schemas(
        dto::RootResponse,
        dto::HealthResponse,
        dto::GeminiTestResponse,
        dto::ExtractTextResponse,
        dto::ErrorDetail,
    )),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "diagnostics", description = "Connectivity checks against Gemini"),
        (name = "extraction", description = "Prescription text extraction"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
