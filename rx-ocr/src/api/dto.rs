//! Wire types for the HTTP API.
//!
//! Field names are snake_case on the wire, matching the documented contract
//! (`extracted_text`, `file_size`, `gemini_configured`).

use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "OCR Prescription Service";

/// `GET /` liveness payload.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
}

/// `GET /health` readiness payload.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Whether a Gemini credential is present. The value itself is never exposed.
    pub gemini_configured: bool,
    pub service: String,
}

/// `GET /test-gemini` result. Exactly one of `response` / `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GeminiTestResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GeminiTestResponse {
    pub fn ok(response: String) -> Self {
        Self {
            success: true,
            response: Some(response),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error),
        }
    }
}

/// `POST /extract-text` success payload.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ExtractTextResponse {
    pub success: bool,
    pub extracted_text: String,
    pub filename: Option<String>,
    /// Length in bytes of the upload as received, before preprocessing.
    pub file_size: usize,
    pub message: String,
}

/// Error body returned for every 4xx/5xx produced by the service.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorDetail {
    pub detail: String,
}
