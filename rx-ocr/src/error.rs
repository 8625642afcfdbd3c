use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RxOcrError {
    /// Bad client input: wrong media type, oversized or malformed upload.
    #[error("{0}")]
    Validation(String),

    /// A required setting (the Gemini credential) is missing.
    #[error("{0}")]
    Configuration(String),

    /// Never reaches a caller; the pipeline falls back to the original bytes.
    #[error("Image preprocessing failed: {0}")]
    Preprocessing(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl RxOcrError {
    pub fn status(&self) -> StatusCode {
        match self {
            RxOcrError::Validation(_) => StatusCode::BAD_REQUEST,
            RxOcrError::Configuration(_)
            | RxOcrError::Preprocessing(_)
            | RxOcrError::Extraction(_)
            | RxOcrError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `detail` field of the error body.
    pub fn detail(&self) -> String {
        match self {
            RxOcrError::Validation(msg) | RxOcrError::Configuration(msg) => msg.clone(),
            RxOcrError::Extraction(_) => self.to_string(),
            RxOcrError::Preprocessing(_) | RxOcrError::Internal(_) => {
                "An unexpected error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for RxOcrError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            RxOcrError::Validation(msg) => tracing::debug!(error = %msg, "Rejected upload"),
            RxOcrError::Preprocessing(_) | RxOcrError::Internal(_) => {
                tracing::error!(error = %self, "Unexpected error mapped to response")
            }
            _ => tracing::error!(error = %self, "Request failed"),
        }

        let body = Json(json!({ "detail": self.detail() }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RxOcrError>;
