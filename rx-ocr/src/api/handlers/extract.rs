use axum::extract::State;
use axum::Json;

use crate::api::dto::{ErrorDetail, ExtractTextResponse};
use crate::api::extractors::UploadForm;
use crate::api::state::AppState;
use crate::error::{Result, RxOcrError};
use crate::ocr::preprocess_image;

const SUCCESS_MESSAGE: &str = "Text extracted successfully";

/// `POST /extract-text`
///
/// Accepts a multipart form with an image in the `file` field, cleans it up
/// and returns the text read from it by the extraction model.
#[utoipa::path(
    post,
    path = "/extract-text",
    tag = "extraction",
    request_body(content_type = "multipart/form-data", content = String, description = "Prescription image in the `file` field (image/*, max 10MB)"),
    responses(
        (status = 200, description = "Text extracted", body = ExtractTextResponse),
        (status = 400, description = "Not an image, too large, or malformed form", body = ErrorDetail),
        (status = 500, description = "Extraction or configuration failure", body = ErrorDetail),
    )
)]
pub async fn extract_text(
    State(state): State<AppState>,
    form: UploadForm,
) -> Result<Json<ExtractTextResponse>> {
    let upload = form
        .into_image(state.config.upload.max_upload_bytes)
        .await?;

    let file_size = upload.bytes.len();
    tracing::info!(
        filename = upload.filename.as_deref().unwrap_or("<unnamed>"),
        content_type = %upload.content_type,
        file_size,
        "Received prescription image"
    );

    let image_bytes = if state.config.upload.preprocess_images {
        let original = upload.bytes;
        let max_dimension = state.config.upload.max_image_dimension;
        tokio::task::spawn_blocking(move || preprocess_image(&original, max_dimension))
            .await
            .map_err(|e| RxOcrError::Internal(format!("Preprocessing task failed: {e}")))?
    } else {
        upload.bytes
    };

    let extracted_text = state.extractor.extract_text(&image_bytes).await?;

    Ok(Json(ExtractTextResponse {
        success: true,
        extracted_text,
        filename: upload.filename,
        file_size,
        message: SUCCESS_MESSAGE.to_string(),
    }))
}
