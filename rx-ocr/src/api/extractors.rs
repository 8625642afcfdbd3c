use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_LENGTH;

use crate::error::{Result, RxOcrError};

/// Multipart extractor whose rejection is an [`RxOcrError`], so a body that
/// is not `multipart/form-data` gets the usual `{detail}` 400.
pub struct UploadForm(pub Multipart);

impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = RxOcrError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        Multipart::from_request(req, state)
            .await
            .map(Self)
            .map_err(RxOcrError::from)
    }
}

impl From<MultipartRejection> for RxOcrError {
    fn from(rejection: MultipartRejection) -> Self {
        RxOcrError::Validation(format!("Invalid multipart request: {}", rejection.body_text()))
    }
}

/// An uploaded file as received, before any preprocessing.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

const MIB: usize = 1024 * 1024;

/// Upload rejected for exceeding `max_bytes`.
pub(crate) fn too_large(max_bytes: usize) -> RxOcrError {
    RxOcrError::Validation(format!("File size too large (max {})", format_limit(max_bytes)))
}

/// Whole mebibytes print as `10MB`, other sizes of at least 1 MiB with one
/// decimal, anything smaller in bytes.
fn format_limit(bytes: usize) -> String {
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= MIB {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

fn read_error(e: MultipartError) -> RxOcrError {
    RxOcrError::Validation(format!("Failed to read file: {}", e.body_text()))
}

impl UploadForm {
    /// Pull the `file` field out of the form, enforcing the image media type
    /// and the size limit.
    ///
    /// The media type and any declared part `Content-Length` are checked
    /// before the body is touched; without a declared length the body is read
    /// chunk by chunk and abandoned once it passes `max_bytes`.
    pub async fn into_image(mut self, max_bytes: usize) -> Result<UploadedImage> {
        while let Some(field) = self.0.next_field().await.map_err(read_error)? {
            if field.name() != Some("file") {
                continue;
            }
            return read_image_field(field, max_bytes).await;
        }

        Err(RxOcrError::Validation(
            "Missing required 'file' field".to_string(),
        ))
    }
}

async fn read_image_field(mut field: Field<'_>, max_bytes: usize) -> Result<UploadedImage> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    if !content_type.starts_with("image/") {
        return Err(RxOcrError::Validation("File must be an image".to_string()));
    }

    let declared_size = field
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<usize>().ok());
    if declared_size.is_some_and(|size| size > max_bytes) {
        return Err(too_large(max_bytes));
    }

    let filename = field.file_name().map(String::from);

    let mut bytes = Vec::with_capacity(declared_size.unwrap_or(0));
    while let Some(chunk) = field.chunk().await.map_err(read_error)? {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(too_large(max_bytes));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(UploadedImage {
        filename,
        content_type,
        bytes,
    })
}
