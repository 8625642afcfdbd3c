use std::io::Cursor;

use async_trait::async_trait;
use image::ImageReader;

use crate::error::{Result, RxOcrError};

/// Image payload ready to be embedded in a multimodal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InlineImage {
    /// Decode `bytes` to confirm they form a readable image and pick the
    /// media type from the detected format.
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| RxOcrError::Extraction(format!("cannot read image: {e}")))?;

        let format = reader
            .format()
            .ok_or_else(|| RxOcrError::Extraction("cannot identify image format".to_string()))?;

        reader
            .decode()
            .map_err(|e| RxOcrError::Extraction(format!("cannot decode image: {e}")))?;

        Ok(Self {
            mime_type: format.to_mime_type().to_string(),
            data: bytes.to_vec(),
        })
    }
}

/// A single prompt, optionally paired with one image, sent to a named model.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub image: Option<InlineImage>,
}

/// Remote capability: produce text from a prompt and an optional image.
///
/// Implementations return the raw model text (possibly empty); trimming and
/// fallback handling belong to the caller.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};

    fn encode(format: ImageFormat) -> Vec<u8> {
        let mut output = Vec::new();
        DynamicImage::new_rgb8(16, 16)
            .write_to(&mut Cursor::new(&mut output), format)
            .unwrap();
        output
    }

    #[test]
    fn test_png_mime_type() {
        let bytes = encode(ImageFormat::Png);
        let image = InlineImage::from_image_bytes(&bytes).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, bytes);
    }

    #[test]
    fn test_jpeg_mime_type() {
        let image = InlineImage::from_image_bytes(&encode(ImageFormat::Jpeg)).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
    }

    #[test]
    fn test_unreadable_bytes_are_extraction_errors() {
        let result = InlineImage::from_image_bytes(b"plain text, not pixels");
        assert!(matches!(result, Err(RxOcrError::Extraction(_))));
    }
}
