use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::GeminiConfig;
use crate::error::{Result, RxOcrError};

use super::api::GeminiClient;
use super::generator::{GenerationRequest, InlineImage, TextGenerator};
use super::prompts::{prescription_extraction_prompt, DIAGNOSTIC_PROMPT, NO_TEXT_FALLBACK};

#[derive(Clone)]
enum ExtractionBackend {
    Remote { generator: Arc<dyn TextGenerator> },
    Unconfigured { reason: String },
}

/// Sends prescription images to the hosted model and shapes its answer.
#[derive(Clone)]
pub struct ExtractionProvider {
    backend: ExtractionBackend,
    config: GeminiConfig,
}

impl ExtractionProvider {
    pub fn new(config: &GeminiConfig) -> Self {
        if !config.is_configured() {
            warn!("GEMINI_API_KEY not found in environment variables");
            return Self::unconfigured(config, "Gemini API key not configured");
        }

        match GeminiClient::new(config) {
            Ok(client) => {
                info!(model = %config.model, "Gemini extraction backend initialized");
                Self::with_generator(config, Arc::new(client))
            }
            Err(e) => {
                let reason = format!("Gemini backend unavailable: {e}");
                warn!("{}", reason);
                Self::unconfigured(config, &reason)
            }
        }
    }

    /// Use `generator` for remote calls. The credential check still applies,
    /// so a config without an API key yields an unconfigured provider.
    pub fn with_generator(config: &GeminiConfig, generator: Arc<dyn TextGenerator>) -> Self {
        if !config.is_configured() {
            return Self::unconfigured(config, "Gemini API key not configured");
        }
        Self {
            backend: ExtractionBackend::Remote { generator },
            config: config.clone(),
        }
    }

    fn unconfigured(config: &GeminiConfig, reason: &str) -> Self {
        Self {
            backend: ExtractionBackend::Unconfigured {
                reason: reason.to_string(),
            },
            config: config.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.backend, ExtractionBackend::Remote { .. })
    }

    fn generator(&self) -> Result<&Arc<dyn TextGenerator>> {
        match &self.backend {
            ExtractionBackend::Remote { generator } => Ok(generator),
            ExtractionBackend::Unconfigured { reason } => {
                Err(RxOcrError::Configuration(reason.clone()))
            }
        }
    }

    /// Extract prescription text from an encoded image.
    ///
    /// A blank model answer is not an error; it becomes [`NO_TEXT_FALLBACK`].
    pub async fn extract_text(&self, image_bytes: &[u8]) -> Result<String> {
        let generator = self.generator()?;

        let bytes = image_bytes.to_vec();
        let image = tokio::task::spawn_blocking(move || InlineImage::from_image_bytes(&bytes))
            .await
            .map_err(|e| RxOcrError::Internal(format!("Image decoding task failed: {e}")))??;

        let request = GenerationRequest {
            model: self.config.model.clone(),
            prompt: prescription_extraction_prompt().to_string(),
            image: Some(image),
        };

        let text = self.generate_with_timeout(generator, &request).await?;
        let text = text.trim();

        if text.is_empty() {
            info!("Model returned no text");
            Ok(NO_TEXT_FALLBACK.to_string())
        } else {
            Ok(text.to_string())
        }
    }

    /// Text-only round trip against the diagnostic model.
    pub async fn say_hello(&self) -> Result<String> {
        let generator = self.generator()?;

        let request = GenerationRequest {
            model: self.config.diagnostic_model.clone(),
            prompt: DIAGNOSTIC_PROMPT.to_string(),
            image: None,
        };

        self.generate_with_timeout(generator, &request).await
    }

    async fn generate_with_timeout(
        &self,
        generator: &Arc<dyn TextGenerator>,
        request: &GenerationRequest,
    ) -> Result<String> {
        let timeout_duration = Duration::from_secs(self.config.timeout_secs);

        match tokio::time::timeout(timeout_duration, generator.generate(request)).await {
            Ok(inner_result) => inner_result,
            Err(_) => Err(RxOcrError::Extraction(format!(
                "request to {} timed out after {} seconds",
                request.model, self.config.timeout_secs
            ))),
        }
    }
}
