use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{Result, RxOcrError};

use super::generator::{GenerationRequest, TextGenerator};

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: Blob },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    status: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| RxOcrError::Configuration("Gemini API key not configured".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RxOcrError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn build_body(request: &GenerationRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: request.prompt.clone(),
        }];
        if let Some(image) = &request.image {
            parts.push(Part::InlineData {
                inline_data: Blob {
                    mime_type: image.mime_type.clone(),
                    data: STANDARD.encode(&image.data),
                },
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = Self::build_body(request);

        // Key travels in a header so it never appears in URL-bearing errors.
        let resp = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RxOcrError::Extraction(format!("API request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorEnvelope>(&raw) {
                Ok(envelope) => match envelope.error.status {
                    Some(code) => format!("{code}: {}", envelope.error.message),
                    None => envelope.error.message,
                },
                Err(_) => raw,
            };
            return Err(RxOcrError::Extraction(format!(
                "API request failed: {status} - {message}"
            )));
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| RxOcrError::Extraction(format!("Failed to parse response: {e}")))?;

        response_text(parsed)
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(response: GenerateContentResponse) -> Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "unknown".to_string());
        return Err(RxOcrError::Extraction(format!(
            "No candidates returned (block reason: {reason})"
        )));
    };

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    if parts.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "unknown".to_string());
        return Err(RxOcrError::Extraction(format!(
            "Response contained no content (finish reason: {reason})"
        )));
    }

    Ok(parts.into_iter().filter_map(|p| p.text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::generator::InlineImage;
    use serde_json::json;

    fn create_test_config() -> GeminiConfig {
        GeminiConfig {
            api_key: Some("test-key".to_string()),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = GeminiConfig::default();
        let result = GeminiClient::new(&config);
        assert!(matches!(result, Err(RxOcrError::Configuration(_))));
    }

    #[test]
    fn test_client_with_api_key() {
        assert!(GeminiClient::new(&create_test_config()).is_ok());
    }

    #[test]
    fn test_endpoint_uses_model_and_trims_slash() {
        let mut config = create_test_config();
        config.base_url = "https://custom.api.com/v1beta/".to_string();

        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("gemini-2.0-flash-exp"),
            "https://custom.api.com/v1beta/models/gemini-2.0-flash-exp:generateContent"
        );
    }

    #[test]
    fn test_body_with_image_serializes_inline_data() {
        let request = GenerationRequest {
            model: "m".to_string(),
            prompt: "read this".to_string(),
            image: Some(InlineImage {
                mime_type: "image/png".to_string(),
                data: vec![0xFF, 0xD8, 0xFF, 0xE0],
            }),
        };

        let body = serde_json::to_value(GeminiClient::build_body(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "read this"},
                        {"inlineData": {"mimeType": "image/png", "data": "/9j/4A=="}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_body_without_image_is_text_only() {
        let request = GenerationRequest {
            model: "m".to_string(),
            prompt: "Say hello".to_string(),
            image: None,
        };

        let body = serde_json::to_value(GeminiClient::build_body(&request)).unwrap();
        assert_eq!(body["contents"][0]["parts"], json!([{"text": "Say hello"}]));
    }

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Rx: "}, {"text": "Amoxicillin"}]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(response_text(response).unwrap(), "Rx: Amoxicillin");
    }

    #[test]
    fn test_response_text_empty_part_is_ok() {
        let response = parse(json!({
            "candidates": [{"content": {"parts": [{"text": ""}]}, "finishReason": "STOP"}]
        }));
        assert_eq!(response_text(response).unwrap(), "");
    }

    #[test]
    fn test_response_without_candidates_is_error() {
        let response = parse(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        let err = response_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_candidate_without_content_is_error() {
        let response = parse(json!({"candidates": [{"finishReason": "RECITATION"}]}));
        let err = response_text(response).unwrap_err();
        assert!(matches!(err, RxOcrError::Extraction(_)));
        assert!(err.to_string().contains("RECITATION"));
    }
}
