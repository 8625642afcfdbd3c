use serde::Deserialize;
use std::env;

/// Upload ceiling applied when `MAX_UPLOAD_BYTES` is not set (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Longest image side kept by preprocessing; larger images are downscaled.
pub const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 4096;

pub const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_DIAGNOSTIC_MODEL: &str = "gemini-1.5-pro";

const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:8080"];

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Like [`parse_env_or`], but zero is rejected as well.
fn parse_positive_env_or<T>(var: &str, default: T) -> T
where
    T: std::str::FromStr + PartialEq + Default + Copy,
    T::Err: std::fmt::Display,
{
    let value = parse_env_or(var, default);
    if value == T::default() {
        tracing::warn!("{} must be greater than zero. Using default.", var);
        return default;
    }
    value
}

/// Read a secret from the environment, treating blank values as unset.
fn env_secret(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `CORS_ALLOWED_ORIGINS`.
/// Format: comma-separated origins, e.g. `http://localhost:5173,http://localhost:8080`
fn parse_cors_origins() -> Vec<String> {
    match env::var("CORS_ALLOWED_ORIGINS") {
        Ok(val) if !val.trim().is_empty() => val
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_upload_bytes: usize,
    /// Server-wide switch for the grayscale/blur/threshold pass.
    pub preprocess_images: bool,
    pub max_image_dimension: u32,
}

/// Settings for the hosted Gemini text-extraction model.
#[derive(Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub diagnostic_model: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

// Hand-written so the credential never ends up in logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("diagnostic_model", &self.diagnostic_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl UploadConfig {
    /// Hard cap on the whole request body: twice the upload limit plus 1 MiB
    /// of multipart framing, so oversized files still reach the handler's
    /// size check.
    pub fn request_body_limit(&self) -> usize {
        self.max_upload_bytes
            .saturating_mul(2)
            .saturating_add(1024 * 1024)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            preprocess_images: true,
            max_image_dimension: DEFAULT_MAX_IMAGE_DIMENSION,
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            diagnostic_model: DEFAULT_DIAGNOSTIC_MODEL.to_string(),
            timeout_secs: DEFAULT_GEMINI_TIMEOUT_SECS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PORT", 8000),
                cors_origins: parse_cors_origins(),
            },
            upload: UploadConfig {
                max_upload_bytes: parse_positive_env_or(
                    "MAX_UPLOAD_BYTES",
                    DEFAULT_MAX_UPLOAD_BYTES,
                ),
                preprocess_images: parse_env_or("PREPROCESS_IMAGES", true),
                max_image_dimension: parse_positive_env_or(
                    "MAX_IMAGE_DIMENSION",
                    DEFAULT_MAX_IMAGE_DIMENSION,
                ),
            },
            gemini: GeminiConfig {
                api_key: env_secret("GEMINI_API_KEY"),
                base_url: env::var("GEMINI_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
                model: env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
                diagnostic_model: env::var("GEMINI_DIAGNOSTIC_MODEL")
                    .unwrap_or_else(|_| DEFAULT_DIAGNOSTIC_MODEL.to_string()),
                timeout_secs: parse_positive_env_or(
                    "GEMINI_TIMEOUT_SECS",
                    DEFAULT_GEMINI_TIMEOUT_SECS,
                ),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
