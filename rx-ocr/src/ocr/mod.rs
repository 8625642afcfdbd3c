//! Prescription OCR Module
//!
//! Turns an uploaded prescription photo into text in two stages:
//!
//! - `preprocessing`: grayscale, Gaussian blur and adaptive thresholding so the
//!   page reaches the model as clean black-on-white. Never fails; undecodable
//!   input is forwarded untouched.
//! - `ExtractionProvider`: sends the image and a fixed instruction prompt to
//!   Google Gemini and normalizes the answer.
//!
//! # Architecture
//!
//! The remote model sits behind the `TextGenerator` trait:
//! - `GeminiClient` implements it over the `generateContent` REST API
//! - tests substitute in-process fakes
//!
//! # Configuration
//!
//! Driven by `GeminiConfig` (see `config.rs`):
//! - `api_key`: credential; without it every call fails with a configuration error
//! - `model` / `diagnostic_model`: extraction and connectivity-check models
//! - `base_url`: API root, overridable for proxies and tests
//! - `timeout_secs`: upper bound on each remote call
//!
//! # Usage
//!
//! ```rust,ignore
//! let provider = ExtractionProvider::new(&config.gemini);
//! let cleaned = preprocess_image(&upload, config.upload.max_image_dimension);
//! let text = provider.extract_text(&cleaned).await?;
//! ```

mod api;
mod generator;
pub mod prompts;
mod preprocessing;
mod provider;

pub use api::GeminiClient;
pub use generator::{GenerationRequest, InlineImage, TextGenerator};
pub use preprocessing::{preprocess_image, try_preprocess_image};
pub use provider::ExtractionProvider;
