//! Prescription OCR service.
//!
//! Accepts an uploaded prescription photo, binarizes it for legibility and
//! asks Google Gemini to transcribe it. See [`api::create_router`] for the
//! HTTP surface and [`ocr`] for the pipeline.

pub mod api;
pub mod config;
pub mod error;
pub mod ocr;
