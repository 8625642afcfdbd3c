#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};

use rx_ocr::api::{create_router, AppState};
use rx_ocr::config::{Config, GeminiConfig, ServerConfig, UploadConfig};
use rx_ocr::error::{Result, RxOcrError};
use rx_ocr::ocr::{ExtractionProvider, GenerationRequest, TextGenerator};

pub const BOUNDARY: &str = "rx-ocr-test-boundary";

/// One part of a multipart form.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub extra_headers: Vec<(&'a str, String)>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(filename: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name: "file",
            filename: Some(filename),
            content_type: Some(content_type),
            extra_headers: Vec::new(),
            data,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            filename: None,
            content_type: None,
            extra_headers: Vec::new(),
            data: value.as_bytes(),
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match part.filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.name, filename
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        for (name, value) in &part.extra_headers {
            body.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/extract-text")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// A gray page with a dark horizontal stroke, PNG encoded.
pub fn prescription_png(width: u32, height: u32) -> Vec<u8> {
    let img = GrayImage::from_fn(width, height, |_, y| {
        if y == height / 2 {
            Luma([30u8])
        } else {
            Luma([200u8])
        }
    });
    let mut output = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .unwrap();
    output
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Answers every request with a fixed result and records what it was sent.
pub struct FakeGenerator {
    answer: std::result::Result<String, String>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeGenerator {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.answer.clone().map_err(RxOcrError::Extraction)
    }
}

pub fn test_config(api_key: Option<&str>) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
        },
        upload: UploadConfig::default(),
        gemini: GeminiConfig {
            api_key: api_key.map(String::from),
            ..GeminiConfig::default()
        },
    }
}

/// Router whose remote model is `generator`.
pub fn app_with(config: Config, generator: Arc<dyn TextGenerator>) -> axum::Router {
    let extractor = ExtractionProvider::with_generator(&config.gemini, generator);
    create_router(AppState::new(config, extractor))
}

/// Uniform gray PNG padded with a `tEXt` chunk to exactly `total_len` bytes.
pub fn padded_gray_png(width: u32, height: u32, total_len: usize) -> Vec<u8> {
    let img = GrayImage::from_pixel(width, height, Luma([128u8]));
    let mut png = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();

    // Signature (8) + IHDR chunk (25); ancillary chunk goes right after.
    let insert_at = 33;
    let data_len = total_len - png.len() - 12;
    let mut data = b"Comment\0".to_vec();
    data.resize(data_len, b'x');

    let mut chunk = Vec::with_capacity(data_len + 12);
    chunk.extend_from_slice(&(data_len as u32).to_be_bytes());
    chunk.extend_from_slice(b"tEXt");
    chunk.extend_from_slice(&data);
    chunk.extend_from_slice(&crc32(&chunk[4..]).to_be_bytes());

    let mut padded = png[..insert_at].to_vec();
    padded.extend_from_slice(&chunk);
    padded.extend_from_slice(&png[insert_at..]);
    assert_eq!(padded.len(), total_len);
    padded
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
    }
    !crc
}
