use std::io::Cursor;

use image::{DynamicImage, GenericImageView, GrayImage, ImageFormat, ImageReader};

use crate::error::{Result, RxOcrError};

/// Side length of the square smoothing kernel applied before thresholding.
const BLUR_KERNEL_SIZE: usize = 5;

/// Neighbourhood used to compute the local threshold.
const THRESHOLD_BLOCK_SIZE: usize = 11;

/// Subtracted from the weighted local mean before comparison.
const THRESHOLD_OFFSET: i16 = 2;

#[derive(Debug, Clone, Copy)]
enum Border {
    /// `dcb|abcd|cba`
    Reflect101,
    /// `aaa|abcd|ddd`
    Replicate,
}

/// Clean up a photographed document before it is sent for extraction.
///
/// Never fails: when the input cannot be decoded or re-encoded the original
/// bytes are returned unchanged and the failure is logged.
pub fn preprocess_image(bytes: &[u8], max_dimension: u32) -> Vec<u8> {
    match try_preprocess_image(bytes, max_dimension) {
        Ok(processed) => {
            tracing::debug!(
                input_bytes = bytes.len(),
                output_bytes = processed.len(),
                "Image preprocessed"
            );
            processed
        }
        Err(e) => {
            tracing::error!(error = %e, "Image preprocessing failed, sending original image");
            bytes.to_vec()
        }
    }
}

/// Downscale → grayscale → Gaussian blur → adaptive threshold → PNG.
///
/// Images whose longer side exceeds `max_dimension` are shrunk first, keeping
/// the aspect ratio, so the filter buffers stay bounded. Binarization against
/// a Gaussian-weighted local mean compensates for the uneven lighting typical
/// of phone photos of paper.
pub fn try_preprocess_image(bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RxOcrError::Preprocessing(format!("Failed to read image: {e}")))?
        .decode()
        .map_err(|e| RxOcrError::Preprocessing(format!("Failed to decode image: {e}")))?;

    let gray = resize_if_needed(img, max_dimension).to_luma8();
    let blurred = gaussian_blur(&gray, BLUR_KERNEL_SIZE);
    let binary = adaptive_threshold(&blurred, THRESHOLD_BLOCK_SIZE, THRESHOLD_OFFSET);

    let mut output = Vec::new();
    binary
        .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| RxOcrError::Preprocessing(format!("Failed to encode image: {e}")))?;

    Ok(output)
}

fn resize_if_needed(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let max_dimension = max_dimension.max(1);
    if width <= max_dimension && height <= max_dimension {
        return img;
    }

    tracing::debug!(width, height, max_dimension, "Downscaling oversized image");
    // Area-averaging thumbnail: integer arithmetic, no full-size float buffer.
    img.thumbnail(max_dimension, max_dimension)
}

/// Smooth with a `size`×`size` Gaussian, borders reflected.
fn gaussian_blur(img: &GrayImage, size: usize) -> GrayImage {
    let kernel = gaussian_kernel(size);
    let smoothed = convolve_separable(img, &kernel, Border::Reflect101);
    to_gray(img.width(), img.height(), &smoothed)
}

/// Binarize each pixel against the Gaussian-weighted mean of its
/// `block_size` neighbourhood minus `offset`. Foreground (ink) becomes 0,
/// background 255.
fn adaptive_threshold(img: &GrayImage, block_size: usize, offset: i16) -> GrayImage {
    let kernel = gaussian_kernel(block_size);
    let local_mean = convolve_separable(img, &kernel, Border::Replicate);

    let mut output = GrayImage::new(img.width(), img.height());
    for ((out, src), mean) in output
        .pixels_mut()
        .zip(img.pixels())
        .zip(local_mean.iter())
    {
        let mean = mean.round().clamp(0.0, 255.0) as i16;
        let value = src.0[0] as i16;
        out.0[0] = if value > mean - offset { 255 } else { 0 };
    }

    output
}

/// Normalized 1-D Gaussian weights. Sigma follows the usual rule of thumb
/// for a kernel chosen by size: `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let denom = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / denom).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for w in kernel.iter_mut() {
        *w /= sum;
    }
    kernel
}

/// Horizontal then vertical pass of the same 1-D kernel.
fn convolve_separable(img: &GrayImage, kernel: &[f32], border: Border) -> Vec<f32> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let radius = (kernel.len() / 2) as isize;
    let src: Vec<f32> = img.pixels().map(|p| p.0[0] as f32).collect();

    let mut horizontal = vec![0.0f32; w * h];
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = border_index(x as isize + k as isize - radius, w, border);
                acc += row[sx] * weight;
            }
            horizontal[y * w + x] = acc;
        }
    }

    let mut output = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = border_index(y as isize + k as isize - radius, h, border);
                acc += horizontal[sy * w + x] * weight;
            }
            output[y * w + x] = acc;
        }
    }

    output
}

fn border_index(i: isize, len: usize, border: Border) -> usize {
    let len = len as isize;
    if len == 1 {
        return 0;
    }
    match border {
        Border::Replicate => i.clamp(0, len - 1) as usize,
        Border::Reflect101 => {
            let mut i = i;
            loop {
                if i < 0 {
                    i = -i;
                } else if i >= len {
                    i = 2 * (len - 1) - i;
                } else {
                    return i as usize;
                }
            }
        }
    }
}

fn to_gray(width: u32, height: u32, values: &[f32]) -> GrayImage {
    let data = values
        .iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    // Buffer length is width * height by construction.
    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}
