//! Shared test utilities for the thumbcraft test suite.
//!
//! Builds synthetic images in memory, encodes them to upload-style bytes, and
//! loads the bundled font so stage tests never touch fixture files.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let upload = jpeg_bytes(&gradient(400, 300));
//! let out = fast_pipeline().render(&ThumbnailRequest::new(upload)).unwrap();
//! ```

use crate::config::EncodingConfig;
use crate::imaging::{FontAsset, RasterImage};
use crate::pipeline::ThumbnailPipeline;
use image::{ImageEncoder, Rgba};
use std::path::Path;

// =========================================================================
// Synthetic images
// =========================================================================

/// Opaque image with a red/green gradient and constant blue.
pub fn gradient(width: u32, height: u32) -> RasterImage {
    RasterImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    })
}

/// Single-color image.
pub fn solid(width: u32, height: u32, color: Rgba<u8>) -> RasterImage {
    RasterImage::from_pixel(width, height, color)
}

// =========================================================================
// Encoded uploads
// =========================================================================

pub fn jpeg_bytes(img: &RasterImage) -> Vec<u8> {
    let rgb = image::DynamicImage::ImageRgba8(img.clone()).into_rgb8();
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 95)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    out
}

pub fn png_bytes(img: &RasterImage) -> Vec<u8> {
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
    out
}

// =========================================================================
// Font and pipeline
// =========================================================================

/// The font shipped in `assets/fonts/`.
pub fn test_font() -> FontAsset {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/fonts/DejaVuSans.ttf");
    FontAsset::load(&path).unwrap_or_else(|e| panic!("bundled font must load: {e}"))
}

/// Production pipeline with the fastest AVIF speed preset.
pub fn fast_pipeline() -> ThumbnailPipeline {
    ThumbnailPipeline::new(
        test_font(),
        EncodingConfig {
            avif_speed: 10,
            ..EncodingConfig::default()
        },
    )
}
