//! Image processing: pure Rust, no system libraries.
//!
//! | Stage | Module | Crate / function |
//! |---|---|---|
//! | **Resolve size** | [`dimensions`] | preset table, `W:H` parsing |
//! | **Decode** | [`loader`] | `image` decoders, `avif-parse` + `rav1d` for AVIF |
//! | **Cover-fit** | [`compositor`] | `crop_imm` + `resize` (Lanczos3) |
//! | **Text** | [`text`] | `rusttype` coverage + dilated outline |
//! | **Watermark** | [`watermark`] | `resize` + `imageops::overlay` |
//! | **Encode** | [`encoder`] | `AvifEncoder` (rav1e), `JpegEncoder` fallback |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for geometry (unit testable)
//! - **Parameters**: Data structures describing overlays and quality
//! - **Stages**: One module per pipeline stage, each taking and returning an owned canvas

mod calculations;
pub mod compositor;
pub mod dimensions;
pub mod encoder;
pub mod loader;
mod params;
pub mod text;
pub mod watermark;

/// Owned 8-bit RGBA pixel buffer; every stage works on this.
pub type RasterImage = image::RgbaImage;

pub use calculations::{
    CropRect, calculate_cover_crop, calculate_watermark_dimensions, height_for_aspect,
};
pub use dimensions::{Platform, TargetDimensions, resolve_dimensions};
pub use encoder::{
    AvifCodec, Codec, EncodeError, EncodedResult, JpegCodec, OutputFormat, encode_with_fallback,
};
pub use loader::{DecodeError, decode_image, identify_payload, load_watermark};
pub use params::{Color, HAlign, OverlaySpec, Quality, VAlign};
pub use text::{FontAsset, FontError, TextRenderer};
