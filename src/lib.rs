//! # thumbcraft
//!
//! Turns an uploaded photo into a thumbnail sized for a publishing platform,
//! with an optional title, link, and watermark, encoded as AVIF (or JPEG when
//! AVIF encoding fails) and returned as a self-contained `data:` URI.
//!
//! # Architecture: Ownership-Passing Pipeline
//!
//! ```text
//! 1. Resolve     platform / aspect  →  TargetDimensions
//! 2. Decode      main image bytes   →  RasterImage (canvas)
//! 3. Composite   canvas             →  cover-fit (+ forced upscale)
//! 4. Text        canvas             →  title (center) + link (top-left)
//! 5. Watermark   canvas + watermark →  bottom-right, 20 px inset
//! 6. Encode      canvas             →  AVIF, else JPEG → data URI
//! ```
//!
//! Every stage takes the canvas by value and returns it. There is no shared
//! image handle; the only long-lived state is the read-only
//! [`pipeline::ThumbnailPipeline`] (font, encoding settings, codecs).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The stages: dimensions, loader, compositor, text, watermark, encoder |
//! | [`pipeline`] | Runs the stages for one request; error taxonomy |
//! | [`request`] | Typed request parameters with defaults resolved once |
//! | [`response`] | JSON response body and status mapping for the HTTP layer |
//! | [`config`] | `config.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Failure Policy
//!
//! A missing or undecodable main image is the caller's fault and is reported
//! as such. A broken watermark is not worth failing a request over: it is
//! logged and skipped. AVIF encoding is allowed to fail and falls back to
//! JPEG; only a failure of both is an error, and it is reported generically.
//! Malformed parameters never fail; they resolve to defaults.
//!
//! ## Font Loaded Once at Startup
//!
//! The overlay font is a deployment asset, not request input. It is loaded
//! when the pipeline is built, so a missing font stops the service from
//! starting instead of failing every request.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling (Lanczos3), text rasterization (`rusttype`), and
//! encoding (rav1e for AVIF) are all pure Rust. No ImageMagick, GD, or libavif
//! is needed at runtime.

pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod request;
pub mod response;

#[cfg(test)]
pub(crate) mod test_helpers;
