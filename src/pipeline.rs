//! The thumbnail pipeline.
//!
//! ```text
//! resolve size → decode main → cover-fit (+ upscale) → text → watermark → encode
//! ```
//!
//! Each stage takes the canvas by value and returns it, so ownership moves
//! strictly forward and no stage can observe another's intermediate state.
//! The [`ThumbnailPipeline`] itself holds only read-only state (font,
//! encoding settings, codecs) and can be shared between threads.

use crate::config::{EncodingConfig, ServiceConfig};
use crate::imaging::{
    AvifCodec, Codec, DecodeError, EncodeError, EncodedResult, FontAsset, FontError, JpegCodec,
    OverlaySpec, TextRenderer, compositor, decode_image, encode_with_fallback, load_watermark,
    resolve_dimensions, watermark,
};
use crate::request::ThumbnailRequest;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Main image is required")]
    MissingInput,
    #[error("Main image could not be decoded: {0}")]
    Decode(#[from] DecodeError),
    #[error("Thumbnail encoding failed: {0}")]
    Encode(#[from] EncodeError),
}

impl PipelineError {
    /// Whether the caller sent a bad request (as opposed to a server-side failure).
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::MissingInput | PipelineError::Decode(_))
    }
}

/// Startup failures: the service cannot run without config and font.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error(transparent)]
    Font(#[from] FontError),
}

/// A configured, reusable thumbnail renderer.
pub struct ThumbnailPipeline {
    text: TextRenderer,
    encoding: EncodingConfig,
    primary: Box<dyn Codec + Send>,
    fallback: Box<dyn Codec + Send>,
}

impl ThumbnailPipeline {
    /// Build a pipeline with the production codecs (AVIF, then JPEG).
    pub fn new(font: FontAsset, encoding: EncodingConfig) -> Self {
        let primary = Box::new(AvifCodec::with_speed(encoding.avif_speed));
        Self {
            text: TextRenderer::new(font),
            encoding,
            primary,
            fallback: Box::new(JpegCodec),
        }
    }

    /// Load the font named by `config` (relative to `root`) and build a pipeline.
    ///
    /// This is the fail-fast startup path: a missing font is an error here,
    /// never a per-request failure.
    pub fn from_config(config: &ServiceConfig, root: &Path) -> Result<Self, StartupError> {
        let font_path = config.assets.font_path(root);
        let font = FontAsset::load(&font_path)?;
        info!(font = %font_path.display(), "font loaded");
        Ok(Self::new(font, config.encoding.clone()))
    }

    /// Replace the primary codec.
    pub fn with_primary_codec(mut self, codec: Box<dyn Codec + Send>) -> Self {
        self.primary = codec;
        self
    }

    /// Replace the fallback codec.
    pub fn with_fallback_codec(mut self, codec: Box<dyn Codec + Send>) -> Self {
        self.fallback = codec;
        self
    }

    /// Render one thumbnail.
    pub fn render(&self, request: &ThumbnailRequest) -> Result<EncodedResult, PipelineError> {
        let main = request
            .main_image
            .as_deref()
            .filter(|bytes| !bytes.is_empty())
            .ok_or(PipelineError::MissingInput)?;
        let params = &request.params;

        let target = resolve_dimensions(&params.platform, &params.aspect);
        debug!(
            platform = %params.platform,
            aspect = %params.aspect,
            %target,
            "resolved canvas size"
        );

        let canvas = decode_image(main)?;
        let canvas = compositor::composite(canvas, target, params.upscale);

        let overlays: Vec<OverlaySpec> = [
            OverlaySpec::title(&params.title, target.width, target.height),
            OverlaySpec::link(&params.link, target.width),
        ]
        .into_iter()
        .flatten()
        .collect();
        let canvas = self.text.render(canvas, &overlays);

        let mark = load_watermark(request.watermark.as_deref());
        let canvas = watermark::place_watermark(canvas, mark, target.width);

        let encoded = encode_with_fallback(
            &canvas,
            self.primary.as_ref(),
            self.encoding.avif_quality(),
            self.fallback.as_ref(),
            self.encoding.jpeg_quality(),
        )?;
        info!(
            format = %encoded.format,
            bytes = encoded.bytes.len(),
            %target,
            "thumbnail rendered"
        );
        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::encoder::tests::FailingCodec;
    use crate::imaging::{OutputFormat, identify_payload};
    use crate::request::RequestParams;
    use crate::test_helpers::{fast_pipeline, gradient, jpeg_bytes, png_bytes, solid};
    use image::Rgba;

    fn params(platform: &str, aspect: &str) -> RequestParams {
        RequestParams {
            platform: platform.to_string(),
            aspect: aspect.to_string(),
            ..RequestParams::default()
        }
    }

    #[test]
    fn missing_main_image_is_client_error() {
        let err = fast_pipeline()
            .render(&ThumbnailRequest::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput));
        assert!(err.is_client_error());
    }

    #[test]
    fn empty_main_image_counts_as_missing() {
        let err = fast_pipeline()
            .render(&ThumbnailRequest::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput));
    }

    #[test]
    fn undecodable_main_image_is_client_error() {
        let err = fast_pipeline()
            .render(&ThumbnailRequest::new(b"not an image".to_vec()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn preset_output_has_preset_size() {
        let req = ThumbnailRequest::new(jpeg_bytes(&gradient(300, 200)))
            .with_params(params("instagram", "16:9"));
        let out = fast_pipeline().render(&req).unwrap();
        assert_eq!(out.format, OutputFormat::Avif);
        assert_eq!(identify_payload(&out.bytes).unwrap(), (1080, 1080));
    }

    #[test]
    fn malformed_aspect_uses_default_size() {
        let req = ThumbnailRequest::new(jpeg_bytes(&gradient(64, 64)))
            .with_params(params("custom", "abc"));
        let out = fast_pipeline().render(&req).unwrap();
        assert_eq!(identify_payload(&out.bytes).unwrap(), (1280, 720));
    }

    #[test]
    fn corrupt_watermark_still_renders() {
        let req = ThumbnailRequest::new(jpeg_bytes(&gradient(64, 36)))
            .with_watermark(b"\x89PNG\r\n\x1a\nbroken".to_vec())
            .with_params(params("youtube", ""));
        let out = fast_pipeline().render(&req).unwrap();
        assert_eq!(identify_payload(&out.bytes).unwrap(), (1280, 720));
    }

    #[test]
    fn corrupt_watermark_matches_no_watermark_output() {
        let main = png_bytes(&solid(32, 18, Rgba([40, 80, 120, 255])));
        let pipeline = fast_pipeline().with_primary_codec(Box::new(FailingCodec::new(
            OutputFormat::Avif,
        )));

        let plain = pipeline
            .render(&ThumbnailRequest::new(main.clone()).with_params(params("youtube", "")))
            .unwrap();
        let broken = pipeline
            .render(
                &ThumbnailRequest::new(main)
                    .with_watermark(vec![0xFF, 0xD8, 0xFF, 0x00])
                    .with_params(params("youtube", "")),
            )
            .unwrap();
        assert_eq!(plain, broken);
    }

    #[test]
    fn primary_failure_falls_back_to_jpeg() {
        let pipeline = fast_pipeline()
            .with_primary_codec(Box::new(FailingCodec::new(OutputFormat::Avif)));
        let req = ThumbnailRequest::new(jpeg_bytes(&gradient(100, 100)))
            .with_params(params("twitter", ""));
        let out = pipeline.render(&req).unwrap();
        assert_eq!(out.format, OutputFormat::Jpeg);
        assert_eq!(identify_payload(&out.bytes).unwrap(), (1200, 675));
    }

    #[test]
    fn both_codecs_failing_is_server_error() {
        let pipeline = fast_pipeline()
            .with_primary_codec(Box::new(FailingCodec::new(OutputFormat::Avif)))
            .with_fallback_codec(Box::new(FailingCodec::new(OutputFormat::Jpeg)));
        let err = pipeline
            .render(&ThumbnailRequest::new(jpeg_bytes(&gradient(10, 10))))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Encode(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn from_config_missing_font_fails_fast() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = ThumbnailPipeline::from_config(&ServiceConfig::default(), tmp.path());
        assert!(matches!(result, Err(StartupError::Font(FontError::Io { .. }))));
    }

    #[test]
    fn from_config_loads_bundled_font() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        assert!(ThumbnailPipeline::from_config(&ServiceConfig::default(), root).is_ok());
    }
}
