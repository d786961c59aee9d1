//! Final encoding: AVIF first, JPEG if that fails.
//!
//! The [`Codec`] trait is the seam between the pipeline and the actual
//! encoders. Production uses [`AvifCodec`] (rav1e via the `image` crate) as
//! the primary and [`JpegCodec`] as the fallback; tests substitute a codec
//! that always fails to exercise the fallback path.
//!
//! [`encode_with_fallback`] makes exactly two attempts at most. Only the
//! fallback's error is ever returned; the primary's is logged and dropped.

use super::RasterImage;
use super::params::Quality;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageEncoder;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use std::fmt;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("{format} encode failed: {reason}")]
    Failed {
        format: OutputFormat,
        reason: String,
    },
}

impl EncodeError {
    pub fn failed(format: OutputFormat, reason: impl fmt::Display) -> Self {
        EncodeError::Failed {
            format,
            reason: reason.to_string(),
        }
    }
}

/// Output container format of an encoded thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Avif,
    Jpeg,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Avif => "image/avif",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Avif => "avif",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Avif => f.write_str("AVIF"),
            OutputFormat::Jpeg => f.write_str("JPEG"),
        }
    }
}

/// An encoded thumbnail and the format it was encoded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResult {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

impl EncodedResult {
    /// Self-contained `data:` URI, e.g. `data:image/avif;base64,AAAA...`.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }
}

/// An image encoder for one output format.
pub trait Codec: Sync {
    fn format(&self) -> OutputFormat;

    fn encode(&self, canvas: &RasterImage, quality: Quality) -> Result<Vec<u8>, EncodeError>;
}

/// AVIF via rav1e.
#[derive(Debug, Clone, Copy)]
pub struct AvifCodec {
    /// rav1e speed preset, 1 (slowest, smallest) to 10 (fastest).
    speed: u8,
}

impl AvifCodec {
    pub fn with_speed(speed: u8) -> Self {
        Self {
            speed: speed.clamp(1, 10),
        }
    }
}

impl Default for AvifCodec {
    fn default() -> Self {
        Self::with_speed(6)
    }
}

impl Codec for AvifCodec {
    fn format(&self) -> OutputFormat {
        OutputFormat::Avif
    }

    fn encode(&self, canvas: &RasterImage, quality: Quality) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        AvifEncoder::new_with_speed_quality(&mut out, self.speed, quality.value() as u8)
            .write_image(
                canvas.as_raw(),
                canvas.width(),
                canvas.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| EncodeError::failed(OutputFormat::Avif, e))?;
        Ok(out)
    }
}

/// Baseline JPEG. Alpha is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl Codec for JpegCodec {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(&self, canvas: &RasterImage, quality: Quality) -> Result<Vec<u8>, EncodeError> {
        let rgb = image::DynamicImage::ImageRgba8(canvas.clone()).into_rgb8();
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality.value() as u8)
            .write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| EncodeError::failed(OutputFormat::Jpeg, e))?;
        Ok(out)
    }
}

/// Encode with `primary`, falling back to `fallback` on any failure.
pub fn encode_with_fallback(
    canvas: &RasterImage,
    primary: &dyn Codec,
    primary_quality: Quality,
    fallback: &dyn Codec,
    fallback_quality: Quality,
) -> Result<EncodedResult, EncodeError> {
    match primary.encode(canvas, primary_quality) {
        Ok(bytes) => Ok(EncodedResult {
            format: primary.format(),
            bytes,
        }),
        Err(e) => {
            warn!(error = %e, fallback = %fallback.format(), "primary encode failed, falling back");
            let bytes = fallback.encode(canvas, fallback_quality)?;
            Ok(EncodedResult {
                format: fallback.format(),
                bytes,
            })
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::loader::{decode_image, identify_payload};
    use crate::test_helpers::gradient;
    use std::sync::Mutex;

    /// Codec that records the qualities it was asked for and always fails.
    pub struct FailingCodec {
        pub format: OutputFormat,
        pub calls: Mutex<Vec<u32>>,
    }

    impl FailingCodec {
        pub fn new(format: OutputFormat) -> Self {
            Self {
                format,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Codec for FailingCodec {
        fn format(&self) -> OutputFormat {
            self.format
        }

        fn encode(&self, _canvas: &RasterImage, quality: Quality) -> Result<Vec<u8>, EncodeError> {
            self.calls.lock().unwrap().push(quality.value());
            Err(EncodeError::failed(self.format, "simulated failure"))
        }
    }

    #[test]
    fn avif_encodes_and_identifies() {
        let bytes = AvifCodec::with_speed(10)
            .encode(&gradient(96, 54), Quality::new(80))
            .unwrap();
        assert_eq!(identify_payload(&bytes).unwrap(), (96, 54));
    }

    #[test]
    fn jpeg_encodes_rgba_canvas() {
        let bytes = JpegCodec.encode(&gradient(40, 30), Quality::new(90)).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(decode_image(&bytes).unwrap().dimensions(), (40, 30));
    }

    #[test]
    fn primary_success_skips_fallback() {
        let fallback = FailingCodec::new(OutputFormat::Jpeg);
        let result = encode_with_fallback(
            &gradient(32, 32),
            &AvifCodec::with_speed(10),
            Quality::new(80),
            &fallback,
            Quality::new(90),
        )
        .unwrap();
        assert_eq!(result.format, OutputFormat::Avif);
        assert_eq!(fallback.call_count(), 0);
    }

    #[test]
    fn primary_failure_uses_fallback_quality() {
        let primary = FailingCodec::new(OutputFormat::Avif);
        let result = encode_with_fallback(
            &gradient(32, 32),
            &primary,
            Quality::new(80),
            &JpegCodec,
            Quality::new(90),
        )
        .unwrap();
        assert_eq!(result.format, OutputFormat::Jpeg);
        assert_eq!(*primary.calls.lock().unwrap(), vec![80]);
        assert_eq!(identify_payload(&result.bytes).unwrap(), (32, 32));
    }

    #[test]
    fn both_failing_reports_fallback_error() {
        let primary = FailingCodec::new(OutputFormat::Avif);
        let fallback = FailingCodec::new(OutputFormat::Jpeg);
        let err = encode_with_fallback(
            &gradient(8, 8),
            &primary,
            Quality::new(80),
            &fallback,
            Quality::new(90),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::Failed {
                format: OutputFormat::Jpeg,
                ..
            }
        ));
        assert_eq!(primary.call_count(), 1);
        assert_eq!(fallback.call_count(), 1);
    }

    #[test]
    fn data_uri_has_mime_prefix() {
        let result = EncodedResult {
            format: OutputFormat::Jpeg,
            bytes: vec![0xFF, 0xD8, 0xFF],
        };
        assert_eq!(result.to_data_uri(), "data:image/jpeg;base64,/9j/");
    }
}
