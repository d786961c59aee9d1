//! Decoding uploaded bytes into a [`RasterImage`].
//!
//! ## Codec mapping
//!
//! | Format | Decoder |
//! |---|---|
//! | JPEG, PNG, TIFF, WebP | `image` crate (pure Rust decoders) |
//! | AVIF | `avif-parse` (container) + `rav1d` (AV1 decode) + BT.601 YUV→RGB |
//!
//! The format is sniffed from the leading bytes; upload filenames and
//! declared content types are never trusted.
//!
//! A main image that fails to decode ends the request. A watermark that fails
//! to decode is dropped with a warning ([`load_watermark`]), and the thumbnail
//! is produced without it.

use super::RasterImage;
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("image data is empty")]
    Empty,
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("corrupt image data: {0}")]
    Corrupt(String),
    #[error("image is too large to decode ({width}x{height})")]
    TooLarge { width: u32, height: u32 },
}

/// Largest frame the AVIF path will decode, in pixels.
///
/// Matches the `image` crate's default 512 MiB allocation limit at four bytes
/// per pixel, so AVIF uploads get the same ceiling as every other format.
const MAX_DECODED_PIXELS: u32 = 512 * 1024 * 1024 / 4;

fn check_frame_size(width: u32, height: u32) -> Result<(), DecodeError> {
    if u64::from(width) * u64::from(height) > u64::from(MAX_DECODED_PIXELS) {
        return Err(DecodeError::TooLarge { width, height });
    }
    Ok(())
}

/// Decode an uploaded image into an RGBA canvas.
pub fn decode_image(data: &[u8]) -> Result<RasterImage, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::Empty);
    }
    let format = image::guess_format(data).map_err(|_| DecodeError::UnsupportedFormat)?;

    let decoded = if format == ImageFormat::Avif {
        DynamicImage::ImageRgb8(decode_avif(data)?)
    } else {
        if !format.reading_enabled() {
            return Err(DecodeError::UnsupportedFormat);
        }
        image::load_from_memory_with_format(data, format)
            .map_err(|e| DecodeError::Corrupt(e.to_string()))?
    };

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(DecodeError::Corrupt("image has no pixels".into()));
    }
    debug!(
        ?format,
        width = decoded.width(),
        height = decoded.height(),
        "decoded image"
    );
    Ok(decoded.to_rgba8())
}

/// Decode an optional watermark, treating any failure as "no watermark".
pub fn load_watermark(data: Option<&[u8]>) -> Option<RasterImage> {
    let data = data?;
    match decode_image(data) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(error = %e, "ignoring watermark that failed to decode");
            None
        }
    }
}

/// Read the pixel dimensions of encoded image bytes without a full decode.
pub fn identify_payload(data: &[u8]) -> Result<(u32, u32), DecodeError> {
    match image::guess_format(data) {
        Ok(ImageFormat::Avif) => identify_avif(data),
        Ok(format) => ImageReader::with_format(Cursor::new(data), format)
            .into_dimensions()
            .map_err(|e| DecodeError::Corrupt(e.to_string())),
        Err(_) => Err(DecodeError::UnsupportedFormat),
    }
}

/// Extract dimensions from an AVIF container's metadata.
fn identify_avif(data: &[u8]) -> Result<(u32, u32), DecodeError> {
    let avif = avif_parse::read_avif(&mut Cursor::new(data))
        .map_err(|e| DecodeError::Corrupt(format!("AVIF container: {e:?}")))?;
    let meta = avif
        .primary_item_metadata()
        .map_err(|e| DecodeError::Corrupt(format!("AVIF metadata: {e:?}")))?;
    Ok((meta.max_frame_width.get(), meta.max_frame_height.get()))
}

/// Decode AVIF bytes using avif-parse (container) + rav1d (AV1 decode).
///
/// The `image` crate's `"avif"` feature only provides the encoder (rav1e);
/// its decoder needs the C dav1d library, so the pure-Rust port is driven
/// directly here.
fn decode_avif(data: &[u8]) -> Result<RgbImage, DecodeError> {
    use rav1d::include::dav1d::data::Dav1dData;
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::include::dav1d::picture::Dav1dPicture;
    use rav1d::src::lib as dav1d;
    use std::ptr::NonNull;

    let avif = avif_parse::read_avif(&mut Cursor::new(data))
        .map_err(|e| DecodeError::Corrupt(format!("AVIF container: {e:?}")))?;
    let meta = avif
        .primary_item_metadata()
        .map_err(|e| DecodeError::Corrupt(format!("AVIF metadata: {e:?}")))?;
    check_frame_size(meta.max_frame_width.get(), meta.max_frame_height.get())?;
    let av1_bytes: &[u8] = &avif.primary_item;

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    unsafe { dav1d::dav1d_default_settings(NonNull::from(&mut settings).cast()) };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;
    settings.frame_size_limit = MAX_DECODED_PIXELS;

    let mut ctx = None;
    let rc = unsafe { dav1d::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(DecodeError::Corrupt(format!("rav1d open failed ({})", rc.0)));
    }

    let decode = || -> Result<RgbImage, DecodeError> {
        let mut input = Dav1dData::default();
        let buf = unsafe { dav1d::dav1d_data_create(NonNull::new(&mut input), av1_bytes.len()) };
        if buf.is_null() {
            return Err(DecodeError::Corrupt("rav1d data_create failed".into()));
        }
        unsafe { std::ptr::copy_nonoverlapping(av1_bytes.as_ptr(), buf, av1_bytes.len()) };

        let rc = unsafe { dav1d::dav1d_send_data(ctx, NonNull::new(&mut input)) };
        if rc.0 != 0 {
            unsafe { dav1d::dav1d_data_unref(NonNull::new(&mut input)) };
            return Err(DecodeError::Corrupt(format!(
                "rav1d send_data failed ({})",
                rc.0
            )));
        }

        let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
        let rc = unsafe { dav1d::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
        if rc.0 != 0 {
            return Err(DecodeError::Corrupt(format!(
                "rav1d get_picture failed ({})",
                rc.0
            )));
        }

        let rgb = picture_to_rgb(&pic);
        unsafe { dav1d::dav1d_picture_unref(NonNull::new(&mut pic)) };
        rgb
    };

    let result = decode();
    unsafe { dav1d::dav1d_close(NonNull::new(&mut ctx)) };
    result
}

/// Convert a decoded rav1d picture into an RGB8 buffer.
fn picture_to_rgb(
    pic: &rav1d::include::dav1d::picture::Dav1dPicture,
) -> Result<RgbImage, DecodeError> {
    use rav1d::include::dav1d::headers::{
        DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
        DAV1D_PIXEL_LAYOUT_I444,
    };

    let plane = |i: usize| -> Result<*const u8, DecodeError> {
        pic.data[i]
            .map(|p| p.as_ptr() as *const u8)
            .ok_or_else(|| DecodeError::Corrupt(format!("AVIF plane {i} missing")))
    };

    let width = pic.p.w as u32;
    let height = pic.p.h as u32;
    check_frame_size(width, height)?;
    let y_ptr = plane(0)?;

    let frame = if pic.p.layout == DAV1D_PIXEL_LAYOUT_I400 {
        YuvFrame {
            y_ptr,
            u_ptr: y_ptr,
            v_ptr: y_ptr,
            y_stride: pic.stride[0],
            uv_stride: 0,
            width,
            height,
            bpc: pic.p.bpc as u32,
            subsampling: (false, false),
            monochrome: true,
        }
    } else {
        let subsampling = match pic.p.layout {
            DAV1D_PIXEL_LAYOUT_I420 => (true, true),
            DAV1D_PIXEL_LAYOUT_I422 => (true, false),
            DAV1D_PIXEL_LAYOUT_I444 => (false, false),
            other => {
                return Err(DecodeError::Corrupt(format!(
                    "unsupported AVIF pixel layout: {other}"
                )));
            }
        };
        YuvFrame {
            y_ptr,
            u_ptr: plane(1)?,
            v_ptr: plane(2)?,
            y_stride: pic.stride[0],
            uv_stride: pic.stride[1],
            width,
            height,
            bpc: pic.p.bpc as u32,
            subsampling,
            monochrome: false,
        }
    };

    RgbImage::from_raw(width, height, frame.to_rgb8()?)
        .ok_or_else(|| DecodeError::Corrupt("AVIF frame size mismatch".into()))
}

/// Byte length of an interleaved RGB8 buffer, `None` on overflow.
fn rgb_buffer_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(3)
}

/// Borrowed YUV planes of a decoded frame.
struct YuvFrame {
    y_ptr: *const u8,
    u_ptr: *const u8,
    v_ptr: *const u8,
    y_stride: isize,
    uv_stride: isize,
    width: u32,
    height: u32,
    bpc: u32,
    /// Chroma subsampling (horizontal, vertical), e.g. I420 = (true, true)
    subsampling: (bool, bool),
    monochrome: bool,
}

impl YuvFrame {
    /// Interleaved RGB8 using BT.601 coefficients.
    fn to_rgb8(&self) -> Result<Vec<u8>, DecodeError> {
        let len = rgb_buffer_len(self.width, self.height).ok_or(DecodeError::TooLarge {
            width: self.width,
            height: self.height,
        })?;
        let max_val = ((1u32 << self.bpc) - 1) as f32;
        let center = (1u32 << (self.bpc - 1)) as f32;
        let scale = 255.0 / max_val;
        let (ss_x, ss_y) = self.subsampling;

        let mut rgb = Vec::with_capacity(len);
        for row in 0..self.height {
            for col in 0..self.width {
                let y = self.sample(self.y_ptr, self.y_stride, col, row);

                if self.monochrome {
                    let v = (y * scale).clamp(0.0, 255.0) as u8;
                    rgb.extend_from_slice(&[v, v, v]);
                    continue;
                }

                let (cx, cy) = (if ss_x { col / 2 } else { col }, if ss_y { row / 2 } else { row });
                let cb = self.sample(self.u_ptr, self.uv_stride, cx, cy) - center;
                let cr = self.sample(self.v_ptr, self.uv_stride, cx, cy) - center;

                rgb.extend_from_slice(&[
                    ((y + 1.402 * cr) * scale).clamp(0.0, 255.0) as u8,
                    ((y - 0.344136 * cb - 0.714136 * cr) * scale).clamp(0.0, 255.0) as u8,
                    ((y + 1.772 * cb) * scale).clamp(0.0, 255.0) as u8,
                ]);
            }
        }
        Ok(rgb)
    }

    /// One sample from a plane; 10/12-bit content is stored as u16.
    #[inline]
    fn sample(&self, ptr: *const u8, stride: isize, x: u32, y: u32) -> f32 {
        if self.bpc <= 8 {
            (unsafe { *ptr.offset(y as isize * stride + x as isize) }) as f32
        } else {
            let offset = y as isize * stride + x as isize * 2;
            (unsafe { (ptr.offset(offset) as *const u16).read_unaligned() }) as f32
        }
    }
}
