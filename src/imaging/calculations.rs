//! Pure calculation functions for canvas and overlay geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Watermark width as a fraction of the canvas width.
pub const WATERMARK_WIDTH_RATIO: f64 = 0.15;

/// Distance between the watermark and the bottom/right canvas edges.
pub const WATERMARK_INSET: u32 = 20;

/// Upper bound on the title font size, in pixels.
pub const TITLE_MAX_FONT_SIZE: f32 = 80.0;

/// Height for a canvas of `base_width` with aspect ratio `ratio_w:ratio_h`.
///
/// Returns `None` for a degenerate ratio (either side zero) or when the
/// height rounds down to zero.
///
/// # Examples
/// ```
/// # use thumbcraft::imaging::height_for_aspect;
/// assert_eq!(height_for_aspect(1280, 16, 9), Some(720));
/// assert_eq!(height_for_aspect(1280, 4, 3), Some(960));
/// assert_eq!(height_for_aspect(1280, 1, 0), None);
/// ```
pub fn height_for_aspect(base_width: u32, ratio_w: u32, ratio_h: u32) -> Option<u32> {
    if ratio_w == 0 || ratio_h == 0 {
        return None;
    }
    let ratio = ratio_w as f64 / ratio_h as f64;
    let height = (base_width as f64 / ratio).round();
    (height >= 1.0 && height <= u32::MAX as f64).then_some(height as u32)
}

/// A rectangular region of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Calculate the centered source region that, once resized, covers the target.
///
/// The region has the target's aspect ratio: the full extent of the source is
/// kept on the axis that fits and the overflow on the other axis is trimmed
/// equally from both sides. Resizing this region to `target` is the same as
/// scaling the source to cover the target and cropping the center, without
/// materializing the oversized intermediate.
///
/// Zero-sized inputs are treated as 1 px so the ratio is always defined, and
/// the region is never smaller than 1×1.
///
/// # Arguments
/// * `source` - Source image dimensions (width, height)
/// * `target` - Target canvas dimensions (width, height)
pub fn calculate_cover_crop(source: (u32, u32), target: (u32, u32)) -> CropRect {
    let (src_w, src_h) = (source.0.max(1), source.1.max(1));
    let (tgt_w, tgt_h) = (target.0.max(1), target.1.max(1));

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: keep full height, trim the sides
        let width = ((src_h as f64 * tgt_aspect).round() as u32).clamp(1, src_w);
        CropRect {
            x: (src_w - width) / 2,
            y: 0,
            width,
            height: src_h,
        }
    } else {
        // Source is taller (or equal): keep full width, trim top and bottom
        let height = ((src_w as f64 / tgt_aspect).round() as u32).clamp(1, src_h);
        CropRect {
            x: 0,
            y: (src_h - height) / 2,
            width: src_w,
            height,
        }
    }
}

/// Calculate watermark dimensions for a canvas `target_width` wide.
///
/// Width is [`WATERMARK_WIDTH_RATIO`] of the canvas; height follows the
/// watermark's own aspect ratio. Either side may be zero, in which case the
/// watermark should not be placed.
pub fn calculate_watermark_dimensions(original: (u32, u32), target_width: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let width = (target_width as f64 * WATERMARK_WIDTH_RATIO).round() as u32;
    if orig_w == 0 {
        return (width, 0);
    }
    let height = (orig_h as f64 * width as f64 / orig_w as f64).round() as u32;
    (width, height)
}

/// Top-left position of a watermark pinned to the bottom-right corner.
///
/// Negative when the watermark plus inset is larger than the canvas.
pub fn watermark_origin(canvas: (u32, u32), watermark: (u32, u32)) -> (i64, i64) {
    let inset = WATERMARK_INSET as i64;
    (
        canvas.0 as i64 - watermark.0 as i64 - inset,
        canvas.1 as i64 - watermark.1 as i64 - inset,
    )
}

/// Title font size: one fifteenth of the canvas width, capped at 80.
pub fn title_font_size(canvas_width: u32) -> f32 {
    (canvas_width as f32 / 15.0).min(TITLE_MAX_FONT_SIZE)
}

/// Link font size: one fortieth of the canvas width.
pub fn link_font_size(canvas_width: u32) -> f32 {
    canvas_width as f32 / 40.0
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // height_for_aspect tests
    // =========================================================================

    #[test]
    fn aspect_common_ratios() {
        assert_eq!(height_for_aspect(1280, 16, 9), Some(720));
        assert_eq!(height_for_aspect(1280, 4, 3), Some(960));
        assert_eq!(height_for_aspect(1280, 1, 1), Some(1280));
        assert_eq!(height_for_aspect(1280, 9, 16), Some(2276));
    }

    #[test]
    fn aspect_rounds_to_nearest() {
        // 1280 / (21/9) = 548.57
        assert_eq!(height_for_aspect(1280, 21, 9), Some(549));
    }

    #[test]
    fn aspect_zero_side_is_degenerate() {
        assert_eq!(height_for_aspect(1280, 0, 9), None);
        assert_eq!(height_for_aspect(1280, 16, 0), None);
    }

    #[test]
    fn aspect_height_rounding_to_zero_is_degenerate() {
        assert_eq!(height_for_aspect(1280, 100_000, 1), None);
    }

    // =========================================================================
    // calculate_cover_crop tests
    // =========================================================================

    #[test]
    fn cover_landscape_source_to_wider_target() {
        // 4000x3000 (4:3) → 1280x720 (16:9): keep width, trim height to 2250
        assert_eq!(
            calculate_cover_crop((4000, 3000), (1280, 720)),
            CropRect {
                x: 0,
                y: 375,
                width: 4000,
                height: 2250
            }
        );
    }

    #[test]
    fn cover_wider_source_to_portrait_target() {
        // 800x600 → 400x500: keep height, width = 600 * 0.8 = 480
        assert_eq!(
            calculate_cover_crop((800, 600), (400, 500)),
            CropRect {
                x: 160,
                y: 0,
                width: 480,
                height: 600
            }
        );
    }

    #[test]
    fn cover_same_aspect_keeps_everything() {
        assert_eq!(
            calculate_cover_crop((800, 600), (400, 300)),
            CropRect {
                x: 0,
                y: 0,
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn cover_extreme_tall_source_clamps_to_one_pixel() {
        let rect = calculate_cover_crop((1, 1000), (1280, 720));
        assert_eq!(rect.width, 1);
        assert_eq!(rect.height, 1);
        assert_eq!(rect.y, 499);
    }

    #[test]
    fn cover_extreme_wide_source() {
        let rect = calculate_cover_crop((1000, 1), (1080, 1920));
        assert_eq!(rect.height, 1);
        assert_eq!(rect.width, 1);
        assert_eq!(rect.x, 499);
    }

    #[test]
    fn cover_zero_sized_source_does_not_panic() {
        let rect = calculate_cover_crop((0, 0), (1280, 720));
        assert_eq!((rect.width, rect.height), (1, 1));
    }

    #[test]
    fn cover_region_stays_inside_source() {
        for source in [(1, 1), (3, 7), (50, 50), (4000, 3000), (123, 4567)] {
            for target in [(1280, 720), (1080, 1920), (1080, 1080), (1, 1)] {
                let r = calculate_cover_crop(source, target);
                assert!(r.width >= 1 && r.height >= 1);
                assert!(r.x + r.width <= source.0, "{source:?} → {target:?}: {r:?}");
                assert!(r.y + r.height <= source.1, "{source:?} → {target:?}: {r:?}");
            }
        }
    }

    // =========================================================================
    // watermark geometry tests
    // =========================================================================

    #[test]
    fn watermark_square_on_1280_canvas() {
        assert_eq!(calculate_watermark_dimensions((200, 200), 1280), (192, 192));
    }

    #[test]
    fn watermark_keeps_aspect_ratio() {
        // 400x100 logo on a 1200 wide canvas → 180 wide, 45 tall
        assert_eq!(calculate_watermark_dimensions((400, 100), 1200), (180, 45));
    }

    #[test]
    fn watermark_very_wide_logo_rounds_height_to_zero() {
        assert_eq!(calculate_watermark_dimensions((10_000, 1), 1280), (192, 0));
    }

    #[test]
    fn watermark_origin_is_inset_from_bottom_right() {
        assert_eq!(watermark_origin((1280, 1280), (192, 192)), (1068, 1068));
    }

    #[test]
    fn watermark_origin_can_go_negative() {
        assert_eq!(watermark_origin((100, 100), (192, 192)), (-112, -112));
    }

    // =========================================================================
    // font size tests
    // =========================================================================

    #[test]
    fn title_font_size_capped_at_80() {
        assert_eq!(title_font_size(1280), 80.0);
        assert_eq!(title_font_size(1080), 72.0);
    }

    #[test]
    fn link_font_size_scales_with_width() {
        assert_eq!(link_font_size(1280), 32.0);
        assert_eq!(link_font_size(1080), 27.0);
    }
}
