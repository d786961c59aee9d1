//! Bottom-right watermark placement.

use super::RasterImage;
use super::calculations::{calculate_watermark_dimensions, watermark_origin};
use image::imageops::{self, FilterType};
use tracing::debug;

/// Scale `watermark` to 15% of `target_width` and alpha-composite it into the
/// bottom-right corner with a 20 px inset.
///
/// `None`, or a watermark whose scaled width or height rounds to zero, leaves
/// the canvas unchanged.
pub fn place_watermark(
    mut canvas: RasterImage,
    watermark: Option<RasterImage>,
    target_width: u32,
) -> RasterImage {
    let Some(watermark) = watermark else {
        return canvas;
    };

    let (width, height) = calculate_watermark_dimensions(watermark.dimensions(), target_width);
    if width == 0 || height == 0 {
        debug!(
            original = ?watermark.dimensions(),
            "watermark scales to nothing, skipping"
        );
        return canvas;
    }

    let scaled = imageops::resize(&watermark, width, height, FilterType::Lanczos3);
    let (x, y) = watermark_origin(canvas.dimensions(), (width, height));
    debug!(width, height, x, y, "placing watermark");
    imageops::overlay(&mut canvas, &scaled, x, y);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::solid;
    use image::Rgba;

    const BG: Rgba<u8> = Rgba([10, 20, 30, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn no_watermark_is_noop() {
        let canvas = solid(200, 100, BG);
        assert_eq!(place_watermark(canvas.clone(), None, 200), canvas);
    }

    #[test]
    fn square_watermark_lands_bottom_right_with_inset() {
        let canvas = solid(1280, 1280, BG);
        let out = place_watermark(canvas, Some(solid(200, 200, RED)), 1280);

        // 192x192 at (1068, 1068) .. (1259, 1259)
        assert_eq!(out.get_pixel(1068, 1068), &RED);
        assert_eq!(out.get_pixel(1259, 1259), &RED);
        assert_eq!(out.get_pixel(1067, 1100), &BG);
        assert_eq!(out.get_pixel(1100, 1067), &BG);
        assert_eq!(out.get_pixel(1260, 1259), &BG);
        assert_eq!(out.get_pixel(1259, 1260), &BG);
    }

    #[test]
    fn transparent_watermark_pixels_keep_background() {
        let canvas = solid(1280, 720, BG);
        let out = place_watermark(canvas, Some(solid(100, 100, Rgba([255, 0, 0, 0]))), 1280);
        assert_eq!(out.get_pixel(1200, 650), &BG);
    }

    #[test]
    fn degenerate_watermark_is_skipped() {
        let canvas = solid(1280, 720, BG);
        let out = place_watermark(canvas.clone(), Some(solid(10_000, 1, RED)), 1280);
        assert_eq!(out, canvas);
    }

    #[test]
    fn oversized_watermark_is_clipped() {
        // 15% of 1280 is wider than this small canvas; must not panic
        let canvas = solid(100, 100, BG);
        let out = place_watermark(canvas, Some(solid(50, 50, RED)), 1280);
        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(out.get_pixel(0, 0), &RED);
        assert_eq!(out.get_pixel(99, 99), &BG);
    }
}
