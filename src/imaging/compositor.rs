//! Fitting the source image onto the target canvas.
//!
//! [`cover_fit`] fills the target rectangle completely (no letterboxing) and
//! crops the overflow from the center. [`force_upscale`] is the optional
//! second pass requested by the `upscale` flag; it always resamples to the
//! target size even though cover-fit already produced it, so it never changes
//! the final dimensions.

use super::RasterImage;
use super::calculations::calculate_cover_crop;
use super::dimensions::TargetDimensions;
use image::imageops::{self, FilterType};
use tracing::debug;

/// Scale and center-crop `canvas` so it is exactly `target`.
pub fn cover_fit(canvas: RasterImage, target: TargetDimensions) -> RasterImage {
    let rect = calculate_cover_crop(canvas.dimensions(), target.as_tuple());
    debug!(
        source = ?canvas.dimensions(),
        crop = ?rect,
        %target,
        "cover-fit"
    );

    let cropped = if (rect.x, rect.y, rect.width, rect.height)
        == (0, 0, canvas.width(), canvas.height())
    {
        canvas
    } else {
        imageops::crop_imm(&canvas, rect.x, rect.y, rect.width, rect.height).to_image()
    };

    if cropped.dimensions() == target.as_tuple() {
        return cropped;
    }
    imageops::resize(&cropped, target.width, target.height, FilterType::Lanczos3)
}

/// Resample `canvas` to exactly `target`, regardless of its current size.
pub fn force_upscale(canvas: RasterImage, target: TargetDimensions) -> RasterImage {
    debug!(%target, "forced upscale pass");
    imageops::resize(&canvas, target.width, target.height, FilterType::Lanczos3)
}

/// Cover-fit followed by the optional forced resample.
pub fn composite(canvas: RasterImage, target: TargetDimensions, upscale: bool) -> RasterImage {
    let fitted = cover_fit(canvas, target);
    if upscale {
        force_upscale(fitted, target)
    } else {
        fitted
    }
}
