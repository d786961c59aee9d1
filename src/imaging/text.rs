//! Outlined text overlays.
//!
//! Glyphs are laid out and rasterized with `rusttype` into a coverage mask.
//! The outline is the mask dilated by the stroke width with a round kernel;
//! it is painted first in the stroke color, then the glyph coverage is painted
//! on top in the fill color. Pixels that fall outside the canvas are clipped.

use super::RasterImage;
use super::params::{Color, HAlign, OverlaySpec, VAlign};
use rusttype::{Font, PositionedGlyph, Scale, point};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("cannot read font {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not a usable TrueType/OpenType font")]
    Invalid(PathBuf),
}

/// A parsed font face, shared by every overlay and every request.
#[derive(Clone)]
pub struct FontAsset {
    font: Arc<Font<'static>>,
}

impl FontAsset {
    /// Read and parse a font file.
    pub fn load(path: &Path) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes).ok_or_else(|| FontError::Invalid(path.to_path_buf()))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(bytes).map(|font| Self {
            font: Arc::new(font),
        })
    }
}

impl std::fmt::Debug for FontAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontAsset")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

/// Draws [`OverlaySpec`]s onto a canvas with a single font face.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    font: FontAsset,
}

impl TextRenderer {
    pub fn new(font: FontAsset) -> Self {
        Self { font }
    }

    /// Draw each overlay in order. An empty list leaves the canvas untouched.
    pub fn render(&self, mut canvas: RasterImage, overlays: &[OverlaySpec]) -> RasterImage {
        for overlay in overlays {
            self.draw(&mut canvas, overlay);
        }
        canvas
    }

    fn draw(&self, canvas: &mut RasterImage, spec: &OverlaySpec) {
        let font = &*self.font.font;
        let scale = Scale::uniform(spec.font_size);
        let v_metrics = font.v_metrics(scale);

        let (left, top) = self.block_origin(spec, scale);
        let glyphs: Vec<_> = font
            .layout(&spec.text, scale, point(left, top + v_metrics.ascent))
            .collect();

        let Some(mask) = GlyphMask::rasterize(&glyphs, spec.stroke_width, canvas.dimensions())
        else {
            return;
        };
        debug!(
            text = %spec.text,
            size = spec.font_size,
            origin = ?mask.origin,
            "drawing overlay"
        );

        if spec.stroke_width > 0 {
            let outline = mask.dilate(spec.stroke_width);
            mask.paint(canvas, &outline, spec.stroke);
        }
        mask.paint(canvas, &mask.coverage, spec.fill);
    }

    /// Top-left corner of the text's line box after alignment.
    fn block_origin(&self, spec: &OverlaySpec, scale: Scale) -> (f32, f32) {
        let font = &*self.font.font;
        let (anchor_x, anchor_y) = spec.anchor;

        let left = match spec.h_align {
            HAlign::Left => anchor_x,
            HAlign::Center => anchor_x - advance_width(font, &spec.text, scale) / 2.0,
        };
        let top = match spec.v_align {
            VAlign::Top => anchor_y,
            VAlign::Middle => {
                let v = font.v_metrics(scale);
                anchor_y - (v.ascent - v.descent) / 2.0
            }
        };
        (left, top)
    }
}

/// Horizontal advance of a laid-out string, including kerning.
fn advance_width(font: &Font<'_>, text: &str, scale: Scale) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Glyph coverage for one overlay, padded on every side by the stroke width.
///
/// The mask never extends more than the padding past the canvas, so its size
/// is bounded by the canvas and not by the length of the text.
struct GlyphMask {
    /// Canvas position of the mask's top-left pixel.
    origin: (i32, i32),
    width: usize,
    height: usize,
    coverage: Vec<f32>,
}

impl GlyphMask {
    /// `None` when no inked glyph lands on (or within `pad` of) the canvas.
    fn rasterize(glyphs: &[PositionedGlyph<'_>], pad: u32, canvas: (u32, u32)) -> Option<Self> {
        let pad = pad as i32;
        let (cw, ch) = (canvas.0 as i32, canvas.1 as i32);

        let inked: Vec<_> = glyphs
            .iter()
            .filter_map(|g| g.pixel_bounding_box().map(|bb| (g, bb)))
            .filter(|(_, bb)| {
                bb.max.x + pad > 0
                    && bb.min.x - pad < cw
                    && bb.max.y + pad > 0
                    && bb.min.y - pad < ch
            })
            .collect();

        // Ink box grown by the stroke, clipped to the canvas plus the stroke
        // margin so the outline along the canvas edge still sees nearby ink.
        let x0 = (inked.iter().map(|(_, bb)| bb.min.x).min()? - pad).max(-pad);
        let y0 = (inked.iter().map(|(_, bb)| bb.min.y).min()? - pad).max(-pad);
        let x1 = (inked.iter().map(|(_, bb)| bb.max.x).max()? + pad).min(cw + pad);
        let y1 = (inked.iter().map(|(_, bb)| bb.max.y).max()? + pad).min(ch + pad);
        let (width, height) = (x1 - x0, y1 - y0);
        if width <= 0 || height <= 0 {
            return None;
        }

        let mut coverage = vec![0.0f32; (width * height) as usize];
        for (glyph, bb) in &inked {
            glyph.draw(|gx, gy, v| {
                let mx = bb.min.x + gx as i32 - x0;
                let my = bb.min.y + gy as i32 - y0;
                if mx >= 0 && my >= 0 && mx < width && my < height {
                    let c = &mut coverage[(my * width + mx) as usize];
                    *c = c.max(v);
                }
            });
        }

        Some(Self {
            origin: (x0, y0),
            width: width as usize,
            height: height as usize,
            coverage,
        })
    }

    /// Max coverage within a disc of `radius` around each pixel.
    fn dilate(&self, radius: u32) -> Vec<f32> {
        let r = radius as i32;
        let kernel: Vec<(i32, i32)> = (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter(|(dx, dy)| dx * dx + dy * dy <= r * r)
            .collect();

        let (w, h) = (self.width as i32, self.height as i32);
        let mut out = vec![0.0f32; self.coverage.len()];
        for y in 0..h {
            for x in 0..w {
                let mut best = 0.0f32;
                for &(dx, dy) in &kernel {
                    let (sx, sy) = (x + dx, y + dy);
                    if sx >= 0 && sy >= 0 && sx < w && sy < h {
                        best = best.max(self.coverage[(sy * w + sx) as usize]);
                    }
                }
                out[(y * w + x) as usize] = best;
            }
        }
        out
    }

    /// Alpha-blend `color` onto the canvas using `alpha` as per-pixel opacity.
    fn paint(&self, canvas: &mut RasterImage, alpha: &[f32], color: Color) {
        let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
        for my in 0..self.height {
            let y = self.origin.1 + my as i32;
            if y < 0 || y >= ch {
                continue;
            }
            for mx in 0..self.width {
                let x = self.origin.0 + mx as i32;
                if x < 0 || x >= cw {
                    continue;
                }
                let a = alpha[my * self.width + mx].clamp(0.0, 1.0);
                if a <= 0.0 {
                    continue;
                }
                let dst = canvas.get_pixel_mut(x as u32, y as u32);
                let inv = 1.0 - a;
                for (channel, src) in dst.0.iter_mut().zip([color.r, color.g, color.b]) {
                    *channel = (src as f32 * a + *channel as f32 * inv).round() as u8;
                }
                dst.0[3] = (255.0 * a + dst.0[3] as f32 * inv).round() as u8;
            }
        }
    }
}
