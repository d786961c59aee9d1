//! Parameter types for image operations.
//!
//! These structs describe *what* to draw or encode, not *how*. They are the
//! interface between the [`pipeline`](crate::pipeline) (which decides what a
//! thumbnail looks like) and the stage modules that do the pixel work.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`Color`]: Opaque RGB color used for overlay fill and stroke.
//! - [`HAlign`] / [`VAlign`]: How a text block is positioned relative to its anchor.
//! - [`OverlaySpec`]: One text overlay: content, anchor, alignment, size, colors, stroke.

use super::calculations::{link_font_size, title_font_size};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Horizontal placement of a text block relative to its anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    /// Anchor is the left edge of the text.
    Left,
    /// Anchor is the horizontal midpoint of the text.
    Center,
}

/// Vertical placement of a text block relative to its anchor y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    /// Anchor is the top of the line box (ascent).
    Top,
    /// Anchor is the vertical midpoint of the line box.
    Middle,
}

/// Link overlay anchor, measured from the canvas top-left corner.
pub const LINK_ANCHOR: (f32, f32) = (20.0, 40.0);

/// A single text overlay, fully resolved against the canvas size.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    pub text: String,
    /// Anchor point in canvas pixel space.
    pub anchor: (f32, f32),
    pub h_align: HAlign,
    pub v_align: VAlign,
    /// Font size in pixels.
    pub font_size: f32,
    pub fill: Color,
    pub stroke: Color,
    /// Outline thickness in pixels. Zero disables the outline.
    pub stroke_width: u32,
}

impl OverlaySpec {
    /// Centered title overlay. Returns `None` for empty text.
    pub fn title(text: &str, canvas_width: u32, canvas_height: u32) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            anchor: (canvas_width as f32 / 2.0, canvas_height as f32 / 2.0),
            h_align: HAlign::Center,
            v_align: VAlign::Middle,
            font_size: title_font_size(canvas_width),
            fill: Color::WHITE,
            stroke: Color::BLACK,
            stroke_width: 3,
        })
    }

    /// Top-left link overlay. Returns `None` for empty text.
    pub fn link(text: &str, canvas_width: u32) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            anchor: LINK_ANCHOR,
            h_align: HAlign::Left,
            v_align: VAlign::Top,
            font_size: link_font_size(canvas_width),
            fill: Color::WHITE,
            stroke: Color::BLACK,
            stroke_width: 2,
        })
    }
}
