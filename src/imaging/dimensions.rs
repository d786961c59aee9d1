//! Target canvas dimensions: platform presets and custom aspect ratios.
//!
//! | Platform | Size |
//! |---|---|
//! | `youtube` | 1280×720 |
//! | `instagram` | 1080×1080 |
//! | `instagram-story` | 1080×1920 |
//! | `facebook` | 1200×630 |
//! | `twitter` | 1200×675 |
//!
//! Anything else (including the form's `custom` value) derives the size from
//! the `W:H` aspect string at a fixed 1280 px width. Resolution never fails:
//! a malformed or degenerate ratio yields the 1280×720 default.

use super::calculations::height_for_aspect;
use std::fmt;
use std::str::FromStr;

/// Width used for custom aspect ratios.
pub const CUSTOM_BASE_WIDTH: u32 = 1280;

/// Largest height a custom aspect ratio may produce before it is treated as degenerate.
pub const MAX_DIMENSION: u32 = 16_384;

/// Final canvas size. Both sides are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDimensions {
    pub width: u32,
    pub height: u32,
}

impl TargetDimensions {
    /// Fallback size for unknown platforms with an unusable aspect ratio.
    pub const DEFAULT: TargetDimensions = TargetDimensions {
        width: 1280,
        height: 720,
    };

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl fmt::Display for TargetDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Publishing platforms with a fixed thumbnail size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Youtube,
    Instagram,
    InstagramStory,
    Facebook,
    Twitter,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Youtube,
        Platform::Instagram,
        Platform::InstagramStory,
        Platform::Facebook,
        Platform::Twitter,
    ];

    /// Form identifier, e.g. `instagram-story`.
    pub fn id(self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::InstagramStory => "instagram-story",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
        }
    }

    pub fn dimensions(self) -> TargetDimensions {
        let (width, height) = match self {
            Platform::Youtube => (1280, 720),
            Platform::Instagram => (1080, 1080),
            Platform::InstagramStory => (1080, 1920),
            Platform::Facebook => (1200, 630),
            Platform::Twitter => (1200, 675),
        };
        TargetDimensions { width, height }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returned when a string is not a known platform identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.id() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

/// Parse a `W:H` ratio into its two integer parts.
///
/// Whitespace around either number is ignored. Zero is accepted here;
/// degeneracy is decided by [`height_for_aspect`].
pub fn parse_aspect(aspect: &str) -> Option<(u32, u32)> {
    let (w, h) = aspect.split_once(':')?;
    let w = w.trim().parse().ok()?;
    let h = h.trim().parse().ok()?;
    Some((w, h))
}

/// Resolve the canvas size for a request.
///
/// Custom ratios whose height would exceed [`MAX_DIMENSION`] (16384 px) are
/// treated as malformed and fall back to the default: `1:12` gives 1280×15360,
/// while `1:13` and anything taller gives 1280×720.
pub fn resolve_dimensions(platform: &str, aspect: &str) -> TargetDimensions {
    if let Ok(preset) = platform.parse::<Platform>() {
        return preset.dimensions();
    }

    parse_aspect(aspect)
        .and_then(|(w, h)| height_for_aspect(CUSTOM_BASE_WIDTH, w, h))
        .filter(|&height| height <= MAX_DIMENSION)
        .map(|height| TargetDimensions {
            width: CUSTOM_BASE_WIDTH,
            height,
        })
        .unwrap_or(TargetDimensions::DEFAULT)
}
