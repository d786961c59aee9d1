//! Service configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by an optional `config.toml` in the config directory; the file
//! is sparse, so it only needs the keys it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [encoding]
//! avif_quality = 80   # Primary (AVIF) quality, 1-100
//! jpeg_quality = 90   # Fallback (JPEG) quality, 1-100
//! avif_speed = 6      # rav1e speed preset, 1 (slow) - 10 (fast)
//!
//! [assets]
//! font = "assets/fonts/DejaVuSans.ttf"  # Relative to the config directory
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Quality;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Service configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Output encoding settings.
    pub encoding: EncodingConfig,
    /// Static assets needed at startup.
    pub assets: AssetsConfig,
}

impl ServiceConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let e = &self.encoding;
        if !(1..=100).contains(&e.avif_quality) {
            return Err(ConfigError::Validation(
                "encoding.avif_quality must be 1-100".into(),
            ));
        }
        if !(1..=100).contains(&e.jpeg_quality) {
            return Err(ConfigError::Validation(
                "encoding.jpeg_quality must be 1-100".into(),
            ));
        }
        if !(1..=10).contains(&e.avif_speed) {
            return Err(ConfigError::Validation(
                "encoding.avif_speed must be 1-10".into(),
            ));
        }
        if self.assets.font.as_os_str().is_empty() {
            return Err(ConfigError::Validation("assets.font must not be empty".into()));
        }
        Ok(())
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// Primary AVIF quality (1-100).
    pub avif_quality: u32,
    /// Fallback JPEG quality (1-100).
    pub jpeg_quality: u32,
    /// rav1e speed preset (1-10).
    pub avif_speed: u8,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            avif_quality: 80,
            jpeg_quality: 90,
            avif_speed: 6,
        }
    }
}

impl EncodingConfig {
    pub fn avif_quality(&self) -> Quality {
        Quality::new(self.avif_quality)
    }

    pub fn jpeg_quality(&self) -> Quality {
        Quality::new(self.jpeg_quality)
    }
}

/// Static asset locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Font used for both overlays.
    pub font: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            font: PathBuf::from("assets/fonts/DejaVuSans.ttf"),
        }
    }
}

impl AssetsConfig {
    /// Font path, with relative paths resolved against `root`.
    pub fn font_path(&self, root: &Path) -> PathBuf {
        if self.font.is_absolute() {
            self.font.clone()
        } else {
            root.join(&self.font)
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ServiceConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<ServiceConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: ServiceConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# thumbcraft configuration
# ========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[encoding]
# Thumbnails are encoded as AVIF. If AVIF encoding fails for any reason the
# same image is encoded as JPEG instead.
avif_quality = 80
jpeg_quality = 90

# rav1e speed preset: 1 is slowest with the smallest files, 10 is fastest.
avif_speed = 6

# ---------------------------------------------------------------------------
# Assets
# ---------------------------------------------------------------------------
[assets]
# TrueType/OpenType font used for the title and link overlays. Relative paths
# are resolved against the directory holding this file. The font is loaded at
# startup; a missing or unreadable font stops the service from starting.
font = "assets/fonts/DejaVuSans.ttf"
"##
}
