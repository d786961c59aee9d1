//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! do no I/O.
//!
//! ```text
//! Platforms
//!     youtube            1280x720
//!     instagram          1080x1080
//!     ...
//!     custom             1280 wide, height from --aspect (default 1280x720)
//! ```

use crate::imaging::{EncodedResult, Platform, TargetDimensions, identify_payload};
use std::path::Path;

/// The preset table, one line per platform.
pub fn format_platforms() -> Vec<String> {
    let mut lines = vec!["Platforms".to_string()];
    for platform in Platform::ALL {
        lines.push(format!(
            "    {:<18} {}",
            platform.id(),
            platform.dimensions()
        ));
    }
    lines.push(format!(
        "    {:<18} 1280 wide, height from --aspect (default {})",
        "custom",
        TargetDimensions::DEFAULT
    ));
    lines
}

pub fn print_platforms() {
    for line in format_platforms() {
        println!("{line}");
    }
}

/// Confirmation that config and font both loaded.
pub fn format_check(config_file: &Path, font: &Path) -> Vec<String> {
    vec![
        format!("==> Config OK: {}", config_file.display()),
        format!("==> Font OK: {}", font.display()),
    ]
}

pub fn print_check(config_file: &Path, font: &Path) {
    for line in format_check(config_file, font) {
        println!("{line}");
    }
}

/// Summary of a thumbnail written to disk.
pub fn format_written(result: &EncodedResult, path: &Path) -> Vec<String> {
    let size = match identify_payload(&result.bytes) {
        Ok((w, h)) => format!("{w}x{h}"),
        Err(_) => "unknown size".to_string(),
    };
    vec![
        format!("Thumbnail → {}", path.display()),
        format!("    Format: {}", result.format),
        format!("    Size: {size}"),
        format!("    Bytes: {}", result.bytes.len()),
    ]
}

pub fn print_written(result: &EncodedResult, path: &Path) {
    for line in format_written(result, path) {
        println!("{line}");
    }
}
