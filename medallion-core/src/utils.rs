//! Utility functions for formatting and path handling.
//!
//! This module provides general-purpose helpers used by the library and the
//! CLI: byte formatting and output file naming.

use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Extension of every badge this crate writes.
pub const OUTPUT_EXTENSION: &str = "webp";

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Safely extracts filename from a path with consistent error handling.
pub fn get_filename_safe(path: &Path) -> CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| {
            CoreError::PathError(format!("Failed to get filename for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}

/// Appends `.webp` unless the name already ends with it (any case).
#[must_use]
pub fn ensure_webp_extension(name: &str) -> String {
    let has_extension = Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(OUTPUT_EXTENSION));
    if has_extension {
        name.to_string()
    } else {
        format!("{name}.{OUTPUT_EXTENSION}")
    }
}

/// Destination for a badge made from `input`.
///
/// Defaults to `<input dir>/<input stem>.webp`; `output_dir` and `name`
/// override the directory and file name.
pub fn resolve_output_path(
    input: &Path,
    output_dir: Option<&Path>,
    name: Option<&str>,
) -> CoreResult<PathBuf> {
    let file_name = match name {
        Some(name) if !name.trim().is_empty() => ensure_webp_extension(name.trim()),
        _ => {
            let stem = input.file_stem().ok_or_else(|| {
                CoreError::PathError(format!("Failed to get file stem for {}", input.display()))
            })?;
            format!("{}.{OUTPUT_EXTENSION}", stem.to_string_lossy())
        }
    };

    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    Ok(dir.join(file_name))
}
