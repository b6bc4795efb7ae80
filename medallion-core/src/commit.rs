//! Promotion of the chosen artifact onto its final destination.

use crate::error::{CoreError, CoreResult};

use log::info;
use std::path::Path;

/// Atomically replaces `destination` with `artifact`.
///
/// Both paths live in the same directory, so this is a single rename: the
/// destination is either the old file or the new one, never a partial write.
/// On failure the artifact is left in place for the caller to release.
pub fn promote(artifact: &Path, destination: &Path) -> CoreResult<()> {
    std::fs::rename(artifact, destination).map_err(|source| CoreError::Commit {
        path: destination.to_path_buf(),
        source,
    })?;
    info!("Saved {}", destination.display());
    Ok(())
}
