//! Temporary artifact management for encode attempts.
//!
//! Every attempt writes to its own hidden file next to the final destination,
//! so promotion is a same-directory rename. `TempArtifacts` remembers every
//! path it handed out that has not been released or surrendered, and deletes
//! whatever is left when it is dropped.

use log::{debug, warn};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

/// Length of the random token in temp artifact names.
const TOKEN_LEN: usize = 16;

/// Attempts at finding an unused name before giving up.
const MAX_NAME_ATTEMPTS: usize = 32;

/// Owner of the temporary files produced during one run.
#[derive(Debug)]
pub struct TempArtifacts {
    destination: PathBuf,
    outstanding: BTreeSet<PathBuf>,
}

impl TempArtifacts {
    /// Creates a manager for artifacts that will eventually replace `destination`.
    #[must_use]
    pub fn new(destination: &Path) -> Self {
        Self {
            destination: destination.to_path_buf(),
            outstanding: BTreeSet::new(),
        }
    }

    /// Returns a fresh path of the form `.{stem}.tmp_{token}.{ext}` beside the destination.
    ///
    /// The file is not created; the encoder writes it.
    pub fn allocate(&mut self) -> io::Result<PathBuf> {
        let dir = match self.destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = self
            .destination
            .file_stem()
            .map(OsStr::to_string_lossy)
            .unwrap_or_default();
        let suffix = self
            .destination
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        for _ in 0..MAX_NAME_ATTEMPTS {
            let token: String = thread_rng()
                .sample_iter(&Alphanumeric)
                .take(TOKEN_LEN)
                .map(char::from)
                .collect();
            let candidate = dir.join(format!(".{stem}.tmp_{token}{suffix}"));

            if candidate.exists() || self.outstanding.contains(&candidate) {
                continue;
            }
            debug!("Allocated temp artifact {}", candidate.display());
            self.outstanding.insert(candidate.clone());
            return Ok(candidate);
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free temp name next to {}", self.destination.display()),
        ))
    }

    /// Deletes `path` and stops tracking it. A missing file is not an error.
    pub fn release(&mut self, path: &Path) {
        self.outstanding.remove(path);
        remove_quietly(path);
    }

    /// Deletes every outstanding artifact.
    pub fn release_all(&mut self) {
        for path in std::mem::take(&mut self.outstanding) {
            remove_quietly(&path);
        }
    }

    /// Stops tracking `path` without deleting it; used once it has been promoted.
    pub fn surrender(&mut self, path: &Path) -> bool {
        self.outstanding.remove(path)
    }

    /// Paths handed out and not yet released or surrendered.
    pub fn outstanding(&self) -> impl Iterator<Item = &Path> {
        self.outstanding.iter().map(PathBuf::as_path)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outstanding.is_empty()
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        self.release_all();
    }
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed temp artifact {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove temp artifact {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_allocate_names_hidden_sibling() {
        let dir = tempdir().unwrap();
        let mut artifacts = TempArtifacts::new(&dir.path().join("badge.webp"));
        let path = artifacts.allocate().unwrap();

        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".badge.tmp_"), "{name}");
        assert!(name.ends_with(".webp"), "{name}");
        assert_eq!(name.len(), ".badge.tmp_".len() + TOKEN_LEN + ".webp".len());
        assert!(!path.exists());
    }

    #[test]
    fn test_allocations_are_distinct() {
        let dir = tempdir().unwrap();
        let mut artifacts = TempArtifacts::new(&dir.path().join("badge.webp"));
        let first = artifacts.allocate().unwrap();
        let second = artifacts.allocate().unwrap();
        assert_ne!(first, second);
        assert_eq!(artifacts.outstanding().count(), 2);
    }

    #[test]
    fn test_release_missing_file_is_ok() {
        let dir = tempdir().unwrap();
        let mut artifacts = TempArtifacts::new(&dir.path().join("badge.webp"));
        let path = artifacts.allocate().unwrap();
        artifacts.release(&path);
        assert!(artifacts.is_empty());
    }

    #[test]
    fn test_drop_deletes_outstanding_but_not_surrendered() {
        let dir = tempdir().unwrap();
        let kept;
        let dropped;
        {
            let mut artifacts = TempArtifacts::new(&dir.path().join("badge.webp"));
            kept = artifacts.allocate().unwrap();
            dropped = artifacts.allocate().unwrap();
            std::fs::write(&kept, b"kept").unwrap();
            std::fs::write(&dropped, b"dropped").unwrap();
            assert!(artifacts.surrender(&kept));
        }
        assert!(kept.exists());
        assert!(!dropped.exists());
    }
}
