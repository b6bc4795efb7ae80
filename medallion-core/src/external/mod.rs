// ============================================================================
// medallion-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and the File System
//
// This module encapsulates everything that touches ffmpeg or file metadata.
// The launcher and metadata access are expressed as traits so a run can be
// driven by a synthetic encoder in tests.
//
// KEY COMPONENTS:
// - EncodeLauncher / LaunchHandle: asynchronous one-attempt encode protocol
// - SidecarLauncher: ffmpeg-sidecar implementation
// - FileMetadataProvider: file size lookup abstraction
// - check_dependency: verifies ffmpeg can be started
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions for ffmpeg

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, command_start_error};

// ---- Standard library imports ----
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Encode parameters and ffmpeg argument building
pub mod ffmpeg;

/// Command builder and filter chain helpers
pub mod ffmpeg_builder;

/// Traits and implementations for launching ffmpeg attempts
pub mod ffmpeg_executor;

/// Synthetic launcher for tests
#[cfg(test)]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg::{CropSpec, EncodeParameters, EncodeRequest};
pub use ffmpeg_executor::{
    AttemptCompletion, CompletionStatus, EncodeLauncher, FailureCause, LaunchHandle,
    SidecarHandle, SidecarLauncher,
};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external command can be started.
///
/// Runs `cmd -version` with output discarded. Only a failure to spawn counts;
/// the exit status is ignored.
///
/// # Returns
///
/// * `Ok(())` - The command started
/// * `Err(CoreError::DependencyNotFound)` - The command does not exist
/// * `Err(CoreError::CommandStart)` - The command exists but failed to start
pub fn check_dependency(cmd: impl AsRef<OsStr>) -> CoreResult<()> {
    let cmd = cmd.as_ref();
    let cmd_name = cmd.to_string_lossy();

    let result = Command::new(cmd)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.into_owned()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(command_start_error(&cmd_name, e))
        }
    }
}

// ============================================================================
// FILE METADATA ACCESS
// ============================================================================

/// Abstraction over file metadata lookups.
///
/// # Examples
///
/// ```rust
/// use medallion_core::external::FileMetadataProvider;
/// use medallion_core::CoreResult;
/// use std::path::Path;
///
/// struct FixedSize;
///
/// impl FileMetadataProvider for FixedSize {
///     fn get_size(&self, _path: &Path) -> CoreResult<u64> {
///         Ok(1_000_000)
///     }
/// }
///
/// assert_eq!(FixedSize.get_size(Path::new("/fake/path")).unwrap(), 1_000_000);
/// ```
pub trait FileMetadataProvider {
    /// Size of the file at `path` in bytes.
    fn get_size(&self, path: &Path) -> CoreResult<u64>;
}

/// [`FileMetadataProvider`] backed by `std::fs::metadata`.
#[derive(Debug, Clone, Default)]
pub struct StdFsMetadataProvider;

impl FileMetadataProvider for StdFsMetadataProvider {
    fn get_size(&self, path: &Path) -> CoreResult<u64> {
        std::fs::metadata(path)
            .map(|m| m.len())
            .map_err(|source| CoreError::SizeProbe {
                path: path.to_path_buf(),
                source,
            })
    }
}
