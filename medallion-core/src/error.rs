// ============================================================================
// medallion-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the Medallion Core Library
//
// Every failure a run can hit is mapped to one CoreError variant here. The
// session converts these into a run-level terminal outcome; nothing below the
// level of "this run failed" is ever reported as a partial success.
//
// AI-ASSISTANT-INFO: Error types and helper constructors for medallion-core

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for medallion-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("An encode run is already in progress")]
    RunInProgress,

    /// The encoder could not be started (missing executable, permission denied).
    #[error("ffmpeg failed to start: {diagnostic}")]
    LaunchFailed { diagnostic: String },

    /// The encoder ran but exited with failure or was killed.
    #[error("ffmpeg failed: {diagnostic}")]
    EncoderFailed { diagnostic: String },

    #[error("Failed to read ffmpeg output: {diagnostic}")]
    DiagnosticsUnreadable { diagnostic: String },

    /// The attempt produced an artifact whose size could not be determined.
    #[error("Could not read size of '{}': {source}", path.display())]
    SizeProbe {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Promoting the chosen artifact onto the destination failed.
    #[error("Failed to save final file '{}': {source}", path.display())]
    Commit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("The quality search has already finished")]
    SearchFinished,

    #[error("No usable output was produced")]
    NoUsableResult,

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for medallion-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds the error for a command that could not be spawned.
pub fn command_start_error(cmd_name: &str, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd_name.to_string(), err)
}

/// Falls back to `reason` when the captured diagnostic text is empty.
pub(crate) fn diagnostic_or(diagnostic: &str, reason: &str) -> String {
    let trimmed = diagnostic.trim();
    if trimmed.is_empty() {
        reason.to_string()
    } else {
        trimmed.to_string()
    }
}
