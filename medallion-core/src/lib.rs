//! Core library for making size-limited animated WebP badges with ffmpeg.
//!
//! A badge is a square crop of a video, optionally rescaled and resampled,
//! masked to a circle and encoded with libwebp. When a byte budget is given,
//! the library searches for the highest libwebp quality whose output fits,
//! trying one encode at a time and committing only the chosen result.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use medallion_core::{EncodeSession, RunConfig, RunOutcome, SidecarLauncher, mib_to_bytes};
//! use medallion_core::external::{CropSpec, EncodeParameters};
//! use std::path::PathBuf;
//!
//! let params = EncodeParameters::new(
//!     PathBuf::from("/videos/clip.mp4"),
//!     CropSpec { x: 420, y: 0, side: 1080 },
//! );
//! let mut config = RunConfig::new(params, PathBuf::from("/videos/clip.webp"));
//! config.target_bytes = Some(mib_to_bytes(5));
//!
//! let mut session = EncodeSession::new(SidecarLauncher::default());
//! session.start(config).unwrap();
//!
//! let (_interrupt_tx, interrupt_rx) = crossbeam_channel::unbounded();
//! if let Some(RunOutcome::Success(summary)) = session.wait(&interrupt_rx) {
//!     println!("quality {} -> {} bytes", summary.quality, summary.size_bytes);
//! }
//! ```

pub mod artifacts;
pub mod commit;
pub mod config;
pub mod error;
pub mod external;
pub mod search;
pub mod session;
pub mod utils;

// Re-exports for public API
pub use artifacts::TempArtifacts;
pub use commit::promote;
pub use config::{QualityBounds, RunConfig, mib_to_bytes};
pub use error::{CoreError, CoreResult};
pub use external::{EncodeLauncher, SidecarLauncher, check_dependency};
pub use search::{AttainmentNote, SearchController, SearchPhase};
pub use session::{EncodeSession, EncodeSummary, RunOutcome};
pub use utils::{ensure_webp_extension, format_bytes, resolve_output_path};
