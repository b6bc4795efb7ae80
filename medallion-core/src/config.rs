// ============================================================================
// medallion-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Run Configuration Structures and Constants
//
// This module defines the configuration consumed by an encode run: the fixed
// encode parameters, the destination, the requested quality and, for
// size-constrained runs, the byte budget and search limits.
//
// KEY COMPONENTS:
// - QualityBounds: Validated [min, max] quality interval for one search
// - RunConfig: Everything a single run needs, fixed at run start
// - Default constants: Values mirroring the interactive tool's defaults
//
// AI-ASSISTANT-INFO: Configuration structures and constants for medallion-core

use crate::error::{CoreError, CoreResult};
use crate::external::ffmpeg::EncodeParameters;

use std::ops::RangeInclusive;
use std::path::PathBuf;

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Quality values libwebp accepts for `-q:v`.
pub const ADMISSIBLE_QUALITY: RangeInclusive<u32> = 0..=100;

/// Default requested quality. Acts as the search ceiling.
pub const DEFAULT_QUALITY: u32 = 100;

/// Lowest quality the search will fall back to.
pub const DEFAULT_QUALITY_FLOOR: u32 = 1;

/// Hard cap on binary-refine attempts, independent of the range size.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 12;

/// Default badge side length in pixels.
pub const DEFAULT_OUTPUT_SIDE: u32 = 1080;

/// Default badge frame rate.
pub const DEFAULT_FPS: u32 = 30;

/// Largest accepted size limit, in MiB.
pub const MAX_TARGET_MIB: u64 = 1024;

const MIB: u64 = 1024 * 1024;

/// Converts a size limit in MiB into a byte budget.
#[must_use]
pub const fn mib_to_bytes(mib: u64) -> u64 {
    mib * MIB
}

// ============================================================================
// QUALITY BOUNDS
// ============================================================================

/// Inclusive quality interval searched by one constrained run.
///
/// `max` is the quality the user asked for; `min` is the floor the search
/// falls back to when even the ceiling is too large.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityBounds {
    min: u32,
    max: u32,
}

impl QualityBounds {
    /// Creates bounds, rejecting values outside [`ADMISSIBLE_QUALITY`] or `min > max`.
    pub fn new(min: u32, max: u32) -> CoreResult<Self> {
        for value in [min, max] {
            if !ADMISSIBLE_QUALITY.contains(&value) {
                return Err(CoreError::Config(format!(
                    "quality {value} is outside the admissible range {}-{}",
                    ADMISSIBLE_QUALITY.start(),
                    ADMISSIBLE_QUALITY.end()
                )));
            }
        }
        if min > max {
            return Err(CoreError::Config(format!(
                "quality floor {min} is above quality ceiling {max}"
            )));
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> u32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }
}

// ============================================================================
// RUN CONFIGURATION
// ============================================================================

/// Configuration for one encode run.
///
/// When `target_bytes` is `None` the run is unconstrained: a single attempt at
/// `quality` is made and reported directly.
///
/// # Examples
///
/// ```rust
/// use medallion_core::config::{RunConfig, mib_to_bytes};
/// use medallion_core::external::ffmpeg::{CropSpec, EncodeParameters};
/// use std::path::PathBuf;
///
/// let params = EncodeParameters::new(
///     PathBuf::from("/videos/clip.mp4"),
///     CropSpec { x: 420, y: 0, side: 1080 },
/// );
/// let mut config = RunConfig::new(params, PathBuf::from("/videos/clip.webp"));
/// config.target_bytes = Some(mib_to_bytes(5));
/// config.validate().unwrap();
/// assert_eq!(config.quality_bounds().unwrap().max(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct RunConfig {
    // ---- What to encode ----

    /// Fixed encode parameters (source, crop, scale, frame rate)
    pub params: EncodeParameters,

    /// Final destination of the committed artifact
    pub destination: PathBuf,

    // ---- Quality ----

    /// Requested quality; the ceiling of a constrained search
    pub quality: u32,

    /// Byte budget; `None` disables the search
    pub target_bytes: Option<u64>,

    /// Lowest quality a constrained search may fall back to
    pub quality_floor: u32,

    /// Maximum number of binary-refine attempts
    pub max_attempts: u32,
}

impl RunConfig {
    /// Creates an unconstrained configuration with default quality settings.
    #[must_use]
    pub fn new(params: EncodeParameters, destination: PathBuf) -> Self {
        Self {
            params,
            destination,
            quality: DEFAULT_QUALITY,
            target_bytes: None,
            quality_floor: DEFAULT_QUALITY_FLOOR,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Search bounds for a constrained run. The ceiling never drops below the floor.
    pub fn quality_bounds(&self) -> CoreResult<QualityBounds> {
        QualityBounds::new(self.quality_floor, self.quality.max(self.quality_floor))
    }

    /// Validates the configuration before a run starts.
    pub fn validate(&self) -> CoreResult<()> {
        if !ADMISSIBLE_QUALITY.contains(&self.quality) {
            return Err(CoreError::Config(format!(
                "quality {} is outside the admissible range {}-{}",
                self.quality,
                ADMISSIBLE_QUALITY.start(),
                ADMISSIBLE_QUALITY.end()
            )));
        }

        if let Some(target) = self.target_bytes {
            if target == 0 {
                return Err(CoreError::Config(
                    "target size must be greater than zero".to_string(),
                ));
            }
            self.quality_bounds()?;
        }

        if self.destination.file_name().is_none() {
            return Err(CoreError::PathError(format!(
                "destination '{}' has no file name",
                self.destination.display()
            )));
        }

        self.params.validate()
    }
}
