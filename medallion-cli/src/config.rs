// medallion-cli/src/config.rs
//
// Default values for `medallion encode` arguments. Quality and search limits
// come from medallion-core so the library and the CLI agree.

pub use medallion_core::config::{
    DEFAULT_FPS, DEFAULT_MAX_ATTEMPTS, DEFAULT_OUTPUT_SIDE, DEFAULT_QUALITY,
    DEFAULT_QUALITY_FLOOR, MAX_TARGET_MIB,
};

/// Size limit used when `--max-size-mb` is given without a value.
pub const DEFAULT_TARGET_MIB: &str = "5";

/// Environment variable naming the ffmpeg binary.
pub const FFMPEG_ENV: &str = "MEDALLION_FFMPEG";

/// Binary looked up on PATH when no ffmpeg path is configured.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Exit code for a run canceled with Ctrl-C.
pub const EXIT_CANCELED: u8 = 130;
