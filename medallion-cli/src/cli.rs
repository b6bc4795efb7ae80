// medallion-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use crate::config;

use clap::{Parser, Subcommand};
use medallion_core::external::CropSpec;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Medallion: circular animated WebP badge encoder",
    long_about = "Crops a square from a video, masks it to a circle and encodes it as an \
                  animated WebP, optionally searching for the best quality under a size limit."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug output (ffmpeg commands, search phases, temp files)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encodes one badge from a video file
    Encode(EncodeArgs),
}

#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// Source video file
    #[arg(short = 'i', long = "input", required = true, value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Square crop region as SIDE:X:Y in source pixels
    #[arg(long, required = true, value_name = "SIDE:X:Y", value_parser = parse_crop)]
    pub crop: CropSpec,

    /// Directory for the badge (defaults to the input's directory)
    #[arg(short = 'o', long = "output-dir", value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output file name; ".webp" is appended when missing (defaults to the input's name)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Output side length in pixels
    #[arg(long, value_name = "PIXELS", default_value_t = config::DEFAULT_OUTPUT_SIDE,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub size: u32,

    /// Output frame rate (0 keeps the source rate)
    #[arg(long, value_name = "FPS", default_value_t = config::DEFAULT_FPS)]
    pub fps: u32,

    /// libwebp quality; the ceiling when a size limit is set
    #[arg(short = 'q', long, value_name = "QUALITY", default_value_t = config::DEFAULT_QUALITY,
          value_parser = clap::value_parser!(u32).range(0..=100))]
    pub quality: u32,

    /// Limit the badge to this many MiB, searching for the highest quality that fits
    #[arg(long = "max-size-mb", value_name = "MIB", num_args = 0..=1,
          default_missing_value = config::DEFAULT_TARGET_MIB,
          value_parser = clap::value_parser!(u64).range(1..=config::MAX_TARGET_MIB))]
    pub max_size_mb: Option<u64>,

    /// Lowest quality the size search may fall back to
    #[arg(long, value_name = "QUALITY", default_value_t = config::DEFAULT_QUALITY_FLOOR,
          value_parser = clap::value_parser!(u32).range(0..=100))]
    pub quality_floor: u32,

    /// Maximum number of refinement attempts after the two probes
    #[arg(long, value_name = "COUNT", default_value_t = config::DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Replace an existing output file
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// ffmpeg binary to use (defaults to ffmpeg on PATH)
    #[arg(long, value_name = "PATH", env = config::FFMPEG_ENV)]
    pub ffmpeg: Option<PathBuf>,
}

/// Parses `SIDE:X:Y` into a crop region.
pub fn parse_crop(value: &str) -> Result<CropSpec, String> {
    let parts: Vec<&str> = value.split(':').map(str::trim).collect();
    let [side, x, y] = parts[..] else {
        return Err(format!("expected SIDE:X:Y, got '{value}'"));
    };
    let number = |part: &str, what: &str| {
        part.parse::<u32>()
            .map_err(|_| format!("invalid crop {what} '{part}'"))
    };
    let side = number(side, "side")?;
    if side == 0 {
        return Err("crop side must be at least 1 pixel".to_string());
    }
    Ok(CropSpec {
        side,
        x: number(x, "x")?,
        y: number(y, "y")?,
    })
}
