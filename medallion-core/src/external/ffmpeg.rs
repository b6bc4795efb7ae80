//! FFmpeg command building for animated WebP badge encodes
//!
//! This module holds the fixed per-run encode parameters and turns one
//! (quality, output path) attempt into a complete ffmpeg command line using
//! libwebp with an alpha channel.

use crate::error::{CoreError, CoreResult};
use crate::external::ffmpeg_builder::{FfmpegCommandBuilder, VideoFilterChain};

use ffmpeg_sidecar::command::FfmpegCommand;
use log::debug;

use std::path::PathBuf;

/// Square region of the source video, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropSpec {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

/// Parameters that stay fixed for every attempt of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeParameters {
    pub source: PathBuf,
    pub crop: CropSpec,
    /// Output side length; `None` keeps the crop side.
    pub output_side: Option<u32>,
    /// Output frame rate; `None` or zero keeps the source rate.
    pub fps: Option<u32>,
}

impl EncodeParameters {
    /// Creates parameters that keep the crop size and source frame rate.
    #[must_use]
    pub fn new(source: PathBuf, crop: CropSpec) -> Self {
        Self {
            source,
            crop,
            output_side: None,
            fps: None,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.crop.side == 0 {
            return Err(CoreError::Config("crop side must be at least 1 pixel".to_string()));
        }
        if self.output_side == Some(0) {
            return Err(CoreError::Config("output side must be at least 1 pixel".to_string()));
        }
        Ok(())
    }

    /// Builds the crop → scale → fps → circular mask filter graph.
    #[must_use]
    pub fn filter_graph(&self) -> String {
        let CropSpec { x, y, side } = self.crop;
        let mut chain = VideoFilterChain::new().add_square_crop(side, x, y);

        if let Some(out_side) = self.output_side.filter(|&s| s != side) {
            chain = chain.add_square_scale(out_side);
        }

        chain
            .add_fps(self.fps.unwrap_or(0))
            .add_circular_mask()
            .build()
            .unwrap_or_default()
    }
}

/// One encode attempt handed to a launcher.
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    /// Identifies the attempt in its completion event
    pub job_id: u64,
    pub quality: u32,
    pub output: PathBuf,
    pub params: EncodeParameters,
}

/// Builds the ffmpeg command for a single attempt.
///
/// # Arguments
///
/// * `ffmpeg_path` - Explicit ffmpeg binary, or `None` to use the one on `PATH`
/// * `request` - Quality, output path and fixed parameters for this attempt
pub fn build_encode_command(ffmpeg_path: Option<PathBuf>, request: &EncodeRequest) -> FfmpegCommand {
    let mut cmd = FfmpegCommandBuilder::new()
        .with_ffmpeg_path(ffmpeg_path)
        .build();

    let filter = request.params.filter_graph();
    debug!("Badge filter graph: {filter}");

    cmd.input(request.params.source.to_string_lossy().as_ref());
    cmd.args(["-vf", filter.as_str()]);
    cmd.arg("-an");
    cmd.args(["-vsync", "0"]);

    cmd.args(["-c:v", "libwebp"]);
    cmd.args(["-lossless", "0"]);
    cmd.args(["-q:v", &request.quality.to_string()]);
    cmd.args(["-preset", "icon"]);
    cmd.args(["-compression_level", "6"]);
    cmd.args(["-loop", "0"]);
    cmd.args(["-pix_fmt", "yuva420p"]);

    cmd.output(request.output.to_string_lossy().as_ref());
    cmd
}
