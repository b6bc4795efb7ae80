//! FFmpeg command builder utilities
//!
//! This module provides a builder pattern for constructing FFmpeg commands
//! with the common options every badge encode shares, plus the video filter
//! chain that turns a square crop into a circular, alpha-masked badge.

use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::PathBuf;

/// Alpha mask keeping only the pixels inside the inscribed circle.
const CIRCULAR_MASK_FILTER: &str = "geq=\
r='r(X,Y)':g='g(X,Y)':b='b(X,Y)':\
a='if(lte((X-W/2)*(X-W/2)+(Y-H/2)*(Y-H/2),(W/2)*(W/2)),255,0)'";

/// Builder for `FFmpeg` commands carrying the options every attempt shares:
/// overwrite (`-y`), no banner, and `-loglevel error` so stderr holds only
/// diagnostics.
#[derive(Default)]
pub struct FfmpegCommandBuilder {
    ffmpeg_path: Option<PathBuf>,
}

impl FfmpegCommandBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an explicit ffmpeg binary instead of the one found on `PATH`
    #[must_use]
    pub fn with_ffmpeg_path(mut self, path: Option<PathBuf>) -> Self {
        self.ffmpeg_path = path;
        self
    }

    /// Builds the `FFmpeg` command with the shared options applied
    #[must_use]
    pub fn build(self) -> FfmpegCommand {
        let mut cmd = match &self.ffmpeg_path {
            Some(path) => FfmpegCommand::new_with_path(path),
            None => FfmpegCommand::new(),
        };
        cmd.arg("-y");
        cmd.arg("-hide_banner");
        cmd.args(["-loglevel", "error"]);
        cmd
    }
}

/// Builder for constructing video filter chains
#[derive(Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a square crop of `side` pixels at (`x`, `y`)
    #[must_use]
    pub fn add_square_crop(mut self, side: u32, x: u32, y: u32) -> Self {
        self.filters.push(format!("crop={side}:{side}:{x}:{y}"));
        self
    }

    /// Adds a lanczos rescale to a `side`×`side` square
    #[must_use]
    pub fn add_square_scale(mut self, side: u32) -> Self {
        self.filters
            .push(format!("scale={side}:{side}:flags=lanczos"));
        self
    }

    /// Adds a frame rate resample; zero leaves the source rate alone
    #[must_use]
    pub fn add_fps(mut self, fps: u32) -> Self {
        if fps > 0 {
            self.filters.push(format!("fps={fps}"));
        }
        self
    }

    /// Converts to RGBA and masks everything outside the inscribed circle
    #[must_use]
    pub fn add_circular_mask(mut self) -> Self {
        self.filters.push("format=rgba".to_string());
        self.filters.push(CIRCULAR_MASK_FILTER.to_string());
        self
    }

    /// Builds the filter chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}
