//! Implementation of the 'encode' subcommand.
//!
//! Resolves the input and output paths, checks for ffmpeg, builds a
//! `RunConfig` and drives one medallion-core `EncodeSession` to completion.

use crate::cli::EncodeArgs;
use crate::cli_error;
use crate::config::DEFAULT_FFMPEG;
use crate::error::{CliErrorContext, CliResult};
use crate::logging::get_datetime;
use crate::terminal;

use crossbeam_channel::Receiver;
use log::{debug, info};
use medallion_core::external::EncodeParameters;
use medallion_core::utils::get_filename_safe;
use medallion_core::{
    CoreError, EncodeSession, EncodeSummary, RunConfig, RunOutcome, SidecarLauncher,
    check_dependency, format_bytes, mib_to_bytes, resolve_output_path,
};

use std::fs;
use std::path::PathBuf;

/// How an encode command ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStatus {
    Completed,
    Canceled,
}

/// Resolves and validates the input file.
fn resolve_input(args: &EncodeArgs) -> CliResult<PathBuf> {
    let input_path = args.input_path.canonicalize().map_err(|e| {
        CoreError::PathError(format!(
            "Invalid input path '{}': {}",
            args.input_path.display(),
            e
        ))
    })?;

    if !input_path.is_file() {
        return Err(CoreError::PathError(format!(
            "Input path '{}' is not a file",
            input_path.display()
        )));
    }
    Ok(input_path)
}

/// Builds the run configuration from parsed arguments.
pub fn build_run_config(args: &EncodeArgs, input: PathBuf, destination: PathBuf) -> RunConfig {
    let mut params = EncodeParameters::new(input, args.crop);
    params.output_side = Some(args.size);
    params.fps = Some(args.fps);

    let mut config = RunConfig::new(params, destination);
    config.quality = args.quality;
    config.target_bytes = args.max_size_mb.map(mib_to_bytes);
    config.quality_floor = args.quality_floor;
    config.max_attempts = args.max_attempts;
    config
}

/// Runs the encode command until the badge is written, the run fails, or
/// `interrupt` cancels it.
pub fn run_encode(args: EncodeArgs, interrupt: &Receiver<()>) -> CliResult<EncodeStatus> {
    let input = resolve_input(&args)?;
    let destination = resolve_output_path(&input, args.output_dir.as_deref(), args.name.as_deref())?;

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).cli_with_context(|| {
            format!("Failed to create output directory '{}'", dir.display())
        })?;
    }
    if destination.exists() && !args.overwrite {
        return Err(cli_error!(
            "Output file '{}' already exists; pass --overwrite to replace it",
            destination.display()
        ));
    }

    let ffmpeg = args
        .ffmpeg
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FFMPEG));
    check_dependency(&ffmpeg)?;
    debug!("Using ffmpeg at {}", ffmpeg.display());

    let config = build_run_config(&args, input, destination);

    terminal::print_section("Encode");
    terminal::print_status("Started", &get_datetime());
    terminal::print_status("Input", &config.params.source.display().to_string());
    terminal::print_status("Output", &config.destination.display().to_string());
    terminal::print_status(
        "Crop",
        &format!(
            "{0}x{0} at {1},{2}",
            config.params.crop.side, config.params.crop.x, config.params.crop.y
        ),
    );
    terminal::print_status("Size", &format!("{0}x{0}", args.size));
    terminal::print_status("Quality", &config.quality.to_string());
    if let Some(target) = config.target_bytes {
        terminal::print_status("Limit", &format_bytes(target));
    }

    let mut session = EncodeSession::new(SidecarLauncher::new(args.ffmpeg));
    session.start(config)?;

    match session.wait(interrupt) {
        Some(RunOutcome::Success(summary)) => {
            print_summary(&summary)?;
            Ok(EncodeStatus::Completed)
        }
        Some(RunOutcome::Failed(e)) => Err(e),
        Some(RunOutcome::Canceled) => {
            info!("Encode canceled by user");
            terminal::print_canceled("Encode canceled; no file was written");
            Ok(EncodeStatus::Canceled)
        }
        None => Err(cli_error!("Encode run ended without a result")),
    }
}

fn print_summary(summary: &EncodeSummary) -> CliResult<()> {
    let file_name = get_filename_safe(&summary.path)?;

    terminal::print_section("Result");
    terminal::print_status("File", &summary.path.display().to_string());
    terminal::print_status("Quality", &summary.quality.to_string());
    terminal::print_status("File size", &format_bytes(summary.size_bytes));
    terminal::print_status("Attempts", &summary.attempts.to_string());
    if let Some(note) = summary.note {
        terminal::print_status("Note", &note.to_string());
    }
    terminal::print_success(&format!("Saved {file_name}"));
    Ok(())
}
