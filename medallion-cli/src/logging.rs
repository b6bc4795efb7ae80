// ============================================================================
// medallion-cli/src/logging.rs
// ============================================================================
//
// LOGGING UTILITIES: Logger Setup and Helper Functions
//
// The application logs through the `log` facade with `env_logger` as the
// backend. RUST_LOG, when set, overrides the level chosen from the command
// line:
// - RUST_LOG=info (default): attempt-by-attempt progress
// - RUST_LOG=debug: ffmpeg command lines, search phases, temp files
//
// AI-ASSISTANT-INFO: Logger initialization and timestamp helpers

use console::style;
use log::{Level, LevelFilter};
use std::io::Write;

/// Initializes the global logger. `verbose` lowers the level to debug.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => style("ERROR").red().bold(),
                Level::Warn => style("WARN ").yellow(),
                Level::Info => style("INFO ").green(),
                Level::Debug => style("DEBUG").blue(),
                Level::Trace => style("TRACE").magenta(),
            };
            writeln!(buf, "{} {} {}", style(get_time()).dim(), level, record.args())
        })
        .filter_level(level)
        .parse_default_env()
        .init();

    log::debug!("Logger initialized with level: {}", level);
}

/// Returns the current local date and time formatted as "YYYY-MM-DD HH:MM:SS".
pub fn get_datetime() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn get_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
