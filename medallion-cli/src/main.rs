// medallion-cli/src/main.rs
//
// Entry point for the `medallion` binary.
//
// Responsibilities:
// - Parsing arguments (usage errors exit with clap's status 2).
// - Setting up logging.
// - Turning Ctrl-C into a cancel request for the active run.
// - Mapping the command result to an exit code: 0 success, 1 failure,
//   130 canceled.

use clap::Parser;
use log::warn;
use medallion_cli::config::EXIT_CANCELED;
use medallion_cli::{Cli, Commands, EncodeStatus, logging, run_encode, terminal};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let (interrupt_tx, interrupt_rx) = crossbeam_channel::bounded(1);
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = interrupt_tx.try_send(());
    }) {
        warn!("Ctrl-C handler unavailable, cancel will not clean up: {e}");
    }

    let result = match cli.command {
        Commands::Encode(args) => run_encode(args, &interrupt_rx),
    };

    match result {
        Ok(EncodeStatus::Completed) => ExitCode::SUCCESS,
        Ok(EncodeStatus::Canceled) => ExitCode::from(EXIT_CANCELED),
        Err(e) => {
            terminal::print_error(&format!("Error: {e}"));
            ExitCode::FAILURE
        }
    }
}
