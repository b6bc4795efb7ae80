// ============================================================================
// medallion-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: UI Components and Styling
//
// Sections, key/value status lines and final result messages for the CLI.
// Everything goes to stdout except errors, which go to stderr. Styling comes
// from `console`, which drops colors when the stream is not a terminal.
//
// AI-ASSISTANT-INFO: Terminal UI components and styling for the CLI

use console::style;

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const ERROR_SYMBOL: &str = "✗";
    pub const CANCEL_SYMBOL: &str = "■";

    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";

    pub const STATUS_INDENT: &str = "  ";
    pub const LABEL_WIDTH: usize = 12;
}

/// Formats a section header.
#[must_use]
pub fn format_section(title: &str) -> String {
    format!(
        "{}{}{}",
        styling::SECTION_PREFIX,
        style(title.to_uppercase()).cyan().bold(),
        styling::SECTION_SUFFIX
    )
}

/// Formats an aligned `label: value` line.
#[must_use]
pub fn format_status(label: &str, value: &str) -> String {
    format!(
        "{}{:<width$} {}",
        styling::STATUS_INDENT,
        format!("{label}:"),
        style(value).bold(),
        width = styling::LABEL_WIDTH
    )
}

/// Print a section header for a major step, preceded by a blank line.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format_section(title));
}

/// Print a key/value line.
pub fn print_status(label: &str, value: &str) {
    println!("{}", format_status(label, value));
}

pub fn print_success(message: &str) {
    println!("{} {}", style(styling::SUCCESS_SYMBOL).green().bold(), message);
}

pub fn print_canceled(message: &str) {
    println!("{} {}", style(styling::CANCEL_SYMBOL).yellow(), message);
}

/// Print an error message to stderr.
pub fn print_error(message: &str) {
    eprintln!(
        "{} {}",
        style(styling::ERROR_SYMBOL).for_stderr().red().bold(),
        style(message).for_stderr().red()
    );
}
