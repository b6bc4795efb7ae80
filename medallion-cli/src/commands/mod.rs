//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `encode` command.
/// This command turns a square video crop into a circular animated WebP badge.
pub mod encode;
