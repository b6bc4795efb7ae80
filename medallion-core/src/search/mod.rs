//! Quality search for size-constrained runs.
//!
//! The [`controller`] holds the phase state machine. It is kept free of I/O
//! so every transition can be tested without ffmpeg.

pub mod controller;

#[cfg(test)]
mod tests;

pub use controller::{
    AttainmentNote, AttemptOutcome, Candidate, Next, SearchController, SearchPhase, Transition,
};
