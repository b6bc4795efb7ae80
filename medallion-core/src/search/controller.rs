// ============================================================================
// medallion-core/src/search/controller.rs
// ============================================================================
//
// SEARCH CONTROLLER: Quality Search State Machine
//
// Decides which quality to try next for a size-constrained run. The search
// runs in three phases:
//
// 1. ProbeHigh: try the ceiling quality; done if it already fits
// 2. ProbeLow: try the floor quality; done if even that is too large
// 3. Refine: binary search strictly between the two probes
//
// The controller never touches the filesystem or spawns anything. It is a
// pure function of (phase, attempt outcome) -> (next phase, action); the
// session carries out the action.
//
// Output size is assumed to be non-decreasing in quality for fixed crop,
// scale and frame rate. This is not verified here.
//
// AI-ASSISTANT-INFO: Pure phase state machine for the quality/size search

use crate::config::QualityBounds;
use crate::error::{CoreError, CoreResult};

use std::fmt;
use std::path::PathBuf;

/// An attempt that produced a usable artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub quality: u32,
    pub size_bytes: u64,
    pub artifact: PathBuf,
}

/// How a finished search relates to the byte budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttainmentNote {
    /// The requested quality already fit the budget.
    MetAtCeiling,
    /// The highest fitting quality was found.
    Met,
    /// Even the floor quality exceeded the budget; the floor result is used.
    Unattainable,
    /// The attempt cap stopped the search; the best fitting result is used.
    AttemptsExhausted,
}

impl fmt::Display for AttainmentNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MetAtCeiling => "target met at ceiling quality",
            Self::Met => "target met",
            Self::Unattainable => "target unattainable — lowest quality used",
            Self::AttemptsExhausted => "max attempts exhausted — best found used",
        };
        f.write_str(text)
    }
}

/// Current phase. Fields exist only where the phase gives them meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPhase {
    ProbeHigh,
    ProbeLow,
    Refine { low: u32, high: u32 },
    Done { best: Candidate, note: AttainmentNote },
    Failed { reason: String },
}

impl SearchPhase {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Failed { .. })
    }
}

/// Result of the attempt the controller last asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success { size_bytes: u64, artifact: PathBuf },
    Failure { diagnostic: String },
}

/// What the session should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    /// Launch an attempt at this quality.
    Launch(u32),
    /// Promote `best.artifact` to the destination.
    Commit { best: Candidate, note: AttainmentNote },
    /// Give up; release every artifact.
    Abort { reason: String },
}

/// One controller step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Artifact no longer needed, to be released before acting on `next`.
    pub discard: Option<PathBuf>,
    pub next: Next,
}

impl Transition {
    fn launch(quality: u32, discard: Option<PathBuf>) -> Self {
        Self { discard, next: Next::Launch(quality) }
    }
}

/// Phase state machine for one size-constrained run.
#[derive(Debug, Clone)]
pub struct SearchController {
    target_bytes: u64,
    bounds: QualityBounds,
    max_attempts: u32,
    refine_attempts: u32,
    phase: SearchPhase,
    best: Option<Candidate>,
    /// Quality of the attempt awaiting an outcome.
    in_flight: Option<u32>,
}

impl SearchController {
    /// Creates a controller in `ProbeHigh`.
    ///
    /// `max_attempts` caps only the Refine phase, so a run makes at most
    /// `2 + max_attempts` attempts.
    pub fn new(target_bytes: u64, bounds: QualityBounds, max_attempts: u32) -> CoreResult<Self> {
        if target_bytes == 0 {
            return Err(CoreError::Config(
                "target size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            target_bytes,
            bounds,
            max_attempts,
            refine_attempts: 0,
            phase: SearchPhase::ProbeHigh,
            best: None,
            in_flight: None,
        })
    }

    /// Quality of the first attempt (the ceiling).
    pub fn start(&mut self) -> u32 {
        let quality = self.bounds.max();
        self.in_flight = Some(quality);
        quality
    }

    #[must_use]
    pub fn phase(&self) -> &SearchPhase {
        &self.phase
    }

    #[must_use]
    pub fn best(&self) -> Option<&Candidate> {
        self.best.as_ref()
    }

    #[must_use]
    pub fn refine_attempts(&self) -> u32 {
        self.refine_attempts
    }

    #[must_use]
    pub fn target_bytes(&self) -> u64 {
        self.target_bytes
    }

    /// Consumes the outcome of the in-flight attempt and decides the next step.
    ///
    /// Returns [`CoreError::SearchFinished`] once the phase is terminal or
    /// when no attempt is in flight.
    pub fn advance(&mut self, outcome: AttemptOutcome) -> CoreResult<Transition> {
        if self.phase.is_terminal() {
            return Err(CoreError::SearchFinished);
        }
        let quality = self.in_flight.take().ok_or(CoreError::SearchFinished)?;

        let (size_bytes, artifact) = match outcome {
            AttemptOutcome::Success { size_bytes, artifact } => (size_bytes, artifact),
            AttemptOutcome::Failure { diagnostic } => return Ok(self.fail(diagnostic)),
        };
        let candidate = Candidate { quality, size_bytes, artifact };
        let fits = size_bytes <= self.target_bytes;

        match self.phase.clone() {
            SearchPhase::ProbeHigh => {
                if fits {
                    self.best = Some(candidate);
                    return Ok(self.finish(AttainmentNote::MetAtCeiling));
                }
                if self.bounds.min() == self.bounds.max() {
                    self.best = Some(candidate);
                    return Ok(self.finish(AttainmentNote::Unattainable));
                }
                self.phase = SearchPhase::ProbeLow;
                Ok(self.launch_at(self.bounds.min(), Some(candidate.artifact)))
            }
            SearchPhase::ProbeLow => {
                self.best = Some(candidate);
                if !fits {
                    return Ok(self.finish(AttainmentNote::Unattainable));
                }
                let low = self.bounds.min() + 1;
                let high = self.bounds.max() - 1;
                Ok(self.next_refine(low, high, None))
            }
            SearchPhase::Refine { low, high } => {
                let better = fits
                    && self
                        .best
                        .as_ref()
                        .is_none_or(|best| quality > best.quality);
                if better {
                    let previous = self.best.replace(candidate).map(|old| old.artifact);
                    Ok(self.next_refine(quality + 1, high, previous))
                } else {
                    // mid >= low >= 1 inside Refine
                    Ok(self.next_refine(low, quality - 1, Some(candidate.artifact)))
                }
            }
            SearchPhase::Done { .. } | SearchPhase::Failed { .. } => Err(CoreError::SearchFinished),
        }
    }

    /// Loop condition of the Refine phase.
    fn next_refine(&mut self, low: u32, high: u32, discard: Option<PathBuf>) -> Transition {
        if low > high {
            return self.finish_with(AttainmentNote::Met, discard);
        }
        if self.refine_attempts >= self.max_attempts {
            return self.finish_with(AttainmentNote::AttemptsExhausted, discard);
        }
        self.refine_attempts += 1;
        self.phase = SearchPhase::Refine { low, high };
        self.launch_at(low + (high - low) / 2, discard)
    }

    fn launch_at(&mut self, quality: u32, discard: Option<PathBuf>) -> Transition {
        self.in_flight = Some(quality);
        Transition::launch(quality, discard)
    }

    fn finish(&mut self, note: AttainmentNote) -> Transition {
        self.finish_with(note, None)
    }

    fn finish_with(&mut self, note: AttainmentNote, discard: Option<PathBuf>) -> Transition {
        match self.best.clone() {
            Some(best) => {
                self.phase = SearchPhase::Done { best: best.clone(), note };
                Transition { discard, next: Next::Commit { best, note } }
            }
            None => {
                let mut transition = self.fail(CoreError::NoUsableResult.to_string());
                transition.discard = discard;
                transition
            }
        }
    }

    fn fail(&mut self, reason: String) -> Transition {
        self.phase = SearchPhase::Failed { reason: reason.clone() };
        Transition { discard: None, next: Next::Abort { reason } }
    }
}
