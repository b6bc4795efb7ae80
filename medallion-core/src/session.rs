// ============================================================================
// medallion-core/src/session.rs
// ============================================================================
//
// ENCODE SESSION: Run Ownership and Event Handling
//
// An EncodeSession owns at most one active run. It launches attempts through
// an EncodeLauncher, receives their completions on a channel, feeds measured
// sizes to the SearchController and carries out whatever it decides:
// releasing artifacts, launching the next attempt, or promoting the best one.
//
// KEY COMPONENTS:
// - EncodeSession: start / handle / cancel / wait
// - RunOutcome: terminal result handed to the caller
// - EncodeSummary: details of a successful run
//
// Every terminal path (success, failure, cancel, drop) ends with the run's
// TempArtifacts released, so no temp file outlives its run.
//
// AI-ASSISTANT-INFO: Drives one encode run from first launch to terminal outcome

use crate::artifacts::TempArtifacts;
use crate::commit::promote;
use crate::config::RunConfig;
use crate::error::{CoreError, CoreResult, diagnostic_or};
use crate::external::{
    AttemptCompletion, CompletionStatus, EncodeLauncher, EncodeRequest, FailureCause,
    FileMetadataProvider, LaunchHandle, StdFsMetadataProvider,
};
use crate::search::{AttainmentNote, AttemptOutcome, Next, SearchController};
use crate::utils::format_bytes;

use crossbeam_channel::{Receiver, Sender, never, select, unbounded};
use log::{debug, error, info, warn};

use std::path::PathBuf;

/// Details of a committed result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSummary {
    pub path: PathBuf,
    pub quality: u32,
    pub size_bytes: u64,
    /// Attempts launched during the run, including the committed one
    pub attempts: u32,
    /// Present for size-constrained runs only
    pub note: Option<AttainmentNote>,
}

/// Terminal outcome of a run.
#[derive(Debug)]
pub enum RunOutcome {
    Success(EncodeSummary),
    Failed(CoreError),
    Canceled,
}

enum RunMode {
    /// No byte budget: one attempt, reported directly.
    Single,
    Search(SearchController),
}

struct InFlight<H> {
    handle: H,
    quality: u32,
    artifact: PathBuf,
}

/// State owned by the session while a run is active.
struct ActiveRun<H> {
    config: RunConfig,
    mode: RunMode,
    artifacts: TempArtifacts,
    in_flight: Option<InFlight<H>>,
    attempts: u32,
}

/// Owner of at most one encode run at a time.
///
/// Events are processed one at a time on the caller's thread, either by
/// [`EncodeSession::wait`] or by feeding [`EncodeSession::events`] into
/// [`EncodeSession::handle`].
pub struct EncodeSession<L: EncodeLauncher> {
    launcher: L,
    metadata: Box<dyn FileMetadataProvider + Send>,
    events_tx: Sender<AttemptCompletion>,
    events_rx: Receiver<AttemptCompletion>,
    next_job_id: u64,
    active: Option<ActiveRun<L::Handle>>,
}

impl<L: EncodeLauncher> EncodeSession<L> {
    #[must_use]
    pub fn new(launcher: L) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            launcher,
            metadata: Box::new(StdFsMetadataProvider),
            events_tx,
            events_rx,
            next_job_id: 1,
            active: None,
        }
    }

    /// Replaces how artifact sizes are read.
    #[must_use]
    pub fn with_metadata_provider(mut self, provider: impl FileMetadataProvider + Send + 'static) -> Self {
        self.metadata = Box::new(provider);
        self
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Completion events from the launcher.
    #[must_use]
    pub fn events(&self) -> &Receiver<AttemptCompletion> {
        &self.events_rx
    }

    /// Validates `config` and launches the first attempt. Returns immediately.
    pub fn start(&mut self, config: RunConfig) -> CoreResult<()> {
        if self.active.is_some() {
            return Err(CoreError::RunInProgress);
        }
        config.validate()?;

        let (mode, first_quality) = match config.target_bytes {
            Some(target) => {
                let mut controller =
                    SearchController::new(target, config.quality_bounds()?, config.max_attempts)?;
                let quality = controller.start();
                info!(
                    "Searching for the highest quality under {} (quality {}-{})",
                    format_bytes(target),
                    config.quality_floor,
                    quality
                );
                (RunMode::Search(controller), quality)
            }
            None => (RunMode::Single, config.quality),
        };

        let mut run = ActiveRun {
            artifacts: TempArtifacts::new(&config.destination),
            config,
            mode,
            in_flight: None,
            attempts: 0,
        };
        self.launch(&mut run, first_quality)?;
        self.active = Some(run);
        Ok(())
    }

    /// Processes one completion event.
    ///
    /// Returns the terminal outcome when this event ends the run. Events for
    /// anything but the in-flight attempt are ignored.
    pub fn handle(&mut self, completion: AttemptCompletion) -> Option<RunOutcome> {
        let current = self
            .active
            .as_ref()
            .and_then(|run| run.in_flight.as_ref())
            .map(|f| f.handle.job_id());
        if current != Some(completion.job_id) {
            debug!("Ignoring stale completion for job {}", completion.job_id);
            return None;
        }

        let mut run = self.active.take()?;
        let in_flight = run.in_flight.take()?;

        let (size_bytes, artifact) = match completion.status {
            CompletionStatus::Canceled => {
                warn!("Encode at quality {} was stopped externally", in_flight.quality);
                return Some(Self::finish(run, RunOutcome::Canceled));
            }
            CompletionStatus::Failed { cause, diagnostic } => {
                let err = attempt_error(cause, &diagnostic);
                error!("Encode at quality {} failed: {}", in_flight.quality, err);
                if let RunMode::Search(controller) = &mut run.mode {
                    match controller.advance(AttemptOutcome::Failure {
                        diagnostic: diagnostic.clone(),
                    }) {
                        Ok(transition) => debug!("Search aborted: {:?}", transition.next),
                        Err(e) => debug!("Search controller rejected the failure: {e}"),
                    }
                }
                return Some(Self::finish(run, RunOutcome::Failed(err)));
            }
            CompletionStatus::Succeeded { diagnostic } => {
                if !diagnostic.trim().is_empty() {
                    debug!("ffmpeg output: {}", diagnostic.trim());
                }
                match self.metadata.get_size(&in_flight.artifact) {
                    Ok(size) => (size, in_flight.artifact),
                    Err(e) => return Some(Self::finish(run, RunOutcome::Failed(e))),
                }
            }
        };
        info!("Quality {} -> {}", in_flight.quality, format_bytes(size_bytes));

        let advanced = match &mut run.mode {
            RunMode::Single => None,
            RunMode::Search(controller) => Some(controller.advance(AttemptOutcome::Success {
                size_bytes,
                artifact: artifact.clone(),
            })),
        };
        let transition = match advanced {
            None => {
                let outcome = Self::commit(&mut run, artifact, in_flight.quality, size_bytes, None);
                return Some(Self::finish(run, outcome));
            }
            Some(Ok(transition)) => transition,
            Some(Err(e)) => return Some(Self::finish(run, RunOutcome::Failed(e))),
        };

        if let Some(discard) = &transition.discard {
            run.artifacts.release(discard);
        }

        match transition.next {
            Next::Launch(quality) => match self.launch(&mut run, quality) {
                Ok(()) => {
                    self.active = Some(run);
                    None
                }
                Err(e) => Some(Self::finish(run, RunOutcome::Failed(e))),
            },
            Next::Commit { best, note } => {
                info!("Search finished: {note}");
                let outcome =
                    Self::commit(&mut run, best.artifact, best.quality, best.size_bytes, Some(note));
                Some(Self::finish(run, outcome))
            }
            Next::Abort { reason } => {
                Some(Self::finish(run, RunOutcome::Failed(CoreError::OperationFailed(reason))))
            }
        }
    }

    /// Cancels the active run, killing the in-flight attempt.
    ///
    /// Returns `None` when no run is active.
    pub fn cancel(&mut self) -> Option<RunOutcome> {
        let mut run = self.active.take()?;
        if let Some(mut in_flight) = run.in_flight.take() {
            info!("Canceling encode at quality {}", in_flight.quality);
            in_flight.handle.cancel();
        }
        Some(Self::finish(run, RunOutcome::Canceled))
    }

    /// Processes events until the run ends, canceling it when `interrupt` fires.
    ///
    /// Returns `None` when no run is active.
    pub fn wait(&mut self, interrupt: &Receiver<()>) -> Option<RunOutcome> {
        let events = self.events_rx.clone();
        let mut interrupt = interrupt.clone();

        while self.active.is_some() {
            select! {
                recv(events) -> completion => {
                    let completion = completion.ok()?;
                    if let Some(outcome) = self.handle(completion) {
                        return Some(outcome);
                    }
                }
                recv(interrupt) -> signal => {
                    if signal.is_ok() {
                        return self.cancel();
                    }
                    interrupt = never();
                }
            }
        }
        None
    }

    fn launch(&mut self, run: &mut ActiveRun<L::Handle>, quality: u32) -> CoreResult<()> {
        let artifact = run.artifacts.allocate()?;
        let job_id = self.next_job_id;
        self.next_job_id += 1;
        run.attempts += 1;

        match &run.mode {
            RunMode::Search(controller) => {
                info!(
                    "Trying quality {} (attempt {} of at most {})",
                    quality,
                    run.attempts,
                    run.config.max_attempts + 2
                );
                debug!(
                    "Search phase: {:?} ({} of {} refine attempts used)",
                    controller.phase(),
                    controller.refine_attempts(),
                    run.config.max_attempts
                );
            }
            RunMode::Single => info!("Encoding at quality {}", quality),
        }

        let request = EncodeRequest {
            job_id,
            quality,
            output: artifact.clone(),
            params: run.config.params.clone(),
        };
        let handle = self.launcher.launch(request, self.events_tx.clone());
        run.in_flight = Some(InFlight { handle, quality, artifact });
        Ok(())
    }

    fn commit(
        run: &mut ActiveRun<L::Handle>,
        artifact: PathBuf,
        quality: u32,
        size_bytes: u64,
        note: Option<AttainmentNote>,
    ) -> RunOutcome {
        let destination = run.config.destination.clone();
        match promote(&artifact, &destination) {
            Ok(()) => {
                run.artifacts.surrender(&artifact);
                RunOutcome::Success(EncodeSummary {
                    path: destination,
                    quality,
                    size_bytes,
                    attempts: run.attempts,
                    note,
                })
            }
            Err(e) => RunOutcome::Failed(e),
        }
    }

    fn finish(mut run: ActiveRun<L::Handle>, outcome: RunOutcome) -> RunOutcome {
        run.artifacts.release_all();
        match &outcome {
            RunOutcome::Success(summary) => debug!(
                "Run finished after {} attempts at quality {}",
                summary.attempts, summary.quality
            ),
            RunOutcome::Failed(e) => debug!("Run failed after {} attempts: {}", run.attempts, e),
            RunOutcome::Canceled => debug!("Run canceled after {} attempts", run.attempts),
        }
        outcome
    }
}

impl<L: EncodeLauncher> Drop for EncodeSession<L> {
    fn drop(&mut self) {
        if self.cancel().is_some() {
            debug!("Canceled active run on session drop");
        }
    }
}

fn attempt_error(cause: FailureCause, diagnostic: &str) -> CoreError {
    match cause {
        FailureCause::FailedToStart => CoreError::LaunchFailed {
            diagnostic: diagnostic_or(diagnostic, "ffmpeg could not be started"),
        },
        FailureCause::AbnormalExit { code } => CoreError::EncoderFailed {
            diagnostic: diagnostic_or(
                diagnostic,
                &match code {
                    Some(code) => format!("ffmpeg exited with status {code}"),
                    None => "ffmpeg was terminated".to_string(),
                },
            ),
        },
        FailureCause::DiagnosticsUnreadable => CoreError::DiagnosticsUnreadable {
            diagnostic: diagnostic_or(diagnostic, "ffmpeg output could not be read"),
        },
    }
}
