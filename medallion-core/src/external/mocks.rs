// medallion-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Only compiled for this crate's tests.

use super::ffmpeg::EncodeRequest;
use super::ffmpeg_executor::{
    AttemptCompletion, CompletionStatus, EncodeLauncher, FailureCause, LaunchHandle,
};

use crossbeam_channel::Sender;

use std::collections::HashMap;
use std::fs::File;
use std::sync::{Arc, Mutex};

type SizeFn = dyn Fn(u32) -> u64 + Send + Sync;

/// An attempt held back until released or canceled.
struct HeldAttempt {
    request: EncodeRequest,
    events: Sender<AttemptCompletion>,
}

#[derive(Default)]
struct SyntheticState {
    launched: Vec<u32>,
    failures: HashMap<u32, String>,
    hold: bool,
    held: HashMap<u64, HeldAttempt>,
}

/// Launcher standing in for ffmpeg: each attempt writes a file whose length
/// is given by a size function of the quality.
#[derive(Clone)]
pub struct SyntheticLauncher {
    size: Arc<SizeFn>,
    state: Arc<Mutex<SyntheticState>>,
}

impl SyntheticLauncher {
    pub fn new(size: impl Fn(u32) -> u64 + Send + Sync + 'static) -> Self {
        Self {
            size: Arc::new(size),
            state: Arc::new(Mutex::new(SyntheticState::default())),
        }
    }

    /// Makes attempts at `quality` fail with `diagnostic` and no output.
    pub fn fail_at(&self, quality: u32, diagnostic: &str) {
        self.lock().failures.insert(quality, diagnostic.to_string());
    }

    /// When enabled, completions are withheld until [`Self::release_held`].
    pub fn hold_completions(&self, hold: bool) {
        self.lock().hold = hold;
    }

    /// Completes every held attempt normally.
    pub fn release_held(&self) {
        let held: Vec<HeldAttempt> = self.lock().held.drain().map(|(_, a)| a).collect();
        for attempt in held {
            self.complete(attempt.request, &attempt.events);
        }
    }

    /// Qualities launched so far, in order.
    pub fn launched(&self) -> Vec<u32> {
        self.lock().launched.clone()
    }

    /// Job ids of attempts currently held back.
    pub fn held_jobs(&self) -> Vec<u64> {
        self.lock().held.keys().copied().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SyntheticState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn complete(&self, request: EncodeRequest, events: &Sender<AttemptCompletion>) {
        let failure = self.lock().failures.get(&request.quality).cloned();
        let status = match failure {
            Some(diagnostic) => CompletionStatus::Failed {
                cause: FailureCause::AbnormalExit { code: Some(1) },
                diagnostic,
            },
            None => {
                let size = (self.size)(request.quality);
                match File::create(&request.output).and_then(|f| f.set_len(size)) {
                    Ok(()) => CompletionStatus::Succeeded { diagnostic: String::new() },
                    Err(e) => CompletionStatus::Failed {
                        cause: FailureCause::AbnormalExit { code: Some(1) },
                        diagnostic: format!("synthetic write failed: {e}"),
                    },
                }
            }
        };
        log::debug!("SyntheticLauncher: job {} at q{} -> {:?}", request.job_id, request.quality, status);
        let _ = events.send(AttemptCompletion { job_id: request.job_id, status });
    }
}

/// Handle returned by [`SyntheticLauncher`].
pub struct SyntheticHandle {
    job_id: u64,
    state: Arc<Mutex<SyntheticState>>,
}

impl LaunchHandle for SyntheticHandle {
    fn job_id(&self) -> u64 {
        self.job_id
    }

    fn cancel(&mut self) {
        let held = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .held
            .remove(&self.job_id);
        if let Some(attempt) = held {
            // Mirror a killed encoder that had already started writing.
            let _ = File::create(&attempt.request.output);
            let _ = attempt.events.send(AttemptCompletion {
                job_id: self.job_id,
                status: CompletionStatus::Canceled,
            });
        }
    }
}

impl EncodeLauncher for SyntheticLauncher {
    type Handle = SyntheticHandle;

    fn launch(&self, request: EncodeRequest, events: Sender<AttemptCompletion>) -> SyntheticHandle {
        let job_id = request.job_id;
        let hold = {
            let mut state = self.lock();
            state.launched.push(request.quality);
            state.hold
        };

        if hold {
            self.lock().held.insert(job_id, HeldAttempt { request, events });
        } else {
            self.complete(request, &events);
        }

        SyntheticHandle {
            job_id,
            state: Arc::clone(&self.state),
        }
    }
}
