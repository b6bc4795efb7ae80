// ============================================================================
// medallion-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Asynchronous Encode Job Launching
//
// This module launches one ffmpeg encode at a time without blocking the
// caller. Each launch reports exactly one terminal AttemptCompletion on the
// channel it was given, and can be forcibly canceled through its handle.
//
// KEY COMPONENTS:
// - EncodeLauncher: Trait for starting one encode attempt
// - LaunchHandle: Trait for the in-flight attempt (id + cancel)
// - SidecarLauncher: Concrete implementation using ffmpeg-sidecar
//
// ARCHITECTURE:
// The launcher spawns the process, moves stderr into a reader thread and
// hands the child to a waiter thread that polls it. The child sits behind a
// mutex shared with the handle so cancel can kill and reap it synchronously.
//
// AI-ASSISTANT-INFO: FFmpeg process launching, completion events and cancellation

use crate::external::ffmpeg::{EncodeRequest, build_encode_command};

use crossbeam_channel::Sender;
use ffmpeg_sidecar::child::FfmpegChild;
use log::{debug, error, warn};

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How often the waiter thread checks whether ffmpeg has exited.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// COMPLETION EVENTS
// ============================================================================

/// Why an attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The process could not be spawned.
    FailedToStart,
    /// Non-zero exit, or killed by a signal (`code` is `None`).
    AbnormalExit { code: Option<i32> },
    /// The process output could not be read.
    DiagnosticsUnreadable,
}

/// Terminal state of one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStatus {
    Succeeded { diagnostic: String },
    Failed { cause: FailureCause, diagnostic: String },
    /// The attempt was killed through its handle.
    Canceled,
}

/// The single terminal event a launch delivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptCompletion {
    pub job_id: u64,
    pub status: CompletionStatus,
}

// ============================================================================
// LAUNCHER ABSTRACTION
// ============================================================================

/// An in-flight encode attempt.
pub trait LaunchHandle {
    fn job_id(&self) -> u64;

    /// Forcibly stops the attempt. Its completion is reported as `Canceled`.
    fn cancel(&mut self);
}

/// Something that can start encode attempts.
///
/// Implementations return immediately and later send exactly one
/// [`AttemptCompletion`] for `request.job_id` on `events`.
pub trait EncodeLauncher {
    type Handle: LaunchHandle;

    fn launch(&self, request: EncodeRequest, events: Sender<AttemptCompletion>) -> Self::Handle;
}

// ============================================================================
// FFMPEG-SIDECAR IMPLEMENTATION
// ============================================================================

/// Launches real ffmpeg processes via `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarLauncher {
    ffmpeg_path: Option<PathBuf>,
}

impl SidecarLauncher {
    /// Uses `ffmpeg_path` if given, otherwise the ffmpeg found on `PATH`.
    #[must_use]
    pub fn new(ffmpeg_path: Option<PathBuf>) -> Self {
        Self { ffmpeg_path }
    }
}

/// Handle to a process started by [`SidecarLauncher`].
pub struct SidecarHandle {
    job_id: u64,
    child: Option<Arc<Mutex<FfmpegChild>>>,
    canceled: Arc<AtomicBool>,
}

impl LaunchHandle for SidecarHandle {
    fn job_id(&self) -> u64 {
        self.job_id
    }

    fn cancel(&mut self) {
        if self.canceled.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(child) = &self.child else {
            return;
        };
        match child.lock() {
            Ok(mut child) => {
                if let Err(e) = child.kill() {
                    debug!("Kill of ffmpeg job {} returned: {}", self.job_id, e);
                }
                if let Err(e) = child.wait() {
                    warn!("Failed to reap canceled ffmpeg job {}: {}", self.job_id, e);
                }
            }
            Err(_) => error!("ffmpeg job {} lock poisoned; cannot kill", self.job_id),
        }
    }
}

impl EncodeLauncher for SidecarLauncher {
    type Handle = SidecarHandle;

    fn launch(&self, request: EncodeRequest, events: Sender<AttemptCompletion>) -> SidecarHandle {
        let job_id = request.job_id;
        let canceled = Arc::new(AtomicBool::new(false));
        let mut cmd = build_encode_command(self.ffmpeg_path.clone(), &request);
        let args: Vec<String> = cmd
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        debug!("Running ffmpeg job {job_id}: ffmpeg {}", args.join(" "));

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!("Failed to start ffmpeg for job {job_id}: {e}");
                send(&events, job_id, CompletionStatus::Failed {
                    cause: FailureCause::FailedToStart,
                    diagnostic: format!("ffmpeg failed to start: {e}"),
                });
                return SidecarHandle { job_id, child: None, canceled };
            }
        };

        let reader = child.take_stderr().map(|mut stderr| {
            thread::spawn(move || {
                let mut buffer = Vec::new();
                stderr.read_to_end(&mut buffer).map(|_| buffer)
            })
        });

        let child = Arc::new(Mutex::new(child));
        let waiter_child = Arc::clone(&child);
        let waiter_canceled = Arc::clone(&canceled);

        thread::spawn(move || {
            let exit = wait_for_exit(&waiter_child, &waiter_canceled);
            let diagnostic = reader.map(|handle| match handle.join() {
                Ok(Ok(bytes)) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err("stderr reader thread panicked".to_string()),
            });

            let status = if waiter_canceled.load(Ordering::SeqCst) {
                CompletionStatus::Canceled
            } else {
                completion_status(exit, diagnostic)
            };
            send(&events, job_id, status);
        });

        SidecarHandle {
            job_id,
            child: Some(child),
            canceled,
        }
    }
}

/// Polls the child until it exits or the attempt is canceled.
fn wait_for_exit(
    child: &Mutex<FfmpegChild>,
    canceled: &AtomicBool,
) -> Result<Option<ExitStatus>, String> {
    loop {
        if canceled.load(Ordering::SeqCst) {
            return Ok(None);
        }
        {
            let mut guard = child
                .lock()
                .map_err(|_| "ffmpeg process lock poisoned".to_string())?;
            match guard.as_inner_mut().try_wait() {
                Ok(Some(status)) => return Ok(Some(status)),
                Ok(None) => {}
                Err(e) => return Err(format!("Error waiting for ffmpeg: {e}")),
            }
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn completion_status(
    exit: Result<Option<ExitStatus>, String>,
    diagnostic: Option<Result<String, String>>,
) -> CompletionStatus {
    let diagnostic = match diagnostic {
        Some(Ok(text)) => text,
        Some(Err(e)) => {
            return CompletionStatus::Failed {
                cause: FailureCause::DiagnosticsUnreadable,
                diagnostic: format!("ffmpeg output could not be read: {e}"),
            };
        }
        None => String::new(),
    };

    match exit {
        Ok(Some(status)) if status.success() => CompletionStatus::Succeeded { diagnostic },
        Ok(Some(status)) => {
            let cause = FailureCause::AbnormalExit { code: status.code() };
            let diagnostic = if diagnostic.trim().is_empty() {
                format!("ffmpeg exited abnormally ({status})")
            } else {
                diagnostic
            };
            CompletionStatus::Failed { cause, diagnostic }
        }
        Ok(None) => CompletionStatus::Canceled,
        Err(e) => CompletionStatus::Failed {
            cause: FailureCause::AbnormalExit { code: None },
            diagnostic: format!("{diagnostic}{e}"),
        },
    }
}

fn send(events: &Sender<AttemptCompletion>, job_id: u64, status: CompletionStatus) {
    if events.send(AttemptCompletion { job_id, status }).is_err() {
        debug!("No receiver for completion of ffmpeg job {job_id}");
    }
}
