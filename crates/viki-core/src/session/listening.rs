//! The capture -> recognize -> dispatch loop behind "start listening".
//!
//! # Cancellation contract
//!
//! [`ListeningSession::stop`] only raises a flag. The worker checks it once
//! per iteration, before it starts a new capture. A capture that is already
//! in flight is never interrupted: the worker finishes that iteration
//! (including any dispatch and dialog it triggers) and then reaches
//! [`ListeningState::Idle`] and exits. The stop latency is therefore bounded
//! by one capture call plus one dispatch, plus at most one yield interval.

use crate::{
    CoreError, CoreResult,
    actions::ActionExecutor,
    commands::CommandRegistry,
    mailbox::{IndicatorColor, Status},
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Where the listening worker is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListeningState {
    /// Between iterations, or exited.
    Idle,
    /// Blocked in the speech collaborator.
    Capturing,
    /// Handling the capture result.
    Recognizing,
    /// Running the resolved command.
    Dispatching,
}

/// Loop pacing.
#[derive(Debug, Clone)]
pub struct ListeningSettings {
    /// Pause between two iterations.
    pub yield_interval: Duration,
    /// Pause after the speech service reported itself unavailable.
    pub unavailable_backoff: Duration,
}

impl Default for ListeningSettings {
    fn default() -> Self {
        Self {
            yield_interval: Duration::from_millis(100),
            unavailable_backoff: Duration::from_secs(2),
        }
    }
}

#[derive(Debug)]
struct Control {
    state: ListeningState,
    finished: bool,
}

#[derive(Debug)]
struct Shared {
    stop: AtomicBool,
    control: Mutex<Control>,
}

impl Shared {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: ListeningState) {
        self.control().state = state;
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Exit check. Marks the worker finished under the same lock `resume`
    /// takes, so a resume either sees `finished` or keeps the worker alive.
    fn should_exit(&self) -> bool {
        let mut control = self.control();
        if self.stop_requested() {
            control.state = ListeningState::Idle;
            control.finished = true;
            return true;
        }
        false
    }
}

/// One "listening" activation: a worker thread plus its stop flag.
#[derive(Debug)]
pub struct ListeningSession {
    id: Uuid,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl ListeningSession {
    /// Spawn the worker. It runs until [`stop`](Self::stop) is observed.
    #[track_caller]
    #[instrument(skip(executor, registry))]
    pub fn start(
        executor: ActionExecutor,
        registry: Arc<CommandRegistry>,
        settings: ListeningSettings,
    ) -> CoreResult<Self> {
        let id = Uuid::new_v4();
        let shared = Arc::new(Shared {
            stop: AtomicBool::new(false),
            control: Mutex::new(Control {
                state: ListeningState::Idle,
                finished: false,
            }),
        });

        let worker = Worker {
            id,
            shared: Arc::clone(&shared),
            executor,
            registry,
            settings,
        };
        let handle = thread::Builder::new()
            .name("viki-listening".to_string())
            .spawn(move || worker.run())?;

        info!(session_id = %id, "Listening session started");

        Ok(Self {
            id,
            shared,
            handle: Some(handle),
        })
    }

    /// Session identifier used in log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Request a cooperative stop. Returns immediately.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        debug!("Stop requested");
    }

    /// Withdraw a pending stop if the worker has not exited yet.
    ///
    /// Returns `false` when the worker is already gone and a new session
    /// has to be started instead.
    pub fn resume(&self) -> bool {
        let control = self.shared.control();
        if control.finished {
            return false;
        }
        self.shared.stop.store(false, Ordering::SeqCst);
        true
    }

    /// Whether a stop has been requested and not withdrawn.
    pub fn is_stopping(&self) -> bool {
        self.shared.stop_requested()
    }

    /// Current loop state.
    pub fn state(&self) -> ListeningState {
        self.shared.control().state
    }

    /// Whether the worker has left its loop.
    pub fn is_finished(&self) -> bool {
        self.shared.control().finished
    }

    /// Wait for the worker to exit. Only returns once a stop was observed.
    #[track_caller]
    pub fn join(mut self) -> CoreResult<()> {
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| CoreError::InvalidState {
                reason: "listening worker panicked".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }
        Ok(())
    }
}

struct Worker {
    id: Uuid,
    shared: Arc<Shared>,
    executor: ActionExecutor,
    registry: Arc<CommandRegistry>,
    settings: ListeningSettings,
}

impl Worker {
    fn run(self) {
        let span = tracing::info_span!("listening", session_id = %self.id);
        let _enter = span.enter();

        while !self.shared.should_exit() {
            self.iteration();
            thread::sleep(self.settings.yield_interval);
        }

        info!("Listening session exited");
    }

    fn iteration(&self) {
        let mailbox = self.executor.mailbox();

        self.shared.set_state(ListeningState::Capturing);
        mailbox.activity(Status::Listening, IndicatorColor::Green);

        let captured = self.executor.speech_input().capture();

        self.shared.set_state(ListeningState::Recognizing);
        mailbox.activity(Status::Processing, IndicatorColor::Orange);

        match captured {
            Ok(transcript) => {
                debug!(text = %transcript.text, "Transcript received");
                mailbox.user(transcript.text.clone());
                self.shared.set_state(ListeningState::Dispatching);
                self.executor.dispatch(&self.registry, &transcript.text);
            }
            Err(CoreError::NoSpeechDetected { .. }) => {
                mailbox.notice("Sorry, I didn't catch that.");
            }
            Err(CoreError::ServiceUnavailable { reason, .. }) => {
                warn!(reason = %reason, "Speech service unavailable");
                mailbox.notice(format!("Could not request results; {}", reason));
                self.back_off();
            }
            Err(e) => {
                warn!(error = %e, "Listening iteration failed");
                mailbox.notice(format!(
                    "An unexpected error occurred during listening: {}",
                    e
                ));
            }
        }

        self.shared.set_state(ListeningState::Idle);
        mailbox.activity(Status::Idle, IndicatorColor::Gray);
    }

    /// Sleep out the backoff in yield-sized slices so a stop still lands
    /// within one slice.
    fn back_off(&self) {
        let deadline = Instant::now() + self.settings.unavailable_backoff;
        let slice = self.settings.yield_interval.max(Duration::from_millis(1));
        while !self.shared.stop_requested() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(slice.min(deadline - now));
        }
    }
}

impl Drop for ListeningSession {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shared.stop.store(true, Ordering::SeqCst);
        }
    }
}
