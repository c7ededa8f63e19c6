//! The surface the UI collaborator drives.
//!
//! Every operation returns quickly: long-running work happens on the
//! session workers or on a per-command dispatch thread, and everything the
//! user should see arrives through the [`Mailbox`].

use crate::{
    CoreError, CoreResult,
    actions::{ActionExecutor, Launcher},
    commands::{ActionTarget, CommandRegistry, CommandStore},
    dialog::{DialogSettings, KnowledgeLookup},
    mailbox::{ControlSignal, IndicatorColor, Mailbox, Status},
    session::{
        Camera, FrameSlot, ListeningSession, ListeningSettings, RecordingSummary, SinkFactory,
        VideoFormat, VideoSession, VideoSettings, VideoState, timestamped_path,
    },
    speech::{SpeechInput, SpeechOutput},
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard},
    thread::{self, JoinHandle},
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// External collaborators the core consumes.
#[derive(Clone)]
pub struct Collaborators {
    /// Speech recognizer.
    pub speech_in: Arc<dyn SpeechInput>,
    /// Speech synthesizer.
    pub speech_out: Arc<dyn SpeechOutput>,
    /// Program, file and URL launcher.
    pub launcher: Arc<dyn Launcher>,
    /// Topic summaries.
    pub knowledge: Arc<dyn KnowledgeLookup>,
    /// Capture device provider.
    pub camera: Arc<dyn Camera>,
    /// Recording encoder provider.
    pub sinks: Arc<dyn SinkFactory>,
}

/// Tunables for every session kind.
#[derive(Debug, Clone, Default)]
pub struct AssistantSettings {
    /// Listening loop pacing.
    pub listening: ListeningSettings,
    /// Video cadence, frame size and output directories.
    pub video: VideoSettings,
    /// Lookup dialog sentence counts.
    pub dialog: DialogSettings,
}

/// Coordinates the registry, the sessions and typed dispatch.
pub struct Assistant {
    executor: ActionExecutor,
    registry: Arc<CommandRegistry>,
    camera: Arc<dyn Camera>,
    sinks: Arc<dyn SinkFactory>,
    slot: Arc<FrameSlot>,
    settings: AssistantSettings,
    listening: Mutex<Option<ListeningSession>>,
    video: Mutex<Option<VideoSession>>,
}

impl Assistant {
    /// Wire the collaborators to a registry and a mailbox.
    pub fn new(
        registry: Arc<CommandRegistry>,
        collaborators: Collaborators,
        mailbox: Mailbox,
        settings: AssistantSettings,
    ) -> Self {
        let executor = ActionExecutor::new(
            collaborators.speech_in,
            collaborators.speech_out,
            collaborators.launcher,
            collaborators.knowledge,
            mailbox,
            settings.dialog.clone(),
        );

        Self {
            executor,
            registry,
            camera: collaborators.camera,
            sinks: collaborators.sinks,
            slot: Arc::new(FrameSlot::new()),
            settings,
            listening: Mutex::new(None),
            video: Mutex::new(None),
        }
    }

    /// The command registry.
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// The mailbox every notice is posted to.
    pub fn mailbox(&self) -> &Mailbox {
        self.executor.mailbox()
    }

    /// Start the listening loop, or keep the current one running.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start_listening(&self) -> CoreResult<()> {
        let mut slot = self.listening();

        if let Some(session) = slot.as_ref()
            && !session.is_finished()
        {
            if !session.is_stopping() {
                debug!("Listening already active");
                return Ok(());
            }
            if session.resume() {
                info!(session_id = %session.id(), "Pending stop withdrawn");
                self.mailbox().notice("Listening started.");
                return Ok(());
            }
        }

        let session = ListeningSession::start(
            self.executor.clone(),
            Arc::clone(&self.registry),
            self.settings.listening.clone(),
        )?;
        *slot = Some(session);
        self.mailbox().notice("Listening started.");
        Ok(())
    }

    /// Ask the listening loop to stop after its current iteration.
    #[instrument(skip(self))]
    pub fn stop_listening(&self) {
        let mut slot = self.listening();
        match slot.as_ref() {
            Some(session) if !session.is_finished() && !session.is_stopping() => {
                session.stop();
                self.mailbox().notice("Listening stopped.");
            }
            Some(session) if session.is_finished() => {
                *slot = None;
            }
            _ => debug!("Listening not active"),
        }
    }

    /// Start or stop listening. Returns whether listening is now on.
    #[track_caller]
    pub fn toggle_listening(&self) -> CoreResult<bool> {
        if self.is_listening() {
            self.stop_listening();
            Ok(false)
        } else {
            self.start_listening()?;
            Ok(true)
        }
    }

    /// Whether a listening loop is running without a pending stop.
    pub fn is_listening(&self) -> bool {
        self.listening()
            .as_ref()
            .is_some_and(|s| !s.is_finished() && !s.is_stopping())
    }

    /// Switch video mode. Returns whether video mode is now on.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn toggle_video_mode(&self) -> CoreResult<bool> {
        let mut slot = self.video();

        if let Some(session) = slot.as_ref()
            && !session.is_finished()
        {
            if session.is_active() {
                session.deactivate();
            } else {
                self.mailbox().notice("Video mode is still stopping.");
            }
            return Ok(false);
        }

        let session = VideoSession::activate(
            Arc::clone(&self.camera),
            Arc::clone(&self.sinks),
            Arc::clone(&self.slot),
            self.mailbox().clone(),
            self.settings.video.clone(),
        )?;
        *slot = Some(session);
        Ok(true)
    }

    /// Current video state.
    pub fn video_state(&self) -> VideoState {
        self.video()
            .as_ref()
            .map_or(VideoState::Off, VideoSession::state)
    }

    /// Start recording in `format`. Valid only while previewing.
    #[track_caller]
    pub fn start_recording(&self, format: VideoFormat) -> CoreResult<PathBuf> {
        let slot = self.video();
        let Some(session) = slot.as_ref() else {
            return Err(self.video_inactive());
        };
        session.start_recording(format)
    }

    /// Stop the running recording.
    #[track_caller]
    pub fn stop_recording(&self) -> CoreResult<RecordingSummary> {
        let slot = self.video();
        let Some(session) = slot.as_ref() else {
            return Err(self.video_inactive());
        };
        session.stop_recording()
    }

    /// Save a copy of the latest frame as `viki_photo_<unix>.png`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn capture_photo(&self) -> CoreResult<PathBuf> {
        let Some(frame) = self.slot.snapshot() else {
            return Err(CoreError::NoFrame {
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let path = timestamped_path(&self.settings.video.photos_dir, "viki_photo", "png")?;
        frame.save_png(&path)?;

        info!(path = ?path, "Photo saved");
        self.mailbox()
            .notice(format!("Photo captured and saved as {}", path.display()));
        Ok(path)
    }

    /// Register `trigger` -> `target`, overwriting an existing trigger.
    ///
    /// Program and file targets must name an existing file.
    #[track_caller]
    pub fn add_command(&self, trigger: &str, target: &str) -> CoreResult<()> {
        check_target(target)?;
        self.registry.add(trigger, target)?;
        self.mailbox()
            .notice(format!("Command '{}' added.", trigger.trim()));
        Ok(())
    }

    /// Point an existing trigger at a new target.
    #[track_caller]
    pub fn update_command(&self, trigger: &str, target: &str) -> CoreResult<()> {
        check_target(target)?;
        self.registry.update(trigger, target)?;
        self.mailbox()
            .notice(format!("Command '{}' updated.", trigger.trim()));
        Ok(())
    }

    /// Remove a trigger.
    #[track_caller]
    pub fn delete_command(&self, trigger: &str) -> CoreResult<()> {
        self.registry.delete(trigger)?;
        self.mailbox()
            .notice(format!("Command '{}' deleted.", trigger.trim()));
        Ok(())
    }

    /// Copy of the registered commands.
    pub fn commands(&self) -> CommandStore {
        self.registry.snapshot()
    }

    /// Run a typed command on its own thread.
    ///
    /// Returns `None` for blank input or when the thread could not start.
    #[instrument(skip(self))]
    pub fn dispatch_typed(&self, text: &str) -> Option<JoinHandle<()>> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return None;
        }

        let mailbox = self.mailbox().clone();
        mailbox.user(text.clone());
        mailbox.activity(Status::Processing, IndicatorColor::Orange);

        let executor = self.executor.clone();
        let registry = Arc::clone(&self.registry);
        let spawned = thread::Builder::new()
            .name("viki-dispatch".to_string())
            .spawn(move || {
                executor.dispatch(&registry, &text);
                let mailbox = executor.mailbox();
                mailbox.activity(Status::Idle, IndicatorColor::Gray);
                mailbox.control(ControlSignal::DispatchFinished);
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "Dispatch thread could not start");
                mailbox.notice("Sorry, I couldn't run that command.");
                mailbox.activity(Status::Idle, IndicatorColor::Gray);
                None
            }
        }
    }

    /// Stop every session. Workers finish their current iteration on their own.
    #[instrument(skip(self))]
    pub fn shutdown(&self) {
        if let Some(session) = self.listening().as_ref() {
            session.stop();
        }
        if let Some(session) = self.video().as_ref() {
            session.deactivate();
        }
        info!("Assistant shut down");
    }

    #[track_caller]
    fn video_inactive(&self) -> CoreError {
        CoreError::InvalidState {
            reason: "video mode is not active".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    fn listening(&self) -> MutexGuard<'_, Option<ListeningSession>> {
        self.listening.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn video(&self) -> MutexGuard<'_, Option<VideoSession>> {
        self.video.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[track_caller]
fn check_target(target: &str) -> CoreResult<()> {
    match ActionTarget::parse(target.trim()) {
        ActionTarget::WebApp(_) => Ok(()),
        ActionTarget::Executable(path) | ActionTarget::File(path) if path.is_file() => Ok(()),
        ActionTarget::Executable(path) | ActionTarget::File(path) => {
            Err(CoreError::InvalidTarget {
                path,
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }
}
