//! Webcam preview and recording worker.
//!
//! The worker thread is the only writer of the shared [`FrameSlot`] and the
//! only caller of the open [`CaptureDevice`]. The recorder (device-open flag
//! plus optional sink) sits behind one mutex that both the worker and the
//! UI-side start/stop calls take, so a sink is either installed before a
//! frame is processed or after it, never halfway.

use crate::{
    CoreError, CoreResult,
    mailbox::{ControlSignal, Mailbox, MailboxEvent},
    session::{
        Frame, FrameSlot, timestamped_path,
        device::{Camera, CaptureDevice, SinkFactory, VideoFormat, VideoSink},
    },
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Frame cadence, normalised frame size and output directories.
#[derive(Debug, Clone)]
pub struct VideoSettings {
    /// Target frames per second.
    pub fps: u32,
    /// Every frame is resized to this before it is stored or recorded.
    pub frame_size: (u32, u32),
    /// Where recordings are written.
    pub recordings_dir: PathBuf,
    /// Where photos are written.
    pub photos_dir: PathBuf,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            frame_size: (640, 480),
            recordings_dir: PathBuf::from("recordings"),
            photos_dir: PathBuf::from("photos"),
        }
    }
}

impl VideoSettings {
    fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

/// Observable video session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoState {
    /// No device held.
    Off,
    /// Device open, frames flowing to the preview.
    Previewing,
    /// Previewing and writing every frame to a sink.
    Recording,
}

/// Result of a finished recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSummary {
    /// The file that was written.
    pub path: PathBuf,
    /// Frames handed to the sink.
    pub frames_written: u64,
}

struct ActiveRecording {
    sink: Box<dyn VideoSink>,
    path: PathBuf,
    frames_written: u64,
}

#[derive(Default)]
struct Recorder {
    device_open: bool,
    recording: Option<ActiveRecording>,
}

struct Shared {
    active: AtomicBool,
    finished: AtomicBool,
    frames_produced: AtomicU64,
    recorder: Mutex<Recorder>,
}

impl Shared {
    fn recorder(&self) -> MutexGuard<'_, Recorder> {
        self.recorder.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One "video mode" activation.
pub struct VideoSession {
    shared: Arc<Shared>,
    slot: Arc<FrameSlot>,
    sinks: Arc<dyn SinkFactory>,
    mailbox: Mailbox,
    settings: VideoSettings,
    handle: Option<JoinHandle<()>>,
}

impl VideoSession {
    /// Spawn the worker. The device is opened on the worker thread; if that
    /// fails the session posts a diagnostic and finishes in `Off`.
    #[track_caller]
    #[instrument(skip(camera, sinks, slot, mailbox))]
    pub fn activate(
        camera: Arc<dyn Camera>,
        sinks: Arc<dyn SinkFactory>,
        slot: Arc<FrameSlot>,
        mailbox: Mailbox,
        settings: VideoSettings,
    ) -> CoreResult<Self> {
        let shared = Arc::new(Shared {
            active: AtomicBool::new(true),
            finished: AtomicBool::new(false),
            frames_produced: AtomicU64::new(0),
            recorder: Mutex::new(Recorder::default()),
        });

        let worker = Worker {
            shared: Arc::clone(&shared),
            slot: Arc::clone(&slot),
            mailbox: mailbox.clone(),
            settings: settings.clone(),
        };
        let handle = thread::Builder::new()
            .name("viki-video".to_string())
            .spawn(move || worker.run(camera.as_ref()))?;

        Ok(Self {
            shared,
            slot,
            sinks,
            mailbox,
            settings,
            handle: Some(handle),
        })
    }

    /// Request the worker to stop. Any recording is closed by the worker
    /// before it releases the device and signals `VideoStopped`.
    #[instrument(skip(self))]
    pub fn deactivate(&self) {
        self.shared.active.store(false, Ordering::SeqCst);
        debug!("Video deactivation requested");
    }

    /// Current state.
    pub fn state(&self) -> VideoState {
        let recorder = self.shared.recorder();
        match (recorder.device_open, recorder.recording.is_some()) {
            (false, _) => VideoState::Off,
            (true, false) => VideoState::Previewing,
            (true, true) => VideoState::Recording,
        }
    }

    /// Whether the session is running and no deactivation is pending.
    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst) && !self.is_finished()
    }

    /// Whether the worker has exited and released the device.
    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::SeqCst)
    }

    /// Frames read from the device since activation.
    pub fn frames_produced(&self) -> u64 {
        self.shared.frames_produced.load(Ordering::SeqCst)
    }

    /// Start writing frames to `viki_recording_<unix>.<ext>`.
    ///
    /// Valid only while previewing. On `SinkUnavailable` nothing changes.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start_recording(&self, format: VideoFormat) -> CoreResult<PathBuf> {
        let mut recorder = self.shared.recorder();

        if !recorder.device_open {
            return Err(CoreError::InvalidState {
                reason: "video mode is not active".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if recorder.recording.is_some() {
            return Err(CoreError::InvalidState {
                reason: "already recording".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let path = timestamped_path(
            &self.settings.recordings_dir,
            "viki_recording",
            format.extension(),
        )?;
        let size = self.slot.size().unwrap_or(self.settings.frame_size);

        let sink = match self
            .sinks
            .open_sink(&path, format, self.settings.fps, size)
        {
            Ok(sink) => sink,
            Err(e) => {
                warn!(path = ?path, error = %e, "Video sink could not be opened");
                self.mailbox.notice(
                    "Failed to open video writer. Check codec support and permissions.",
                );
                return Err(e);
            }
        };

        recorder.recording = Some(ActiveRecording {
            sink,
            path: path.clone(),
            frames_written: 0,
        });
        drop(recorder);

        info!(path = ?path, format = %format, "Recording started");
        self.mailbox
            .notice(format!("Recording started: {}", path.display()));
        self.mailbox.control(ControlSignal::RecordingStarted);
        Ok(path)
    }

    /// Close the open recording.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop_recording(&self) -> CoreResult<RecordingSummary> {
        let taken = self.shared.recorder().recording.take();
        let Some(active) = taken else {
            return Err(CoreError::InvalidState {
                reason: "not recording".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let summary = finish_recording(active, &self.mailbox)?;
        info!(path = ?summary.path, frames = summary.frames_written, "Recording stopped");
        Ok(summary)
    }

    /// Wait for the worker to exit.
    #[track_caller]
    pub fn join(mut self) -> CoreResult<()> {
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| CoreError::InvalidState {
                reason: "video worker panicked".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }
        Ok(())
    }
}

impl Drop for VideoSession {
    fn drop(&mut self) {
        self.shared.active.store(false, Ordering::SeqCst);
    }
}

/// Close a recording's sink and announce it.
fn finish_recording(active: ActiveRecording, mailbox: &Mailbox) -> CoreResult<RecordingSummary> {
    let ActiveRecording {
        sink,
        path,
        frames_written,
    } = active;

    let closed = sink.close();
    mailbox.notice("Recording stopped.");
    mailbox.control(ControlSignal::RecordingStopped);
    closed?;

    Ok(RecordingSummary {
        path,
        frames_written,
    })
}

struct Worker {
    shared: Arc<Shared>,
    slot: Arc<FrameSlot>,
    mailbox: Mailbox,
    settings: VideoSettings,
}

impl Worker {
    fn run(self, camera: &dyn Camera) {
        let span = tracing::info_span!("video");
        let _enter = span.enter();

        match camera.open() {
            Ok(device) => {
                self.shared.recorder().device_open = true;
                info!("Capture device opened");
                self.mailbox.notice("Video mode started.");
                self.mailbox.control(ControlSignal::VideoStarted);
                self.mailbox
                    .control(ControlSignal::RecordingControlsEnabled(true));
                self.mailbox.control(ControlSignal::CaptureControlEnabled(true));

                self.stream(device);
            }
            Err(e) => {
                error!(error = %e, "Capture device unavailable");
                self.mailbox
                    .notice(format!("Error: Cannot open webcam. {}", e));
                self.signal_off();
            }
        }

        self.shared.active.store(false, Ordering::SeqCst);
        self.shared.finished.store(true, Ordering::SeqCst);
    }

    /// Frame loop, then ordered teardown: sink, device, signals.
    fn stream(&self, mut device: Box<dyn CaptureDevice>) {
        let interval = self.settings.frame_interval();

        while self.shared.active.load(Ordering::SeqCst) {
            let started = Instant::now();

            match device.next_frame() {
                Ok(Some(frame)) => self.process(frame),
                Ok(None) => {
                    warn!("Capture device reached end of stream");
                    self.grab_failed();
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Frame grab failed");
                    self.grab_failed();
                    break;
                }
            }

            if let Some(rest) = interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }

        let mut recorder = self.shared.recorder();
        let pending = recorder.recording.take();
        if let Some(active) = pending
            && let Err(e) = finish_recording(active, &self.mailbox)
        {
            warn!(error = %e, "Recording did not close cleanly");
        }
        recorder.device_open = false;
        drop(device);
        drop(recorder);

        info!("Capture device released");
        self.mailbox.notice("Video mode stopped.");
        self.signal_off();
    }

    // A read that returns after deactivation is not a failure the user sees.
    fn grab_failed(&self) {
        if self.shared.active.load(Ordering::SeqCst) {
            self.mailbox.notice("Failed to grab frame.");
        }
    }

    fn process(&self, frame: Frame) {
        let frame = frame.fit(self.settings.frame_size);
        self.shared.frames_produced.fetch_add(1, Ordering::SeqCst);

        self.slot.store(frame.clone());
        self.mailbox.post(MailboxEvent::FrameReady {
            frame: frame.clone(),
        });

        let mut recorder = self.shared.recorder();
        let failed = match recorder.recording.as_mut() {
            Some(active) => match active.sink.write(&frame) {
                Ok(()) => {
                    active.frames_written += 1;
                    false
                }
                Err(e) => {
                    warn!(error = %e, "Frame write failed");
                    true
                }
            },
            None => false,
        };

        if failed && let Some(active) = recorder.recording.take() {
            drop(recorder);
            self.mailbox.notice("Failed to write frame to the recording.");
            if let Err(e) = finish_recording(active, &self.mailbox) {
                warn!(error = %e, "Recording did not close cleanly");
            }
        }
    }

    fn signal_off(&self) {
        self.mailbox.control(ControlSignal::VideoStopped);
        self.mailbox
            .control(ControlSignal::RecordingControlsEnabled(false));
        self.mailbox
            .control(ControlSignal::CaptureControlEnabled(false));
    }
}
