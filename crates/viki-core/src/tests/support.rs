//! In-memory collaborators shared by the unit tests.

#![allow(clippy::unwrap_used)]

use crate::{
    CoreError, CoreResult,
    actions::{ActionExecutor, Launcher},
    commands::ActionTarget,
    dialog::{DialogSettings, KnowledgeLookup},
    mailbox::{Author, Mailbox, MailboxEvent, MailboxReceiver},
    session::{Camera, CaptureDevice, Frame, SinkFactory, VideoFormat, VideoSink},
    speech::{SpeechInput, SpeechOutput, Transcript},
};

use std::{
    collections::VecDeque,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    time::{Duration, Instant},
};

use error_location::ErrorLocation;

pub(crate) const WAIT: Duration = Duration::from_secs(5);

/// One scripted recognition result.
#[derive(Debug, Clone)]
pub(crate) enum Heard {
    Say(&'static str),
    Silence,
    Unavailable,
}

/// Replays a fixed script of recognition results, then reports silence.
#[derive(Default)]
pub(crate) struct ScriptedSpeech {
    script: Mutex<VecDeque<Heard>>,
}

impl ScriptedSpeech {
    pub(crate) fn new(script: &[Heard]) -> Self {
        Self {
            script: Mutex::new(script.iter().cloned().collect()),
        }
    }

    pub(crate) fn saying(answers: &[&'static str]) -> Self {
        let script: Vec<Heard> = answers.iter().map(|a| Heard::Say(*a)).collect();
        Self::new(&script)
    }
}

impl SpeechInput for ScriptedSpeech {
    fn capture(&self) -> CoreResult<Transcript> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Heard::Say(text)) => Ok(Transcript::new(text)),
            Some(Heard::Unavailable) => Err(CoreError::ServiceUnavailable {
                reason: "recognizer offline".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
            Some(Heard::Silence) | None => Err(CoreError::NoSpeechDetected {
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

/// Speech input the test steps by hand.
///
/// Each capture announces itself on `entered`, then blocks until the test
/// sends a reply: `Some(text)` is a transcript, `None` is silence. A dropped
/// reply sender reads as silence.
pub(crate) struct GatedSpeech {
    entered: Mutex<Sender<()>>,
    replies: Mutex<Receiver<Option<String>>>,
}

pub(crate) struct SpeechGate {
    pub(crate) entered: Receiver<()>,
    pub(crate) replies: Sender<Option<String>>,
}

impl GatedSpeech {
    pub(crate) fn new() -> (Self, SpeechGate) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (reply_tx, reply_rx) = mpsc::channel();
        (
            Self {
                entered: Mutex::new(entered_tx),
                replies: Mutex::new(reply_rx),
            },
            SpeechGate {
                entered: entered_rx,
                replies: reply_tx,
            },
        )
    }
}

impl SpeechInput for GatedSpeech {
    fn capture(&self) -> CoreResult<Transcript> {
        let _ = self.entered.lock().unwrap().send(());
        match self.replies.lock().unwrap().recv() {
            Ok(Some(text)) => Ok(Transcript::new(text)),
            Ok(None) | Err(_) => Err(CoreError::NoSpeechDetected {
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingSpeaker {
    pub(crate) spoken: Mutex<Vec<String>>,
}

impl SpeechOutput for RecordingSpeaker {
    fn speak(&self, text: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
    }
}

/// Records every launch. Programs listed in `missing` fail with `NotFound`.
#[derive(Default)]
pub(crate) struct RecordingLauncher {
    pub(crate) launched: Mutex<Vec<ActionTarget>>,
    pub(crate) missing: Vec<String>,
}

impl RecordingLauncher {
    pub(crate) fn launched(&self) -> Vec<ActionTarget> {
        self.launched.lock().unwrap().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, target: &ActionTarget) -> CoreResult<()> {
        if let ActionTarget::Executable(path) = target
            && self.missing.iter().any(|m| path == Path::new(m))
        {
            return Err(CoreError::NotFound {
                item: path.display().to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.launched.lock().unwrap().push(target.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Lookup {
    #[default]
    Found,
    Ambiguous,
    Missing,
}

/// Answers every topic with `"<topic> in <n> sentences"`.
#[derive(Default)]
pub(crate) struct ScriptedKnowledge {
    pub(crate) outcome: Lookup,
    pub(crate) requests: Mutex<Vec<(String, usize)>>,
}

impl ScriptedKnowledge {
    pub(crate) fn answering(outcome: Lookup) -> Self {
        Self {
            outcome,
            requests: Mutex::default(),
        }
    }
}

impl KnowledgeLookup for ScriptedKnowledge {
    fn summarize(&self, topic: &str, sentences: usize) -> CoreResult<String> {
        self.requests
            .lock()
            .unwrap()
            .push((topic.to_string(), sentences));
        match self.outcome {
            Lookup::Found => Ok(format!("{} in {} sentences", topic, sentences)),
            Lookup::Ambiguous => Err(CoreError::Ambiguous {
                topic: topic.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
            Lookup::Missing => Err(CoreError::NotFound {
                item: topic.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    fn resolve_link(&self, topic: &str) -> CoreResult<String> {
        Ok(format!("https://en.wikipedia.org/wiki/{}", topic.replace(' ', "_")))
    }
}

/// Collaborators and a mailbox wired together for one test.
pub(crate) struct Harness {
    pub(crate) speech: Arc<dyn SpeechInput>,
    pub(crate) speaker: Arc<RecordingSpeaker>,
    pub(crate) launcher: Arc<RecordingLauncher>,
    pub(crate) knowledge: Arc<ScriptedKnowledge>,
    pub(crate) mailbox: Mailbox,
    pub(crate) events: MailboxReceiver,
}

impl Harness {
    pub(crate) fn new(speech: Arc<dyn SpeechInput>) -> Self {
        Self::with(speech, RecordingLauncher::default(), ScriptedKnowledge::default())
    }

    pub(crate) fn with(
        speech: Arc<dyn SpeechInput>,
        launcher: RecordingLauncher,
        knowledge: ScriptedKnowledge,
    ) -> Self {
        let (mailbox, events) = Mailbox::channel();
        Self {
            speech,
            speaker: Arc::new(RecordingSpeaker::default()),
            launcher: Arc::new(launcher),
            knowledge: Arc::new(knowledge),
            mailbox,
            events,
        }
    }

    pub(crate) fn executor(&self, dialog: DialogSettings) -> ActionExecutor {
        ActionExecutor::new(
            Arc::clone(&self.speech),
            self.speaker.clone(),
            self.launcher.clone(),
            self.knowledge.clone(),
            self.mailbox.clone(),
            dialog,
        )
    }

    pub(crate) fn spoken(&self) -> Vec<String> {
        self.speaker.spoken.lock().unwrap().clone()
    }
}

/// Chat lines among `events`, in order.
pub(crate) fn messages(events: &[MailboxEvent]) -> Vec<(Author, String)> {
    events
        .iter()
        .filter_map(|e| match e {
            MailboxEvent::Message { text, sender } => Some((*sender, text.clone())),
            _ => None,
        })
        .collect()
}

/// Poll `condition` until it holds or [`WAIT`] elapses.
pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Camera handing out one [`GatedDevice`].
///
/// The device acknowledges on `ready` each time it is asked for a frame, so
/// an ack means every earlier frame has been fully processed. Dropping the
/// frame sender ends the stream.
pub(crate) struct GatedCamera {
    device: Mutex<Option<GatedDevice>>,
}

pub(crate) struct CameraGate {
    pub(crate) ready: Receiver<()>,
    pub(crate) frames: Sender<Frame>,
}

impl GatedCamera {
    pub(crate) fn new() -> (Self, CameraGate) {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (frame_tx, frame_rx) = mpsc::channel();
        (
            Self {
                device: Mutex::new(Some(GatedDevice {
                    ready: ready_tx,
                    frames: frame_rx,
                })),
            },
            CameraGate {
                ready: ready_rx,
                frames: frame_tx,
            },
        )
    }
}

impl Camera for GatedCamera {
    fn open(&self) -> CoreResult<Box<dyn CaptureDevice>> {
        match self.device.lock().unwrap().take() {
            Some(device) => Ok(Box::new(device)),
            None => Err(CoreError::DeviceUnavailable {
                reason: "device already in use".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

pub(crate) struct GatedDevice {
    ready: Sender<()>,
    frames: Receiver<Frame>,
}

impl CaptureDevice for GatedDevice {
    fn next_frame(&mut self) -> CoreResult<Option<Frame>> {
        let _ = self.ready.send(());
        Ok(self.frames.recv().ok())
    }
}

pub(crate) struct UnpluggedCamera;

impl Camera for UnpluggedCamera {
    fn open(&self) -> CoreResult<Box<dyn CaptureDevice>> {
        Err(CoreError::DeviceUnavailable {
            reason: "no camera attached".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Sink factory counting what its sinks receive.
#[derive(Default)]
pub(crate) struct CountingSinks {
    pub(crate) refuse: bool,
    pub(crate) written: Arc<AtomicU64>,
    pub(crate) closed: Arc<AtomicBool>,
    pub(crate) opened: Mutex<Vec<(PathBuf, VideoFormat, u32, (u32, u32))>>,
}

impl CountingSinks {
    pub(crate) fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }
}

impl SinkFactory for CountingSinks {
    fn open_sink(
        &self,
        path: &Path,
        format: VideoFormat,
        fps: u32,
        size: (u32, u32),
    ) -> CoreResult<Box<dyn VideoSink>> {
        if self.refuse {
            return Err(CoreError::SinkUnavailable {
                reason: "codec rejected".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.opened
            .lock()
            .unwrap()
            .push((path.to_path_buf(), format, fps, size));
        Ok(Box::new(CountingSink {
            written: Arc::clone(&self.written),
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct CountingSink {
    written: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
}

impl VideoSink for CountingSink {
    fn write(&mut self, _frame: &Frame) -> CoreResult<()> {
        self.written.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(self: Box<Self>) -> CoreResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) fn test_frame() -> Frame {
    Frame::solid(64, 48, [10, 200, 30])
}
