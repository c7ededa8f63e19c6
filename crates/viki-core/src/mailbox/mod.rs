//! Single-consumer event queue from worker threads to the UI thread.
//!
//! Any number of [`Mailbox`] clones post events; one [`MailboxReceiver`]
//! drains them on the UI thread's timer tick ([`DEFAULT_DRAIN_TICK`] unless
//! configured otherwise). The queue is FIFO per producer and unbounded: no
//! event is dropped, coalesced or prioritised, and nothing applies
//! backpressure. A producer flood grows memory without limit.

use crate::session::Frame;

use std::{
    fmt,
    sync::mpsc::{self, RecvTimeoutError},
    time::Duration,
};

use tracing::debug;

/// Default interval between two drains of the queue by the UI thread.
pub const DEFAULT_DRAIN_TICK: Duration = Duration::from_millis(100);

/// Who a chat message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    /// Recognized or typed user input.
    User,
    /// Spoken replies and system notices.
    Assistant,
}

/// Status line shown by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Nothing in flight.
    Idle,
    /// Waiting for the user to speak.
    Listening,
    /// Recognizing or dispatching.
    Processing,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Idle => "Idle",
            Status::Listening => "Listening...",
            Status::Processing => "Processing...",
        };
        f.write_str(s)
    }
}

/// Activity indicator colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorColor {
    /// Idle.
    Gray,
    /// Capturing speech.
    Green,
    /// Processing.
    Orange,
}

impl IndicatorColor {
    /// RGB value used when painting the indicator.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            IndicatorColor::Gray => [128, 128, 128],
            IndicatorColor::Green => [0, 170, 0],
            IndicatorColor::Orange => [255, 140, 0],
        }
    }
}

/// Control changes the UI applies to its widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Video mode is live; show the preview.
    VideoStarted,
    /// Video mode ended; hide the preview.
    VideoStopped,
    /// Enable or disable the start/stop recording controls.
    RecordingControlsEnabled(bool),
    /// Enable or disable the capture-photo control.
    CaptureControlEnabled(bool),
    /// Recording is live; swap start/stop recording control states.
    RecordingStarted,
    /// Recording ended.
    RecordingStopped,
    /// A typed command thread finished.
    DispatchFinished,
}

/// One queued UI effect.
#[derive(Debug, Clone)]
pub enum MailboxEvent {
    /// Render a chat message.
    Message {
        /// Message body.
        text: String,
        /// Attribution.
        sender: Author,
    },
    /// Update the status line.
    StatusChanged {
        /// New status.
        state: Status,
    },
    /// Update the indicator colour.
    IndicatorChanged {
        /// New colour.
        color: IndicatorColor,
    },
    /// A new preview frame (an owned copy).
    FrameReady {
        /// The frame.
        frame: Frame,
    },
    /// Toggle dependent controls.
    ControlSignal {
        /// What to change.
        kind: ControlSignal,
    },
}

/// Producer handle. Cheap to clone, one per worker.
#[derive(Debug, Clone)]
pub struct Mailbox {
    tx: mpsc::Sender<MailboxEvent>,
}

impl Mailbox {
    /// Create a connected producer/consumer pair.
    pub fn channel() -> (Mailbox, MailboxReceiver) {
        let (tx, rx) = mpsc::channel();
        (Mailbox { tx }, MailboxReceiver { rx })
    }

    /// Enqueue an event. A closed consumer means the UI is gone; the event
    /// is discarded with a debug line.
    pub fn post(&self, event: MailboxEvent) {
        if self.tx.send(event).is_err() {
            debug!("Mailbox consumer closed, event discarded");
        }
    }

    /// Chat message from the user.
    pub fn user(&self, text: impl Into<String>) {
        self.post(MailboxEvent::Message {
            text: text.into(),
            sender: Author::User,
        });
    }

    /// Chat message from the assistant.
    pub fn notice(&self, text: impl Into<String>) {
        self.post(MailboxEvent::Message {
            text: text.into(),
            sender: Author::Assistant,
        });
    }

    /// Status and indicator change, in that order.
    pub fn activity(&self, state: Status, color: IndicatorColor) {
        self.post(MailboxEvent::StatusChanged { state });
        self.post(MailboxEvent::IndicatorChanged { color });
    }

    /// Control signal.
    pub fn control(&self, kind: ControlSignal) {
        self.post(MailboxEvent::ControlSignal { kind });
    }
}

/// The single consumer. Lives on the UI thread.
#[derive(Debug)]
pub struct MailboxReceiver {
    rx: mpsc::Receiver<MailboxEvent>,
}

impl MailboxReceiver {
    /// Take everything queued right now, in arrival order. Never blocks.
    pub fn drain(&self) -> Vec<MailboxEvent> {
        self.rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// Returns `None` on timeout or when every producer is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<MailboxEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}
