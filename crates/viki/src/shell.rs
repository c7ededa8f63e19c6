//! UI-thread state built from mailbox events.
//!
//! [`ShellView`] is the only consumer of the mailbox. It turns chat messages
//! into console lines and keeps the indicator, status and control states
//! that the tray mirrors.

use viki_core::{
    MailboxEvent,
    mailbox::{Author, ControlSignal, IndicatorColor, Status},
};

/// Render a chat message as one console line.
pub(crate) fn render_message(sender: Author, text: &str) -> String {
    match sender {
        Author::User => format!("[you] {}", text),
        Author::Assistant => format!("[viki] {}", text),
    }
}

/// What the shell currently shows.
#[derive(Debug, Clone)]
pub struct ShellView {
    status: Status,
    indicator: IndicatorColor,
    video_live: bool,
    recording: bool,
    recording_controls: bool,
    capture_control: bool,
    last_frame_size: Option<(u32, u32)>,
    dirty: bool,
}

impl Default for ShellView {
    fn default() -> Self {
        Self {
            status: Status::Idle,
            indicator: IndicatorColor::Gray,
            video_live: false,
            recording: false,
            recording_controls: false,
            capture_control: false,
            last_frame_size: None,
            dirty: true,
        }
    }
}

impl ShellView {
    /// Apply one event. Returns the console line to print, if any.
    pub fn apply(&mut self, event: MailboxEvent) -> Option<String> {
        match event {
            MailboxEvent::Message { text, sender } => return Some(render_message(sender, &text)),
            MailboxEvent::StatusChanged { state } => self.status = state,
            MailboxEvent::IndicatorChanged { color } => self.indicator = color,
            MailboxEvent::FrameReady { frame } => {
                // Preview frames only mark the tray dirty when the size changes.
                let size = Some(frame.size());
                if self.last_frame_size == size {
                    return None;
                }
                self.last_frame_size = size;
            }
            MailboxEvent::ControlSignal { kind } => self.signal(kind),
        }
        self.dirty = true;
        None
    }

    fn signal(&mut self, kind: ControlSignal) {
        match kind {
            ControlSignal::VideoStarted => self.video_live = true,
            ControlSignal::VideoStopped => {
                self.video_live = false;
                self.recording = false;
            }
            ControlSignal::RecordingControlsEnabled(enabled) => self.recording_controls = enabled,
            ControlSignal::CaptureControlEnabled(enabled) => self.capture_control = enabled,
            ControlSignal::RecordingStarted => self.recording = true,
            ControlSignal::RecordingStopped => self.recording = false,
            ControlSignal::DispatchFinished => {}
        }
    }

    /// Whether the tray needs a refresh since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Tray tooltip for the current state.
    pub fn tooltip(&self) -> String {
        let mut tooltip = format!("Viki - {}", self.status);
        if self.recording {
            tooltip.push_str(" | Recording");
        } else if self.video_live {
            tooltip.push_str(" | Video");
            if let Some((width, height)) = self.last_frame_size {
                tooltip.push_str(&format!(" {}x{}", width, height));
            }
        }
        tooltip
    }

    /// Current status line.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Current indicator colour.
    pub fn indicator(&self) -> IndicatorColor {
        self.indicator
    }

    /// Whether "Start Recording" is available.
    pub fn can_start_recording(&self) -> bool {
        self.recording_controls && !self.recording
    }

    /// Whether "Stop Recording" is available.
    pub fn can_stop_recording(&self) -> bool {
        self.recording_controls && self.recording
    }

    /// Whether "Capture Photo" is available.
    pub fn can_capture(&self) -> bool {
        self.capture_control
    }
}
