//! Speech collaborators: recognition in, synthesis out.

mod whisper;

pub use whisper::{ListenerSettings, WhisperListener};

#[cfg(test)]
pub(crate) use whisper::{
    Resampler, WHISPER_SAMPLE_RATE, WhisperEngine, energy, trim_transcript,
};

use crate::CoreResult;

/// Text recognized from one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// The recognized words, trimmed.
    pub text: String,
}

impl Transcript {
    /// Wrap recognized text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Blocking capture-and-recognize of one utterance.
///
/// Fails with `NoSpeechDetected` when nothing intelligible was heard and
/// `ServiceUnavailable` when the recognizer cannot run at all. Calls are not
/// interruptible; callers that need to stop poll their own flag afterwards.
pub trait SpeechInput: Send + Sync {
    /// Listen for one utterance and return its transcript.
    fn capture(&self) -> CoreResult<Transcript>;
}

/// Fire-and-forget speech synthesis.
///
/// Implementations swallow and log their own failures.
pub trait SpeechOutput: Send + Sync {
    /// Say `text` aloud, best effort.
    fn speak(&self, text: &str);
}
