//! Microphone + whisper.cpp implementation of [`SpeechInput`](crate::speech::SpeechInput).
//!
//! Capture runs until the speaker goes quiet, the audio is resampled to
//! 16 kHz mono and transcribed on the calling thread.

mod capture;
mod engine;
mod listener;
mod resampler;

pub(crate) use {capture::MicrophoneCapture, engine::WhisperEngine, resampler::Resampler};

#[cfg(test)]
pub(crate) use {capture::energy, engine::trim_transcript};

pub use listener::{ListenerSettings, WhisperListener};

/// Sample rate whisper models expect.
pub(crate) const WHISPER_SAMPLE_RATE: u32 = 16_000;
