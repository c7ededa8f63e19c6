use crate::{CoreError, CoreResult};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Markers whisper emits for non-speech audio.
const NON_SPEECH_MARKERS: &[&str] = &["[BLANK_AUDIO]", "[ Silence ]", "(silence)", "[MUSIC]"];

/// Drop non-speech markers and surrounding whitespace from a raw transcript.
pub(crate) fn trim_transcript(raw: &str) -> String {
    let mut text = raw.to_string();
    for marker in NON_SPEECH_MARKERS {
        text = text.replace(marker, " ");
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) struct WhisperEngine {
    ctx: WhisperContext,
}

impl WhisperEngine {
    #[track_caller]
    #[instrument(skip(model_path))]
    pub(crate) fn new(model_path: &Path, use_gpu: bool) -> CoreResult<Self> {
        if !model_path.exists() {
            return Err(CoreError::ServiceUnavailable {
                reason: format!("whisper model not found at {:?}", model_path),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let path_str = model_path.to_str().ok_or(CoreError::ServiceUnavailable {
            reason: format!("model path is not valid UTF-8: {:?}", model_path),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let mut params = WhisperContextParameters::default();
        params.use_gpu(use_gpu);

        let ctx = WhisperContext::new_with_params(path_str, params).map_err(|e| {
            CoreError::ServiceUnavailable {
                reason: format!("failed to load whisper model: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        info!(model_path = ?model_path, use_gpu, "Whisper model loaded");

        Ok(Self { ctx })
    }

    /// Transcribe 16 kHz mono samples. Blank output is `NoSpeechDetected`.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub(crate) fn transcribe(&self, samples: &[f32]) -> CoreResult<String> {
        if samples.is_empty() {
            return Err(CoreError::NoSpeechDetected {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some("en"));
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_nst(true);
        params.set_single_segment(true);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| CoreError::ServiceUnavailable {
                reason: format!("failed to create whisper state: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        state
            .full(params, samples)
            .map_err(|e| CoreError::ServiceUnavailable {
                reason: format!("whisper inference failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let mut raw = String::new();
        for i in 0..state.full_n_segments() {
            if let Some(segment) = state.get_segment(i) {
                raw.push_str(&segment.to_string());
                raw.push(' ');
            }
        }

        let text = trim_transcript(&raw);
        debug!(sample_count = samples.len(), text_len = text.len(), "Utterance transcribed");

        if text.is_empty() {
            return Err(CoreError::NoSpeechDetected {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(text)
    }
}
