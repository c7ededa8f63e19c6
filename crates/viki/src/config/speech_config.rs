use crate::config::{data_dir, default_true};

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use viki_core::{session::ListeningSettings, speech::ListenerSettings};

/// Speech recognition and synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Path to the Whisper model file (e.g., ggml-base.en.bin).
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Use GPU for inference if a GPU backend was compiled in (Metal/Vulkan).
    #[serde(default = "default_true")]
    pub use_gpu: bool,

    /// Longest utterance recorded once voice is detected.
    #[serde(default = "default_max_utterance_secs")]
    pub max_utterance_secs: u64,

    /// Quiet time that ends an utterance.
    #[serde(default = "default_trailing_silence_ms")]
    pub trailing_silence_ms: u64,

    /// How long one capture waits for voice to start.
    #[serde(default = "default_listen_timeout_secs")]
    pub listen_timeout_secs: u64,

    /// Mean absolute amplitude counted as voice.
    #[serde(default = "default_energy_threshold")]
    pub energy_threshold: f32,

    /// Pause before retrying after the recognizer was unavailable.
    #[serde(default = "default_unavailable_backoff_ms")]
    pub unavailable_backoff_ms: u64,

    /// Speak replies through the platform speech command.
    #[serde(default = "default_true")]
    pub speak_aloud: bool,
}

impl SpeechConfig {
    /// Settings for the microphone and whisper pipeline.
    pub fn listener_settings(&self) -> ListenerSettings {
        ListenerSettings {
            model_path: self.model_path.clone(),
            use_gpu: self.use_gpu,
            max_utterance: Duration::from_secs(self.max_utterance_secs),
            trailing_silence: Duration::from_millis(self.trailing_silence_ms),
            listen_timeout: Duration::from_secs(self.listen_timeout_secs),
            energy_threshold: self.energy_threshold,
        }
    }

    /// Settings for the listening loop.
    pub fn listening_settings(&self) -> ListeningSettings {
        ListeningSettings {
            unavailable_backoff: Duration::from_millis(self.unavailable_backoff_ms),
            ..ListeningSettings::default()
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            use_gpu: true,
            max_utterance_secs: default_max_utterance_secs(),
            trailing_silence_ms: default_trailing_silence_ms(),
            listen_timeout_secs: default_listen_timeout_secs(),
            energy_threshold: default_energy_threshold(),
            unavailable_backoff_ms: default_unavailable_backoff_ms(),
            speak_aloud: true,
        }
    }
}

fn default_model_path() -> PathBuf {
    data_dir().join("models").join("ggml-base.en.bin")
}

fn default_max_utterance_secs() -> u64 {
    10
}

fn default_trailing_silence_ms() -> u64 {
    800
}

fn default_listen_timeout_secs() -> u64 {
    5
}

fn default_energy_threshold() -> f32 {
    0.01
}

fn default_unavailable_backoff_ms() -> u64 {
    2000
}
