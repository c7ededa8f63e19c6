use crate::{
    CoreError, CoreResult,
    speech::{
        SpeechInput, Transcript,
        whisper::{MicrophoneCapture, Resampler, WHISPER_SAMPLE_RATE, WhisperEngine},
    },
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tracing::{info, instrument, warn};

/// Tuning for microphone capture and recognition.
#[derive(Debug, Clone)]
pub struct ListenerSettings {
    /// Path to the ggml whisper model.
    pub model_path: PathBuf,
    /// Use a GPU backend when one was compiled in.
    pub use_gpu: bool,
    /// Hard cap on one utterance once voice started.
    pub max_utterance: Duration,
    /// Quiet time after speech that ends the utterance.
    pub trailing_silence: Duration,
    /// How long to wait for voice before giving up.
    pub listen_timeout: Duration,
    /// Mean absolute amplitude counted as voice.
    pub energy_threshold: f32,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-base.en.bin"),
            use_gpu: true,
            max_utterance: Duration::from_secs(10),
            trailing_silence: Duration::from_millis(800),
            listen_timeout: Duration::from_secs(5),
            energy_threshold: 0.01,
        }
    }
}

struct Pipeline {
    microphone: MicrophoneCapture,
    resampler: Option<Resampler>,
    engine: WhisperEngine,
}

impl Pipeline {
    fn open(settings: &ListenerSettings) -> CoreResult<Self> {
        let microphone = MicrophoneCapture::new()?;
        let engine = WhisperEngine::new(&settings.model_path, settings.use_gpu)?;
        let rate = microphone.sample_rate();
        let resampler = if rate == WHISPER_SAMPLE_RATE {
            None
        } else {
            Some(Resampler::new(rate, WHISPER_SAMPLE_RATE)?)
        };
        Ok(Self {
            microphone,
            resampler,
            engine,
        })
    }
}

/// [`SpeechInput`] backed by the default microphone and a local whisper model.
///
/// Opening the device and loading the model happen on the first capture, so a
/// missing model surfaces as `ServiceUnavailable` on each attempt instead of
/// preventing startup. Captures are serialized.
pub struct WhisperListener {
    settings: ListenerSettings,
    pipeline: Mutex<Option<Pipeline>>,
}

impl WhisperListener {
    /// Create a listener. Nothing is opened yet.
    pub fn new(settings: ListenerSettings) -> Self {
        Self {
            settings,
            pipeline: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Pipeline>> {
        self.pipeline.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SpeechInput for WhisperListener {
    #[instrument(skip(self))]
    fn capture(&self) -> CoreResult<Transcript> {
        let mut guard = self.lock();

        if guard.is_none() {
            let pipeline = Pipeline::open(&self.settings).inspect_err(|e| {
                warn!(error = %e, "Speech pipeline unavailable");
            })?;
            info!("Speech pipeline ready");
            *guard = Some(pipeline);
        }

        let Some(pipeline) = guard.as_mut() else {
            return Err(CoreError::ServiceUnavailable {
                reason: "speech pipeline not initialised".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let samples = pipeline.microphone.record_utterance(&self.settings)?;

        let start = Instant::now();
        let prepared = match pipeline.resampler.as_mut() {
            Some(resampler) => resampler.resample(&samples)?,
            None => samples,
        };

        let text = pipeline.engine.transcribe(&prepared)?;

        info!(
            duration_ms = start.elapsed().as_millis(),
            text_len = text.len(),
            "Speech recognized"
        );

        Ok(Transcript::new(text))
    }
}
