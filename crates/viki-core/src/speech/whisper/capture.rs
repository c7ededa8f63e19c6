use crate::{CoreError, CoreResult, speech::ListenerSettings};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use cpal::{
    Device, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// How often the endpoint detector looks at newly captured audio.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Mean absolute amplitude of a chunk, a cheap speech/silence discriminator.
pub(crate) fn energy(chunk: &[f32]) -> f32 {
    if chunk.is_empty() {
        return 0.0;
    }
    chunk.iter().map(|s| s.abs()).sum::<f32>() / chunk.len() as f32
}

/// Default input device, opened per utterance.
///
/// The cpal stream only exists inside [`MicrophoneCapture::record_utterance`],
/// so this type holds no platform stream between calls.
pub(crate) struct MicrophoneCapture {
    device: Device,
    config: StreamConfig,
}

impl MicrophoneCapture {
    #[track_caller]
    #[instrument]
    pub(crate) fn new() -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(CoreError::ServiceUnavailable {
                reason: "no microphone found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| CoreError::ServiceUnavailable {
                reason: format!("failed to get input config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "Microphone opened"
        );

        Ok(Self {
            device,
            config: config.into(),
        })
    }

    pub(crate) fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Record one utterance as mono samples at the device rate.
    ///
    /// Returns an empty buffer when no voice crossed the energy threshold
    /// within `listen_timeout`.
    #[track_caller]
    #[instrument(skip(self, settings))]
    pub(crate) fn record_utterance(&self, settings: &ListenerSettings) -> CoreResult<Vec<f32>> {
        let samples = Arc::new(Mutex::new(Vec::<f32>::new()));
        let shutdown = Arc::new(AtomicBool::new(false));
        let channels = usize::from(self.config.channels.max(1));

        let stream = {
            let samples = Arc::clone(&samples);
            let shutdown = Arc::clone(&shutdown);
            self.device
                .build_input_stream(
                    &self.config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if shutdown.load(Ordering::Acquire) {
                            return;
                        }
                        let mut buf = samples.lock().unwrap_or_else(|e| e.into_inner());
                        // Interleaved frames, mixed down to mono.
                        buf.extend(
                            data.chunks(channels)
                                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
                        );
                    },
                    |err| {
                        error!("Microphone stream error: {}", err);
                    },
                    None,
                )
                .map_err(|e| CoreError::ServiceUnavailable {
                    reason: format!("failed to build input stream: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?
        };

        stream.play().map_err(|e| CoreError::ServiceUnavailable {
            reason: format!("failed to start input stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let started = Instant::now();
        let mut inspected = 0usize;
        let mut voice_started = false;
        let mut last_voice = started;

        loop {
            std::thread::sleep(POLL_INTERVAL);

            let level = {
                let buf = samples.lock().unwrap_or_else(|e| e.into_inner());
                let level = energy(&buf[inspected.min(buf.len())..]);
                inspected = buf.len();
                level
            };

            let now = Instant::now();
            if level >= settings.energy_threshold {
                voice_started = true;
                last_voice = now;
            }

            if voice_started && now.duration_since(last_voice) >= settings.trailing_silence {
                debug!("Trailing silence reached");
                break;
            }
            if voice_started && now.duration_since(started) >= settings.max_utterance {
                debug!("Maximum utterance length reached");
                break;
            }
            if !voice_started && now.duration_since(started) >= settings.listen_timeout {
                debug!("No voice before listen timeout");
                break;
            }
        }

        shutdown.store(true, Ordering::Release);
        drop(stream);

        if !voice_started {
            return Ok(Vec::new());
        }

        let captured = std::mem::take(&mut *samples.lock().unwrap_or_else(|e| e.into_inner()));
        debug!(sample_count = captured.len(), "Utterance captured");

        Ok(captured)
    }
}
