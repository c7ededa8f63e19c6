use crate::{
    CoreError,
    speech::{
        ListenerSettings, Resampler, SpeechInput, WHISPER_SAMPLE_RATE, WhisperEngine,
        WhisperListener, energy, trim_transcript,
    },
};

use std::path::PathBuf;

// Test constants
const INPUT_SAMPLE_RATE: u32 = 48000;
const ONE_SECOND_INPUT_SAMPLES: usize = INPUT_SAMPLE_RATE as usize;
const ONE_SECOND_OUTPUT_SAMPLES: usize = WHISPER_SAMPLE_RATE as usize;
const LENGTH_TOLERANCE: u64 = 100;
const TEST_SIGNAL_AMPLITUDE: f32 = 0.5;

/// WHAT: Resampler converts 48kHz to 16kHz
/// WHY: Whisper requires 16kHz input
#[test]
#[allow(clippy::unwrap_used)]
fn given_48khz_audio_when_resampling_then_output_length_approximately_correct() {
    // Given: Resampler configured for 48kHz -> 16kHz
    let mut resampler = Resampler::new(INPUT_SAMPLE_RATE, WHISPER_SAMPLE_RATE).unwrap();
    let input = vec![TEST_SIGNAL_AMPLITUDE; ONE_SECOND_INPUT_SAMPLES];

    // When: Resampling one second
    let output = resampler.resample(&input).unwrap();

    // Then: About one second at 16kHz, all finite
    assert!(
        (output.len() as i64 - ONE_SECOND_OUTPUT_SAMPLES as i64).unsigned_abs() < LENGTH_TOLERANCE,
        "Expected ~{} samples, got {}",
        ONE_SECOND_OUTPUT_SAMPLES,
        output.len()
    );
    assert!(output.iter().all(|&s| s.is_finite()));
}

/// WHAT: Resampler output for an utterance shorter than one chunk
/// WHY: Short commands ("stop") are under 1024 input frames
#[test]
#[allow(clippy::unwrap_used)]
fn given_short_utterance_when_resampling_then_tail_is_kept() {
    // Given: 600 samples at 48kHz
    let mut resampler = Resampler::new(INPUT_SAMPLE_RATE, WHISPER_SAMPLE_RATE).unwrap();
    let input = vec![TEST_SIGNAL_AMPLITUDE; 600];

    // When: Resampling
    let output = resampler.resample(&input).unwrap();

    // Then: About a third as many samples
    assert!((output.len() as i64 - 200).unsigned_abs() < 20, "got {}", output.len());
}

/// WHAT: Energy is the mean absolute amplitude
/// WHY: Endpointing compares it with the configured threshold
#[test]
fn given_chunks_when_measuring_energy_then_mean_absolute_amplitude() {
    // Given/When/Then
    assert_eq!(energy(&[]), 0.0);
    assert!((energy(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < f32::EPSILON);
    assert!(energy(&[0.001; 160]) < ListenerSettings::default().energy_threshold);
}

/// WHAT: Non-speech markers are removed from transcripts
/// WHY: "[BLANK_AUDIO]" must read as no speech, not as a query
#[test]
fn given_marked_transcript_when_trimming_then_only_words_remain() {
    // Given/When/Then
    assert_eq!(trim_transcript("  [BLANK_AUDIO]  "), "");
    assert_eq!(trim_transcript(" Open   notes [MUSIC] "), "Open notes");
}

/// WHAT: A missing model surfaces as ServiceUnavailable on capture
/// WHY: The listening loop reports it and keeps running
#[test]
fn given_missing_model_when_capturing_then_service_unavailable() {
    // Given: A listener pointed at a model that does not exist
    let listener = WhisperListener::new(ListenerSettings {
        model_path: PathBuf::from("/nonexistent/ggml-base.en.bin"),
        ..ListenerSettings::default()
    });

    // When: Capturing
    let result = listener.capture();

    // Then: ServiceUnavailable (no device or no model)
    assert!(matches!(result, Err(CoreError::ServiceUnavailable { .. })));
}

/// WHAT: The engine rejects a model path that does not exist
/// WHY: Model problems are reported as an unavailable recognizer
#[test]
fn given_invalid_model_path_when_creating_engine_then_service_unavailable() {
    // Given: Path to non-existent Whisper model
    let invalid_path = PathBuf::from("/nonexistent/model.bin");

    // When: Attempting to create the engine
    let result = WhisperEngine::new(&invalid_path, false);

    // Then
    assert!(matches!(result, Err(CoreError::ServiceUnavailable { .. })));
}

fn test_model_path() -> PathBuf {
    std::env::var("TEST_WHISPER_MODEL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("models/ggml-base.en.bin"))
}

/// WHAT: Empty samples are NoSpeechDetected
/// WHY: Transcription should not run on empty audio
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
fn given_empty_samples_when_transcribing_then_no_speech_detected() {
    // Given: Engine with a real model
    let engine = WhisperEngine::new(&test_model_path(), false).unwrap();

    // When
    let result = engine.transcribe(&[]);

    // Then
    assert!(matches!(result, Err(CoreError::NoSpeechDetected { .. })));
}
