use crate::{AppError, config::Config};

use std::{fs, time::Duration};

use tempfile::TempDir;
use viki_core::session::VideoFormat;

/// WHAT: A partial file loads and fills everything else from defaults
/// WHY: Users only write the settings they change
#[test]
#[allow(clippy::unwrap_used)]
fn given_partial_file_when_loading_then_defaults_fill_gaps() {
    // Given: A file overriding two fields
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[video]\nfps = 15\n\n[dialog]\nmax_detail_rounds = 2\n",
    )
    .unwrap();

    // When
    let config = Config::load_from(&path).unwrap();

    // Then: Overrides applied, the rest default
    assert_eq!(config.video.fps, 15);
    assert_eq!(config.video.frame_width, 640);
    assert_eq!(config.dialog.max_detail_rounds, Some(2));
    assert_eq!(config.dialog.summary_sentences, 3);
    assert_eq!(config.shell.drain_tick(), Duration::from_millis(100));
    assert!(config.speech.speak_aloud);
    assert_eq!(
        config.knowledge.api_endpoint,
        "https://en.wikipedia.org/w/api.php"
    );
}

/// WHAT: Saved configuration reads back unchanged
/// WHY: The default file written on first start must be loadable
#[test]
#[allow(clippy::unwrap_used)]
fn given_saved_config_when_reloading_then_values_preserved() {
    // Given: A modified configuration
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let mut config = Config::default();
    config.video.default_format = "avi".to_string();
    config.shell.hotkey_enabled = false;
    config.storage.photos_dir = dir.path().join("photos");

    // When
    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();

    // Then: Values survive and no temp file is left behind
    assert_eq!(loaded.video.format(), VideoFormat::Avi);
    assert!(!loaded.shell.hotkey_enabled);
    assert_eq!(loaded.storage.photos_dir, dir.path().join("photos"));
    assert_eq!(loaded.dialog.max_detail_rounds, None);
    assert!(!path.with_extension("toml.tmp").exists());
}

/// WHAT: Malformed TOML is a ConfigError
/// WHY: Startup reports the problem instead of running with surprises
#[test]
#[allow(clippy::unwrap_used)]
fn given_malformed_file_when_loading_then_config_error() {
    // Given
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[video\nfps = ").unwrap();

    // When
    let result = Config::load_from(&path);

    // Then
    assert!(matches!(result, Err(AppError::ConfigError { .. })));
}

/// WHAT: Unknown formats fall back to mp4 and zero sizes are clamped
/// WHY: A typo in the file must not disable recording
#[test]
fn given_odd_video_values_when_building_settings_then_sane_values_used() {
    // Given
    let mut config = Config::default();
    config.video.default_format = "webm".to_string();
    config.video.fps = 0;
    config.video.frame_width = 0;

    // When
    let settings = config.assistant_settings();

    // Then
    assert_eq!(config.video.format(), VideoFormat::Mp4);
    assert_eq!(settings.video.fps, 1);
    assert_eq!(settings.video.frame_size, (1, 480));
    assert_eq!(settings.video.recordings_dir, config.storage.recordings_dir);
}

/// WHAT: A missing model path is reported, not fatal
/// WHY: Typed commands and video work without speech recognition
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_model_when_validating_then_config_error() {
    // Given
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.speech.model_path = dir.path().join("absent.bin");

    // When/Then
    assert!(matches!(
        config.validate_model_path(),
        Err(AppError::ConfigError { .. })
    ));

    // Given: The file exists
    fs::write(&config.speech.model_path, b"model").unwrap();

    // When/Then
    assert!(config.validate_model_path().is_ok());
}
