//! Configuration management for viki.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, per-field defaults, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        DialogConfig, KnowledgeConfig, ShellConfig, SpeechConfig, StorageConfig, VideoConfig,
        project_dirs,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use viki_core::AssistantSettings;

/// Main configuration struct.
///
/// Every section and field has a default, so a partial file loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Command, recording and photo locations.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Recognition and synthesis.
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Preview and recording.
    #[serde(default)]
    pub video: VideoConfig,
    /// Lookup dialog.
    #[serde(default)]
    pub dialog: DialogConfig,
    /// Tray, hotkey and console.
    #[serde(default)]
    pub shell: ShellConfig,
    /// Encyclopedia lookup.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    ///
    /// Note: This does NOT validate the model path exists. A missing model
    /// surfaces as "speech service unavailable" on each listening attempt,
    /// so typed commands and video keep working without it.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let config = Self::load_from(&config_path)?;
            info!(config_path = ?config_path, "Configuration loaded");
            Ok(config)
        } else {
            info!("No config found, creating default");
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Read and parse a configuration file.
    #[track_caller]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Check that the Whisper model file exists at the configured path.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate_model_path(&self) -> AppResult<()> {
        if !self.speech.model_path.exists() {
            return Err(AppError::ConfigError {
                reason: format!(
                    "Whisper model not found at: {:?}. Download a model or set [speech] model_path.",
                    self.speech.model_path
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    /// Warn about settings that will degrade features at runtime.
    pub fn report_problems(&self) {
        if let Err(e) = self.validate_model_path() {
            warn!(error = %e, "Listening will report the speech service as unavailable");
        }
    }

    /// Settings handed to the assistant core.
    pub fn assistant_settings(&self) -> AssistantSettings {
        AssistantSettings {
            listening: self.speech.listening_settings(),
            video: self.video.video_settings(&self.storage),
            dialog: self.dialog.dialog_settings(),
        }
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = project_dirs().ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get config directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }
}
