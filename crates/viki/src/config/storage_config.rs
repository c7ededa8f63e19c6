use crate::config::data_dir;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where commands, recordings and photos live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Durable JSON command file.
    #[serde(default = "default_commands_file")]
    pub commands_file: PathBuf,

    /// Human-readable `trigger: target` mirror of the command file.
    #[serde(default = "default_export_file")]
    pub export_file: PathBuf,

    /// Directory for `viki_recording_<unix>.<ext>` recordings.
    #[serde(default = "default_recordings_dir")]
    pub recordings_dir: PathBuf,

    /// Directory for `viki_photo_<unix>.png` photos.
    #[serde(default = "default_photos_dir")]
    pub photos_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            commands_file: default_commands_file(),
            export_file: default_export_file(),
            recordings_dir: default_recordings_dir(),
            photos_dir: default_photos_dir(),
        }
    }
}

fn default_commands_file() -> PathBuf {
    data_dir().join("custom_commands.json")
}

fn default_export_file() -> PathBuf {
    data_dir().join("custom_commands.txt")
}

fn default_recordings_dir() -> PathBuf {
    data_dir().join("recordings")
}

fn default_photos_dir() -> PathBuf {
    data_dir().join("photos")
}
