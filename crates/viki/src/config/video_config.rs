use crate::config::{DEFAULT_FPS, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, StorageConfig};

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;
use viki_core::session::{VideoFormat, VideoSettings};

/// Video preview and recording configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Preview and recording frame rate.
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Normalised frame width.
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,

    /// Normalised frame height.
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,

    /// Container used when a recording names none (`mp4` or `avi`).
    #[serde(default = "default_format")]
    pub default_format: String,
}

impl VideoConfig {
    /// Settings for the video session, with directories from `storage`.
    pub fn video_settings(&self, storage: &StorageConfig) -> VideoSettings {
        VideoSettings {
            fps: self.fps.max(1),
            frame_size: (self.frame_width.max(1), self.frame_height.max(1)),
            recordings_dir: storage.recordings_dir.clone(),
            photos_dir: storage.photos_dir.clone(),
        }
    }

    /// The configured default container, `mp4` when unrecognised.
    pub fn format(&self) -> VideoFormat {
        VideoFormat::from_str(&self.default_format).unwrap_or_else(|e| {
            warn!(format = %self.default_format, error = %e, "Unknown video format, using mp4");
            VideoFormat::Mp4
        })
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            default_format: default_format(),
        }
    }
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

fn default_frame_width() -> u32 {
    DEFAULT_FRAME_WIDTH
}

fn default_frame_height() -> u32 {
    DEFAULT_FRAME_HEIGHT
}

fn default_format() -> String {
    VideoFormat::Mp4.extension().to_string()
}
