#[allow(clippy::module_inception)]
mod config;
mod dialog_config;
mod knowledge_config;
mod shell_config;
mod speech_config;
mod storage_config;
mod video_config;

pub(crate) use {
    config::Config, dialog_config::DialogConfig, knowledge_config::KnowledgeConfig,
    shell_config::ShellConfig, speech_config::SpeechConfig, storage_config::StorageConfig,
    video_config::VideoConfig,
};

use std::path::PathBuf;

use directories::ProjectDirs;

pub(crate) const QUALIFIER: &str = "com";
pub(crate) const ORGANIZATION: &str = "viki";
pub(crate) const APPLICATION: &str = "Viki";

pub(crate) const DEFAULT_FPS: u32 = 30;
pub(crate) const DEFAULT_FRAME_WIDTH: u32 = 640;
pub(crate) const DEFAULT_FRAME_HEIGHT: u32 = 480;
pub(crate) const DEFAULT_SUMMARY_SENTENCES: usize = 3;
pub(crate) const DEFAULT_DETAIL_SENTENCES: usize = 5;
pub(crate) const DEFAULT_DRAIN_TICK_MS: u64 = 100;

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Per-user data directory, or the working directory when the platform has none.
pub(crate) fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub(crate) fn default_true() -> bool {
    true
}
