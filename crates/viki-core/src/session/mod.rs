//! Background worker sessions and the frame cell they share.

mod device;
mod frame;
mod listening;
mod video;

pub use device::{Camera, CaptureDevice, SinkFactory, VideoFormat, VideoSink};
pub use frame::{Frame, FrameSlot};
pub use listening::{ListeningSession, ListeningSettings, ListeningState};
pub use video::{RecordingSummary, VideoSession, VideoSettings, VideoState};

use crate::CoreResult;

use std::{
    fs,
    path::{Path, PathBuf},
};

/// `<dir>/<prefix>_<unix-seconds>.<ext>`, creating `dir` if needed.
pub(crate) fn timestamped_path(dir: &Path, prefix: &str, ext: &str) -> CoreResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let stamp = chrono::Utc::now().timestamp();
    Ok(dir.join(format!("{}_{}.{}", prefix, stamp, ext)))
}
