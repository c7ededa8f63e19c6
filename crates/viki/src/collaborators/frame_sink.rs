//! Recording sink that writes PNG frames plus a JSON manifest.
//!
//! A recording at `.../viki_recording_<unix>.mp4` becomes a directory of that
//! name holding `frame_000000.png`, `frame_000001.png`, ... and
//! [`MANIFEST_FILE`], which names the codec tag, frame rate and size an
//! encoder would need to assemble the container.

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use serde::Serialize;
use tracing::{info, instrument, warn};
use viki_core::{
    CoreError, CoreResult,
    session::{Frame, SinkFactory, VideoFormat, VideoSink},
};

/// Written when the recording is closed.
pub(crate) const MANIFEST_FILE: &str = "manifest.json";

/// [`SinkFactory`] for frame-sequence recordings.
#[derive(Debug, Default)]
pub struct FrameSequenceSinks;

impl SinkFactory for FrameSequenceSinks {
    #[track_caller]
    #[instrument(skip(self))]
    fn open_sink(
        &self,
        path: &Path,
        format: VideoFormat,
        fps: u32,
        size: (u32, u32),
    ) -> CoreResult<Box<dyn VideoSink>> {
        fs::create_dir_all(path).map_err(|e| CoreError::SinkUnavailable {
            reason: format!("{}: {}", path.display(), e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(path = ?path, %format, fps, "Frame sequence opened");

        Ok(Box::new(FrameSequence {
            dir: path.to_path_buf(),
            manifest: Manifest {
                container: format.extension(),
                fourcc: String::from_utf8_lossy(&format.fourcc()).into_owned(),
                fps,
                width: size.0,
                height: size.1,
                frames: 0,
            },
        }))
    }
}

#[derive(Debug, Serialize)]
struct Manifest {
    container: &'static str,
    fourcc: String,
    fps: u32,
    width: u32,
    height: u32,
    frames: u64,
}

struct FrameSequence {
    dir: PathBuf,
    manifest: Manifest,
}

impl VideoSink for FrameSequence {
    #[track_caller]
    fn write(&mut self, frame: &Frame) -> CoreResult<()> {
        let expected = (self.manifest.width, self.manifest.height);
        if frame.size() != expected {
            return Err(CoreError::SinkUnavailable {
                reason: format!("frame is {:?}, recording is {:?}", frame.size(), expected),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let file = self
            .dir
            .join(format!("frame_{:06}.png", self.manifest.frames));
        frame.save_png(&file).map_err(|e| CoreError::SinkUnavailable {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;
        self.manifest.frames += 1;
        Ok(())
    }

    #[track_caller]
    fn close(self: Box<Self>) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(&self.manifest).map_err(|e| {
            CoreError::Serialization {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        if let Err(e) = fs::write(self.dir.join(MANIFEST_FILE), json) {
            warn!(dir = ?self.dir, error = %e, "Manifest not written");
            return Err(e.into());
        }

        info!(dir = ?self.dir, frames = self.manifest.frames, "Frame sequence closed");
        Ok(())
    }
}
