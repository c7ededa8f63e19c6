use crate::{CoreError, CoreResult, session::Frame};

use std::{fmt, panic::Location, path::Path, str::FromStr};

use error_location::ErrorLocation;

/// Opens the capture device for one video session.
pub trait Camera: Send + Sync {
    /// Open the device. Fails with `DeviceUnavailable`.
    fn open(&self) -> CoreResult<Box<dyn CaptureDevice>>;
}

/// An open capture device. Dropping it releases the device.
pub trait CaptureDevice: Send {
    /// Read the next frame. `Ok(None)` signals end of stream.
    fn next_frame(&mut self) -> CoreResult<Option<Frame>>;
}

/// Opens encoders for recordings.
pub trait SinkFactory: Send + Sync {
    /// Open a sink at `path`. Fails with `SinkUnavailable`.
    fn open_sink(
        &self,
        path: &Path,
        format: VideoFormat,
        fps: u32,
        size: (u32, u32),
    ) -> CoreResult<Box<dyn VideoSink>>;
}

/// An open recording.
pub trait VideoSink: Send {
    /// Append one frame.
    fn write(&mut self, frame: &Frame) -> CoreResult<()>;

    /// Flush and close.
    fn close(self: Box<Self>) -> CoreResult<()>;
}

/// Supported recording containers, each bound to one codec tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoFormat {
    /// MPEG-4 container, `mp4v`.
    #[default]
    Mp4,
    /// AVI container, `XVID`.
    Avi,
}

impl VideoFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Avi => "avi",
        }
    }

    /// Four-character codec tag.
    pub fn fourcc(self) -> [u8; 4] {
        match self {
            VideoFormat::Mp4 => *b"mp4v",
            VideoFormat::Avi => *b"XVID",
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for VideoFormat {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "mp4" => Ok(VideoFormat::Mp4),
            "avi" => Ok(VideoFormat::Avi),
            other => Err(CoreError::InvalidState {
                reason: format!("Unsupported video format: {}", other),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
