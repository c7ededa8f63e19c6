use crate::{CoreError, CoreResult};

use std::{
    fmt,
    panic::Location,
    path::Path,
    sync::{Mutex, MutexGuard},
};

use error_location::ErrorLocation;
use image::{ExtendedColorType, RgbImage, imageops::FilterType};
use tracing::{debug, instrument};

/// One decoded RGB8 video frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// Wrap a tightly packed RGB8 buffer of `width * height * 3` bytes.
    #[track_caller]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> CoreResult<Self> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(CoreError::InvalidFrame {
                reason: format!(
                    "{}x{} frame needs {} bytes, got {}",
                    width,
                    height,
                    expected,
                    pixels.len()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A frame of a single colour.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Packed RGB8 bytes, row major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Scale to `size`, or return `self` unchanged when it already fits.
    pub fn fit(self, size: (u32, u32)) -> Self {
        if self.size() == size || size.0 == 0 || size.1 == 0 {
            return self;
        }
        let (width, height) = size;
        match RgbImage::from_raw(self.width, self.height, self.pixels) {
            Some(image) => {
                let scaled = image::imageops::resize(&image, width, height, FilterType::Triangle);
                Self {
                    width,
                    height,
                    pixels: scaled.into_raw(),
                }
            }
            // Unreachable for frames built through `new`/`solid`.
            None => Self::solid(width, height, [0, 0, 0]),
        }
    }

    /// Encode as PNG at `path`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_png(&self, path: &Path) -> CoreResult<()> {
        image::save_buffer_with_format(
            path,
            &self.pixels,
            self.width,
            self.height,
            ExtendedColorType::Rgb8,
            image::ImageFormat::Png,
        )?;
        debug!(path = ?path, "Frame written as PNG");
        Ok(())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Latest-frame cell shared by the video worker and its readers.
///
/// One writer overwrites; readers receive an owned copy, so a reader never
/// observes a frame while it is being replaced.
#[derive(Debug, Default)]
pub struct FrameSlot {
    current: Mutex<Option<Frame>>,
}

impl FrameSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame.
    pub fn store(&self, frame: Frame) {
        *self.lock() = Some(frame);
    }

    /// Copy of the current frame, if any has been produced.
    pub fn snapshot(&self) -> Option<Frame> {
        self.lock().clone()
    }

    /// Size of the current frame without copying it.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.lock().as_ref().map(Frame::size)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Frame>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
