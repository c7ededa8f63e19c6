use std::time::Instant;

use tracing::info;
use viki_core::{
    CoreResult,
    session::{Camera, CaptureDevice, Frame},
};

/// Synthetic camera producing moving colour bars.
///
/// Stands in for a webcam driver: every open succeeds and the stream never
/// ends on its own.
#[derive(Debug, Clone)]
pub struct TestPatternCamera {
    size: (u32, u32),
}

impl TestPatternCamera {
    /// Camera producing `size` frames.
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            size: (size.0.max(1), size.1.max(1)),
        }
    }
}

impl Camera for TestPatternCamera {
    fn open(&self) -> CoreResult<Box<dyn CaptureDevice>> {
        info!(width = self.size.0, height = self.size.1, "Test pattern camera opened");
        Ok(Box::new(TestPattern {
            size: self.size,
            tick: 0,
            opened: Instant::now(),
        }))
    }
}

const BARS: [[u8; 3]; 7] = [
    [192, 192, 192],
    [192, 192, 0],
    [0, 192, 192],
    [0, 192, 0],
    [192, 0, 192],
    [192, 0, 0],
    [0, 0, 192],
];

struct TestPattern {
    size: (u32, u32),
    tick: u32,
    opened: Instant,
}

impl TestPattern {
    fn render(&self) -> CoreResult<Frame> {
        let (width, height) = self.size;
        let bar_width = (width / BARS.len() as u32).max(1);
        // Scrolling bars plus a sweep line whose row follows wall time.
        let sweep = (self.opened.elapsed().as_millis() as u32 / 20) % height;

        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let rgb = if y == sweep {
                    [255, 255, 255]
                } else {
                    let bar = ((x + self.tick) / bar_width) as usize % BARS.len();
                    BARS[bar]
                };
                pixels.extend_from_slice(&rgb);
            }
        }
        Frame::new(width, height, pixels)
    }
}

impl CaptureDevice for TestPattern {
    fn next_frame(&mut self) -> CoreResult<Option<Frame>> {
        let frame = self.render()?;
        self.tick = self.tick.wrapping_add(2);
        Ok(Some(frame))
    }
}
