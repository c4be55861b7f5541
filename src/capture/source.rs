//! Frame source abstraction.
//!
//! The pipeline pulls frames one at a time from a [`FrameSource`]. A source
//! returns `Ok(None)` when the stream is exhausted; read failures are
//! reported as [`CaptureError`] and end the stream the same way.

use super::{CaptureConfig, Frame};
use image::{Rgb, RgbImage};
use std::time::Instant;
use thiserror::Error;

/// Errors that can occur while acquiring frames.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture device not found: {0}")]
    DeviceNotFound(String),
    #[error("failed to open frame source: {0}")]
    OpenFailed(String),
    #[error("failed to configure frame source: {0}")]
    ConfigFailed(String),
    #[error("failed to read frame: {0}")]
    ReadFailed(String),
    #[error("frame source not initialized")]
    NotInitialized,
}

/// A source of frames in strict temporal order.
pub trait FrameSource {
    /// Opens and initializes the source with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CaptureError>;

    /// Blocks until the next frame is available.
    ///
    /// Returns `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Checks if the source is currently open.
    fn is_open(&self) -> bool;

    /// Closes the source and releases resources.
    fn close(&mut self);
}

/// Description of the scene rendered by [`SyntheticSource`].
///
/// A single bright square moves over a uniform dark background. Positions and
/// sizes are in full-resolution pixels and advance once per frame.
#[derive(Debug, Clone)]
pub struct SyntheticScene {
    /// Top-left corner of the square on its first visible frame.
    pub start: (i32, i32),
    /// Displacement per frame.
    pub velocity: (i32, i32),
    /// Side length on the first visible frame.
    pub size: u32,
    /// Change of side length per frame (negative shrinks).
    pub growth: i32,
    /// Number of leading frames showing only the background.
    pub empty_frames: u64,
    /// Total number of frames before the stream ends, if bounded.
    pub length: Option<u64>,
    /// Background intensity.
    pub background: u8,
    /// Square colour.
    pub foreground: [u8; 3],
}

impl Default for SyntheticScene {
    fn default() -> Self {
        Self {
            start: (40, 180),
            velocity: (12, 0),
            size: 120,
            growth: 0,
            empty_frames: 1,
            length: None,
            background: 20,
            foreground: [230, 230, 230],
        }
    }
}

impl SyntheticScene {
    /// Square geometry `(x, y, side)` at the given zero-based frame index,
    /// or `None` while the scene is still empty or the square has vanished.
    pub fn square_at(&self, index: u64) -> Option<(i64, i64, u32)> {
        let visible = index.checked_sub(self.empty_frames)? as i64;
        let side = i64::from(self.size) + i64::from(self.growth) * visible;
        if side <= 0 {
            return None;
        }
        let x = i64::from(self.start.0) + i64::from(self.velocity.0) * visible;
        let y = i64::from(self.start.1) + i64::from(self.velocity.1) * visible;
        Some((x, y, side as u32))
    }

    fn render(&self, index: u64, width: u32, height: u32) -> RgbImage {
        let mut image = RgbImage::from_pixel(width, height, Rgb([self.background; 3]));
        if let Some((x, y, side)) = self.square_at(index) {
            let x0 = x.clamp(0, i64::from(width)) as u32;
            let y0 = y.clamp(0, i64::from(height)) as u32;
            let x1 = (x + i64::from(side)).clamp(0, i64::from(width)) as u32;
            let y1 = (y + i64::from(side)).clamp(0, i64::from(height)) as u32;
            for py in y0..y1 {
                for px in x0..x1 {
                    image.put_pixel(px, py, Rgb(self.foreground));
                }
            }
        }
        image
    }
}

/// Deterministic frame source rendering a [`SyntheticScene`].
///
/// Timestamps are spaced exactly `1 / fps` apart starting at the instant the
/// source was opened, so speed estimates are reproducible.
#[derive(Debug, Default)]
pub struct SyntheticSource {
    scene: SyntheticScene,
    config: Option<CaptureConfig>,
    origin: Option<Instant>,
    sequence: u64,
}

impl SyntheticSource {
    pub fn new(scene: SyntheticScene) -> Self {
        Self {
            scene,
            ..Default::default()
        }
    }

    /// Opens the source with timestamps anchored at `origin`.
    pub fn open_at(&mut self, config: &CaptureConfig, origin: Instant) -> Result<(), CaptureError> {
        self.open(config)?;
        self.origin = Some(origin);
        Ok(())
    }

    /// Returns the rendered scene description.
    pub fn scene(&self) -> &SyntheticScene {
        &self.scene
    }
}

impl FrameSource for SyntheticSource {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CaptureError> {
        config
            .validate()
            .map_err(|e| CaptureError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        self.origin = Some(Instant::now());
        self.sequence = 0;
        tracing::info!(?config, "synthetic source opened");
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        let config = self.config.as_ref().ok_or(CaptureError::NotInitialized)?;
        let origin = self.origin.ok_or(CaptureError::NotInitialized)?;

        if self.scene.length.is_some_and(|length| self.sequence >= length) {
            return Ok(None);
        }

        let Some(offset) = config.frame_offset(self.sequence + 1) else {
            tracing::warn!(sequence = self.sequence, "synthetic clock exhausted");
            return Ok(None);
        };
        let image = self.scene.render(self.sequence, config.width, config.height);
        let timestamp = origin + offset;

        self.sequence += 1;
        Ok(Some(Frame::with_timestamp(image, self.sequence, timestamp)))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        self.origin = None;
        tracing::info!("synthetic source closed");
    }
}
