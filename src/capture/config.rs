//! Capture device configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Highest frame rate a source may request.
pub const MAX_FPS: u32 = 240;

/// Configuration for the frame source.
///
/// The dimensions describe the full-resolution frames handed to the
/// pipeline. Recorded sources use `fps` to space frame timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera device index.
    pub device_id: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Target frames per second.
    pub fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the capture parameters.
    pub fn validate(&self) -> Result<(), CaptureConfigError> {
        if self.width < 2 || self.height < 2 {
            return Err(CaptureConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(1..=MAX_FPS).contains(&self.fps) {
            return Err(CaptureConfigError::InvalidFrameRate(self.fps));
        }
        Ok(())
    }

    /// Interval between consecutive frames at the configured rate.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }

    /// Offset of frame `index` from the stream origin, `None` once it no
    /// longer fits.
    pub fn frame_offset(&self, index: u64) -> Option<Duration> {
        let index = u32::try_from(index).ok()?;
        self.frame_interval().checked_mul(index)
    }
}

/// Capture configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureConfigError {
    #[error("frames of {width}x{height} are too small to track anything")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("frame rate {0} outside 1-240 fps")]
    InvalidFrameRate(u32),
}
