//! Frame acquisition.
//!
//! This module provides the [`FrameSource`] abstraction the frame loop pulls
//! from, plus deterministic and recorded sources. A live camera source is
//! available with the `camera` feature.

#[cfg(feature = "camera")]
mod camera;
mod config;
mod frame;
mod sequence;
mod source;

#[cfg(feature = "camera")]
pub use camera::NokhwaCamera;
pub use config::{CaptureConfig, CaptureConfigError};
pub use frame::Frame;
pub use sequence::ImageSequenceSource;
pub use source::{CaptureError, FrameSource, SyntheticScene, SyntheticSource};
