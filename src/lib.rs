//! Artificial Retina
//!
//! A real-time motion and looming detector for live video. Each frame is
//! reduced to a low-resolution grayscale image, compared against an
//! adaptive background, and the largest moving region is tracked over a
//! short window to estimate its lateral speed and whether it is
//! approaching or receding.
//!
//! # Architecture
//!
//! The system follows a strictly sequential per-frame data flow:
//!
//! ```text
//! capture → preprocess → background ─→ blob → tracking → classification → display
//!                 ↓
//!          ganglion filter (visualization only)
//! ```
//!
//! # Design Principles
//!
//! - **Single focus of attention**: only the largest moving region is tracked
//! - **Explicit state**: the background and tracker histories live in one
//!   [`pipeline::RetinaContext`] owned by the frame loop
//! - **Fresh estimates**: speed and looming are recomputed from the history
//!   each cycle, never accumulated
//! - **Clean termination**: an exhausted or failing source ends the loop
//!   without an error
//!
//! # Example
//!
//! ```no_run
//! use artificial_retina::{
//!     capture::{CaptureConfig, FrameSource, SyntheticSource},
//!     display::NullSink,
//!     pipeline::FrameLoop,
//!     RetinaConfig,
//! };
//!
//! let config = RetinaConfig::default();
//! let mut source = SyntheticSource::default();
//! source.open(&config.capture).unwrap();
//!
//! let mut frame_loop = FrameLoop::new(config).unwrap();
//! let mut sink = NullSink;
//!
//! let remaining = std::cell::Cell::new(100);
//! let stop = || {
//!     remaining.set(remaining.get() - 1);
//!     remaining.get() == 0
//! };
//! let summary = frame_loop.run(&mut source, &mut sink, &stop);
//! println!("{:?}", summary.termination);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod config;
pub mod display;
pub mod metrics;
pub mod pipeline;
pub mod tracking;
pub mod vision;

// Re-export commonly used types at crate root
pub use capture::{CaptureConfig, Frame, FrameSource, SyntheticSource};
pub use config::{ConfigError, RetinaConfig};
pub use display::{DisplaySink, MemorySink, NullSink};
pub use pipeline::{Cycle, CycleOutcome, FrameLoop, RunSummary, StopFlag, Termination};
pub use tracking::{Classification, Looming, MotionEstimate, TemporalTracker};
pub use vision::{BackgroundModel, BlobExtractor, FocusRegion};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
