//! Prometheus metrics for the frame loop.
//!
//! # Metrics Exposed
//!
//! - `retina_frames_total` - Frames pulled from the source
//! - `retina_focus_cycles_total` - Cycles with a focus of attention
//! - `retina_danger_cycles_total` - Cycles classified as dangerous
//! - `retina_history_resets_total` - Tracker history clears
//! - `retina_lateral_speed` - Latest lateral speed (units/s)
//! - `retina_area_delta` - Latest looming area change
//! - `retina_history_length` - Samples currently buffered
//!
//! # Example
//!
//! ```no_run
//! use artificial_retina::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     frames: 120,
//!     focus_cycles: 80,
//!     danger_cycles: 12,
//!     history_resets: 4,
//!     lateral_speed: Some(18.2),
//!     area_delta: Some(35.0),
//!     history_length: 5,
//! };
//!
//! registry.update(&snapshot);
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
