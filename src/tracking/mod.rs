//! Temporal tracking and motion classification.
//!
//! The tracker keeps short position and area histories of the focus of
//! attention and derives lateral speed and looming from them. The classifier
//! folds both into a single danger flag.

mod classifier;
mod history;
mod tracker;

pub use classifier::{Classification, Indicator, MotionClassifier};
pub use history::HistoryBuffer;
pub use tracker::{Looming, MotionEstimate, TemporalTracker};
