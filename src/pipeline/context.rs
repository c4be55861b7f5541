//! State carried from one cycle to the next.

use crate::config::RetinaConfig;
use crate::tracking::TemporalTracker;
use crate::vision::BackgroundModel;
use std::time::Instant;

/// The only cross-frame state of the pipeline.
///
/// Owned by the frame loop, which mutates the background before the tracker
/// in every cycle.
#[derive(Debug, Clone)]
pub struct RetinaContext {
    /// Running-average background, seeded by the first frame.
    pub background: BackgroundModel,
    /// Position and area history of the focus region.
    pub tracker: TemporalTracker,
}

impl RetinaContext {
    /// Build unseeded state; `started_at` is the tracker's initial timestamp.
    pub fn new(config: &RetinaConfig, started_at: Instant) -> Self {
        let detection = &config.detection;
        Self {
            background: BackgroundModel::new(
                detection.adaptation_rate,
                detection.foreground_threshold,
                detection.dilation_iterations,
            ),
            tracker: TemporalTracker::new(&config.tracking, started_at),
        }
    }
}
