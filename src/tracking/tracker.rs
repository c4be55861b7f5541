//! Temporal smoothing of the focus trajectory.
//!
//! Speed and looming are recomputed from scratch every cycle from two short
//! histories. Nothing else persists between cycles except the timestamp of
//! the last update.

use super::HistoryBuffer;
use crate::config::TrackingConfig;
use crate::vision::Point;
use std::fmt;
use std::time::Instant;

/// Depth-wise motion inferred from apparent area change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Looming {
    Stationary,
    Approaching,
    Receding,
}

impl Looming {
    /// Classifies an area change against a symmetric threshold.
    pub fn from_area_delta(area_delta: f64, threshold: f64) -> Self {
        if area_delta > threshold {
            Looming::Approaching
        } else if area_delta < -threshold {
            Looming::Receding
        } else {
            Looming::Stationary
        }
    }
}

impl fmt::Display for Looming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Looming::Stationary => "Stationary",
            Looming::Approaching => "APPROACHING",
            Looming::Receding => "Receding",
        })
    }
}

/// Result of one tracker update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionEstimate {
    /// No time elapsed since the previous update; history untouched.
    Static,
    /// Fewer than two samples buffered.
    Analyzing,
    Measured {
        /// Lateral speed in metric units per second.
        speed: f64,
        looming: Looming,
        /// Current area minus the mean of the earlier buffered areas.
        area_delta: f64,
    },
}

impl MotionEstimate {
    /// Lateral speed, zero when no measurement is available.
    pub fn speed(&self) -> f64 {
        match self {
            MotionEstimate::Measured { speed, .. } => *speed,
            _ => 0.0,
        }
    }

    pub fn looming(&self) -> Option<Looming> {
        match self {
            MotionEstimate::Measured { looming, .. } => Some(*looming),
            _ => None,
        }
    }

    pub fn area_delta(&self) -> Option<f64> {
        match self {
            MotionEstimate::Measured { area_delta, .. } => Some(*area_delta),
            _ => None,
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, MotionEstimate::Measured { .. })
    }
}

impl fmt::Display for MotionEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionEstimate::Static => f.write_str("Static"),
            MotionEstimate::Analyzing => f.write_str("Analyzing..."),
            MotionEstimate::Measured { looming, .. } => write!(f, "{}", looming),
        }
    }
}

/// Bounded-history tracker for the focus of attention.
#[derive(Debug, Clone)]
pub struct TemporalTracker {
    positions: HistoryBuffer<Point>,
    areas: HistoryBuffer<f64>,
    previous: Instant,
    pixel_to_metric: f64,
    looming_threshold: f64,
}

impl TemporalTracker {
    /// Creates a tracker whose first interval is measured from `started_at`.
    pub fn new(config: &TrackingConfig, started_at: Instant) -> Self {
        Self {
            positions: HistoryBuffer::with_capacity(config.history_length),
            areas: HistoryBuffer::with_capacity(config.history_length),
            previous: started_at,
            pixel_to_metric: config.pixel_to_metric,
            looming_threshold: config.looming_threshold,
        }
    }

    /// Records a new observation and estimates motion.
    ///
    /// Speed is the displacement between the oldest and newest buffered
    /// positions divided by the latest interval times the buffer length.
    /// This approximates the elapsed time of the whole window with the most
    /// recent interval.
    pub fn update(&mut self, center: Point, area: f64, now: Instant) -> MotionEstimate {
        let dt = now.saturating_duration_since(self.previous);
        self.previous = now;
        if dt.is_zero() {
            return MotionEstimate::Static;
        }

        self.positions.push(center);
        self.areas.push(area);

        let len = self.positions.len();
        if len < 2 {
            return MotionEstimate::Analyzing;
        }
        let (Some(oldest), Some(newest)) = (self.positions.oldest(), self.positions.newest())
        else {
            return MotionEstimate::Analyzing;
        };

        let distance = oldest.distance(newest) * self.pixel_to_metric;
        let speed = distance / (dt.as_secs_f64() * len as f64);

        let area_delta = area - self.past_area_mean();
        let looming = Looming::from_area_delta(area_delta, self.looming_threshold);

        tracing::trace!(
            speed,
            area_delta,
            samples = len,
            dt_ms = dt.as_secs_f64() * 1e3,
            "motion estimated"
        );

        MotionEstimate::Measured {
            speed,
            looming,
            area_delta,
        }
    }

    /// Mean of all buffered areas except the newest.
    fn past_area_mean(&self) -> f64 {
        let past = self.areas.len().saturating_sub(1);
        if past == 0 {
            return 0.0;
        }
        self.areas.iter().take(past).sum::<f64>() / past as f64
    }

    /// Forgets the trajectory so a new object starts from scratch.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.areas.clear();
    }

    /// Buffered positions from oldest to newest.
    pub fn trail(&self) -> Vec<Point> {
        self.positions.iter().copied().collect()
    }

    pub fn positions(&self) -> &HistoryBuffer<Point> {
        &self.positions
    }

    pub fn areas(&self) -> &HistoryBuffer<f64> {
        &self.areas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const STEP: Duration = Duration::from_millis(100);

    fn tracker() -> (TemporalTracker, Instant) {
        let start = Instant::now();
        (TemporalTracker::new(&TrackingConfig::default(), start), start)
    }

    #[test]
    fn test_first_sample_is_analyzing() {
        let (mut tracker, start) = tracker();
        let estimate = tracker.update(Point::new(10, 10), 100.0, start + STEP);
        assert_eq!(estimate, MotionEstimate::Analyzing);
        assert_eq!(estimate.speed(), 0.0);
        assert_eq!(tracker.positions().len(), 1);
    }

    #[test]
    fn test_zero_dt_leaves_history_alone() {
        let (mut tracker, start) = tracker();
        tracker.update(Point::new(10, 10), 100.0, start + STEP);

        let estimate = tracker.update(Point::new(50, 50), 900.0, start + STEP);
        assert_eq!(estimate, MotionEstimate::Static);
        assert_eq!(tracker.positions().len(), 1);
        assert_eq!(tracker.areas().len(), 1);
    }

    #[test]
    fn test_zero_dt_on_construction_instant() {
        let (mut tracker, start) = tracker();
        assert_eq!(
            tracker.update(Point::new(1, 1), 1.0, start),
            MotionEstimate::Static
        );
        assert!(tracker.positions().is_empty());
    }

    #[test]
    fn test_speed_uses_latest_interval_times_length() {
        let (mut tracker, start) = tracker();
        tracker.update(Point::new(0, 0), 100.0, start + STEP);
        let estimate = tracker.update(Point::new(300, 400), 100.0, start + STEP * 2);

        // 500 px * 0.05 = 25 units over 0.1 s * 2 samples
        assert!((estimate.speed() - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_speed_spans_oldest_to_newest() {
        let (mut tracker, start) = tracker();
        for i in 0..7u32 {
            tracker.update(Point::new(i * 10, 0), 100.0, start + STEP * (i + 1));
        }
        // After the push the window holds x = 30..=70.
        let estimate = tracker.update(Point::new(70, 0), 100.0, start + STEP * 8);
        let expected = 40.0 * 0.05 / (0.1 * 5.0);
        assert!((estimate.speed() - expected).abs() < 1e-9);
        assert_eq!(tracker.positions().len(), 5);
    }

    #[test]
    fn test_looming_thresholds() {
        for (current, expected) in [
            (160.0, Looming::Approaching),
            (40.0, Looming::Receding),
            (120.0, Looming::Stationary),
        ] {
            let (mut tracker, start) = tracker();
            for i in 1..=4u32 {
                tracker.update(Point::new(100, 100), 100.0, start + STEP * i);
            }
            let estimate = tracker.update(Point::new(100, 100), current, start + STEP * 5);
            assert_eq!(estimate.looming(), Some(expected));
            assert!((estimate.area_delta().unwrap() - (current - 100.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_looming_boundary_is_stationary() {
        assert_eq!(Looming::from_area_delta(50.0, 50.0), Looming::Stationary);
        assert_eq!(Looming::from_area_delta(-50.0, 50.0), Looming::Stationary);
        assert_eq!(Looming::from_area_delta(50.5, 50.0), Looming::Approaching);
    }

    #[test]
    fn test_constant_input_settles() {
        let (mut tracker, start) = tracker();
        let mut estimate = MotionEstimate::Static;
        for i in 1..=5u32 {
            estimate = tracker.update(Point::new(64, 48), 2500.0, start + STEP * i);
        }
        assert_eq!(estimate.speed(), 0.0);
        assert_eq!(estimate.looming(), Some(Looming::Stationary));
    }

    #[test]
    fn test_clear_empties_both_histories() {
        let (mut tracker, start) = tracker();
        tracker.update(Point::new(1, 1), 10.0, start + STEP);
        tracker.update(Point::new(2, 2), 10.0, start + STEP * 2);
        tracker.clear();

        assert!(tracker.positions().is_empty());
        assert!(tracker.areas().is_empty());
        assert!(tracker.trail().is_empty());

        let estimate = tracker.update(Point::new(3, 3), 10.0, start + STEP * 3);
        assert_eq!(estimate, MotionEstimate::Analyzing);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(MotionEstimate::Static.to_string(), "Static");
        assert_eq!(MotionEstimate::Analyzing.to_string(), "Analyzing...");
        let measured = MotionEstimate::Measured {
            speed: 1.0,
            looming: Looming::Approaching,
            area_delta: 60.0,
        };
        assert_eq!(measured.to_string(), "APPROACHING");
    }
}
