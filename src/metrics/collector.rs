//! Metrics collection and registry.

use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of frame loop state for metrics update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// Frames pulled from the source.
    pub frames: u64,
    /// Cycles that produced a focus region.
    pub focus_cycles: u64,
    /// Cycles classified as dangerous.
    pub danger_cycles: u64,
    /// Times the tracker history was cleared.
    pub history_resets: u64,
    /// Lateral speed of the latest measured estimate.
    pub lateral_speed: Option<f64>,
    /// Area delta of the latest measured estimate.
    pub area_delta: Option<f64>,
    /// Samples currently buffered by the tracker.
    pub history_length: usize,
}

/// Prometheus metrics registry for the frame loop.
pub struct MetricsRegistry {
    registry: Registry,

    // Cycle counters
    frames_total: IntCounter,
    focus_cycles_total: IntCounter,
    danger_cycles_total: IntCounter,
    history_resets_total: IntCounter,

    // Latest estimate
    lateral_speed: Gauge,
    area_delta: Gauge,
    history_length: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new registry with all retina metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_total =
            IntCounter::new("retina_frames_total", "Total frames pulled from the source")?;
        let focus_cycles_total = IntCounter::new(
            "retina_focus_cycles_total",
            "Cycles in which a focus of attention was selected",
        )?;
        let danger_cycles_total = IntCounter::new(
            "retina_danger_cycles_total",
            "Cycles classified as dangerous motion",
        )?;
        let history_resets_total = IntCounter::new(
            "retina_history_resets_total",
            "Times the tracking history was cleared",
        )?;

        let lateral_speed = Gauge::new(
            "retina_lateral_speed",
            "Lateral speed of the latest estimate (units/s)",
        )?;
        let area_delta = Gauge::new(
            "retina_area_delta",
            "Area change of the latest estimate (pixel^2)",
        )?;
        let history_length = IntGauge::new(
            "retina_history_length",
            "Samples currently buffered by the tracker",
        )?;

        registry.register(Box::new(frames_total.clone()))?;
        registry.register(Box::new(focus_cycles_total.clone()))?;
        registry.register(Box::new(danger_cycles_total.clone()))?;
        registry.register(Box::new(history_resets_total.clone()))?;
        registry.register(Box::new(lateral_speed.clone()))?;
        registry.register(Box::new(area_delta.clone()))?;
        registry.register(Box::new(history_length.clone()))?;

        Ok(Self {
            registry,
            frames_total,
            focus_cycles_total,
            danger_cycles_total,
            history_resets_total,
            lateral_speed,
            area_delta,
            history_length,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // Counters only move forward, so increment by the difference.
        advance(&self.frames_total, snapshot.frames);
        advance(&self.focus_cycles_total, snapshot.focus_cycles);
        advance(&self.danger_cycles_total, snapshot.danger_cycles);
        advance(&self.history_resets_total, snapshot.history_resets);

        // No measurement reads as zero rather than the last object's value.
        self.lateral_speed.set(snapshot.lateral_speed.unwrap_or(0.0));
        self.area_delta.set(snapshot.area_delta.unwrap_or(0.0));
        self.history_length.set(snapshot.history_length as i64);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from the frame loop's statistics.
    pub fn from_loop(frame_loop: &crate::pipeline::FrameLoop) -> Self {
        let stats = frame_loop.stats();
        Self {
            frames: stats.frames,
            focus_cycles: stats.focus_cycles,
            danger_cycles: stats.danger_cycles,
            history_resets: stats.history_resets,
            lateral_speed: stats.last_speed,
            area_delta: stats.last_area_delta,
            history_length: frame_loop.context().tracker.positions().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_retina_metrics_register() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_snapshot_published() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            frames: 10,
            focus_cycles: 6,
            danger_cycles: 2,
            history_resets: 3,
            lateral_speed: Some(12.5),
            area_delta: Some(-60.0),
            history_length: 4,
        };

        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("retina_frames_total 10"));
        assert!(output.contains("retina_focus_cycles_total 6"));
        assert!(output.contains("retina_lateral_speed 12.5"));
        assert!(output.contains("retina_history_length 4"));
    }

    #[test]
    fn test_counters_never_decrease() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&MetricsSnapshot {
            frames: 5,
            ..Default::default()
        });
        registry.update(&MetricsSnapshot {
            frames: 3,
            ..Default::default()
        });

        assert!(registry.encode().unwrap().contains("retina_frames_total 5"));
    }

    #[test]
    fn test_missing_measurement_zeroes_gauges() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&MetricsSnapshot {
            lateral_speed: Some(31.5),
            area_delta: Some(220.0),
            ..Default::default()
        });
        registry.update(&MetricsSnapshot::default());

        let output = registry.encode().unwrap();
        assert!(output.contains("retina_lateral_speed 0"));
        assert!(output.contains("retina_area_delta 0"));
        assert!(!output.contains("retina_lateral_speed 31.5"));
    }

    #[test]
    fn test_unset_gauges_still_exported() {
        let registry = MetricsRegistry::new().unwrap();
        let output = registry.encode().unwrap();

        assert!(output.contains("retina_danger_cycles_total"));
        assert!(output.contains("retina_history_resets_total"));
        assert!(output.contains("retina_area_delta"));
    }
}
