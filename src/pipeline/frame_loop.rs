//! The per-frame cycle and the loop that drives it.

use super::{RetinaContext, StopSignal};
use crate::capture::{Frame, FrameSource};
use crate::config::{ConfigError, RetinaConfig};
use crate::display::{
    draw_focus, draw_trail, DisplaySink, Hud, LayerImage, GANGLION_LAYER, OUTPUT_LAYER,
};
use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use crate::tracking::{Classification, MotionClassifier, MotionEstimate};
use crate::vision::{BackgroundError, BlobExtractor, ContrastFilter, FocusRegion, Point, Preprocessor};
use chrono::{DateTime, Utc};
use image::{GrayImage, RgbImage};
use std::time::Instant;
use thiserror::Error;

/// Errors that abort a cycle.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("background model: {0}")]
    Background(#[from] BackgroundError),
}

/// What a cycle concluded about the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// First frame absorbed into the background; nothing detected.
    Seeded,
    /// No qualifying blob; the tracker history was cleared.
    NoFocus,
    Tracked {
        focus: FocusRegion,
        estimate: MotionEstimate,
        classification: Classification,
        /// Buffered positions, oldest first.
        trail: Vec<Point>,
    },
}

/// Result of processing one frame.
#[derive(Debug, Clone)]
pub struct Cycle {
    pub sequence: u64,
    pub outcome: CycleOutcome,
    /// Full-resolution output, annotated when tracking. `None` when seeding.
    pub output: Option<RgbImage>,
    /// Contrast map, when enabled and not seeding.
    pub contrast: Option<GrayImage>,
    pub hud: Option<Hud>,
}

impl Cycle {
    pub fn focus(&self) -> Option<&FocusRegion> {
        match &self.outcome {
            CycleOutcome::Tracked { focus, .. } => Some(focus),
            _ => None,
        }
    }

    pub fn estimate(&self) -> Option<&MotionEstimate> {
        match &self.outcome {
            CycleOutcome::Tracked { estimate, .. } => Some(estimate),
            _ => None,
        }
    }
}

/// Running counters over the lifetime of a loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopStats {
    pub frames: u64,
    pub focus_cycles: u64,
    pub danger_cycles: u64,
    pub history_resets: u64,
    pub last_speed: Option<f64>,
    pub last_area_delta: Option<f64>,
}

/// Why [`FrameLoop::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    StopRequested,
    EndOfStream,
    SourceFailed(String),
    PipelineFailed(String),
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub termination: Termination,
    pub stats: LoopStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Orchestrates preprocessing, background update, focus selection,
/// tracking and classification for each frame.
pub struct FrameLoop {
    config: RetinaConfig,
    preprocessor: Preprocessor,
    contrast: Option<ContrastFilter>,
    extractor: BlobExtractor,
    classifier: MotionClassifier,
    context: RetinaContext,
    stats: LoopStats,
    disabled_layers: Vec<&'static str>,
    metrics: Option<MetricsRegistry>,
}

impl FrameLoop {
    /// Validates `config` and builds a loop whose tracker clock starts now.
    pub fn new(config: RetinaConfig) -> Result<Self, ConfigError> {
        Self::starting_at(config, Instant::now())
    }

    /// Builds a loop whose tracker measures its first interval from
    /// `started_at`.
    pub fn starting_at(config: RetinaConfig, started_at: Instant) -> Result<Self, ConfigError> {
        config.validate()?;

        let detection = &config.detection;
        let contrast = config.display.show_ganglion.then(|| {
            ContrastFilter::new(config.ganglion.center_kernel, config.ganglion.surround_kernel)
        });

        Ok(Self {
            preprocessor: Preprocessor::new(detection.retina_width, detection.retina_height),
            contrast,
            extractor: BlobExtractor::new(detection.min_area),
            classifier: MotionClassifier::new(config.classifier.danger_speed),
            context: RetinaContext::new(&config, started_at),
            stats: LoopStats::default(),
            disabled_layers: Vec::new(),
            metrics: None,
            config,
        })
    }

    /// Publishes loop statistics to `registry` after every cycle.
    pub fn with_metrics(mut self, registry: MetricsRegistry) -> Self {
        self.metrics = Some(registry);
        self
    }

    pub fn config(&self) -> &RetinaConfig {
        &self.config
    }

    pub fn context(&self) -> &RetinaContext {
        &self.context
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    pub fn metrics(&self) -> Option<&MetricsRegistry> {
        self.metrics.as_ref()
    }

    /// Runs one cycle over `frame`.
    pub fn process(&mut self, frame: &Frame) -> Result<Cycle, PipelineError> {
        self.stats.frames += 1;
        let sequence = frame.sequence();

        let gray = self.preprocessor.process(frame.image());

        let Some(mask) = self.context.background.observe(&gray)? else {
            tracing::info!(sequence, "background seeded from first frame");
            return Ok(Cycle {
                sequence,
                outcome: CycleOutcome::Seeded,
                output: None,
                contrast: None,
                hud: None,
            });
        };

        let contrast = self.contrast.map(|filter| filter.apply(&gray));
        let mut output = frame.image().clone();

        let Some(focus) = self.extractor.extract(&mask, frame.image().dimensions()) else {
            if !self.context.tracker.positions().is_empty() {
                self.stats.history_resets += 1;
                tracing::debug!(sequence, "focus lost, tracking history cleared");
            }
            self.context.tracker.clear();
            self.stats.last_speed = None;
            self.stats.last_area_delta = None;
            return Ok(Cycle {
                sequence,
                outcome: CycleOutcome::NoFocus,
                output: Some(output),
                contrast,
                hud: None,
            });
        };

        let estimate = self
            .context
            .tracker
            .update(focus.center(), focus.area(), frame.timestamp());
        let classification = self.classifier.classify_estimate(&estimate);
        let trail = self.context.tracker.trail();

        draw_focus(&mut output, &focus.bounds, classification.indicator.color());
        if self.config.display.draw_trail {
            draw_trail(&mut output, &trail);
        }

        self.stats.focus_cycles += 1;
        if classification.danger {
            self.stats.danger_cycles += 1;
        }
        if let MotionEstimate::Measured {
            speed, area_delta, ..
        } = estimate
        {
            self.stats.last_speed = Some(speed);
            self.stats.last_area_delta = Some(area_delta);
        }

        tracing::debug!(
            sequence,
            x = focus.bounds.x,
            y = focus.bounds.y,
            area = focus.area(),
            speed = estimate.speed(),
            state = %estimate,
            danger = classification.danger,
            "focus tracked"
        );

        let hud = Hud::new(&focus, &estimate, &classification);
        Ok(Cycle {
            sequence,
            outcome: CycleOutcome::Tracked {
                focus,
                estimate,
                classification,
                trail,
            },
            output: Some(output),
            contrast,
            hud: Some(hud),
        })
    }

    /// Pulls frames until the stop signal is raised or the source ends.
    ///
    /// Source exhaustion and read failures both end the run cleanly.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn DisplaySink,
        stop: &dyn StopSignal,
    ) -> RunSummary {
        let started_at = Utc::now();
        tracing::info!(%started_at, "frame loop started");

        let termination = loop {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break Termination::EndOfStream,
                Err(e) => {
                    tracing::warn!(error = %e, "frame source failed");
                    break Termination::SourceFailed(e.to_string());
                }
            };

            let cycle = match self.process(&frame) {
                Ok(cycle) => cycle,
                Err(e) => {
                    tracing::error!(error = %e, sequence = frame.sequence(), "cycle failed");
                    break Termination::PipelineFailed(e.to_string());
                }
            };

            self.emit(sink, &cycle);

            if let Some(registry) = &self.metrics {
                registry.update(&MetricsSnapshot::from_loop(self));
            }

            if stop.should_stop() {
                break Termination::StopRequested;
            }
        };

        let finished_at = Utc::now();
        tracing::info!(
            ?termination,
            frames = self.stats.frames,
            focus_cycles = self.stats.focus_cycles,
            danger_cycles = self.stats.danger_cycles,
            "frame loop finished"
        );

        RunSummary {
            termination,
            stats: self.stats.clone(),
            started_at,
            finished_at,
        }
    }

    fn emit(&mut self, sink: &mut dyn DisplaySink, cycle: &Cycle) {
        if let Some(output) = &cycle.output {
            self.show(sink, OUTPUT_LAYER, LayerImage::Color(output));
        }
        if let Some(contrast) = &cycle.contrast {
            self.show(sink, GANGLION_LAYER, LayerImage::Gray(contrast));
        }
        if let Some(hud) = &cycle.hud {
            sink.hud(hud);
        }
    }

    fn show(&mut self, sink: &mut dyn DisplaySink, layer: &'static str, image: LayerImage<'_>) {
        if self.disabled_layers.contains(&layer) {
            return;
        }
        if let Err(e) = sink.show(layer, image) {
            tracing::warn!(layer, error = %e, "display layer failed, disabling it");
            self.disabled_layers.push(layer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Frame;
    use image::Rgb;
    use std::time::Duration;

    const STEP: Duration = Duration::from_millis(50);

    fn frame_with_square(sequence: u64, at: Instant, square: Option<(u32, u32, u32)>) -> Frame {
        let mut image = RgbImage::from_pixel(640, 480, Rgb([10, 10, 10]));
        if let Some((x, y, side)) = square {
            for py in y..y + side {
                for px in x..x + side {
                    image.put_pixel(px, py, Rgb([240, 240, 240]));
                }
            }
        }
        Frame::with_timestamp(image, sequence, at)
    }

    #[test]
    fn test_first_cycle_only_seeds() {
        let start = Instant::now();
        let mut frame_loop = FrameLoop::starting_at(RetinaConfig::default(), start).unwrap();

        let cycle = frame_loop
            .process(&frame_with_square(1, start + STEP, Some((100, 100, 200))))
            .unwrap();

        assert_eq!(cycle.outcome, CycleOutcome::Seeded);
        assert!(cycle.output.is_none());
        assert!(cycle.contrast.is_none());
        assert!(frame_loop.context().background.is_seeded());
        assert!(frame_loop.context().tracker.positions().is_empty());
    }

    #[test]
    fn test_new_object_becomes_focus() {
        let start = Instant::now();
        let mut frame_loop = FrameLoop::starting_at(RetinaConfig::default(), start).unwrap();

        frame_loop.process(&frame_with_square(1, start + STEP, None)).unwrap();
        let cycle = frame_loop
            .process(&frame_with_square(2, start + STEP * 2, Some((200, 160, 160))))
            .unwrap();

        let focus = cycle.focus().expect("square should be selected");
        assert!(focus.bounds.x <= 200 && focus.bounds.x + focus.bounds.width >= 360);
        assert_eq!(cycle.estimate(), Some(&MotionEstimate::Analyzing));
        assert!(cycle.hud.is_some());
        assert_eq!(frame_loop.stats().focus_cycles, 1);
    }

    #[test]
    fn test_losing_focus_clears_history() {
        let start = Instant::now();
        let mut frame_loop = FrameLoop::starting_at(RetinaConfig::default(), start).unwrap();

        frame_loop.process(&frame_with_square(1, start + STEP, None)).unwrap();
        frame_loop
            .process(&frame_with_square(2, start + STEP * 2, Some((200, 160, 160))))
            .unwrap();
        frame_loop
            .process(&frame_with_square(3, start + STEP * 3, Some((220, 160, 160))))
            .unwrap();
        assert_eq!(frame_loop.context().tracker.positions().len(), 2);

        // The background has barely adapted, so an empty frame matches it again.
        let cycle = frame_loop.process(&frame_with_square(4, start + STEP * 4, None)).unwrap();
        assert_eq!(cycle.outcome, CycleOutcome::NoFocus);
        assert!(cycle.output.is_some());
        assert!(frame_loop.context().tracker.positions().is_empty());
        assert!(frame_loop.context().tracker.areas().is_empty());
        assert_eq!(frame_loop.stats().history_resets, 1);
    }

    #[test]
    fn test_losing_focus_forgets_last_measurement() {
        let start = Instant::now();
        let mut frame_loop = FrameLoop::starting_at(RetinaConfig::default(), start).unwrap();

        frame_loop.process(&frame_with_square(1, start + STEP, None)).unwrap();
        frame_loop
            .process(&frame_with_square(2, start + STEP * 2, Some((200, 160, 160))))
            .unwrap();
        frame_loop
            .process(&frame_with_square(3, start + STEP * 3, Some((220, 160, 160))))
            .unwrap();
        assert!(frame_loop.stats().last_speed.is_some());
        assert!(frame_loop.stats().last_area_delta.is_some());

        frame_loop.process(&frame_with_square(4, start + STEP * 4, None)).unwrap();
        assert_eq!(frame_loop.stats().last_speed, None);
        assert_eq!(frame_loop.stats().last_area_delta, None);
    }

    #[test]
    fn test_contrast_layer_can_be_disabled() {
        let start = Instant::now();
        let mut config = RetinaConfig::default();
        config.display.show_ganglion = false;
        let mut frame_loop = FrameLoop::starting_at(config, start).unwrap();

        frame_loop.process(&frame_with_square(1, start + STEP, None)).unwrap();
        let cycle = frame_loop.process(&frame_with_square(2, start + STEP * 2, None)).unwrap();
        assert!(cycle.contrast.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = RetinaConfig::default();
        config.tracking.history_length = 0;
        assert!(FrameLoop::new(config).is_err());
    }
}
