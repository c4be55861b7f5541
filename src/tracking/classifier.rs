//! Danger classification.

use super::{Looming, MotionEstimate};
use image::Rgb;

/// Display indicator for a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Warning,
    Safe,
}

impl Indicator {
    /// Bounding-box colour: red for warnings, green otherwise.
    pub fn color(&self) -> Rgb<u8> {
        match self {
            Indicator::Warning => Rgb([255, 0, 0]),
            Indicator::Safe => Rgb([0, 255, 0]),
        }
    }
}

/// Outcome of classifying one motion estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub danger: bool,
    pub indicator: Indicator,
}

/// Flags fast or approaching motion as dangerous.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionClassifier {
    danger_speed: f64,
}

impl MotionClassifier {
    pub fn new(danger_speed: f64) -> Self {
        Self { danger_speed }
    }

    pub fn classify(&self, speed: f64, looming: Option<Looming>) -> Classification {
        let danger = speed > self.danger_speed || looming == Some(Looming::Approaching);
        Classification {
            danger,
            indicator: if danger {
                Indicator::Warning
            } else {
                Indicator::Safe
            },
        }
    }

    pub fn classify_estimate(&self, estimate: &MotionEstimate) -> Classification {
        self.classify(estimate.speed(), estimate.looming())
    }
}

impl Default for MotionClassifier {
    fn default() -> Self {
        Self::new(50.0)
    }
}
