//! Startup configuration.
//!
//! Every tunable of the pipeline lives here. Values are fixed once the frame
//! loop is constructed; there is no live reconfiguration.

use crate::capture::{CaptureConfig, CaptureConfigError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid capture settings: {0}")]
    Capture(#[from] CaptureConfigError),
    #[error("invalid retina dimensions")]
    InvalidRetinaDimensions,
    #[error("adaptation rate {0} outside [0, 1]")]
    InvalidAdaptationRate(f32),
    #[error("history length {0} too short (need at least 2 samples)")]
    InvalidHistoryLength(usize),
    #[error("kernel size {0} must be odd and positive")]
    InvalidKernel(u32),
    #[error("{name} must be finite and positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Foreground detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Width of the low-resolution processing image.
    pub retina_width: u32,
    /// Height of the low-resolution processing image.
    pub retina_height: u32,
    /// Minimum component area in low-resolution pixels (exclusive).
    pub min_area: u32,
    /// Background blending weight per cycle.
    pub adaptation_rate: f32,
    /// Absolute difference above which a pixel is foreground.
    pub foreground_threshold: u8,
    /// Number of 3x3 dilation passes applied to the mask.
    pub dilation_iterations: u8,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            retina_width: 320,
            retina_height: 240,
            min_area: 800,
            adaptation_rate: 0.02,
            foreground_threshold: 30,
            dilation_iterations: 4,
        }
    }
}

/// Difference-of-Gaussians kernel sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanglionConfig {
    /// Excitatory center kernel size.
    pub center_kernel: u32,
    /// Inhibitory surround kernel size.
    pub surround_kernel: u32,
}

impl Default for GanglionConfig {
    fn default() -> Self {
        Self {
            center_kernel: 3,
            surround_kernel: 13,
        }
    }
}

/// Temporal smoothing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Capacity of the position and area histories.
    pub history_length: usize,
    /// Metric units per full-resolution pixel.
    pub pixel_to_metric: f64,
    /// Area change (pixel²) separating stationary from looming.
    pub looming_threshold: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            history_length: 5,
            pixel_to_metric: 0.05,
            looming_threshold: 50.0,
        }
    }
}

/// Danger classification parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Lateral speed (units/s) above which motion is dangerous.
    pub danger_speed: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { danger_speed: 50.0 }
    }
}

/// Output layer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Emit the contrast-filter layer.
    pub show_ganglion: bool,
    /// Draw the buffered trajectory on the output layer.
    pub draw_trail: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_ganglion: true,
            draw_trail: true,
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RetinaConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub ganglion: GanglionConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn odd_kernel(size: u32) -> Result<(), ConfigError> {
    if size % 2 == 1 {
        Ok(())
    } else {
        Err(ConfigError::InvalidKernel(size))
    }
}

impl RetinaConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RetinaConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;

        let detection = &self.detection;
        if detection.retina_width == 0 || detection.retina_height == 0 {
            return Err(ConfigError::InvalidRetinaDimensions);
        }
        if !(0.0..=1.0).contains(&detection.adaptation_rate) {
            return Err(ConfigError::InvalidAdaptationRate(detection.adaptation_rate));
        }

        odd_kernel(self.ganglion.center_kernel)?;
        odd_kernel(self.ganglion.surround_kernel)?;

        if self.tracking.history_length < 2 {
            return Err(ConfigError::InvalidHistoryLength(
                self.tracking.history_length,
            ));
        }
        positive("pixel_to_metric", self.tracking.pixel_to_metric)?;
        positive("looming_threshold", self.tracking.looming_threshold)?;
        positive("danger_speed", self.classifier.danger_speed)?;

        Ok(())
    }
}
