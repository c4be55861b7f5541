//! Display sinks receiving named image layers.

use super::Hud;
use image::{GrayImage, RgbImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reported by a sink for one layer.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("failed to present layer {layer}: {reason}")]
    PresentFailed { layer: String, reason: String },
    #[error("output directory unavailable: {0}")]
    Unavailable(String),
}

/// Borrowed image handed to a sink.
#[derive(Debug, Clone, Copy)]
pub enum LayerImage<'a> {
    Color(&'a RgbImage),
    Gray(&'a GrayImage),
}

impl LayerImage<'_> {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            LayerImage::Color(image) => image.dimensions(),
            LayerImage::Gray(image) => image.dimensions(),
        }
    }
}

/// Receives the output of each cycle.
pub trait DisplaySink {
    /// Presents one named layer.
    fn show(&mut self, layer: &str, image: LayerImage<'_>) -> Result<(), DisplayError>;

    /// Receives the text overlay for the current cycle.
    fn hud(&mut self, _hud: &Hud) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn show(&mut self, _layer: &str, _image: LayerImage<'_>) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// An owned copy of a presented layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedLayer {
    Color(RgbImage),
    Gray(GrayImage),
}

/// Records presented layers and overlays in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Presented layers in order.
    pub layers: Vec<(String, RecordedLayer)>,
    /// One entry per cycle that produced an overlay.
    pub huds: Vec<Hud>,
    /// Layers that report an error when shown.
    pub failing: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `layer` was presented.
    pub fn count(&self, layer: &str) -> usize {
        self.layers.iter().filter(|(name, _)| name == layer).count()
    }

    /// Most recent image presented on `layer`.
    pub fn last(&self, layer: &str) -> Option<&RecordedLayer> {
        self.layers
            .iter()
            .rev()
            .find(|(name, _)| name == layer)
            .map(|(_, image)| image)
    }
}

impl DisplaySink for MemorySink {
    fn show(&mut self, layer: &str, image: LayerImage<'_>) -> Result<(), DisplayError> {
        if self.failing.iter().any(|name| name == layer) {
            return Err(DisplayError::PresentFailed {
                layer: layer.to_string(),
                reason: "configured to fail".to_string(),
            });
        }
        let recorded = match image {
            LayerImage::Color(image) => RecordedLayer::Color(image.clone()),
            LayerImage::Gray(image) => RecordedLayer::Gray(image.clone()),
        };
        self.layers.push((layer.to_string(), recorded));
        Ok(())
    }

    fn hud(&mut self, hud: &Hud) {
        self.huds.push(hud.clone());
    }
}

/// Headless stand-in for a window: writes each layer as numbered PNG files.
#[derive(Debug)]
pub struct DirectorySink {
    directory: PathBuf,
    counters: HashMap<String, u64>,
}

/// File-name friendly form of a layer name.
pub fn layer_slug(layer: &str) -> String {
    let mut slug = String::with_capacity(layer.len());
    for ch in layer.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

impl DirectorySink {
    /// Creates the output directory if needed.
    pub fn new(directory: impl AsRef<Path>) -> Result<Self, DisplayError> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)
            .map_err(|e| DisplayError::Unavailable(format!("{}: {}", directory.display(), e)))?;
        Ok(Self {
            directory,
            counters: HashMap::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl DisplaySink for DirectorySink {
    fn show(&mut self, layer: &str, image: LayerImage<'_>) -> Result<(), DisplayError> {
        let counter = self.counters.entry(layer.to_string()).or_insert(0);
        *counter += 1;
        let path = self
            .directory
            .join(format!("{}_{:06}.png", layer_slug(layer), counter));

        let result = match image {
            LayerImage::Color(image) => image.save(&path),
            LayerImage::Gray(image) => image.save(&path),
        };
        result.map_err(|e| DisplayError::PresentFailed {
            layer: layer.to_string(),
            reason: e.to_string(),
        })
    }

    fn hud(&mut self, hud: &Hud) {
        tracing::info!(
            x = hud.bounds.x,
            y = hud.bounds.y,
            danger = hud.danger,
            "{} | {}",
            hud.speed_label,
            hud.looming_label
        );
    }
}
