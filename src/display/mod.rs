//! Output layers and annotation.
//!
//! The frame loop hands every cycle's images to a [`DisplaySink`] under a
//! layer name. Window management is left to the sink implementation.

mod overlay;
mod sink;

pub use overlay::{draw_focus, draw_trail, Hud, TRAIL_COLOR};
pub use sink::{
    layer_slug, DirectorySink, DisplayError, DisplaySink, LayerImage, MemorySink, NullSink,
    RecordedLayer,
};

/// Annotated full-resolution output.
pub const OUTPUT_LAYER: &str = "Artificial Retina (Output)";

/// Contrast-filter visualization.
pub const GANGLION_LAYER: &str = "Ganglion Cell Layer (Input)";
