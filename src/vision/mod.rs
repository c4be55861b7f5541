//! Per-frame image processing.
//!
//! Turns a colour frame into a low-resolution grayscale image, keeps the
//! adaptive background, and selects the focus of attention from the
//! resulting foreground mask. The contrast filter runs alongside for
//! visualization only.

mod background;
mod blob;
mod ganglion;
mod preprocess;

pub use background::{Accumulator, BackgroundError, BackgroundModel, FOREGROUND};
pub use blob::{BlobExtractor, BoundingBox, FocusRegion, Point};
pub use ganglion::{kernel_sigma, ContrastFilter};
pub use preprocess::Preprocessor;
