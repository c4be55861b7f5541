//! Frame type representing a captured colour image with metadata.

use image::RgbImage;
use std::time::Instant;

/// A single captured frame.
///
/// Holds the full-resolution colour image together with the capture
/// timestamp used for speed estimation.
#[derive(Clone)]
pub struct Frame {
    /// Full-resolution RGB image.
    image: RgbImage,
    /// Capture timestamp.
    timestamp: Instant,
    /// Monotonic sequence number.
    sequence: u64,
}

impl Frame {
    /// Creates a frame stamped with the current instant.
    pub fn new(image: RgbImage, sequence: u64) -> Self {
        Self::with_timestamp(image, sequence, Instant::now())
    }

    /// Creates a frame with an explicit capture timestamp.
    pub fn with_timestamp(image: RgbImage, sequence: u64, timestamp: Instant) -> Self {
        Self {
            image,
            timestamp,
            sequence,
        }
    }

    /// Returns the colour image.
    #[inline]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Consumes the frame, returning its image.
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("sequence", &self.sequence)
            .finish()
    }
}
