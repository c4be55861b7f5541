//! Downsampling and grayscale conversion.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

/// Converts full-resolution colour frames into the low-resolution grayscale
/// image every later stage works on.
///
/// Resampling is bilinear (`FilterType::Triangle`) and always happens before
/// the luminance conversion, so results are reproducible for a given input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocessor {
    width: u32,
    height: u32,
}

impl Preprocessor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Target `(width, height)` of the low-resolution image.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn process(&self, frame: &RgbImage) -> GrayImage {
        if frame.dimensions() == (self.width, self.height) {
            return imageops::grayscale(frame);
        }
        let small = imageops::resize(frame, self.width, self.height, FilterType::Triangle);
        imageops::grayscale(&small)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_output_dimensions() {
        let pre = Preprocessor::new(320, 240);
        let gray = pre.process(&RgbImage::new(640, 480));
        assert_eq!(gray.dimensions(), (320, 240));
    }

    #[test]
    fn test_uniform_frame_stays_uniform() {
        let pre = Preprocessor::new(40, 30);
        let frame = RgbImage::from_pixel(160, 120, Rgb([90, 90, 90]));
        let gray = pre.process(&frame);
        assert!(gray.pixels().all(|p| p.0[0] == 90));
    }

    #[test]
    fn test_green_is_brighter_than_blue() {
        let pre = Preprocessor::new(2, 1);
        let mut frame = RgbImage::new(2, 1);
        frame.put_pixel(0, 0, Rgb([0, 255, 0]));
        frame.put_pixel(1, 0, Rgb([0, 0, 255]));
        let gray = pre.process(&frame);
        assert!(gray.get_pixel(0, 0).0[0] > gray.get_pixel(1, 0).0[0]);
    }
}
