//! Adaptive background model.
//!
//! A floating-point running average of the grayscale scene. Slowly changing
//! content (illumination drift, settling) blends into the average while fast
//! movers stand out in the per-frame difference.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use thiserror::Error;

/// Floating-point grayscale accumulator image.
pub type Accumulator = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Foreground mask value.
pub const FOREGROUND: u8 = 255;

/// Background model errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackgroundError {
    #[error("background model has not been seeded")]
    NotSeeded,
    #[error("frame is {actual:?}, background is {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Exponentially adapted running-average background.
#[derive(Debug, Clone)]
pub struct BackgroundModel {
    accumulator: Option<Accumulator>,
    adaptation_rate: f32,
    threshold: u8,
    dilation_iterations: u8,
}

impl BackgroundModel {
    pub fn new(adaptation_rate: f32, threshold: u8, dilation_iterations: u8) -> Self {
        Self {
            accumulator: None,
            adaptation_rate,
            threshold,
            dilation_iterations,
        }
    }

    /// Returns true once the first frame has been absorbed.
    pub fn is_seeded(&self) -> bool {
        self.accumulator.is_some()
    }

    /// The current accumulator, if seeded.
    pub fn accumulator(&self) -> Option<&Accumulator> {
        self.accumulator.as_ref()
    }

    /// Sets the background to `gray` verbatim.
    pub fn seed(&mut self, gray: &GrayImage) {
        self.accumulator = Some(ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
            Luma([f32::from(gray.get_pixel(x, y).0[0])])
        }));
        tracing::debug!(
            width = gray.width(),
            height = gray.height(),
            "background seeded"
        );
    }

    /// Seeds on the first call and returns `None`; afterwards behaves like
    /// [`update_and_diff`](Self::update_and_diff).
    pub fn observe(&mut self, gray: &GrayImage) -> Result<Option<GrayImage>, BackgroundError> {
        if !self.is_seeded() {
            self.seed(gray);
            return Ok(None);
        }
        self.update_and_diff(gray).map(Some)
    }

    /// Blends `gray` into the background and returns the dilated binary
    /// foreground mask.
    pub fn update_and_diff(&mut self, gray: &GrayImage) -> Result<GrayImage, BackgroundError> {
        let accumulator = self.accumulator.as_mut().ok_or(BackgroundError::NotSeeded)?;
        if accumulator.dimensions() != gray.dimensions() {
            return Err(BackgroundError::DimensionMismatch {
                expected: accumulator.dimensions(),
                actual: gray.dimensions(),
            });
        }

        let alpha = self.adaptation_rate;
        for (acc, px) in accumulator.pixels_mut().zip(gray.pixels()) {
            acc.0[0] = (1.0 - alpha) * acc.0[0] + alpha * f32::from(px.0[0]);
        }

        let threshold = self.threshold;
        let mut mask = GrayImage::new(gray.width(), gray.height());
        for ((out, px), acc) in mask.pixels_mut().zip(gray.pixels()).zip(accumulator.pixels()) {
            let background = acc.0[0].round().clamp(0.0, 255.0) as u8;
            if px.0[0].abs_diff(background) > threshold {
                out.0[0] = FOREGROUND;
            }
        }

        if self.dilation_iterations == 0 {
            return Ok(mask);
        }
        // k passes of a 3x3 square equal one pass at chessboard radius k.
        Ok(dilate(&mask, Norm::LInf, self.dilation_iterations))
    }
}

impl Default for BackgroundModel {
    fn default() -> Self {
        Self::new(0.02, 30, 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(value: u8) -> GrayImage {
        GrayImage::from_pixel(32, 24, Luma([value]))
    }

    #[test]
    fn test_update_before_seed_fails() {
        let mut model = BackgroundModel::default();
        assert_eq!(
            model.update_and_diff(&flat(0)),
            Err(BackgroundError::NotSeeded)
        );
    }

    #[test]
    fn test_self_difference_is_empty() {
        let mut model = BackgroundModel::new(0.0, 30, 4);
        let mut frame = flat(40);
        frame.put_pixel(5, 5, Luma([250]));

        model.seed(&frame);
        let mask = model.update_and_diff(&frame).unwrap();
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_observe_seeds_first() {
        let mut model = BackgroundModel::default();
        assert!(model.observe(&flat(10)).unwrap().is_none());
        assert!(model.is_seeded());
        assert!(model.observe(&flat(10)).unwrap().is_some());
    }

    #[test]
    fn test_accumulator_blends() {
        let mut model = BackgroundModel::new(0.5, 30, 0);
        model.seed(&flat(100));
        model.update_and_diff(&flat(200)).unwrap();

        let acc = model.accumulator().unwrap();
        assert!((acc.get_pixel(0, 0).0[0] - 150.0).abs() < 1e-4);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut model = BackgroundModel::new(0.0, 30, 0);
        model.seed(&flat(100));

        let mut frame = flat(100);
        frame.put_pixel(1, 1, Luma([130]));
        frame.put_pixel(3, 3, Luma([131]));
        let mask = model.update_and_diff(&frame).unwrap();

        assert_eq!(mask.get_pixel(1, 1).0[0], 0);
        assert_eq!(mask.get_pixel(3, 3).0[0], FOREGROUND);
        assert_eq!(mask.pixels().filter(|p| p.0[0] == FOREGROUND).count(), 1);
    }

    #[test]
    fn test_dilation_grows_by_iterations() {
        let mut model = BackgroundModel::new(0.0, 30, 2);
        model.seed(&flat(0));

        let mut frame = flat(0);
        frame.put_pixel(10, 10, Luma([255]));
        let mask = model.update_and_diff(&frame).unwrap();

        // A single pixel dilated twice by a 3x3 square covers 5x5.
        assert_eq!(mask.pixels().filter(|p| p.0[0] == FOREGROUND).count(), 25);
        assert_eq!(mask.get_pixel(8, 8).0[0], FOREGROUND);
        assert_eq!(mask.get_pixel(7, 10).0[0], 0);
    }

    #[test]
    fn test_static_object_fades_into_background() {
        let mut model = BackgroundModel::new(0.5, 30, 0);
        model.seed(&flat(0));

        let bright = flat(200);
        let first = model.update_and_diff(&bright).unwrap();
        assert!(first.pixels().all(|p| p.0[0] == FOREGROUND));

        let mut last = first;
        for _ in 0..8 {
            last = model.update_and_diff(&bright).unwrap();
        }
        assert!(last.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut model = BackgroundModel::default();
        model.seed(&flat(0));
        assert!(matches!(
            model.update_and_diff(&GrayImage::new(8, 8)),
            Err(BackgroundError::DimensionMismatch { .. })
        ));
    }
}
