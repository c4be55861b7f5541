//! Ganglion-cell contrast filter.
//!
//! Approximates retinal receptive fields with a difference of Gaussians: a
//! sharp excitatory center minus a blurred inhibitory surround. The result is
//! only ever displayed; detection never reads it.

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

/// Sigma of a Gaussian kernel of odd size `k`, matching the usual
/// automatic derivation for blur kernels.
pub fn kernel_sigma(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Difference-of-Gaussians contrast filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastFilter {
    center_sigma: f32,
    surround_sigma: f32,
}

impl ContrastFilter {
    /// Builds a filter from odd kernel sizes.
    pub fn new(center_kernel: u32, surround_kernel: u32) -> Self {
        Self {
            center_sigma: kernel_sigma(center_kernel),
            surround_sigma: kernel_sigma(surround_kernel),
        }
    }

    /// Computes the clamped `center - surround` contrast map.
    pub fn apply(&self, gray: &GrayImage) -> GrayImage {
        let center = gaussian_blur_f32(gray, self.center_sigma);
        let surround = gaussian_blur_f32(gray, self.surround_sigma);

        GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            let c = center.get_pixel(x, y).0[0];
            let s = surround.get_pixel(x, y).0[0];
            Luma([c.saturating_sub(s)])
        })
    }
}

impl Default for ContrastFilter {
    fn default() -> Self {
        Self::new(3, 13)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_sigma() {
        assert!((kernel_sigma(3) - 0.8).abs() < 1e-6);
        assert!((kernel_sigma(13) - 2.3).abs() < 1e-6);
    }

    #[test]
    fn test_flat_image_has_no_contrast() {
        let gray = GrayImage::from_pixel(32, 32, Luma([120]));
        let contrast = ContrastFilter::default().apply(&gray);
        assert!(contrast.pixels().all(|p| p.0[0] <= 1));
    }

    #[test]
    fn test_bright_spot_responds_at_center() {
        let mut gray = GrayImage::from_pixel(32, 32, Luma([0]));
        for y in 14..18 {
            for x in 14..18 {
                gray.put_pixel(x, y, Luma([255]));
            }
        }
        let contrast = ContrastFilter::default().apply(&gray);

        assert!(contrast.get_pixel(15, 15).0[0] > 0);
        assert_eq!(contrast.get_pixel(2, 2).0[0], 0);
        assert_eq!(contrast.dimensions(), gray.dimensions());
    }
}
