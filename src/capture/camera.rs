//! Live webcam source backed by `nokhwa`.

use super::{CaptureConfig, CaptureError, Frame, FrameSource};
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

/// Frame source reading from a local camera device.
#[derive(Default)]
pub struct NokhwaCamera {
    device: Option<nokhwa::Camera>,
    sequence: u64,
}

impl NokhwaCamera {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSource for NokhwaCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CaptureError> {
        config
            .validate()
            .map_err(|e| CaptureError::ConfigFailed(e.to_string()))?;

        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut device = nokhwa::Camera::new(CameraIndex::Index(config.device_id), requested)
            .map_err(|e| CaptureError::DeviceNotFound(e.to_string()))?;
        device
            .open_stream()
            .map_err(|e| CaptureError::OpenFailed(e.to_string()))?;

        tracing::info!(device_id = config.device_id, "camera opened");
        self.device = Some(device);
        self.sequence = 0;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        let device = self.device.as_mut().ok_or(CaptureError::NotInitialized)?;

        let buffer = device
            .frame()
            .map_err(|e| CaptureError::ReadFailed(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::ReadFailed(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        let image = RgbImage::from_raw(width, height, decoded.into_raw()).ok_or_else(|| {
            CaptureError::ReadFailed(format!("short frame buffer for {}x{}", width, height))
        })?;

        self.sequence += 1;
        Ok(Some(Frame::new(image, self.sequence)))
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn close(&mut self) {
        if let Some(mut device) = self.device.take() {
            if let Err(e) = device.stop_stream() {
                tracing::warn!(error = %e, "failed to stop camera stream");
            }
            tracing::info!("camera closed");
        }
    }
}
