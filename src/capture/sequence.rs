//! Frame source replaying a directory of still images.

use super::{CaptureConfig, CaptureError, Frame, FrameSource};
use std::path::{Path, PathBuf};
use std::time::Instant;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Replays image files from a directory in lexicographic order.
///
/// Recorded frames carry no capture time, so timestamps are synthesized at
/// the configured frame rate. Frames keep their stored resolution.
#[derive(Debug)]
pub struct ImageSequenceSource {
    directory: PathBuf,
    files: Vec<PathBuf>,
    position: usize,
    config: Option<CaptureConfig>,
    origin: Option<Instant>,
}

impl ImageSequenceSource {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            files: Vec::new(),
            position: 0,
            config: None,
            origin: None,
        }
    }

    /// Number of frames discovered when the source was opened.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CaptureError> {
        config
            .validate()
            .map_err(|e| CaptureError::ConfigFailed(e.to_string()))?;

        if !self.directory.is_dir() {
            return Err(CaptureError::DeviceNotFound(
                self.directory.display().to_string(),
            ));
        }

        let entries = std::fs::read_dir(&self.directory)
            .map_err(|e| CaptureError::OpenFailed(e.to_string()))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| CaptureError::OpenFailed(e.to_string()))?
                .path();
            if path.is_file() && is_image(&path) {
                files.push(path);
            }
        }
        files.sort();

        tracing::info!(
            directory = %self.directory.display(),
            frames = files.len(),
            "image sequence opened"
        );

        self.files = files;
        self.position = 0;
        self.config = Some(config.clone());
        self.origin = Some(Instant::now());
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        let config = self.config.as_ref().ok_or(CaptureError::NotInitialized)?;
        let origin = self.origin.ok_or(CaptureError::NotInitialized)?;

        let Some(path) = self.files.get(self.position) else {
            return Ok(None);
        };

        let Some(offset) = config.frame_offset(self.position as u64 + 1) else {
            tracing::warn!(position = self.position, "image sequence clock exhausted");
            return Ok(None);
        };
        let image = image::open(path)
            .map_err(|e| CaptureError::ReadFailed(format!("{}: {}", path.display(), e)))?
            .to_rgb8();
        self.position += 1;
        let timestamp = origin + offset;
        Ok(Some(Frame::with_timestamp(
            image,
            self.position as u64,
            timestamp,
        )))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        self.origin = None;
        self.files.clear();
        tracing::info!("image sequence closed");
    }
}
