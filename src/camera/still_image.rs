//! File-backed camera device
//!
//! Serves a still image from disk as if it were a live stream. Lets the
//! whole pipeline run on machines without camera hardware, and behaves like
//! a single-camera device: only its configured facing mode satisfies the
//! exact constraint, so requesting the other one exercises the fallback.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::camera::{CameraDevice, CameraStream, FacingMode};
use crate::capture::CapturedFrame;
use crate::error::CameraError;

/// Camera device backed by an image file
pub struct StillImageCamera {
    path: PathBuf,
    facing: FacingMode,
}

impl StillImageCamera {
    /// `facing` is the one mode this device can satisfy
    pub fn new(path: impl Into<PathBuf>, facing: FacingMode) -> Self {
        Self {
            path: path.into(),
            facing,
        }
    }
}

#[async_trait]
impl CameraDevice for StillImageCamera {
    async fn open(&self, facing: FacingMode) -> Result<Box<dyn CameraStream>, CameraError> {
        if facing != self.facing {
            return Err(CameraError::ConstraintUnsatisfiable(facing));
        }

        let image = image::open(&self.path)
            .map_err(|e| CameraError::Hardware(format!("{}: {e}", self.path.display())))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        debug!(
            "opened still-image camera from {} ({}x{})",
            self.path.display(),
            width,
            height
        );

        Ok(Box::new(StillImageStream {
            facing,
            frame: CapturedFrame::new(image.into_raw(), width, height),
        }))
    }
}

struct StillImageStream {
    facing: FacingMode,
    frame: CapturedFrame,
}

impl CameraStream for StillImageStream {
    fn facing(&self) -> FacingMode {
        self.facing
    }

    fn grab_frame(&mut self) -> Result<CapturedFrame, CameraError> {
        Ok(self.frame.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_image(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("card.png");
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([200, 200, 200, 255]));
        image.save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn test_wrong_facing_is_unsatisfiable() {
        let camera = StillImageCamera::new("unused.png", FacingMode::User);
        let result = camera.open(FacingMode::Environment).await;
        assert!(matches!(
            result,
            Err(CameraError::ConstraintUnsatisfiable(FacingMode::Environment))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_hardware_failure() {
        let camera = StillImageCamera::new("/nonexistent/card.png", FacingMode::User);
        let result = camera.open(FacingMode::User).await;
        assert!(matches!(result, Err(CameraError::Hardware(_))));
    }

    #[tokio::test]
    async fn test_grab_frame_matches_image_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path());

        let camera = StillImageCamera::new(path, FacingMode::User);
        let mut stream = camera.open(FacingMode::User).await.unwrap();
        let frame = stream.grab_frame().unwrap();

        assert_eq!(frame.dimensions(), (3, 2));
        assert_eq!(frame.data.len(), 3 * 2 * 4);
    }
}
