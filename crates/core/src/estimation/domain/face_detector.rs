use std::time::Duration;

use crate::inference::domain::model_error::ModelError;
use crate::shared::crop::Crop;
use crate::shared::frame::Frame;

/// Face stage: finds at most one face per frame.
///
/// `Ok(None)` means no detection cleared the confidence threshold and the
/// frame should be skipped; it is not an error.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Option<Crop>, ModelError>;

    fn last_inference_duration(&self) -> Duration;
}
