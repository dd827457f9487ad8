use std::time::Duration;

use crate::inference::domain::model_error::ModelError;
use crate::shared::crop::Crop;

use super::eye_landmarks::EyeCrops;

/// Landmark stage: cuts both eye regions out of a face crop.
///
/// `Ok(None)` when an eye region has no visible pixels.
pub trait LandmarkDetector: Send {
    fn locate_eyes(&mut self, face: &Crop) -> Result<Option<EyeCrops>, ModelError>;

    fn last_inference_duration(&self) -> Duration;
}
