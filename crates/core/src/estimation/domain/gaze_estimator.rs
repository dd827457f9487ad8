use std::time::Duration;

use crate::inference::domain::model_error::ModelError;
use crate::shared::crop::Crop;

use super::gaze_vector::GazeVector;
use super::head_pose::HeadPose;

/// Gaze stage: fuses both eye crops with the head pose.
pub trait GazeEstimator: Send {
    fn estimate(
        &mut self,
        left_eye: &Crop,
        right_eye: &Crop,
        pose: &HeadPose,
    ) -> Result<GazeVector, ModelError>;

    fn last_inference_duration(&self) -> Duration;
}
