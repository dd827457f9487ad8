use std::time::Duration;

use crate::inference::domain::model_error::ModelError;
use crate::shared::crop::Crop;

use super::head_pose::HeadPose;

pub trait HeadPoseEstimator: Send {
    fn estimate(&mut self, face: &Crop) -> Result<HeadPose, ModelError>;

    fn last_inference_duration(&self) -> Duration;
}
