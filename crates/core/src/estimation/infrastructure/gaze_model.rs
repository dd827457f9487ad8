use std::time::Duration;

use ndarray::Array2;

use crate::estimation::domain::gaze_estimator::GazeEstimator;
use crate::estimation::domain::gaze_vector::GazeVector;
use crate::estimation::domain::head_pose::HeadPose;
use crate::inference::domain::detector_model::DetectorModel;
use crate::inference::domain::device::Device;
use crate::inference::domain::inference_backend::InferenceBackend;
use crate::inference::domain::model_error::ModelError;
use crate::inference::domain::model_files::ModelFiles;
use crate::inference::domain::preprocess::ChannelOrder;
use crate::shared::constants::{GAZE_HEAD_POSE_INPUT, GAZE_LEFT_EYE_INPUT, GAZE_RIGHT_EYE_INPUT};
use crate::shared::crop::Crop;

/// Gaze stage: two eye images plus raw head-pose angles in, 3-D gaze out.
pub struct GazeModel {
    model: DetectorModel,
}

impl GazeModel {
    pub fn new(
        backend: &dyn InferenceBackend,
        files: ModelFiles,
        device: Device,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            model: DetectorModel::new(backend, files, device)?,
        })
    }

    pub fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.model = self.model.with_channel_order(order);
        self
    }

    pub fn load(&mut self, backend: &dyn InferenceBackend) -> Result<(), ModelError> {
        self.model
            .expect_image_inputs(&[GAZE_LEFT_EYE_INPUT, GAZE_RIGHT_EYE_INPUT])?;
        self.model.expect_input(GAZE_HEAD_POSE_INPUT)?;
        self.model.load(backend)
    }

    pub fn model(&self) -> &DetectorModel {
        &self.model
    }
}

impl GazeEstimator for GazeModel {
    fn estimate(
        &mut self,
        left_eye: &Crop,
        right_eye: &Crop,
        pose: &HeadPose,
    ) -> Result<GazeVector, ModelError> {
        let left = self.model.preprocess(GAZE_LEFT_EYE_INPUT, left_eye.image())?;
        let right = self.model.preprocess(GAZE_RIGHT_EYE_INPUT, right_eye.image())?;
        let angles = Array2::from_shape_vec((1, 3), pose.to_array().to_vec())
            .map_err(|e| ModelError::InvalidInput {
                model: self.model.name().to_string(),
                reason: e.to_string(),
            })?
            .into_dyn();

        let output = self.model.predict(vec![
            (GAZE_LEFT_EYE_INPUT.to_string(), left),
            (GAZE_RIGHT_EYE_INPUT.to_string(), right),
            (GAZE_HEAD_POSE_INPUT.to_string(), angles),
        ])?;

        let tensor = output.require_first(self.model.name())?;
        let mut values = tensor.iter().copied();
        let raw = match (values.next(), values.next(), values.next()) {
            (Some(x), Some(y), Some(z)) => [x, y, z],
            _ => {
                return Err(ModelError::InferenceFailure {
                    model: self.model.name().to_string(),
                    reason: format!("gaze output of shape {:?} has fewer than 3 values", tensor.shape()),
                })
            }
        };
        Ok(GazeVector::from_raw(raw, pose))
    }

    fn last_inference_duration(&self) -> Duration {
        self.model.last_inference_duration()
    }
}
