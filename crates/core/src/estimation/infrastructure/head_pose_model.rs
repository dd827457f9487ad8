use std::time::Duration;

use crate::estimation::domain::head_pose::HeadPose;
use crate::estimation::domain::head_pose_estimator::HeadPoseEstimator;
use crate::inference::domain::detector_model::DetectorModel;
use crate::inference::domain::device::Device;
use crate::inference::domain::inference_backend::InferenceBackend;
use crate::inference::domain::model_error::ModelError;
use crate::inference::domain::model_files::ModelFiles;
use crate::inference::domain::preprocess::ChannelOrder;
use crate::inference::domain::tensors::RawOutput;
use crate::shared::constants::{
    HEAD_POSE_PITCH_OUTPUT, HEAD_POSE_ROLL_OUTPUT, HEAD_POSE_YAW_OUTPUT,
};
use crate::shared::crop::Crop;

/// Head-pose stage: three named scalar outputs, one per angle.
pub struct HeadPoseModel {
    model: DetectorModel,
}

impl HeadPoseModel {
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
        self.model.expect_primary_image_input()?;
        self.model.load(backend)
    }

    pub fn model(&self) -> &DetectorModel {
        &self.model
    }

    fn angle(&self, output: &RawOutput, name: &str) -> Result<f32, ModelError> {
        output
            .require(self.model.name(), name)?
            .iter()
            .next()
            .copied()
            .ok_or_else(|| ModelError::MissingTensor {
                model: self.model.name().to_string(),
                name: name.to_string(),
            })
    }
}

impl HeadPoseEstimator for HeadPoseModel {
    fn estimate(&mut self, face: &Crop) -> Result<HeadPose, ModelError> {
        let output = self.model.predict_image(face.image())?;
        Ok(HeadPose::new(
            self.angle(&output, HEAD_POSE_YAW_OUTPUT)?,
            self.angle(&output, HEAD_POSE_PITCH_OUTPUT)?,
            self.angle(&output, HEAD_POSE_ROLL_OUTPUT)?,
        ))
    }

    fn last_inference_duration(&self) -> Duration {
        self.model.last_inference_duration()
    }
}
