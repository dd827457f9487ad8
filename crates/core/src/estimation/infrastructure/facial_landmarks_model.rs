use std::time::Duration;

use crate::estimation::domain::eye_landmarks::{EyeCrops, EyeLandmarks};
use crate::estimation::domain::landmark_detector::LandmarkDetector;
use crate::inference::domain::detector_model::DetectorModel;
use crate::inference::domain::device::Device;
use crate::inference::domain::inference_backend::InferenceBackend;
use crate::inference::domain::model_error::ModelError;
use crate::inference::domain::model_files::ModelFiles;
use crate::inference::domain::preprocess::ChannelOrder;
use crate::shared::constants::EYE_BOX_HALF_SIZE;
use crate::shared::crop::Crop;

/// Landmark stage: regresses eye centers and cuts fixed-size eye boxes.
pub struct FacialLandmarksModel {
    model: DetectorModel,
    half_size: i32,
}

impl FacialLandmarksModel {
    pub fn new(
        backend: &dyn InferenceBackend,
        files: ModelFiles,
        device: Device,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            model: DetectorModel::new(backend, files, device)?,
            half_size: EYE_BOX_HALF_SIZE,
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
}

impl LandmarkDetector for FacialLandmarksModel {
    fn locate_eyes(&mut self, face: &Crop) -> Result<Option<EyeCrops>, ModelError> {
        let image = face.image();
        let output = self.model.predict_image(image)?;
        let name = self.model.name().to_string();
        let eyes = EyeLandmarks::from_output(output.require_first(&name)?)
            .map_err(|reason| ModelError::InferenceFailure { model: name, reason })?;

        let (left_box, right_box) = eyes.eye_boxes(image.width(), image.height(), self.half_size);
        let left = Crop::from_parent(image, left_box);
        let right = Crop::from_parent(image, right_box);
        if left.is_empty() || right.is_empty() {
            log::debug!(
                "Eye region outside face crop on frame {} (left {:?}, right {:?})",
                image.index(),
                left_box,
                right_box
            );
            return Ok(None);
        }
        Ok(Some(EyeCrops { left, right }))
    }

    fn last_inference_duration(&self) -> Duration {
        self.model.last_inference_duration()
    }
}
