use std::path::PathBuf;

use crate::inference::domain::device::Device;
use crate::inference::domain::model_files::ModelFiles;
use crate::inference::domain::preprocess::ChannelOrder;
use crate::shared::constants::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::shared::stage::Stage;

/// Everything needed to build and load the four stages.
#[derive(Clone, Debug, PartialEq)]
pub struct GazePipelineConfig {
    pub face_model: ModelFiles,
    pub landmarks_model: ModelFiles,
    pub head_pose_model: ModelFiles,
    pub gaze_model: ModelFiles,
    pub device: Device,
    /// Custom-operator library registered with every model.
    pub extension: Option<PathBuf>,
    pub confidence_threshold: f32,
    pub channel_order: ChannelOrder,
}

impl GazePipelineConfig {
    pub fn new(
        face_model: impl Into<PathBuf>,
        landmarks_model: impl Into<PathBuf>,
        head_pose_model: impl Into<PathBuf>,
        gaze_model: impl Into<PathBuf>,
    ) -> Self {
        Self {
            face_model: ModelFiles::from_structure(face_model),
            landmarks_model: ModelFiles::from_structure(landmarks_model),
            head_pose_model: ModelFiles::from_structure(head_pose_model),
            gaze_model: ModelFiles::from_structure(gaze_model),
            device: Device::default(),
            extension: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            channel_order: ChannelOrder::default(),
        }
    }

    pub fn model_files(&self) -> [(Stage, &ModelFiles); 4] {
        [
            (Stage::FaceDetection, &self.face_model),
            (Stage::FacialLandmarks, &self.landmarks_model),
            (Stage::HeadPose, &self.head_pose_model),
            (Stage::GazeEstimation, &self.gaze_model),
        ]
    }

    /// Checks values that do not need the filesystem.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            ));
        }
        Ok(())
    }
}
