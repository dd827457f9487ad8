use std::time::Duration;

use crate::estimation::domain::face_detection::{decode_detections, first_above};
use crate::estimation::domain::face_detector::FaceDetector;
use crate::inference::domain::detector_model::DetectorModel;
use crate::inference::domain::device::Device;
use crate::inference::domain::inference_backend::InferenceBackend;
use crate::inference::domain::model_error::ModelError;
use crate::inference::domain::model_files::ModelFiles;
use crate::inference::domain::preprocess::ChannelOrder;
use crate::shared::constants::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::shared::crop::Crop;
use crate::shared::frame::Frame;

/// Face stage backed by an SSD face detector.
pub struct FaceDetectionModel {
    model: DetectorModel,
    threshold: f32,
}

impl FaceDetectionModel {
    pub fn new(
        backend: &dyn InferenceBackend,
        files: ModelFiles,
        device: Device,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            model: DetectorModel::new(backend, files, device)?,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        })
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.model = self.model.with_channel_order(order);
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn load(&mut self, backend: &dyn InferenceBackend) -> Result<(), ModelError> {
        self.model.expect_primary_image_input()?;
        self.model.load(backend)
    }

    pub fn model(&self) -> &DetectorModel {
        &self.model
    }
}

impl FaceDetector for FaceDetectionModel {
    fn detect(&mut self, frame: &Frame) -> Result<Option<Crop>, ModelError> {
        let output = self.model.predict_image(frame)?;
        let name = self.model.name().to_string();
        let tensor = output.require_first(&name)?;
        let detections = decode_detections(tensor)
            .map_err(|reason| ModelError::InferenceFailure { model: name, reason })?;

        let Some(detection) = first_above(&detections, self.threshold) else {
            return Ok(None);
        };
        let bbox = detection
            .to_bbox(frame.width(), frame.height())
            .clamped_to(frame.width(), frame.height());
        if bbox.is_empty() {
            return Ok(None);
        }
        Ok(Some(Crop::from_parent(frame, bbox)))
    }

    fn last_inference_duration(&self) -> Duration {
        self.model.last_inference_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::domain::tensors::TensorSpec;
    use crate::inference::testing::{model_file, ScriptedBackend};
    use crate::shared::bounding_box::BoundingBox;
    use ndarray::{Array4, ArrayD};
    use rstest::rstest;
    use tempfile::TempDir;

    fn detections(rows: &[[f32; 7]]) -> ArrayD<f32> {
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        Array4::from_shape_vec((1, 1, rows.len(), 7), flat)
            .unwrap()
            .into_dyn()
    }

    fn stage(dir: &TempDir) -> (ScriptedBackend, FaceDetectionModel) {
        let backend = ScriptedBackend::new(
            vec![TensorSpec::new("data", vec![1, 3, 32, 32])],
            &["detection_out"],
        );
        let mut stage =
            FaceDetectionModel::new(&backend, model_file(dir, "face-detection"), Device::Cpu).unwrap();
        stage.load(&backend).unwrap();
        (backend, stage)
    }

    fn frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![128; (width * height * 3) as usize], width, height, 3, 0)
    }

    #[test]
    fn test_default_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let (_, stage) = stage(&dir);
        assert_eq!(stage.threshold(), 0.60);
    }

    #[test]
    fn test_detection_is_scaled_and_cropped() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, mut stage) = stage(&dir);
        backend.push_output(vec![(
            "detection_out",
            detections(&[[0.0, 1.0, 0.9, 0.1, 0.1, 0.5, 0.5]]),
        )]);

        let face = stage.detect(&frame(200, 200)).unwrap().unwrap();
        assert_eq!(face.bbox(), BoundingBox::new(20, 20, 100, 100));
        assert_eq!((face.image().width(), face.image().height()), (80, 80));
        assert_eq!(backend.inference_count(), 1);
    }

    #[rstest]
    #[case(0.2)]
    #[case(0.6)]
    fn test_low_confidence_yields_no_face(#[case] confidence: f32) {
        let dir = tempfile::tempdir().unwrap();
        let (backend, mut stage) = stage(&dir);
        backend.push_output(vec![(
            "detection_out",
            detections(&[[0.0, 1.0, confidence, 0.1, 0.1, 0.5, 0.5]]),
        )]);
        assert!(stage.detect(&frame(64, 64)).unwrap().is_none());
    }

    #[test]
    fn test_first_qualifying_detection_wins() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, mut stage) = stage(&dir);
        backend.push_output(vec![(
            "detection_out",
            detections(&[
                [0.0, 1.0, 0.7, 0.0, 0.0, 0.5, 0.5],
                [0.0, 1.0, 0.99, 0.5, 0.5, 1.0, 1.0],
            ]),
        )]);
        let face = stage.detect(&frame(100, 100)).unwrap().unwrap();
        assert_eq!(face.bbox(), BoundingBox::new(0, 0, 50, 50));
    }

    #[test]
    fn test_overhanging_detection_is_clamped_to_frame() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, mut stage) = stage(&dir);
        backend.push_output(vec![(
            "detection_out",
            detections(&[[0.0, 1.0, 0.95, -0.1, 0.8, 0.3, 1.2]]),
        )]);
        let face = stage.detect(&frame(100, 50)).unwrap().unwrap();
        assert!(face.bbox().is_within(100, 50));
        assert_eq!(face.bbox(), BoundingBox::new(0, 40, 30, 50));
    }

    #[test]
    fn test_detection_outside_frame_yields_no_face() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, mut stage) = stage(&dir);
        backend.push_output(vec![(
            "detection_out",
            detections(&[[0.0, 1.0, 0.95, 1.1, 1.1, 1.5, 1.5]]),
        )]);
        assert!(stage.detect(&frame(100, 100)).unwrap().is_none());
    }

    #[test]
    fn test_custom_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, stage) = stage(&dir);
        let mut stage = stage.with_threshold(0.95);
        backend.push_output(vec![(
            "detection_out",
            detections(&[[0.0, 1.0, 0.9, 0.1, 0.1, 0.5, 0.5]]),
        )]);
        assert!(stage.detect(&frame(64, 64)).unwrap().is_none());
    }

    #[test]
    fn test_backend_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, mut stage) = stage(&dir);
        backend.push_failure("request failed");
        let err = stage.detect(&frame(64, 64)).unwrap_err();
        assert!(!err.is_fatal());
    }
}
