//! Decoding of SSD-style `DetectionOutput` tensors.
//!
//! The tensor is `[1, 1, N, 7]`; each row is
//! `(image_id, label, confidence, x1, y1, x2, y2)` with corners normalized to
//! `[0, 1]`. A row with a negative `image_id` terminates the list.

use ndarray::ArrayD;

use crate::shared::bounding_box::BoundingBox;

const ROW_LEN: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceDetection {
    pub label: f32,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl FaceDetection {
    /// Box in the pixel space of a `width × height` parent image.
    pub fn to_bbox(&self, width: u32, height: u32) -> BoundingBox {
        BoundingBox::from_normalized(self.x1, self.y1, self.x2, self.y2, width, height)
    }
}

/// Rows of a detection tensor in model output order.
pub fn decode_detections(output: &ArrayD<f32>) -> Result<Vec<FaceDetection>, String> {
    let values: Vec<f32> = output.iter().copied().collect();
    if values.len() % ROW_LEN != 0 {
        return Err(format!(
            "detection tensor of shape {:?} is not a list of {ROW_LEN}-value rows",
            output.shape()
        ));
    }
    Ok(values
        .chunks_exact(ROW_LEN)
        .take_while(|row| row[0] >= 0.0)
        .map(|row| FaceDetection {
            label: row[1],
            confidence: row[2],
            x1: row[3],
            y1: row[4],
            x2: row[5],
            y2: row[6],
        })
        .collect())
}

/// First detection, in output order, whose confidence strictly exceeds
/// `threshold`. Later detections never replace it, even with higher scores.
pub fn first_above(detections: &[FaceDetection], threshold: f32) -> Option<&FaceDetection> {
    detections.iter().find(|d| d.confidence > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array4, IxDyn};
    use rstest::rstest;

    fn tensor(rows: &[[f32; 7]]) -> ArrayD<f32> {
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        Array4::from_shape_vec((1, 1, rows.len(), 7), flat)
            .unwrap()
            .into_dyn()
    }

    #[test]
    fn test_decode_rows_in_order() {
        let dets = decode_detections(&tensor(&[
            [0.0, 1.0, 0.9, 0.1, 0.1, 0.5, 0.5],
            [0.0, 1.0, 0.4, 0.2, 0.2, 0.3, 0.3],
        ]))
        .unwrap();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].confidence, 0.9);
        assert_eq!(dets[1].x2, 0.3);
    }

    #[test]
    fn test_decode_stops_at_terminator() {
        let dets = decode_detections(&tensor(&[
            [0.0, 1.0, 0.9, 0.1, 0.1, 0.5, 0.5],
            [-1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.95, 0.1, 0.1, 0.5, 0.5],
        ]))
        .unwrap();
        assert_eq!(dets.len(), 1);
    }

    #[test]
    fn test_decode_rejects_ragged_tensor() {
        assert!(decode_detections(&ArrayD::zeros(IxDyn(&[1, 1, 1, 5]))).is_err());
    }

    #[test]
    fn test_first_above_prefers_order_over_score() {
        let dets = decode_detections(&tensor(&[
            [0.0, 1.0, 0.3, 0.0, 0.0, 0.1, 0.1],
            [0.0, 1.0, 0.7, 0.1, 0.1, 0.2, 0.2],
            [0.0, 1.0, 0.99, 0.5, 0.5, 0.9, 0.9],
        ]))
        .unwrap();
        let chosen = first_above(&dets, 0.6).unwrap();
        assert_eq!(chosen.confidence, 0.7);
    }

    #[rstest]
    #[case(0.6, false)]
    #[case(0.59, false)]
    #[case(0.61, true)]
    fn test_threshold_is_strict(#[case] confidence: f32, #[case] accepted: bool) {
        let dets = decode_detections(&tensor(&[[0.0, 1.0, confidence, 0.0, 0.0, 1.0, 1.0]])).unwrap();
        assert_eq!(first_above(&dets, 0.6).is_some(), accepted);
    }

    #[test]
    fn test_to_bbox_scales_by_frame() {
        let det = FaceDetection {
            label: 1.0,
            confidence: 0.9,
            x1: 0.1,
            y1: 0.1,
            x2: 0.5,
            y2: 0.5,
        };
        assert_eq!(det.to_bbox(200, 200), BoundingBox::new(20, 20, 100, 100));
    }
}
