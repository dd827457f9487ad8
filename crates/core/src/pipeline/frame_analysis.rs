use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::estimation::domain::eye_landmarks::EyeCrops;
use crate::estimation::domain::gaze_vector::GazeVector;
use crate::estimation::domain::head_pose::HeadPose;
use crate::shared::crop::Crop;
use crate::shared::stage::Stage;
use crate::visualization::domain::frame_observer::FrameAnnotations;

use super::stage_latency::StageLatency;

/// Why a frame produced no gaze vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    NoFace,
    NoEyes,
    Failed(Stage),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoFace => f.write_str("no face"),
            SkipReason::NoEyes => f.write_str("no eyes"),
            SkipReason::Failed(stage) => write!(f, "{stage} failed"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome {
    Tracked(GazeVector),
    Skipped(SkipReason),
}

/// Everything the pipeline learned about one frame, up to the first stage
/// that came back empty.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameAnalysis {
    pub frame_index: usize,
    pub face: Option<Crop>,
    pub eyes: Option<EyeCrops>,
    pub head_pose: Option<HeadPose>,
    pub outcome: FrameOutcome,
    /// Inference time of each stage that ran to completion, in order.
    pub timings: Vec<(Stage, Duration)>,
}

impl FrameAnalysis {
    pub fn gaze(&self) -> Option<&GazeVector> {
        match &self.outcome {
            FrameOutcome::Tracked(gaze) => Some(gaze),
            FrameOutcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self.outcome {
            FrameOutcome::Skipped(reason) => Some(reason),
            FrameOutcome::Tracked(_) => None,
        }
    }

    pub fn stages_run(&self) -> Vec<Stage> {
        self.timings.iter().map(|(s, _)| *s).collect()
    }

    /// Results mapped into frame space for an observer.
    ///
    /// Eye boxes live in face-crop space; the face crop starts at its box's
    /// top-left corner, so they are shifted by that corner.
    pub fn annotations(&self) -> FrameAnnotations {
        let face_box = self.face.as_ref().map(|f| f.bbox());
        let eye_boxes = match (&self.eyes, face_box) {
            (Some(eyes), Some(face)) => Some((
                eyes.left.bbox().translated(face.x_min, face.y_min),
                eyes.right.bbox().translated(face.x_min, face.y_min),
            )),
            _ => None,
        };
        FrameAnnotations {
            face_box,
            eye_boxes,
            head_pose: self.head_pose,
            gaze: self.gaze().copied(),
        }
    }
}

/// Totals for one run over a frame source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSummary {
    pub frames: usize,
    pub tracked: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub latency: StageLatency,
    pub elapsed: Duration,
}

impl SessionSummary {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::frame::Frame;

    #[test]
    fn test_annotations_map_eyes_to_frame_space() {
        let frame = Frame::new(vec![0; 200 * 200 * 3], 200, 200, 3, 0);
        let face = Crop::from_parent(&frame, BoundingBox::new(20, 20, 100, 100));
        let eyes = EyeCrops {
            left: Crop::from_parent(face.image(), BoundingBox::new(20, 20, 60, 60)),
            right: Crop::from_parent(face.image(), BoundingBox::new(28, 20, 68, 60)),
        };
        let analysis = FrameAnalysis {
            frame_index: 0,
            face: Some(face),
            eyes: Some(eyes),
            head_pose: Some(HeadPose::new(10.0, 5.0, 0.0)),
            outcome: FrameOutcome::Skipped(SkipReason::Failed(Stage::GazeEstimation)),
            timings: Vec::new(),
        };

        let annotations = analysis.annotations();
        assert_eq!(annotations.face_box, Some(BoundingBox::new(20, 20, 100, 100)));
        assert_eq!(
            annotations.eye_boxes,
            Some((BoundingBox::new(40, 40, 80, 80), BoundingBox::new(48, 40, 88, 80)))
        );
        assert!(annotations.gaze.is_none());
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::NoFace.to_string(), "no face");
        assert_eq!(SkipReason::Failed(Stage::HeadPose).to_string(), "head_pose failed");
    }

    #[test]
    fn test_summary_skip_totals() {
        let mut summary = SessionSummary::default();
        summary.skipped.insert(SkipReason::NoFace, 3);
        summary.skipped.insert(SkipReason::Failed(Stage::GazeEstimation), 1);
        assert_eq!(summary.skipped_total(), 4);
        assert_eq!(summary.skipped_for(SkipReason::NoEyes), 0);
    }
}
