use std::str::FromStr;

use crate::estimation::domain::gaze_vector::GazeVector;
use crate::estimation::domain::head_pose::HeadPose;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::stage::Stage;

/// Which stage results an overlay draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlayLayers {
    pub face: bool,
    pub landmarks: bool,
    pub head_pose: bool,
    pub gaze: bool,
}

impl OverlayLayers {
    pub fn all() -> Self {
        Self {
            face: true,
            landmarks: true,
            head_pose: true,
            gaze: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn enable(&mut self, stage: Stage) {
        match stage {
            Stage::FaceDetection => self.face = true,
            Stage::FacialLandmarks => self.landmarks = true,
            Stage::HeadPose => self.head_pose = true,
            Stage::GazeEstimation => self.gaze = true,
        }
    }
}

impl FromStr for OverlayLayers {
    type Err = String;

    /// Parses a comma-separated list of stage names, e.g. `face,gaze`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut layers = Self::default();
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let stage = Stage::ALL
                .into_iter()
                .find(|stage| stage.name() == name)
                .ok_or_else(|| {
                    let known: Vec<&str> = Stage::ALL.iter().map(|s| s.name()).collect();
                    format!("unknown overlay '{name}' (expected one of {})", known.join(", "))
                })?;
            layers.enable(stage);
        }
        Ok(layers)
    }
}

/// Stage results for one frame, all in frame pixel space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameAnnotations {
    pub face_box: Option<BoundingBox>,
    pub eye_boxes: Option<(BoundingBox, BoundingBox)>,
    pub head_pose: Option<HeadPose>,
    pub gaze: Option<GazeVector>,
}

impl FrameAnnotations {
    /// Copy keeping only the enabled layers.
    pub fn filtered(&self, layers: OverlayLayers) -> Self {
        Self {
            face_box: self.face_box.filter(|_| layers.face),
            eye_boxes: self.eye_boxes.filter(|_| layers.landmarks),
            head_pose: self.head_pose.filter(|_| layers.head_pose),
            gaze: self.gaze.filter(|_| layers.gaze),
        }
    }
}

/// Observes frames and their annotations. Never feeds back into the pipeline.
pub trait FrameObserver: Send {
    fn observe(
        &mut self,
        frame: &Frame,
        annotations: &FrameAnnotations,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
