use std::fmt;

/// Identity of one pipeline stage, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    FaceDetection,
    FacialLandmarks,
    HeadPose,
    GazeEstimation,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::FaceDetection,
        Stage::FacialLandmarks,
        Stage::HeadPose,
        Stage::GazeEstimation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::FaceDetection => "face",
            Stage::FacialLandmarks => "landmarks",
            Stage::HeadPose => "head_pose",
            Stage::GazeEstimation => "gaze",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
