/// Head orientation in degrees, always ordered (yaw, pitch, roll).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeadPose {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl HeadPose {
    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Angles as fed to the gaze network: `[yaw, pitch, roll]`.
    pub fn to_array(&self) -> [f32; 3] {
        [self.yaw, self.pitch, self.roll]
    }
}
