use super::head_pose::HeadPose;

/// Roll-compensated 2-D gaze direction plus the raw network output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GazeVector {
    pub x: f32,
    pub y: f32,
    /// Untransformed `(x, y, z)` as produced by the gaze network.
    pub raw: [f32; 3],
}

impl GazeVector {
    /// Rotates the raw `(x, y)` by `-roll` so the vector is expressed in a
    /// head-upright frame. `z` is kept only in `raw`.
    pub fn from_raw(raw: [f32; 3], pose: &HeadPose) -> Self {
        let (x, y) = roll_compensate(raw[0], raw[1], pose.roll);
        Self { x, y, raw }
    }
}

/// Rotation of `(x, y)` by `-roll_degrees`.
pub fn roll_compensate(x: f32, y: f32, roll_degrees: f32) -> (f32, f32) {
    let angle = roll_degrees.to_radians();
    let (sin, cos) = angle.sin_cos();
    (x * cos + y * sin, -x * sin + y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[test]
    fn test_zero_roll_is_identity() {
        let gaze = GazeVector::from_raw([0.3, 0.4, 0.1], &HeadPose::new(10.0, 5.0, 0.0));
        assert_abs_diff_eq!(gaze.x, 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(gaze.y, 0.4, epsilon = 1e-6);
        assert_eq!(gaze.raw, [0.3, 0.4, 0.1]);
    }

    #[test]
    fn test_half_turn_negates() {
        let (x, y) = roll_compensate(0.3, -0.7, 180.0);
        assert_abs_diff_eq!(x, -0.3, epsilon = 1e-5);
        assert_abs_diff_eq!(y, 0.7, epsilon = 1e-5);
    }

    #[test]
    fn test_quarter_turn_direction() {
        // Head rolled 90 degrees: raw +x maps to -y in the upright frame.
        let (x, y) = roll_compensate(1.0, 0.0, 90.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, -1.0, epsilon = 1e-6);
    }

    #[rstest]
    #[case(12.5)]
    #[case(-33.0)]
    #[case(270.0)]
    fn test_rotation_preserves_length(#[case] roll: f32) {
        let (x, y) = roll_compensate(0.6, 0.8, roll);
        assert_abs_diff_eq!((x * x + y * y).sqrt(), 1.0, epsilon = 1e-5);
    }
}
