/// Minimum face-detection confidence; a detection must strictly exceed it.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.60;

/// Half extent, in face-crop pixels, of the square box cut around each eye.
pub const EYE_BOX_HALF_SIZE: i32 = 20;

/// Extension of the weights file that sits next to a model structure file.
pub const WEIGHTS_EXTENSION: &str = "bin";

pub const HEAD_POSE_YAW_OUTPUT: &str = "angle_y_fc";
pub const HEAD_POSE_PITCH_OUTPUT: &str = "angle_p_fc";
pub const HEAD_POSE_ROLL_OUTPUT: &str = "angle_r_fc";

pub const GAZE_LEFT_EYE_INPUT: &str = "left_eye_image";
pub const GAZE_RIGHT_EYE_INPUT: &str = "right_eye_image";
pub const GAZE_HEAD_POSE_INPUT: &str = "head_pose_angles";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
