pub mod face_detection_model;
pub mod facial_landmarks_model;
pub mod gaze_model;
pub mod head_pose_model;
