pub mod eye_landmarks;
pub mod face_detection;
pub mod face_detector;
pub mod gaze_estimator;
pub mod gaze_vector;
pub mod head_pose;
pub mod head_pose_estimator;
pub mod landmark_detector;
