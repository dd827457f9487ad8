pub mod gaze_sink;
pub mod logging_gaze_sink;
pub mod mouse_controller;
pub mod pointer_driver;
