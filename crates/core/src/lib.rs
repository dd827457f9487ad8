//! Gaze-driven pointer control.
//!
//! Each frame passes through face detection, facial landmarks, head pose and
//! gaze estimation. The resulting gaze vector moves the pointer; an optional
//! observer renders what each stage found.

pub mod control;
pub mod estimation;
pub mod inference;
pub mod pipeline;
pub mod shared;
pub mod video;
pub mod visualization;
