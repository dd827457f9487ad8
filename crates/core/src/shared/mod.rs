pub mod bounding_box;
pub mod constants;
pub mod crop;
pub mod frame;
pub mod stage;
pub mod video_metadata;
