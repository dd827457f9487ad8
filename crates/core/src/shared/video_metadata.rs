use std::path::PathBuf;

/// Properties of an opened frame source.
///
/// `total_frames` is 0 when the container does not report a frame count.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Metadata of a still image treated as a one-frame stream.
    pub fn still(width: u32, height: u32, source_path: Option<PathBuf>) -> Self {
        Self {
            width,
            height,
            fps: 0.0,
            total_frames: 1,
            source_path,
        }
    }
}
