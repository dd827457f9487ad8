use std::path::Path;

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::video::domain::frame_source::FrameSource;

use super::ffmpeg_camera_reader::{is_camera_input, FfmpegCameraReader};
use super::ffmpeg_reader::FfmpegReader;
use super::image_file_reader::ImageFileReader;

/// Whether `path` names a still image, judged by its extension.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Camera,
    Image,
    Video,
}

impl SourceKind {
    pub fn of(path: &Path) -> Self {
        if is_camera_input(path) {
            SourceKind::Camera
        } else if is_image_path(path) {
            SourceKind::Image
        } else {
            SourceKind::Video
        }
    }
}

/// Frame source suited to `path`: `cam` inputs through a capture device,
/// stills through `image`, anything else through ffmpeg.
pub fn source_for(path: &Path) -> Box<dyn FrameSource> {
    match SourceKind::of(path) {
        SourceKind::Camera => Box::new(FfmpegCameraReader::new()),
        SourceKind::Image => Box::new(ImageFileReader::new()),
        SourceKind::Video => Box::new(FfmpegReader::new()),
    }
}
