use std::path::Path;

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes frames through the `image` crate, creating parent directories.
#[derive(Default)]
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if frame.channels() != 3 {
            return Err(format!("cannot write {}-channel frame", frame.channels()).into());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("frame data does not match its dimensions")?;
        img.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/frame_000001.png");
        let frame = Frame::new([12u8, 34, 56].repeat(6 * 5), 6, 5, 3, 1);

        ImageFileWriter::new().write(&path, &frame).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (6, 5));
        assert_eq!(img.get_pixel(5, 4).0, [12, 34, 56]);
    }

    #[test]
    fn test_write_rejects_non_rgb_frame() {
        let dir = tempfile::tempdir().unwrap();
        let frame = Frame::new(vec![0; 4], 2, 2, 1, 0);
        assert!(ImageFileWriter::new()
            .write(&dir.path().join("gray.png"), &frame)
            .is_err());
    }

    #[test]
    fn test_write_unknown_extension_fails() {
        let dir = tempfile::tempdir().unwrap();
        let frame = Frame::new(vec![0; 12], 2, 2, 3, 0);
        assert!(ImageFileWriter::new()
            .write(&dir.path().join("frame.unknownext"), &frame)
            .is_err());
    }
}
