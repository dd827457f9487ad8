use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;
use crate::visualization::domain::frame_observer::{FrameAnnotations, FrameObserver};

use super::overlay_renderer::OverlayRenderer;

/// Renders the overlay and saves each frame as `frame_<index>.png`.
pub struct AnnotatedFrameWriter {
    renderer: OverlayRenderer,
    writer: Box<dyn ImageWriter>,
    output_dir: PathBuf,
    written: usize,
}

impl AnnotatedFrameWriter {
    pub fn new(
        renderer: OverlayRenderer,
        writer: Box<dyn ImageWriter>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            renderer,
            writer,
            output_dir: output_dir.into(),
            written: 0,
        }
    }

    pub fn path_for(&self, frame_index: usize) -> PathBuf {
        self.output_dir.join(format!("frame_{frame_index:06}.png"))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameObserver for AnnotatedFrameWriter {
    fn observe(
        &mut self,
        frame: &Frame,
        annotations: &FrameAnnotations,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let annotated = self.renderer.render(frame, annotations)?;
        let path = self.path_for(frame.index());
        self.writer.write(&path, &annotated)?;
        self.written += 1;
        log::debug!("Wrote overlay {}", path.display());
        Ok(())
    }
}
