use crate::estimation::domain::gaze_vector::GazeVector;

use super::gaze_sink::GazeSink;

/// Sink used when pointer control is disabled: logs each vector.
#[derive(Debug, Default)]
pub struct LoggingGazeSink {
    received: usize,
    last: Option<GazeVector>,
}

impl LoggingGazeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub fn last(&self) -> Option<&GazeVector> {
        self.last.as_ref()
    }
}

impl GazeSink for LoggingGazeSink {
    fn on_gaze(
        &mut self,
        frame_index: usize,
        gaze: &GazeVector,
    ) -> Result<(), Box<dyn std::error::Error>> {
        log::info!(
            "Frame {frame_index}: gaze ({:.4}, {:.4}) raw {:?}",
            gaze.x,
            gaze.y,
            gaze.raw
        );
        self.received += 1;
        self.last = Some(*gaze);
        Ok(())
    }
}
