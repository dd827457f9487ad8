use crate::estimation::domain::gaze_vector::GazeVector;

/// Receives the gaze vector of every successfully tracked frame.
pub trait GazeSink: Send {
    fn on_gaze(
        &mut self,
        frame_index: usize,
        gaze: &GazeVector,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
