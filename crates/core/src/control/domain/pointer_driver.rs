use std::time::Duration;

/// Moves the system pointer.
pub trait PointerDriver: Send {
    /// Moves the pointer by a pixel offset from its current position.
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), Box<dyn std::error::Error>>;

    /// Waits between interpolation steps.
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
