//! Relative pointer movement on X11 displays.

use x11rb::connection::Connection;
use x11rb::protocol::xproto::ConnectionExt;
use x11rb::rust_connection::RustConnection;

use crate::control::domain::pointer_driver::PointerDriver;

pub struct X11Pointer {
    connection: RustConnection,
}

impl X11Pointer {
    /// Connects to the display named by `$DISPLAY`.
    pub fn connect() -> Result<Self, Box<dyn std::error::Error>> {
        let (connection, screen_num) = RustConnection::connect(None)
            .map_err(|e| format!("failed to connect to X11 display: {e}"))?;
        if let Some(screen) = connection.setup().roots.get(screen_num) {
            log::info!(
                "Pointer control on X11 screen {screen_num} ({}x{})",
                screen.width_in_pixels,
                screen.height_in_pixels
            );
        }
        Ok(Self { connection })
    }
}

impl PointerDriver for X11Pointer {
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), Box<dyn std::error::Error>> {
        let dx = clamp_i16(dx);
        let dy = clamp_i16(dy);
        // No source or destination window: the server offsets the pointer.
        self.connection
            .warp_pointer(x11rb::NONE, x11rb::NONE, 0, 0, 0, 0, dx, dy)
            .map_err(|e| format!("failed to warp pointer: {e}"))?;
        self.connection
            .flush()
            .map_err(|e| format!("failed to flush X11 connection: {e}"))?;
        Ok(())
    }
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
