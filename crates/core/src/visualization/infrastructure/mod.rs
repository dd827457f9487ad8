pub mod annotated_frame_writer;
pub mod overlay_renderer;
