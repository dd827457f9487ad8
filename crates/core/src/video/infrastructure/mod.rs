pub mod ffmpeg_camera_reader;
pub mod ffmpeg_reader;
pub mod frame_source_factory;
pub mod image_file_reader;
pub mod image_file_writer;
