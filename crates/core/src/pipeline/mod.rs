pub mod frame_analysis;
pub mod gaze_pipeline;
pub mod pipeline_config;
pub mod pipeline_logger;
pub mod stage_latency;
