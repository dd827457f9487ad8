use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use gaze_pointer_core::control::domain::gaze_sink::GazeSink;
use gaze_pointer_core::control::domain::logging_gaze_sink::LoggingGazeSink;
use gaze_pointer_core::control::domain::mouse_controller::{Precision, Speed};
use gaze_pointer_core::inference::domain::device::Device;
use gaze_pointer_core::inference::domain::preprocess::ChannelOrder;
use gaze_pointer_core::inference::infrastructure::ort_backend::OrtBackend;
use gaze_pointer_core::pipeline::gaze_pipeline::GazePipeline;
use gaze_pointer_core::pipeline::pipeline_config::GazePipelineConfig;
use gaze_pointer_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use gaze_pointer_core::video::infrastructure::ffmpeg_camera_reader::{camera_device, is_camera_input};
use gaze_pointer_core::video::infrastructure::frame_source_factory::source_for;
use gaze_pointer_core::video::infrastructure::image_file_writer::ImageFileWriter;
use gaze_pointer_core::visualization::domain::frame_observer::{FrameObserver, OverlayLayers};
use gaze_pointer_core::visualization::infrastructure::annotated_frame_writer::AnnotatedFrameWriter;
use gaze_pointer_core::visualization::infrastructure::overlay_renderer::OverlayRenderer;

/// Moves the mouse pointer where a face in a video or image is looking.
#[derive(Parser)]
#[command(name = "gaze-pointer")]
struct Cli {
    /// Face detection model (.onnx).
    #[arg(short = 'f', long)]
    face_model: PathBuf,

    /// Facial landmarks model (.onnx).
    #[arg(short = 'l', long)]
    landmarks_model: PathBuf,

    /// Head pose estimation model (.onnx).
    #[arg(long, visible_alias = "hp")]
    head_pose_model: PathBuf,

    /// Gaze estimation model (.onnx).
    #[arg(short = 'g', long)]
    gaze_model: PathBuf,

    /// Input video or image file, or `cam` (`cam:<device>`) for a webcam.
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Target device: CPU, GPU, CUDA, COREML or DIRECTML.
    #[arg(short = 'd', long, default_value = "CPU")]
    device: Device,

    /// Custom operator library registered with every model.
    #[arg(short = 'e', long)]
    extension: Option<PathBuf>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value = "0.6")]
    threshold: f32,

    /// Pixel order of model image inputs: bgr or rgb.
    #[arg(long, default_value = "bgr")]
    channel_order: ChannelOrder,

    /// Pointer precision: high, medium or low.
    #[arg(long, default_value = "medium")]
    precision: Precision,

    /// Pointer speed: fast, medium or slow.
    #[arg(long, default_value = "medium")]
    speed: Speed,

    /// Log gaze vectors instead of moving the pointer.
    #[arg(long)]
    no_mouse: bool,

    /// Stage results to draw (comma-separated: face,landmarks,head_pose,gaze).
    #[arg(long)]
    overlay: Option<String>,

    /// Directory for annotated frames (required with --overlay).
    #[arg(long)]
    overlay_dir: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let layers = validate(&cli)?;

    let mut config = GazePipelineConfig::new(
        &cli.face_model,
        &cli.landmarks_model,
        &cli.head_pose_model,
        &cli.gaze_model,
    );
    config.device = cli.device;
    config.extension = cli.extension.clone();
    config.confidence_threshold = cli.threshold;
    config.channel_order = cli.channel_order;
    config.validate()?;

    let backend = OrtBackend::new(config.extension.clone())?;
    let mut pipeline = GazePipeline::load(Box::new(backend), &config)?;

    let mut sink = build_sink(&cli)?;
    let mut observer = build_observer(layers, cli.overlay_dir.as_deref());
    let mut logger = StdoutPipelineLogger::default();

    let mut source = source_for(&cli.input);
    let metadata = source.open(&cli.input)?;
    logger.info(&format!(
        "Tracking gaze in {} ({}x{})",
        cli.input.display(),
        metadata.width,
        metadata.height
    ));

    let result = pipeline.run(
        source.frames(),
        metadata.total_frames,
        sink.as_mut(),
        observer.as_mut().map(|o| o as &mut dyn FrameObserver),
        &mut logger,
    );
    source.close();
    let summary = result?;

    if let Some(dir) = &cli.overlay_dir {
        log::info!("Annotated frames written to {}", dir.display());
    }
    log::info!(
        "Tracked {} of {} frames ({} skipped)",
        summary.tracked,
        summary.frames,
        summary.skipped_total()
    );
    Ok(())
}

fn build_sink(cli: &Cli) -> Result<Box<dyn GazeSink>, Box<dyn std::error::Error>> {
    if cli.no_mouse {
        return Ok(Box::new(LoggingGazeSink::new()));
    }
    mouse_sink(cli.precision, cli.speed)
}

#[cfg(target_os = "linux")]
fn mouse_sink(
    precision: Precision,
    speed: Speed,
) -> Result<Box<dyn GazeSink>, Box<dyn std::error::Error>> {
    use gaze_pointer_core::control::domain::mouse_controller::MouseController;
    use gaze_pointer_core::control::infrastructure::x11_pointer::X11Pointer;

    let pointer = X11Pointer::connect()?;
    log::info!(
        "Pointer control: precision {precision}, speed {speed} ({}ms per move)",
        speed.duration().as_millis()
    );
    Ok(Box::new(MouseController::new(pointer, precision, speed)))
}

#[cfg(not(target_os = "linux"))]
fn mouse_sink(
    _precision: Precision,
    _speed: Speed,
) -> Result<Box<dyn GazeSink>, Box<dyn std::error::Error>> {
    log::warn!("Pointer control is only available on X11; logging gaze vectors instead");
    Ok(Box::new(LoggingGazeSink::new()))
}

fn build_observer(
    layers: Option<OverlayLayers>,
    overlay_dir: Option<&Path>,
) -> Option<AnnotatedFrameWriter> {
    let (layers, dir) = (layers?, overlay_dir?);
    Some(AnnotatedFrameWriter::new(
        OverlayRenderer::new(layers),
        Box::new(ImageFileWriter::new()),
        dir,
    ))
}

/// Checks flags that need no model, returning the requested overlay layers.
fn validate(cli: &Cli) -> Result<Option<OverlayLayers>, Box<dyn std::error::Error>> {
    if is_camera_input(&cli.input) {
        camera_device(&cli.input)?;
    } else if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !(0.0..=1.0).contains(&cli.threshold) {
        return Err(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            cli.threshold
        )
        .into());
    }
    if let Some(extension) = &cli.extension {
        if !extension.is_file() {
            return Err(format!("Extension library not found: {}", extension.display()).into());
        }
    }

    let layers = match &cli.overlay {
        Some(list) => {
            let layers: OverlayLayers = list.parse()?;
            if layers.is_empty() {
                return Err("--overlay needs at least one of face, landmarks, head_pose, gaze".into());
            }
            Some(layers)
        }
        None => None,
    };
    if layers.is_some() && cli.overlay_dir.is_none() {
        return Err("--overlay-dir is required when --overlay is used".into());
    }
    if layers.is_none() && cli.overlay_dir.is_some() {
        return Err("--overlay-dir has no effect without --overlay".into());
    }
    Ok(layers)
}
