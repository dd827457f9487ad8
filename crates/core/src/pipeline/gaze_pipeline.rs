use std::time::{Duration, Instant};

use crate::control::domain::gaze_sink::GazeSink;
use crate::estimation::domain::face_detector::FaceDetector;
use crate::estimation::domain::gaze_estimator::GazeEstimator;
use crate::estimation::domain::head_pose_estimator::HeadPoseEstimator;
use crate::estimation::domain::landmark_detector::LandmarkDetector;
use crate::estimation::infrastructure::face_detection_model::FaceDetectionModel;
use crate::estimation::infrastructure::facial_landmarks_model::FacialLandmarksModel;
use crate::estimation::infrastructure::gaze_model::GazeModel;
use crate::estimation::infrastructure::head_pose_model::HeadPoseModel;
use crate::inference::domain::inference_backend::InferenceBackend;
use crate::inference::domain::model_error::ModelError;
use crate::shared::frame::Frame;
use crate::shared::stage::Stage;
use crate::visualization::domain::frame_observer::FrameObserver;

use super::frame_analysis::{FrameAnalysis, FrameOutcome, SessionSummary, SkipReason};
use super::pipeline_config::GazePipelineConfig;
use super::pipeline_logger::PipelineLogger;
use super::stage_latency::StageLatency;

/// Runs face detection, landmarks, head pose and gaze on each frame, in that
/// order, stopping at the first stage that finds nothing.
///
/// Owns the inference backend for the whole session; the stages only borrow
/// it while they are constructed and loaded.
pub struct GazePipeline {
    backend: Option<Box<dyn InferenceBackend>>,
    face: Box<dyn FaceDetector>,
    landmarks: Box<dyn LandmarkDetector>,
    head_pose: Box<dyn HeadPoseEstimator>,
    gaze: Box<dyn GazeEstimator>,
    latency: StageLatency,
}

impl GazePipeline {
    /// Builds all four models, then loads each onto `config.device`.
    ///
    /// Every model is read before any is compiled, so a bad path fails before
    /// the slower device work starts.
    pub fn load(
        backend: Box<dyn InferenceBackend>,
        config: &GazePipelineConfig,
    ) -> Result<Self, ModelError> {
        let device = config.device;
        let order = config.channel_order;
        let backend_ref = backend.as_ref();
        for (stage, files) in config.model_files() {
            log::debug!("{stage} model: {}", files.structure().display());
        }

        let mut face = FaceDetectionModel::new(backend_ref, config.face_model.clone(), device)?
            .with_threshold(config.confidence_threshold)
            .with_channel_order(order);
        let mut landmarks =
            FacialLandmarksModel::new(backend_ref, config.landmarks_model.clone(), device)?
                .with_channel_order(order);
        let mut head_pose =
            HeadPoseModel::new(backend_ref, config.head_pose_model.clone(), device)?
                .with_channel_order(order);
        let mut gaze = GazeModel::new(backend_ref, config.gaze_model.clone(), device)?
            .with_channel_order(order);

        let started = Instant::now();
        face.load(backend_ref)?;
        landmarks.load(backend_ref)?;
        head_pose.load(backend_ref)?;
        gaze.load(backend_ref)?;
        log::info!(
            "Loaded 4 models on {device} in {:.1}s",
            started.elapsed().as_secs_f64()
        );

        let mut pipeline = Self::from_stages(
            Box::new(face),
            Box::new(landmarks),
            Box::new(head_pose),
            Box::new(gaze),
        );
        pipeline.backend = Some(backend);
        Ok(pipeline)
    }

    /// Assembles a pipeline from already-loaded stages.
    pub fn from_stages(
        face: Box<dyn FaceDetector>,
        landmarks: Box<dyn LandmarkDetector>,
        head_pose: Box<dyn HeadPoseEstimator>,
        gaze: Box<dyn GazeEstimator>,
    ) -> Self {
        Self {
            backend: None,
            face,
            landmarks,
            head_pose,
            gaze,
            latency: StageLatency::default(),
        }
    }

    pub fn backend(&self) -> Option<&dyn InferenceBackend> {
        self.backend.as_deref()
    }

    /// Inference time accumulated over every processed frame.
    pub fn latency(&self) -> &StageLatency {
        &self.latency
    }

    /// Runs the stages on one frame.
    ///
    /// Empty stage results and recoverable inference errors end the frame
    /// with a [`SkipReason`]. Only fatal model errors are returned as `Err`.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameAnalysis, ModelError> {
        let mut analysis = FrameAnalysis {
            frame_index: frame.index(),
            face: None,
            eyes: None,
            head_pose: None,
            outcome: FrameOutcome::Skipped(SkipReason::NoFace),
            timings: Vec::with_capacity(Stage::ALL.len()),
        };

        let result = self.face.detect(frame);
        let took = self.face.last_inference_duration();
        let face = match self.settle(&mut analysis, Stage::FaceDetection, result, took)? {
            Ok(Some(face)) => face,
            other => {
                let reason = other.err().unwrap_or(SkipReason::NoFace);
                return Ok(skip(analysis, reason));
            }
        };

        let result = self.landmarks.locate_eyes(&face);
        let took = self.landmarks.last_inference_duration();
        let eyes = match self.settle(&mut analysis, Stage::FacialLandmarks, result, took)? {
            Ok(Some(eyes)) => eyes,
            other => {
                analysis.face = Some(face);
                let reason = other.err().unwrap_or(SkipReason::NoEyes);
                return Ok(skip(analysis, reason));
            }
        };

        let result = self.head_pose.estimate(&face);
        let took = self.head_pose.last_inference_duration();
        let pose = match self.settle(&mut analysis, Stage::HeadPose, result, took)? {
            Ok(pose) => pose,
            Err(reason) => {
                analysis.face = Some(face);
                analysis.eyes = Some(eyes);
                return Ok(skip(analysis, reason));
            }
        };

        let result = self.gaze.estimate(&eyes.left, &eyes.right, &pose);
        let took = self.gaze.last_inference_duration();
        analysis.outcome = match self.settle(&mut analysis, Stage::GazeEstimation, result, took)? {
            Ok(gaze) => FrameOutcome::Tracked(gaze),
            Err(reason) => FrameOutcome::Skipped(reason),
        };
        analysis.face = Some(face);
        analysis.eyes = Some(eyes);
        analysis.head_pose = Some(pose);
        Ok(analysis)
    }

    /// Feeds every frame through the stages until the source is exhausted.
    ///
    /// Tracked vectors go to `sink`; every frame, tracked or not, goes to
    /// `observer` when one is attached. A source error or a fatal model error
    /// ends the session.
    pub fn run<I>(
        &mut self,
        frames: I,
        total_frames: usize,
        sink: &mut dyn GazeSink,
        mut observer: Option<&mut dyn FrameObserver>,
        logger: &mut dyn PipelineLogger,
    ) -> Result<SessionSummary, Box<dyn std::error::Error>>
    where
        I: IntoIterator<Item = Result<Frame, Box<dyn std::error::Error>>>,
    {
        let started = Instant::now();
        let mut summary = SessionSummary::default();

        for frame in frames {
            let frame = frame?;
            let analysis = self.process_frame(&frame)?;
            summary.frames += 1;

            for (stage, duration) in &analysis.timings {
                logger.timing(*stage, *duration);
            }
            match analysis.outcome {
                FrameOutcome::Tracked(gaze) => {
                    summary.tracked += 1;
                    sink.on_gaze(analysis.frame_index, &gaze)?;
                }
                FrameOutcome::Skipped(reason) => {
                    *summary.skipped.entry(reason).or_default() += 1;
                    logger.skipped(analysis.frame_index, reason);
                }
            }
            if let Some(observer) = observer.as_deref_mut() {
                observer.observe(&frame, &analysis.annotations())?;
            }
            logger.progress(summary.frames, total_frames);
        }

        summary.latency = self.latency.clone();
        summary.elapsed = started.elapsed();
        logger.info(&format!(
            "Session finished: {} of {} frames tracked, {:.1}ms inference",
            summary.tracked,
            summary.frames,
            summary.latency.total().as_secs_f64() * 1000.0
        ));
        logger.summary();
        Ok(summary)
    }

    /// Records a finished stage, or turns a recoverable error into a skip.
    fn settle<T>(
        &mut self,
        analysis: &mut FrameAnalysis,
        stage: Stage,
        result: Result<T, ModelError>,
        took: Duration,
    ) -> Result<Result<T, SkipReason>, ModelError> {
        match result {
            Ok(value) => {
                self.latency.record(stage, took);
                analysis.timings.push((stage, took));
                Ok(Ok(value))
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                log::warn!("Frame {}: {stage} stage failed: {e}", analysis.frame_index);
                Ok(Err(SkipReason::Failed(stage)))
            }
        }
    }
}

fn skip(mut analysis: FrameAnalysis, reason: SkipReason) -> FrameAnalysis {
    analysis.outcome = FrameOutcome::Skipped(reason);
    analysis
}
