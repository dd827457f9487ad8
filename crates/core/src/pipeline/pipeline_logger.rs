use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use crate::shared::stage::Stage;

use super::frame_analysis::SkipReason;

/// Cross-cutting logger for gaze pipeline events.
///
/// Keeps the orchestration loop free of output concerns; the CLI reports
/// through stdout while tests use the null logger.
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 when the source length is unknown.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long one stage's inference took for one frame.
    fn timing(&mut self, stage: Stage, duration: Duration);

    /// Record a frame that produced no gaze vector.
    fn skipped(&mut self, frame_index: usize, reason: SkipReason);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: Stage, _duration: Duration) {}
    fn skipped(&mut self, _frame_index: usize, _reason: SkipReason) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger that tracks per-stage timing and skip counts and
/// prints a summary report when the session ends.
///
/// Progress output is throttled to every `throttle_frames` frames.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<Stage, Vec<f64>>,
    skips: BTreeMap<SkipReason, usize>,
    start_time: Instant,
    frames_seen: usize,
    total_frames: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            skips: BTreeMap::new(),
            start_time: Instant::now(),
            frames_seen: 0,
            total_frames: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if nothing was processed.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames_seen == 0 && self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames_seen;
        let skipped: usize = self.skips.values().sum();
        let mut lines = Vec::new();

        lines.push(format!(
            "Gaze summary ({frames} frames, {} tracked, {skipped} skipped, {:.1}s total):",
            frames.saturating_sub(skipped),
            elapsed_ms / 1000.0
        ));

        let mut inference_ms = 0.0;
        for stage in Stage::ALL {
            let Some(durations) = self.timings.get(&stage) else {
                continue;
            };
            let total_ms: f64 = durations.iter().sum();
            inference_ms += total_ms;
            let avg_ms = if durations.is_empty() {
                0.0
            } else {
                total_ms / durations.len() as f64
            };
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({pct:4.1}%)",
                stage.name()
            ));
        }
        if !self.timings.is_empty() {
            lines.push(format!("  Inference total: {inference_ms:.0}ms"));
        }

        for (reason, count) in &self.skips {
            lines.push(format!("  Skipped ({reason}): {count}"));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    /// Returns the per-frame timings (ms) recorded for a stage.
    pub fn timings_for(&self, stage: Stage) -> Option<&[f64]> {
        self.timings.get(&stage).map(|v| v.as_slice())
    }

    pub fn skips_for(&self, reason: SkipReason) -> usize {
        self.skips.get(&reason).copied().unwrap_or(0)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = current;
        self.total_frames = total;
        if current % self.throttle_frames != 0 && current != total {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processing: {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("Processing: {current} frames");
        }
    }

    fn timing(&mut self, stage: Stage, duration: Duration) {
        self.timings
            .entry(stage)
            .or_default()
            .push(duration.as_secs_f64() * 1000.0);
    }

    fn skipped(&mut self, frame_index: usize, reason: SkipReason) {
        *self.skips.entry(reason).or_default() += 1;
        log::debug!("Frame {frame_index} skipped: {reason}");
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
