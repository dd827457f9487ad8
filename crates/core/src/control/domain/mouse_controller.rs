//! Gaze-driven pointer movement with precision and speed presets.
//!
//! A unit gaze component maps to `precision` pixels. Screen y grows
//! downward while gaze y grows upward, so y is negated. Each move is split
//! into `speed` steps of [`STEP_INTERVAL`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::estimation::domain::gaze_vector::GazeVector;

use super::gaze_sink::GazeSink;
use super::pointer_driver::PointerDriver;

pub const STEP_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Precision {
    High,
    #[default]
    Medium,
    Low,
}

impl Precision {
    /// Pixels moved per unit of gaze.
    pub fn pixels(&self) -> f32 {
        match self {
            Precision::High => 100.0,
            Precision::Medium => 500.0,
            Precision::Low => 1000.0,
        }
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Precision::High),
            "medium" => Ok(Precision::Medium),
            "low" => Ok(Precision::Low),
            _ => Err(format!("unknown precision '{s}' (expected high, medium or low)")),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Precision::High => "high",
            Precision::Medium => "medium",
            Precision::Low => "low",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Speed {
    Fast,
    #[default]
    Medium,
    Slow,
}

impl Speed {
    /// Number of interpolation steps per move.
    pub fn steps(&self) -> u32 {
        match self {
            Speed::Fast => 1,
            Speed::Medium => 5,
            Speed::Slow => 10,
        }
    }

    pub fn duration(&self) -> Duration {
        STEP_INTERVAL * self.steps()
    }
}

impl FromStr for Speed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(Speed::Fast),
            "medium" => Ok(Speed::Medium),
            "slow" => Ok(Speed::Slow),
            _ => Err(format!("unknown speed '{s}' (expected fast, medium or slow)")),
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Speed::Fast => "fast",
            Speed::Medium => "medium",
            Speed::Slow => "slow",
        })
    }
}

/// Pixel offset for a gaze vector at the given precision.
pub fn pointer_delta(gaze: &GazeVector, precision: Precision) -> (i32, i32) {
    let scale = precision.pixels();
    (
        (gaze.x * scale).round() as i32,
        (-gaze.y * scale).round() as i32,
    )
}

/// Splits `(dx, dy)` into `steps` offsets whose sum is exactly `(dx, dy)`.
pub fn interpolate(dx: i32, dy: i32, steps: u32) -> Vec<(i32, i32)> {
    let steps = steps.max(1) as i64;
    let (dx, dy) = (dx as i64, dy as i64);
    let mut previous = (0i64, 0i64);
    (1..=steps)
        .map(|i| {
            let target = (dx * i / steps, dy * i / steps);
            let step = (target.0 - previous.0, target.1 - previous.1);
            previous = target;
            (step.0 as i32, step.1 as i32)
        })
        .collect()
}

pub struct MouseController<D: PointerDriver> {
    driver: D,
    precision: Precision,
    speed: Speed,
}

impl<D: PointerDriver> MouseController<D> {
    pub fn new(driver: D, precision: Precision, speed: Speed) -> Self {
        Self {
            driver,
            precision,
            speed,
        }
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn move_by(&mut self, gaze: &GazeVector) -> Result<(), Box<dyn std::error::Error>> {
        let (dx, dy) = pointer_delta(gaze, self.precision);
        if (dx, dy) == (0, 0) {
            return Ok(());
        }
        let steps = interpolate(dx, dy, self.speed.steps());
        let last = steps.len() - 1;
        for (i, (sx, sy)) in steps.into_iter().enumerate() {
            if (sx, sy) != (0, 0) {
                self.driver.move_relative(sx, sy)?;
            }
            if i < last {
                self.driver.pause(STEP_INTERVAL);
            }
        }
        Ok(())
    }
}

impl<D: PointerDriver> GazeSink for MouseController<D> {
    fn on_gaze(
        &mut self,
        frame_index: usize,
        gaze: &GazeVector,
    ) -> Result<(), Box<dyn std::error::Error>> {
        log::debug!("Frame {frame_index}: moving pointer for gaze ({:.3}, {:.3})", gaze.x, gaze.y);
        self.move_by(gaze)
    }
}
