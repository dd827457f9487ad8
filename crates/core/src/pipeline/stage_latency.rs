use std::collections::BTreeMap;
use std::time::Duration;

use crate::shared::stage::Stage;

/// Accumulated inference time of one stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageTiming {
    pub total: Duration,
    pub calls: u32,
}

impl StageTiming {
    pub fn average(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total / self.calls
        }
    }
}

/// Session-wide inference latency per stage. Only grows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageLatency {
    stages: BTreeMap<Stage, StageTiming>,
}

impl StageLatency {
    pub fn record(&mut self, stage: Stage, duration: Duration) {
        let timing = self.stages.entry(stage).or_default();
        timing.total += duration;
        timing.calls += 1;
    }

    pub fn get(&self, stage: Stage) -> StageTiming {
        self.stages.get(&stage).copied().unwrap_or_default()
    }

    /// Sum over all stages.
    pub fn total(&self) -> Duration {
        self.stages.values().map(|t| t.total).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, StageTiming)> + '_ {
        self.stages.iter().map(|(s, t)| (*s, *t))
    }
}
