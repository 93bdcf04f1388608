//! telemetry/timers.rs
//! Wall-clock accounting per container stage.
//!
//! Stage totals are kept in a `BTreeMap` so serialized reports list stages
//! in a fixed order.

use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Pulling frame bytes from the source.
    Read,
    /// Pushing frame bytes to the sink, including the final sync.
    Write,
    /// Record serialization and frame checksums on the write path.
    Encode,
    /// Record parsing on the read path.
    Decode,
    /// Checksum verification on the read path.
    Validate,
}

impl Stage {
    pub const ALL: [Stage; 5] = [Stage::Read, Stage::Write, Stage::Encode, Stage::Decode, Stage::Validate];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::Write => "write",
            Stage::Encode => "encode",
            Stage::Decode => "decode",
            Stage::Validate => "validate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accumulated time per stage; absent stages read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimes(BTreeMap<Stage, Duration>);

impl StageTimes {
    pub fn add(&mut self, stage: Stage, dur: Duration) {
        *self.0.entry(stage).or_default() += dur;
    }

    pub fn get(&self, stage: Stage) -> Duration {
        self.0.get(&stage).copied().unwrap_or_default()
    }

    pub fn get_ms(&self, stage: Stage) -> f64 {
        self.get(stage).as_secs_f64() * 1_000.0
    }

    pub fn total(&self) -> Duration {
        self.0.values().sum()
    }

    pub fn merge(&mut self, other: &StageTimes) {
        for (stage, dur) in other {
            self.add(*stage, *dur);
        }
    }

    /// Stage with the largest share, if any time was recorded.
    pub fn dominant(&self) -> Option<(Stage, Duration)> {
        self.0
            .iter()
            .max_by_key(|(_, d)| **d)
            .map(|(s, d)| (*s, *d))
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Stage, Duration> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a StageTimes {
    type Item = (&'a Stage, &'a Duration);
    type IntoIter = btree_map::Iter<'a, Stage, Duration>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Run clock plus per-stage totals for one writer or reader.
#[derive(Clone, Debug)]
pub struct TelemetryTimer {
    pub started_at: Instant,
    /// Set once the run is over; `elapsed` then stops growing.
    pub finished_at: Option<Instant>,
    pub stages: StageTimes,
}

impl Default for TelemetryTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryTimer {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            finished_at: None,
            stages: StageTimes::default(),
        }
    }

    /// Stop the run clock. Later calls keep the first stop time.
    pub fn finish(&mut self) {
        self.finished_at.get_or_insert_with(Instant::now);
    }

    pub fn add_stage_time(&mut self, stage: Stage, dur: Duration) {
        self.stages.add(stage, dur);
    }

    /// Run `f` and charge its wall time to `stage`.
    pub fn time<R>(&mut self, stage: Stage, f: impl FnOnce() -> R) -> R {
        let t = Instant::now();
        let out = f();
        self.stages.add(stage, t.elapsed());
        out
    }

    pub fn elapsed(&self) -> Duration {
        self.finished_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_keeps_first_stop() {
        let mut t = TelemetryTimer::new();
        t.finish();
        let first = t.finished_at;
        std::thread::sleep(Duration::from_millis(2));
        t.finish();
        assert_eq!(t.finished_at, first);
    }

    #[test]
    fn dominant_stage() {
        let mut s = StageTimes::default();
        assert_eq!(s.dominant(), None);
        s.add(Stage::Read, Duration::from_millis(1));
        s.add(Stage::Decode, Duration::from_millis(4));
        assert_eq!(s.dominant(), Some((Stage::Decode, Duration::from_millis(4))));
    }
}
