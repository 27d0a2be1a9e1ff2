use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use chrono::{DateTime, Utc};
use crate::constants::{MAX_PERIOD, TRIM_SLACK};
use crate::util::{format_stamp, minute_label, state_glyph};

/// A single link reading taken by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub is_down: bool,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, is_down: bool) -> Self {
        Self { timestamp, is_down }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "📆 {} {}", format_stamp(self.timestamp), state_glyph(self.is_down))
    }
}

/// Chronological store of samples, trimmed in batches of [`TRIM_SLACK`].
#[derive(Debug)]
pub struct SampleHistory {
    samples: VecDeque<Sample>,
    period: usize,
}

impl SampleHistory {
    pub fn new(period: usize) -> Self {
        let capacity = period.min(MAX_PERIOD) + TRIM_SLACK + 1;
        Self {
            samples: VecDeque::with_capacity(capacity),
            period,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Appends a sample, then drops the oldest batch once the slack is used up.
    /// Returns the number of samples removed by the trim.
    pub fn push(&mut self, sample: Sample) -> usize {
        self.samples.push_back(sample);
        self.trim()
    }

    fn trim(&mut self) -> usize {
        if self.samples.len() <= self.period.saturating_add(TRIM_SLACK) {
            return 0;
        }
        let removed = TRIM_SLACK.min(self.samples.len());
        self.samples.drain(..removed);
        removed
    }

    /// Classifies the minute containing `t`. A minute with no sample is down.
    pub fn is_down_at(&self, t: DateTime<Utc>) -> bool {
        let bucket = minute_label(t);
        self.samples
            .iter()
            .find(|s| minute_label(s.timestamp) == bucket)
            .map_or(true, |s| s.is_down)
    }
}

/// History shared between the sampler (writer) and the decision engine (reader).
#[derive(Debug, Clone)]
pub struct SharedHistory(Arc<Mutex<SampleHistory>>);

impl SharedHistory {
    pub fn new(period: usize) -> Self {
        Self(Arc::new(Mutex::new(SampleHistory::new(period))))
    }

    // A panic in one loop must not blind the other, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, SampleHistory> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
