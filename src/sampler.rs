use std::{
    ops::ControlFlow,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use crate::history::{Sample, SharedHistory};
use crate::network::LinkStateSource;
use crate::schedule::{run_every, Shutdown};
use crate::util::format_stamp;

/// Periodically records one aggregated link reading into the shared history.
pub struct Sampler {
    source: Arc<dyn LinkStateSource>,
    history: SharedHistory,
}

impl Sampler {
    pub fn new(source: Arc<dyn LinkStateSource>, history: SharedHistory) -> Self {
        Self { source, history }
    }

    /// Takes one reading at `now`. Returns `None` when the tick is skipped.
    pub fn tick(&self, now: DateTime<Utc>) -> Option<Sample> {
        let interfaces = match self.source.candidate_interfaces() {
            Ok(interfaces) => interfaces,
            Err(err) => {
                debug!(target: "monitor", "Skipping sample: {}", err);
                return None;
            }
        };

        // Wired adapters are redundant paths: one carrier is enough.
        let is_down = interfaces
            .iter()
            .all(|name| self.source.is_interface_down(name));
        let sample = Sample::new(now, is_down);

        let mut history = self.history.lock();
        let trimmed = history.push(sample);
        info!(
            target: "monitor",
            "Adding check for {:?} at {}. Number of checks is {}",
            interfaces,
            sample,
            history.len()
        );
        if trimmed > 0 {
            debug!(target: "monitor", "Trimmed {} oldest checks", trimmed);
        }
        Some(sample)
    }

    /// Runs the sampler on its own thread until `shutdown` fires.
    pub fn spawn(self, tick: Duration, shutdown: Shutdown) -> JoinHandle<()> {
        thread::spawn(move || {
            info!(target: "monitor", "Starting monitor at {}", format_stamp(Utc::now()));
            run_every(tick, &shutdown, || {
                self.tick(Utc::now());
                ControlFlow::Continue(())
            });
            info!(target: "monitor", "Monitor stopped");
        })
    }
}
