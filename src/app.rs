use std::{sync::Arc, time::Duration as StdDuration};
use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};
use crate::config::Config;
use crate::constants::SAMPLE_UNIT_SECS;
use crate::decision::{DecisionEngine, Outcome};
use crate::history::SharedHistory;
use crate::network::LinkStateSource;
use crate::runner::ActionRunner;
use crate::sampler::Sampler;
use crate::schedule::Shutdown;

/// Wires the sampler and decision engine around one shared history.
pub struct Watchdog {
    config: Config,
    source: Arc<dyn LinkStateSource>,
    runner: Box<dyn ActionRunner>,
    started_at: DateTime<Utc>,
    tick: StdDuration,
}

impl Watchdog {
    pub fn new(
        config: Config,
        source: Arc<dyn LinkStateSource>,
        runner: Box<dyn ActionRunner>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            source,
            runner,
            started_at,
            tick: StdDuration::from_secs(SAMPLE_UNIT_SECS),
        }
    }

    /// Overrides the tick interval for both loops.
    pub fn with_tick(mut self, tick: StdDuration) -> Self {
        self.tick = tick;
        self
    }

    /// Blocks until a verdict is reached or `shutdown` fires.
    pub fn run(self, shutdown: Shutdown) -> Outcome {
        let sample_unit = Duration::from_std(self.tick).unwrap_or_else(|_| Duration::minutes(1));
        let history = SharedHistory::new(self.config.period);

        let sampler = Sampler::new(self.source, history.clone()).spawn(self.tick, shutdown.clone());
        let engine = DecisionEngine::new(self.config, history, self.runner, self.started_at, sample_unit);
        let outcome = engine.run(self.tick, &shutdown);

        if sampler.join().is_err() {
            warn!("Monitor thread panicked");
        }
        outcome
    }
}

/// Runs the commands straight away, without any monitoring.
pub fn run_unchecked(config: &Config, runner: &dyn ActionRunner) -> Outcome {
    let outcome = Outcome::from_run(runner.run(&config.commands));
    match &outcome {
        Outcome::RemediationFailed(err) => {
            error!(target: "runner", "Error executing commands. {}. Exiting.", err)
        }
        _ => info!(target: "runner", "successfully run commands. Exiting"),
    }
    outcome
}
