//! The decision side of the watchdog.
//!
//! Once enough time has passed since startup, every tick looks back over the
//! last `period` minute buckets and counts how many of them were down. When
//! fewer than `window` of them were up, the remediation commands run once and
//! the engine reaches a terminal state.

use std::{ops::ControlFlow, time::Duration as StdDuration};
use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};
use crate::config::Config;
use crate::error::WatchdogError;
use crate::history::SharedHistory;
use crate::runner::ActionRunner;
use crate::schedule::{run_every, Shutdown};
use crate::util::{format_stamp, minute_label};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WarmingUp,
    Evaluating,
    RemediatedOk,
    RemediatedFailed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::RemediatedOk | Phase::RemediatedFailed)
    }
}

/// How the watchdog run ended.
#[derive(Debug)]
pub enum Outcome {
    Remediated,
    RemediationFailed(WatchdogError),
    /// Stopped from outside before any verdict.
    Interrupted,
}

impl Outcome {
    pub fn from_run(result: crate::error::Result<()>) -> Self {
        match result {
            Ok(()) => Outcome::Remediated,
            Err(err) => Outcome::RemediationFailed(err),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::RemediationFailed(_))
    }

    /// Process exit status: 1 when remediation failed, 0 otherwise.
    pub fn exit_status(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Counts over one trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowReport {
    /// Newest probed minute.
    pub first: DateTime<Utc>,
    /// Oldest probed minute.
    pub last: DateTime<Utc>,
    pub down: usize,
    pub up: usize,
}

impl WindowReport {
    pub fn needs_remediation(&self, window: usize) -> bool {
        self.up < window
    }
}

pub struct DecisionEngine {
    config: Config,
    history: SharedHistory,
    runner: Box<dyn ActionRunner>,
    started_at: DateTime<Utc>,
    sample_unit: Duration,
    phase: Phase,
    outcome: Option<Outcome>,
}

impl DecisionEngine {
    pub fn new(
        config: Config,
        history: SharedHistory,
        runner: Box<dyn ActionRunner>,
        started_at: DateTime<Utc>,
        sample_unit: Duration,
    ) -> Self {
        Self {
            config,
            history,
            runner,
            started_at,
            sample_unit,
            phase: Phase::WarmingUp,
            outcome: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// One sample unit past the period, since the first sample lands a tick after start.
    pub fn required_warmup(&self) -> Duration {
        self.config
            .period
            .checked_add(1)
            .and_then(|n| self.units(n))
            .unwrap_or(Duration::MAX)
    }

    // `n` sample units, or `None` when that does not fit a `Duration`.
    fn units(&self, n: usize) -> Option<Duration> {
        i32::try_from(n).ok().and_then(|n| self.sample_unit.checked_mul(n))
    }

    pub fn warmed_up(&self, now: DateTime<Utc>) -> bool {
        let running = now - self.started_at;
        let required = self.required_warmup();
        info!(
            target: "decide",
            "{}s running. We need at least {}s",
            running.num_seconds(),
            required.num_seconds()
        );
        running >= required
    }

    /// Classifies the `period` minute buckets before `now`.
    pub fn evaluate_window(&self, now: DateTime<Utc>) -> WindowReport {
        let period = self.config.period;
        let history = self.history.lock();

        let (mut first, mut last) = (now, now);
        let mut down = 0;
        for i in 1..=period {
            // A probe before the representable range has no sample: down.
            let Some(probe) = self
                .units(i)
                .and_then(|back| now.checked_sub_signed(back))
                .map(minute_label)
            else {
                down += 1;
                continue;
            };
            if i == 1 {
                first = probe;
            }
            last = probe;
            if history.is_down_at(probe) {
                down += 1;
            }
        }

        WindowReport {
            first,
            last,
            down,
            up: period - down,
        }
    }

    /// Advances the engine by one tick. Commands run at most once per engine.
    pub fn step(&mut self, now: DateTime<Utc>) -> Phase {
        if self.phase.is_terminal() {
            return self.phase;
        }

        info!(target: "decide", "Deciding if enough downtime at {}", format_stamp(now));
        if !self.warmed_up(now) {
            return self.phase;
        }
        self.phase = Phase::Evaluating;

        let report = self.evaluate_window(now);
        info!(
            target: "decide",
            "⏮  '{}', '{}' ⏭ ",
            format_stamp(report.first),
            format_stamp(report.last)
        );
        info!(
            target: "decide",
            "Samples: {} ❌  down, {} 🆙 up. Period {} , window {}",
            report.down,
            report.up,
            self.config.period,
            self.config.window
        );

        if !report.needs_remediation(self.config.window) {
            return self.phase;
        }

        let outcome = Outcome::from_run(self.runner.run(&self.config.commands));
        self.phase = match &outcome {
            Outcome::RemediationFailed(err) => {
                error!(target: "decide", "Error executing commands. {}. Exiting.", err);
                Phase::RemediatedFailed
            }
            _ => {
                info!(target: "decide", "successfully run commands. Exiting");
                Phase::RemediatedOk
            }
        };
        self.outcome = Some(outcome);
        self.phase
    }

    /// Ticks until a terminal verdict or until `shutdown` fires.
    /// A verdict triggers `shutdown` so the sampler stops as well.
    pub fn run(mut self, tick: StdDuration, shutdown: &Shutdown) -> Outcome {
        info!(target: "decide", "Starting decide at {}", format_stamp(self.started_at));
        run_every(tick, shutdown, || {
            if self.step(Utc::now()).is_terminal() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        shutdown.trigger();
        self.outcome.take().unwrap_or(Outcome::Interrupted)
    }
}
