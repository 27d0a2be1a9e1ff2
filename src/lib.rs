//! Wired-link watchdog.
//!
//! Samples the carrier of the host's Ethernet interfaces once per minute and
//! runs a configured list of remediation commands once, then stops, when the
//! link has been down for too much of the trailing window.

pub mod app;
pub mod config;
pub mod constants;
pub mod decision;
pub mod error;
pub mod history;
pub mod network;
pub mod runner;
pub mod sampler;
pub mod schedule;
pub mod util;

pub use app::{run_unchecked, Watchdog};
pub use config::Config;
pub use decision::{DecisionEngine, Outcome, Phase, WindowReport};
pub use error::{Result, WatchdogError};
pub use history::{Sample, SampleHistory, SharedHistory};
pub use network::{LinkStateSource, SysfsLinkState};
pub use runner::{ActionRunner, CommandRunner};
pub use sampler::Sampler;
pub use schedule::Shutdown;
