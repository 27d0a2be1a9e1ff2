//! Watchdog configuration, read once at startup from a TOML file.
//!
//! ```toml
//! Period = 30
//! Window = 5
//! Commands = [
//!     ["systemctl", "restart", "NetworkManager"],
//!     ["logger", "iflandown: wired link restarted"],
//! ]
//! ```

use std::{fs, path::Path};
use serde::Deserialize;
use crate::constants::{DEFAULT_PERIOD, DEFAULT_WINDOW, MAX_PERIOD};
use crate::error::{Result, WatchdogError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Trailing samples considered for each decision.
    pub period: usize,
    /// Minimum number of "up" samples within `period`.
    pub window: usize,
    /// Remediation commands, each an argv.
    pub commands: Vec<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            window: DEFAULT_WINDOW,
            commands: Vec::new(),
        }
    }
}

// As written in the file; any value <= 0 means the default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RawConfig {
    period: i64,
    window: i64,
    commands: Vec<Vec<String>>,
}

fn count_or_default(key: &str, value: i64, default: usize) -> Result<usize> {
    if value <= 0 {
        return Ok(default);
    }
    match usize::try_from(value) {
        Ok(value) if value <= MAX_PERIOD => Ok(value),
        _ => Err(WatchdogError::ConfigInvalid(format!(
            "{} = {} exceeds the maximum of {}",
            key, value, MAX_PERIOD
        ))),
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| WatchdogError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&content).map_err(|source| WatchdogError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        if let Some(index) = raw.commands.iter().position(|argv| argv.is_empty()) {
            return Err(WatchdogError::ConfigInvalid(format!(
                "command #{} has no executable",
                index + 1
            )));
        }
        Ok(Self {
            period: count_or_default("Period", raw.period, DEFAULT_PERIOD)?,
            window: count_or_default("Window", raw.window, DEFAULT_WINDOW)?,
            commands: raw.commands,
        })
    }
}
