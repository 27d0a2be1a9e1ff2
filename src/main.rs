use std::{path::PathBuf, process::ExitCode, sync::Arc};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};
use iflandown::{
    constants::DEFAULT_CONFIG_FILE, run_unchecked, CommandRunner, Config, Outcome, Shutdown,
    SysfsLinkState, Watchdog,
};

/// Runs remediation commands when the wired LAN link stays down.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Run commands, without checks.
    #[arg(long)]
    nocheck: bool,

    /// Path of the TOML config file.
    #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(outcome) => ExitCode::from(outcome.exit_status()),
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let started_at = Utc::now();

    info!("Reading conf file {}", cli.config.display());
    let config = Config::load(&cli.config)
        .with_context(|| format!("cannot start without {}", cli.config.display()))?;

    if cli.nocheck {
        return Ok(run_unchecked(&config, &CommandRunner::new()));
    }

    let shutdown = Shutdown::new();
    let on_signal = shutdown.clone();
    if let Err(err) = ctrlc::set_handler(move || on_signal.trigger()) {
        warn!("Could not install interrupt handler: {}", err);
    }

    let outcome = Watchdog::new(
        config,
        Arc::new(SysfsLinkState::new()),
        Box::new(CommandRunner::new()),
        started_at,
    )
    .run(shutdown);

    if let Outcome::Interrupted = outcome {
        info!("Interrupted before any verdict. Exiting.");
    }
    Ok(outcome)
}
