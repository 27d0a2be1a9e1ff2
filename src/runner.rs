use std::process::Command;
use tracing::{error, info};
use crate::error::{Result, WatchdogError};

/// Executes the configured remediation commands.
pub trait ActionRunner: Send {
    /// Runs every command in order, stopping at the first failure.
    fn run(&self, commands: &[Vec<String>]) -> Result<()>;
}

/// Spawns each argv as a child process and waits for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn run_one(&self, argv: &[String]) -> Result<()> {
        let (program, args) = argv.split_first().ok_or(WatchdogError::EmptyCommand)?;
        info!(target: "runner", "Executing command {:?}", argv);

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| WatchdogError::Spawn {
                program: program.clone(),
                source,
            })?;

        info!(
            target: "runner",
            "Combined command output:\n{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        if !output.status.success() {
            return Err(WatchdogError::CommandFailed {
                command: argv.to_vec(),
                status: output.status,
            });
        }
        Ok(())
    }
}

impl ActionRunner for CommandRunner {
    fn run(&self, commands: &[Vec<String>]) -> Result<()> {
        for argv in commands {
            if let Err(err) = self.run_one(argv) {
                error!(target: "runner", "Command {:?} failed: {}", argv, err);
                return Err(err);
            }
        }
        Ok(())
    }
}
