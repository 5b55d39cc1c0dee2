// src/command/restart.rs
use super::CommandRunner;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// No restart command configured; nothing was spawned.
    NotConfigured,
    Succeeded,
    /// Launch failure, timeout, or non-zero exit. The next unhealthy cycle
    /// tries again.
    Failed,
}

/// Restarts the host service with the configured command. Never fails.
pub struct Restarter<R> {
    command: Option<String>,
    runner: R,
}

impl<R: CommandRunner> Restarter<R> {
    pub fn new(command: Option<String>, runner: R) -> Self {
        let command = command
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Self { command, runner }
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub async fn restart(&self) -> RestartOutcome {
        let Some(command) = self.command.as_deref() else {
            warn!("No restart command configured, can't restart the host service");
            return RestartOutcome::NotConfigured;
        };

        info!(%command, "Restarting host service");

        match self.runner.run(command).await {
            Ok(output) if output.success() => {
                info!(%command, "Restart command finished");
                RestartOutcome::Succeeded
            }
            Ok(output) => {
                error!(
                    %command,
                    code = ?output.code,
                    stdout = %output.stdout,
                    stderr = %output.stderr,
                    "Non-zero exit code from restart command"
                );
                RestartOutcome::Failed
            }
            Err(e) => {
                error!(%command, error = ?e, "Error calling restart command");
                RestartOutcome::Failed
            }
        }
    }
}
