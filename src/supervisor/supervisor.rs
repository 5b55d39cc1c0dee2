// src/supervisor/supervisor.rs
use super::panic::{install_backtrace_hook, panic_message, take_backtrace};
use super::DegradedPolicy;
use crate::api::HostApi;
use crate::command::{CommandRunner, RestartOutcome, Restarter};
use crate::config::SupervisorConfig;
use crate::health::{DegradedModeStatus, HealthEvaluator, HealthStatus};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, error, info, warn};

/// What a single supervision cycle observed and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub health: HealthStatus,
    /// `None` when the host service was unreachable.
    pub degraded: Option<DegradedModeStatus>,
    /// `None` when no restart was attempted.
    pub restart: Option<RestartOutcome>,
    pub elapsed: Duration,
}

/// Flips the supervisor's `running` flag from outside the loop.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.tx.send(false);
    }

    pub fn is_running(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Polls the host service on a fixed cadence and restarts it when it is
/// unreachable or stuck in degraded mode.
pub struct Supervisor<A, R> {
    evaluator: HealthEvaluator<A>,
    restarter: Restarter<R>,
    policy: DegradedPolicy,
    poll_interval: Duration,
    error_backoff: Duration,
    running: watch::Receiver<bool>,
}

impl<A: HostApi, R: CommandRunner> Supervisor<A, R> {
    pub fn new(
        evaluator: HealthEvaluator<A>,
        restarter: Restarter<R>,
        config: &SupervisorConfig,
    ) -> (Self, ShutdownHandle) {
        let (tx, running) = watch::channel(true);

        let supervisor = Self {
            evaluator,
            restarter,
            policy: DegradedPolicy::new(config.degraded_restart_threshold),
            poll_interval: config.poll_interval(),
            error_backoff: config.error_backoff(),
            running,
        };

        (supervisor, ShutdownHandle { tx: Arc::new(tx) })
    }

    pub fn policy(&self) -> &DegradedPolicy {
        &self.policy
    }

    pub fn evaluator(&self) -> &HealthEvaluator<A> {
        &self.evaluator
    }

    pub fn restarter(&self) -> &Restarter<R> {
        &self.restarter
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    /// Runs until the shutdown handle is triggered. A panicking cycle is
    /// logged and followed by the error backoff; it never ends the loop.
    pub async fn run(&mut self) {
        install_backtrace_hook();
        info!(
            interval = ?self.poll_interval,
            restart_configured = self.restarter.command().is_some(),
            "Starting host service supervisor"
        );

        while self.is_running() {
            let start = Instant::now();

            match AssertUnwindSafe(self.run_cycle()).catch_unwind().await {
                Ok(report) => {
                    debug!("Host service health check took {:?}", report.elapsed);

                    if !self.is_running() {
                        break;
                    }
                    let remaining = self.poll_interval.saturating_sub(start.elapsed());
                    self.pause(remaining).await;
                }
                Err(panic) => {
                    let backtrace = take_backtrace().unwrap_or_else(|| "unavailable".to_string());
                    error!(
                        panic = %panic_message(&*panic),
                        backoff = ?self.error_backoff,
                        backtrace = %backtrace,
                        "Unexpected failure during health check cycle"
                    );
                    self.pause(self.error_backoff).await;
                }
            }
        }

        info!("Host service supervisor stopped");
    }

    /// One health check, plus a restart if the verdicts call for it.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let start = Instant::now();
        let health = self.evaluator.health_status().await;

        let (degraded, restart) = match health {
            HealthStatus::Unreachable => {
                warn!("Host service is not OK... Trying to restart it now");
                (None, Some(self.restarter.restart().await))
            }
            HealthStatus::Alive => {
                debug!("Host service seems OK");
                let status = self.evaluator.degraded_mode_status().await;
                let restart = self.handle_degraded_status(status).await;
                (Some(status), restart)
            }
        };

        CycleReport {
            health,
            degraded,
            restart,
            elapsed: start.elapsed(),
        }
    }

    async fn handle_degraded_status(
        &mut self,
        status: DegradedModeStatus,
    ) -> Option<RestartOutcome> {
        if status.is_normal() {
            debug!(?status, "Host service is not in safe mode");
            self.policy.on_normal();
            return None;
        }

        let consecutive = self.policy.consecutive_degraded_cycles();
        warn!(consecutive, "Host service is in safe mode");

        if self.policy.on_degraded() {
            Some(self.restarter.restart().await)
        } else {
            debug!(
                consecutive,
                threshold = self.policy.threshold(),
                "Holding off restart while in safe mode"
            );
            None
        }
    }

    async fn pause(&mut self, duration: Duration) {
        if duration.is_zero() {
            return;
        }

        tokio::select! {
            _ = sleep(duration) => {}
            _ = stopped(&mut self.running) => {
                debug!("Shutdown requested, skipping the rest of the pause");
            }
        }
    }
}

async fn stopped(running: &mut watch::Receiver<bool>) {
    if running.wait_for(|running| !*running).await.is_err() {
        // Every handle is gone, so nothing can stop the pause early.
        std::future::pending::<()>().await;
    }
}
