// src/health/evaluator.rs
use super::{DegradedModeStatus, HealthStatus};
use crate::api::{ApiError, HostApi};
use tracing::{debug, warn};

/// Substring expected (case-insensitively) in the `/api/version` text.
pub const HOST_SERVICE_MARKER: &str = "octoprint";

/// One way of finding out whether the host service is in degraded mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradedModeProbe {
    /// `/api/server`, authoritative on newer releases.
    ServerEndpoint,
    /// `/api/plugin/pluginmanager`, inferred from safe-mode victims.
    PluginManager,
}

/// What to do when a probe's endpoint cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnUnavailable {
    NextProbe,
    AssumeNormal,
}

/// Probes are tried in order; the first one that answers decides.
pub const DEGRADED_MODE_CHAIN: [(DegradedModeProbe, OnUnavailable); 2] = [
    (DegradedModeProbe::ServerEndpoint, OnUnavailable::NextProbe),
    (DegradedModeProbe::PluginManager, OnUnavailable::AssumeNormal),
];

/// Folds host-service API calls into health verdicts. API errors never
/// escape from here.
pub struct HealthEvaluator<A> {
    api: A,
    marker: String,
}

impl<A: HostApi> HealthEvaluator<A> {
    pub fn new(api: A) -> Self {
        Self::with_marker(api, HOST_SERVICE_MARKER)
    }

    pub fn with_marker(api: A, marker: impl Into<String>) -> Self {
        Self {
            api,
            marker: marker.into().to_lowercase(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Unreachable and "answered but not the host service" are
    /// deliberately the same verdict.
    pub async fn health_status(&self) -> HealthStatus {
        match self.api.version().await {
            Ok(version) if version.text.to_lowercase().contains(&self.marker) => {
                HealthStatus::Alive
            }
            Ok(version) => {
                warn!(text = %version.text, "version endpoint answered with an unexpected identity");
                HealthStatus::Unreachable
            }
            Err(e) => {
                debug!(error = %e, "version check failed");
                HealthStatus::Unreachable
            }
        }
    }

    pub async fn check_alive(&self) -> bool {
        self.health_status().await.is_alive()
    }

    pub async fn degraded_mode_status(&self) -> DegradedModeStatus {
        for (probe, on_unavailable) in DEGRADED_MODE_CHAIN {
            match self.probe(probe).await {
                Ok(status) => return status,
                Err(e) => match on_unavailable {
                    OnUnavailable::NextProbe => {
                        debug!(?probe, error = %e, "probe unavailable, falling back");
                    }
                    OnUnavailable::AssumeNormal => {
                        debug!(?probe, error = %e, "probe unavailable, assuming normal mode");
                        return DegradedModeStatus::Indeterminate;
                    }
                },
            }
        }

        DegradedModeStatus::Indeterminate
    }

    /// `true` means "not degraded".
    pub async fn check_degraded_mode(&self) -> bool {
        self.degraded_mode_status().await.is_normal()
    }

    /// Run a single probe of the chain on its own.
    pub async fn probe(&self, probe: DegradedModeProbe) -> Result<DegradedModeStatus, ApiError> {
        match probe {
            DegradedModeProbe::ServerEndpoint => {
                // Reaching the endpoint at all is taken as proof of normal
                // operation, whatever the safemode value.
                let server = self.api.server().await?;
                debug!(safemode = ?server.safemode, "server endpoint answered");
                Ok(DegradedModeStatus::Normal)
            }
            DegradedModeProbe::PluginManager => {
                let plugins = self.api.plugin_list().await?;
                let victim = plugins.safe_mode_victims().next();
                let status = match victim {
                    Some(victim) => {
                        debug!(plugin = %victim.name, "plugin disabled by safe mode");
                        DegradedModeStatus::Degraded
                    }
                    None => DegradedModeStatus::Normal,
                };
                Ok(status)
            }
        }
    }
}
