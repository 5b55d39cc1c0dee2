// src/config/models.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: HostConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
    #[serde(default)]
    pub restart: RestartConfig,
    pub remote: RemoteConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.host.validate()?;
        self.supervisor.validate()?;
        if let Some(0) = self.restart.timeout_secs {
            bail!("restart.timeout_secs must be greater than zero when set");
        }
        if self.remote.timeout_secs == 0 {
            bail!("remote.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

/// Where the host service lives and how to authenticate against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    pub api_key: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl HostConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("host.api_key must not be empty");
        }
        if !matches!(self.base_url.scheme(), "http" | "https") {
            bail!("host.base_url must be an http(s) URL, got {}", self.base_url);
        }
        if self.request_timeout_secs == 0 {
            bail!("host.request_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u64,
    #[serde(default = "default_degraded_restart_threshold")]
    pub degraded_restart_threshold: u32,
}

impl SupervisorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            bail!("supervisor.poll_interval_secs must be greater than zero");
        }
        if self.error_backoff_secs == 0 {
            bail!("supervisor.error_backoff_secs must be greater than zero");
        }
        Ok(())
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            error_backoff_secs: default_error_backoff(),
            degraded_restart_threshold: default_degraded_restart_threshold(),
        }
    }
}

/// The operator-supplied command used to restart the host service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestartConfig {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl RestartConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub update_url: Url,
    #[serde(default)]
    pub instance_id: Option<String>,
    pub api_version: String,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> Url {
    Url::parse("http://127.0.0.1").expect("static URL is valid")
}

fn default_request_timeout() -> u64 {
    10
}

fn default_poll_interval() -> u64 {
    5
}

fn default_error_backoff() -> u64 {
    60
}

fn default_degraded_restart_threshold() -> u32 {
    10
}
