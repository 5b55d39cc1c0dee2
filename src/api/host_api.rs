// src/api/host_api.rs
use super::{ApiError, PluginList, ServerInfo, VersionInfo};
use async_trait::async_trait;

/// The slice of the host service's HTTP API the watchdog consumes.
///
/// Every call is a single GET with no retries; callers decide what a
/// failure means.
#[async_trait]
pub trait HostApi: Send + Sync {
    /// `GET /api/version`
    async fn version(&self) -> Result<VersionInfo, ApiError>;

    /// `GET /api/server`, absent on older host-service releases.
    async fn server(&self) -> Result<ServerInfo, ApiError>;

    /// `GET /api/plugin/pluginmanager`
    async fn plugin_list(&self) -> Result<PluginList, ApiError>;
}
