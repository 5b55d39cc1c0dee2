// src/api/models.rs
use serde::Deserialize;

/// Body of `GET /api/version`.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    /// Product identity string, e.g. "OctoPrint 1.9.3".
    pub text: String,
    #[serde(default)]
    pub api: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
}

/// Body of `GET /api/server`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub version: Option<String>,
    /// Null when the server reports no safe-mode reason.
    #[serde(default)]
    pub safemode: Option<serde_json::Value>,
}

/// Body of `GET /api/plugin/pluginmanager`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginList {
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
}

impl PluginList {
    /// Plugins the host service disabled because it started in safe mode.
    pub fn safe_mode_victims(&self) -> impl Iterator<Item = &PluginEntry> {
        self.plugins.iter().filter(|p| p.safe_mode_victim)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PluginEntry {
    #[serde(default)]
    pub key: Option<String>,
    pub name: String,
    #[serde(default)]
    pub safe_mode_victim: bool,
}
