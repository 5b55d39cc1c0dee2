// src/api/mod.rs
mod client;
mod host_api;
mod models;

pub use client::{ApiClient, ApiError, API_KEY_HEADER};
pub use host_api::HostApi;
pub use models::{PluginEntry, PluginList, ServerInfo, VersionInfo};
