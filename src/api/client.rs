// src/api/client.rs
use super::{HostApi, PluginList, ServerInfo, VersionInfo};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const API_KEY_HEADER: &str = "X-Api-Key";

const VERSION_PATH: &str = "api/version";
const SERVER_PATH: &str = "api/server";
const PLUGIN_MANAGER_PATH: &str = "api/plugin/pluginmanager";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid endpoint {path}: {source}")]
    InvalidEndpoint {
        path: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("Request to {path} failed: {source}")]
    Request {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}")]
    Status {
        path: &'static str,
        status: StatusCode,
    },

    #[error("Malformed response from {path}: {source}")]
    Decode {
        path: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Authenticated client for the host service's HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl ApiClient {
    pub fn new(
        base_url: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &'static str) -> Result<T, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|source| ApiError::InvalidEndpoint { path, source })?;

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|source| ApiError::Request { path, source })?;

        let status = response.status();
        if !status.is_success() {
            debug!(path, %status, "host service rejected request");
            return Err(ApiError::Status { path, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Request { path, source })?;

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { path, source })
    }
}

#[async_trait]
impl HostApi for ApiClient {
    async fn version(&self) -> Result<VersionInfo, ApiError> {
        self.get(VERSION_PATH).await
    }

    async fn server(&self) -> Result<ServerInfo, ApiError> {
        self.get(SERVER_PATH).await
    }

    async fn plugin_list(&self) -> Result<PluginList, ApiError> {
        self.get(PLUGIN_MANAGER_PATH).await
    }
}

// Url::join drops the last segment of a base without a trailing slash,
// which would lose a reverse-proxy prefix such as `/octoprint`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
