// src/remote/pinger.rs
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum PingError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Error sending ping to {url}: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

/// Reports this instance's identity to the remote coordination service.
/// Not part of the polling cycle; callers invoke it on demand.
#[derive(Debug, Clone)]
pub struct RemotePinger {
    client: Client,
    update_url: Url,
}

impl RemotePinger {
    pub fn new(update_url: Url, timeout: Duration) -> Result<Self, PingError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PingError::Client)?;

        Ok(Self { client, update_url })
    }

    /// The URL a ping for `instance_id` would hit.
    pub fn ping_url(&self, instance_id: &str, api_version: &str) -> Url {
        let mut url = self.update_url.clone();
        url.query_pairs_mut()
            .append_pair("id", instance_id)
            .append_pair("api_version", api_version);
        url
    }

    /// Sends the ping. Returns `Ok(None)` without touching the network
    /// when no instance id is set. Send failures are returned to the
    /// caller, which may want to retry or fetch a new id.
    pub async fn ping(
        &self,
        instance_id: &str,
        api_version: &str,
    ) -> Result<Option<reqwest::Response>, PingError> {
        if instance_id.is_empty() {
            debug!("No instance id set, nothing to report");
            return Ok(None);
        }

        let url = self.ping_url(instance_id, api_version);
        match self.client.get(url.clone()).send().await {
            Ok(response) => {
                debug!(status = %response.status(), "Ping sent");
                Ok(Some(response))
            }
            Err(source) => {
                error!(error = ?source, "Error sending get request to the coordination service");
                Err(PingError::Request { url, source })
            }
        }
    }
}
