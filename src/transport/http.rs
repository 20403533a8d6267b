use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Url};
use std::time::Duration;

use super::Transport;
use crate::config::HttpConfig;
use crate::error::TransportError;

/// Fetches documents over HTTP(S) with `reqwest`, and from `file://` URLs with `tokio::fs`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        Self::with_user_agent(timeout, &HttpConfig::default().user_agent)
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, TransportError> {
        Self::with_user_agent(
            Some(Duration::from_secs(config.timeout)),
            &config.user_agent,
        )
    }

    fn with_user_agent(timeout: Option<Duration>, user_agent: &str) -> Result<Self, TransportError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        // Blocking retrievals run each request on a short-lived runtime, and a
        // pooled connection must not outlive the runtime that opened it.
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self { client })
    }

    async fn get_http(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            warn!("{} responded with status {}", url, response.status());
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }

    async fn get_file(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        let path = url
            .to_file_path()
            .map_err(|_| TransportError::InvalidLocation {
                location: url.to_string(),
                reason: "not a local file path".to_string(),
            })?;

        tokio::fs::read(&path)
            .await
            .map_err(|source| TransportError::File { path, source })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        debug!("Fetching {}", url);
        match url.scheme() {
            "http" | "https" => self.get_http(url).await,
            "file" => self.get_file(url).await,
            other => Err(TransportError::UnsupportedScheme(other.to_string())),
        }
    }
}
