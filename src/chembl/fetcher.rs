//! HTTP transport for the ChEMBL client.

use crate::error::{DrugtoxError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Fetches the raw body of one result page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher with a fixed per-request timeout.
pub struct HttpFetcher {
    http_client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("drugtox/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DrugtoxError::Transport(format!(
                "{} returned {}: {}",
                url,
                status.as_u16(),
                body.trim()
            )));
        }

        Ok(response.text().await?)
    }
}
