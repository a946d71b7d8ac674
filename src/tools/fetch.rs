//! Plain HTTP page fetching with a bounded timeout

use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Status and body of a fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// HTTP GET abstraction used by the open-web scout
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`, giving up after `timeout`. Non-200 statuses are returned,
    /// not raised; only transport failures are errors.
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedPage>;
}

/// `reqwest`-backed fetcher
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::Fetch(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("{}: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("{}: {}", url, e)))?;

        Ok(FetchedPage { status, body })
    }
}
