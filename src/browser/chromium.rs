//! Chrome/Chromium backend using chromiumoxide.
//!
//! Requires the `browser` feature flag (on by default).

use super::{BrowserLauncher, BrowserSession};
use crate::types::{AppError, Result};
use crate::utils::config::DeepSourceConfig;
use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Launches Chrome with a persistent user-data directory
pub struct ChromiumLauncher {
    headless: bool,
    chrome_executable: Option<PathBuf>,
    user_agent: String,
}

impl ChromiumLauncher {
    pub fn new(config: &DeepSourceConfig) -> Self {
        Self {
            headless: config.headless,
            chrome_executable: config.chrome_executable.clone(),
            user_agent: config.user_agent.clone(),
        }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, profile_dir: &Path) -> Result<Box<dyn BrowserSession>> {
        let mut builder = chromiumoxide::BrowserConfig::builder().user_data_dir(profile_dir);

        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder = builder
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", self.user_agent));

        let browser_config = builder
            .build()
            .map_err(|e| AppError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = chromiumoxide::Browser::launch(browser_config)
            .await
            .map_err(|e| AppError::Browser(format!("Failed to launch Chrome: {}", e)))?;

        // CDP events must be drained for the connection to make progress
        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(AppError::Browser(format!("Failed to create page: {}", e)));
            }
        };

        debug!(profile = %profile_dir.display(), "Chrome session started");

        Ok(Box::new(ChromiumSession {
            browser: Mutex::new(browser),
            page,
            handler: handler_task,
        }))
    }
}

/// A live Chrome process with one page
pub struct ChromiumSession {
    browser: Mutex<chromiumoxide::Browser>,
    page: chromiumoxide::Page,
    handler: tokio::task::JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(AppError::Browser(format!("Navigation to {} failed: {}", url, e))),
            Err(_) => Err(AppError::Browser(format!(
                "Navigation to {} timed out after {:?}",
                url, timeout
            ))),
        }
    }

    async fn title(&self) -> Result<String> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| AppError::Browser(format!("get_title failed: {}", e)))?;
        Ok(title.unwrap_or_default())
    }

    async fn current_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| AppError::Browser(format!("get_url failed: {}", e)))?;
        Ok(url.unwrap_or_default())
    }

    async fn extract_text(&self) -> Result<String> {
        let result = self
            .page
            .evaluate("document.body ? document.body.innerText : ''")
            .await
            .map_err(|e| AppError::Browser(format!("get_text failed: {}", e)))?;
        Ok(result.into_value::<String>().unwrap_or_default())
    }

    async fn close(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser
            .close()
            .await
            .map_err(|e| AppError::Browser(format!("Failed to close browser: {}", e)));
        let _ = browser.wait().await;
        self.handler.abort();
        closed.map(|_| ())
    }
}
