//! Headless browser abstraction for the deep-source scout
//!
//! [`BrowserLauncher`] starts a session bound to a profile directory;
//! [`BrowserSession`] covers the handful of page operations the scout needs.
//! The real backend ([`chromium::ChromiumLauncher`]) drives Chrome over the
//! DevTools Protocol and is compiled with the `browser` feature.

#[cfg(feature = "browser")]
pub mod chromium;

use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Starts browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a session whose user data lives in `profile_dir`
    async fn launch(&self, profile_dir: &Path) -> Result<Box<dyn BrowserSession>>;
}

/// One live browser with a single active page
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate the page, failing if it does not load within `timeout`
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Title of the current page (empty if none)
    async fn title(&self) -> Result<String>;

    /// URL of the current page after redirects
    async fn current_url(&self) -> Result<String>;

    /// Visible text of the page body
    async fn extract_text(&self) -> Result<String>;

    /// Shut the browser down
    async fn close(&self) -> Result<()>;
}

/// Launcher used when no browser backend is compiled in
pub struct UnavailableLauncher;

#[async_trait]
impl BrowserLauncher for UnavailableLauncher {
    async fn launch(&self, _profile_dir: &Path) -> Result<Box<dyn BrowserSession>> {
        Err(AppError::Browser(
            "No browser backend available (build with the `browser` feature)".to_string(),
        ))
    }
}

/// The launcher selected by the enabled features
pub fn default_launcher(
    config: &crate::utils::config::DeepSourceConfig,
) -> std::sync::Arc<dyn BrowserLauncher> {
    #[cfg(feature = "browser")]
    {
        std::sync::Arc::new(chromium::ChromiumLauncher::new(config))
    }

    #[cfg(not(feature = "browser"))]
    {
        let _ = config;
        std::sync::Arc::new(UnavailableLauncher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_launcher_errors() {
        let result = UnavailableLauncher.launch(Path::new("/tmp/none")).await;
        assert!(matches!(result, Err(AppError::Browser(_))));
    }
}
