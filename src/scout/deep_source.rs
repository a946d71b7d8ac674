//! Authenticated browsing against a cloned browser profile
//!
//! All calls share one [`ProfileSnapshot`] and one browser at a time: a
//! single-permit semaphore admits one `gather` call, which owns the session
//! from launch to close. Queries are throttled with a random delay before each
//! navigation.

use super::snapshot::{FsProfileCloner, ProfileCloner, ProfileSnapshot, SnapshotState};
use super::Scout;
use crate::browser::{BrowserLauncher, BrowserSession};
use crate::tools::WebSearch;
use crate::types::{truncate_chars, AppError, ResearchFinding, ResearchTask, Result};
use crate::utils::config::DeepSourceConfig;
use async_trait::async_trait;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Placeholder relevance assigned to every deep-source finding.
pub const DEEP_SOURCE_RELEVANCE: f64 = 0.9;

const EMPTY_PAGE_TEXT: &str = "No content found.";

pub struct DeepSourceScout {
    snapshot: ProfileSnapshot,
    launcher: Arc<dyn BrowserLauncher>,
    search: Arc<dyn WebSearch>,
    gate: Semaphore,
    config: DeepSourceConfig,
}

impl DeepSourceScout {
    /// Create a scout that snapshots `config.profile_path` with the filesystem cloner.
    ///
    /// The scratch directory is created immediately; the copy happens on first use.
    pub fn new(
        config: &DeepSourceConfig,
        launcher: Arc<dyn BrowserLauncher>,
        search: Arc<dyn WebSearch>,
    ) -> Result<Self> {
        Self::with_cloner(config, launcher, search, Arc::new(FsProfileCloner))
    }

    pub fn with_cloner(
        config: &DeepSourceConfig,
        launcher: Arc<dyn BrowserLauncher>,
        search: Arc<dyn WebSearch>,
        cloner: Arc<dyn ProfileCloner>,
    ) -> Result<Self> {
        let snapshot = ProfileSnapshot::new(
            config.profile_path.clone(),
            config.excluded_dirs.clone(),
            cloner,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create profile workspace: {}", e)))?;

        debug!(working_dir = %snapshot.working_dir().display(), "Deep source workspace ready");

        Ok(Self {
            snapshot,
            launcher,
            search,
            gate: Semaphore::new(1),
            config: config.clone(),
        })
    }

    pub fn snapshot_state(&self) -> SnapshotState {
        self.snapshot.state()
    }

    pub fn working_dir(&self) -> &Path {
        self.snapshot.working_dir()
    }

    fn throttle_delay(&self) -> Duration {
        let (min, max) = self.config.delay_range();
        if max <= min {
            return min;
        }
        let secs = rand::rng().random_range(min.as_secs_f64()..=max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Resolve a query to a URL: literal URLs pass through, anything else
    /// goes through search and takes the top hit.
    async fn resolve_target(&self, query: &str) -> Result<Option<String>> {
        if query.starts_with("http") {
            return Ok(Some(query.to_string()));
        }
        let hits = self.search.search(query, self.config.max_results).await?;
        Ok(hits.into_iter().next().map(|hit| hit.url))
    }

    async fn visit(&self, session: &dyn BrowserSession, target: &str) -> Result<ResearchFinding> {
        info!(url = %target, "Visiting");
        session
            .navigate(target, self.config.navigation_timeout())
            .await?;

        let settle = self.config.settle();
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        let title = session.title().await?;
        let final_url = match session.current_url().await {
            Ok(url) if !url.is_empty() => url,
            _ => target.to_string(),
        };
        let text = session.extract_text().await?;
        let content = if text.trim().is_empty() {
            EMPTY_PAGE_TEXT.to_string()
        } else {
            truncate_chars(text, self.config.content_cap)
        };

        Ok(ResearchFinding::new(
            final_url,
            content,
            DEEP_SOURCE_RELEVANCE,
            format!("Extracted from {}", title),
        ))
    }

    async fn browse(
        &self,
        session: &dyn BrowserSession,
        task: &ResearchTask,
    ) -> Vec<ResearchFinding> {
        let mut findings = Vec::new();

        for query in &task.queries {
            let delay = self.throttle_delay();
            if !delay.is_zero() {
                debug!(delay_ms = delay.as_millis() as u64, "Throttling");
                tokio::time::sleep(delay).await;
            }

            let target = match self.resolve_target(query).await {
                Ok(Some(url)) => url,
                Ok(None) => {
                    debug!(query = %query, "No results for query");
                    continue;
                }
                Err(e) => {
                    warn!(query = %query, error = %e, "Deep search failed");
                    continue;
                }
            };

            match self.visit(session, &target).await {
                Ok(finding) => findings.push(finding),
                Err(e) => warn!(url = %target, error = %e, "Deep scrape failed"),
            }
        }

        findings
    }
}

#[async_trait]
impl Scout for DeepSourceScout {
    fn name(&self) -> &str {
        "deep_source"
    }

    async fn gather(&self, task: &ResearchTask) -> Vec<ResearchFinding> {
        let _permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                error!(error = %e, "Deep source gate closed");
                return Vec::new();
            }
        };

        info!(task_id = %task.id, "DeepSourceScout: authenticating for '{}'", task.description);

        let state = self.snapshot.ensure_ready().await;
        if state != SnapshotState::Ready {
            warn!(?state, "Profile snapshot unavailable, browsing without it");
        }

        let session = match self.launcher.launch(self.snapshot.working_dir()).await {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "Failed to launch browser");
                return Vec::new();
            }
        };

        let findings = self.browse(session.as_ref(), task).await;

        if let Err(e) = session.close().await {
            warn!(error = %e, "Browser did not close cleanly");
        }

        findings
    }

    /// Remove the cloned profile. Safe to call more than once.
    fn cleanup(&self) {
        self.snapshot.remove();
    }
}
