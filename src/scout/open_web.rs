use super::Scout;
use crate::tools::{summarize_html, PageFetcher, SearchHit, WebSearch};
use crate::types::{ResearchFinding, ResearchTask};
use crate::utils::config::OpenWebConfig;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Placeholder relevance assigned to every open-web finding.
pub const OPEN_WEB_RELEVANCE: f64 = 0.8;

/// Scout that searches the public web and scrapes the hits.
///
/// Holds no per-call state, so one instance can serve any number of
/// concurrent tasks.
pub struct OpenWebScout {
    search: Arc<dyn WebSearch>,
    fetcher: Arc<dyn PageFetcher>,
    max_results: usize,
    fetch_timeout: Duration,
    paragraphs: usize,
}

impl OpenWebScout {
    pub fn new(
        search: Arc<dyn WebSearch>,
        fetcher: Arc<dyn PageFetcher>,
        config: &OpenWebConfig,
    ) -> Self {
        Self {
            search,
            fetcher,
            max_results: config.max_results,
            fetch_timeout: config.fetch_timeout(),
            paragraphs: config.paragraphs,
        }
    }

    async fn scrape(&self, hit: &SearchHit) -> Option<ResearchFinding> {
        let page = match self.fetcher.get(&hit.url, self.fetch_timeout).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %hit.url, error = %e, "Failed to fetch");
                return None;
            }
        };

        if !page.is_ok() {
            debug!(url = %hit.url, status = page.status, "Skipping non-200 response");
            return None;
        }

        let summary = summarize_html(&page.body, self.paragraphs);
        let title = if hit.title.trim().is_empty() {
            "Unknown Title"
        } else {
            hit.title.as_str()
        };

        Some(ResearchFinding::new(
            hit.url.clone(),
            summary.to_content(),
            OPEN_WEB_RELEVANCE,
            format!("Retrieved content from {}", title),
        ))
    }
}

#[async_trait]
impl Scout for OpenWebScout {
    fn name(&self) -> &str {
        "open_web"
    }

    async fn gather(&self, task: &ResearchTask) -> Vec<ResearchFinding> {
        info!(task_id = %task.id, "OpenWebScout: searching for '{}'", task.description);
        let mut findings = Vec::new();

        for query in &task.queries {
            info!(task_id = %task.id, query = %query, "Querying");

            let hits = match self.search.search(query, self.max_results).await {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(task_id = %task.id, query = %query, error = %e, "Search failed");
                    continue;
                }
            };

            for hit in hits.iter().take(self.max_results) {
                if let Some(finding) = self.scrape(hit).await {
                    findings.push(finding);
                }
            }
        }

        findings
    }
}
