//! Web search provider backed by daedra
//!
//! The scouts depend on the [`WebSearch`] trait only; [`DuckDuckGoSearch`] is
//! the production implementation, which uses DuckDuckGo through daedra.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// Query in, ordered hits out
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Search for `query`, returning at most `max_results` hits in rank order
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Web search powered by daedra
pub struct DuckDuckGoSearch;

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(AppError::Search("Empty search query".to_string()));
        }
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: max_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        Ok(response
            .data
            .iter()
            .take(max_results)
            .map(|r| SearchHit {
                url: r.url.clone(),
                title: r.title.clone(),
                snippet: r.description.clone(),
            })
            .collect())
    }
}
