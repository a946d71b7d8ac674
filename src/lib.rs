//! # Insta-Expert Researcher
//!
//! An automated research pipeline: given a topic, it produces a structured
//! research plan, gathers material concurrently from the open web and from an
//! authenticated browser session, filters it by a quality heuristic and
//! synthesizes a markdown report with a language model.
//!
//! ## Overview
//!
//! ```text
//! topic ─► PlanGenerator ─► ResearchPlan
//!                              │ one task per sub-task, concurrently
//!            ┌─────────────────┴──────────────────┐
//!            ▼                                    ▼
//!      OpenWebScout                        DeepSourceScout
//!  (search + HTTP fetch)          (profile snapshot, one browser at a time)
//!            └─────────────────┬──────────────────┘
//!                              ▼
//!                   Analyst ─► ReportSynthesizer ─► report
//! ```
//!
//! Remote completion calls go through [`llm::retry`], which retries quota
//! errors with exponential backoff and fails fast on everything else.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use researcher::{ResearcherConfig, research::ResearchPipeline};
//!
//! let config = ResearcherConfig::load(Some("researcher.toml".as_ref()))?;
//! let pipeline = researcher::build_pipeline(&config)?;
//! let outcome = pipeline.run("The Future of Synthetic Biology").await;
//! println!("{}", outcome.report);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `browser` | Chrome DevTools backend for authenticated sources (default) |
//! | `minimal` | Marker for builds without the browser backend |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Headless browser abstraction and the Chrome backend.
pub mod browser;
/// Argument parsing, terminal output and run artifacts.
pub mod cli;
/// Completion client, Gemini provider and quota-aware retry.
pub mod llm;
/// Planning, dispatch, analysis and synthesis.
pub mod research;
/// Open-web and deep-source scouts.
pub mod scout;
/// Search, fetch and HTML extraction.
pub mod tools;
/// Core types (plan, findings, errors).
pub mod types;
/// Configuration loading.
pub mod utils;

pub use llm::{CompletionClient, GeminiClient, RetryPolicy};
pub use research::{ResearchOutcome, ResearchPipeline};
pub use scout::{DeepSourceScout, OpenWebScout, Scout, ScoutRoster};
pub use types::{AppError, Result};
pub use utils::config::ResearcherConfig;

use research::{PlanGenerator, ReportSynthesizer, ResearchCoordinator};
use std::sync::Arc;
use tools::{DuckDuckGoSearch, HttpFetcher, WebSearch};

/// Wire the production pipeline from configuration.
///
/// Without a completion credential the planner and synthesizer use their
/// mock output.
pub fn build_pipeline(config: &ResearcherConfig) -> Result<ResearchPipeline> {
    let client = GeminiClient::from_config(&config.llm)?
        .map(|client| Arc::new(client) as Arc<dyn CompletionClient>);
    if client.is_none() {
        tracing::warn!("GEMINI_API_KEY not set, planner and synthesizer will use mock output");
    }

    let search: Arc<dyn WebSearch> = Arc::new(DuckDuckGoSearch::new());
    let fetcher = Arc::new(HttpFetcher::new(&config.deep_source.user_agent)?);

    let open_web = Arc::new(OpenWebScout::new(
        Arc::clone(&search),
        fetcher,
        &config.open_web,
    ));
    let deep_source = Arc::new(DeepSourceScout::new(
        &config.deep_source,
        browser::default_launcher(&config.deep_source),
        search,
    )?);

    let planner = PlanGenerator::new(client.clone(), config.llm.plan_retry.policy());
    let synthesizer = ReportSynthesizer::new(client, config.llm.report_retry.policy());
    let coordinator = ResearchCoordinator::new(ScoutRoster::new(open_web, deep_source));

    Ok(ResearchPipeline::new(planner, coordinator, synthesizer))
}
