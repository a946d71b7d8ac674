//! Per-run output directory
//!
//! ```text
//! <runs_dir>/<YYYYmmdd_HHMMSS>_<slug>/
//!     final_report.md
//!     metadata.json
//! <latest_path>            copy of the most recent report
//! ```

use crate::research::ResearchOutcome;
use crate::types::{AppError, Result};
use crate::utils::config::OutputConfig;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const SLUG_MAX_CHARS: usize = 50;
pub const REPORT_FILE: &str = "final_report.md";
pub const METADATA_FILE: &str = "metadata.json";

/// Summary written next to each report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub topic: String,
    pub timestamp: String,
    pub run_id: String,
    pub model: String,
    pub plan_subtasks_count: usize,
    pub scout_findings_count: usize,
    pub analyst_gold_count: usize,
    pub plan_detail: Vec<String>,
}

impl RunMetadata {
    pub fn from_outcome(run_id: &RunId, model: &str, outcome: &ResearchOutcome) -> Self {
        Self {
            topic: outcome.plan.topic.clone(),
            timestamp: run_id.timestamp.clone(),
            run_id: run_id.to_string(),
            model: model.to_string(),
            plan_subtasks_count: outcome.plan.sub_tasks.len(),
            scout_findings_count: outcome.findings.len(),
            analyst_gold_count: outcome.gold.len(),
            plan_detail: outcome
                .plan
                .sub_tasks
                .iter()
                .map(|t| t.description.clone())
                .collect(),
        }
    }
}

/// `<timestamp>_<slug>` run identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunId {
    pub timestamp: String,
    pub slug: String,
}

impl RunId {
    pub fn new(topic: &str, at: DateTime<Local>) -> Self {
        Self {
            timestamp: at.format("%Y%m%d_%H%M%S").to_string(),
            slug: slugify(topic),
        }
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.timestamp, self.slug)
    }
}

/// Collapse non-alphanumeric runs to `_`, cut to 50 chars, trim `_`, lowercase
pub fn slugify(topic: &str) -> String {
    let mut slug = String::with_capacity(topic.len());
    let mut in_gap = false;
    for c in topic.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            in_gap = false;
        } else if !in_gap {
            slug.push('_');
            in_gap = true;
        }
    }

    let cut: String = slug.chars().take(SLUG_MAX_CHARS).collect();
    cut.trim_matches('_').to_lowercase()
}

/// Where one run's files landed
#[derive(Debug, Clone)]
pub struct WrittenRun {
    pub run_id: String,
    pub run_dir: PathBuf,
    pub report_path: PathBuf,
    pub metadata_path: PathBuf,
    pub latest_path: PathBuf,
}

/// Writes run directories under a configured root
pub struct RunArtifacts {
    runs_dir: PathBuf,
    latest_path: PathBuf,
}

impl RunArtifacts {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            runs_dir: config.runs_dir.clone(),
            latest_path: config.latest_path.clone(),
        }
    }

    pub fn runs_dir(&self) -> &Path {
        &self.runs_dir
    }

    /// Write report, metadata and the latest copy for a finished run
    pub fn write(&self, outcome: &ResearchOutcome, model: &str) -> Result<WrittenRun> {
        self.write_at(outcome, model, Local::now())
    }

    pub fn write_at(
        &self,
        outcome: &ResearchOutcome,
        model: &str,
        at: DateTime<Local>,
    ) -> Result<WrittenRun> {
        let run_id = RunId::new(&outcome.plan.topic, at);
        let run_dir = self.runs_dir.join(run_id.to_string());
        fs::create_dir_all(&run_dir)?;

        let report_path = run_dir.join(REPORT_FILE);
        fs::write(&report_path, &outcome.report)?;

        let metadata = RunMetadata::from_outcome(&run_id, model, outcome);
        let metadata_path = run_dir.join(METADATA_FILE);
        let json = serde_json::to_string_pretty(&metadata)
            .map_err(|e| AppError::Internal(format!("Failed to serialize metadata: {}", e)))?;
        fs::write(&metadata_path, json)?;

        if let Some(parent) = self.latest_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.latest_path, &outcome.report)?;

        info!(run_id = %run_id, dir = %run_dir.display(), "Run artifacts written");

        Ok(WrittenRun {
            run_id: run_id.to_string(),
            run_dir,
            report_path,
            metadata_path,
            latest_path: self.latest_path.clone(),
        })
    }
}
