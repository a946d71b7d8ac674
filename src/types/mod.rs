use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard cap on the text carried by a single finding.
pub const CONTENT_CAP: usize = 50_000;

// ============= Plan Types =============

/// Which category of source a sub-task must be scouted against.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Public web search plus plain HTTP fetches
    OpenWeb,
    /// Session-backed browsing with the user's cloned profile
    Authenticated,
}

impl SourceType {
    /// Wire name, as used in plan JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::OpenWeb => "open_web",
            SourceType::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source-tagged unit of gathering work.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResearchTask {
    pub id: String,
    pub description: String,
    pub queries: Vec<String>,
    pub source_type: SourceType,
}

/// Decomposition of a topic into sub-tasks.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResearchPlan {
    pub topic: String,
    pub key_questions: Vec<String>,
    #[serde(default)]
    pub estimated_tokens: u64,
    pub sub_tasks: Vec<ResearchTask>,
}

impl ResearchPlan {
    /// Number of sub-tasks routed to the given source type
    pub fn count_by_source(&self, source_type: SourceType) -> usize {
        self.sub_tasks
            .iter()
            .filter(|t| t.source_type == source_type)
            .count()
    }
}

// ============= Finding Types =============

/// One unit of gathered content with its provenance.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResearchFinding {
    pub source_url: String,
    pub content: String,
    pub relevance_score: f64,
    pub key_fact: String,
}

impl ResearchFinding {
    /// Build a finding, truncating `content` to [`CONTENT_CAP`] and clamping
    /// the score into `[0, 1]`.
    pub fn new(
        source_url: impl Into<String>,
        content: impl Into<String>,
        relevance_score: f64,
        key_fact: impl Into<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            content: truncate_chars(content.into(), CONTENT_CAP),
            relevance_score: relevance_score.clamp(0.0, 1.0),
            key_fact: key_fact.into(),
        }
    }
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
    text
}

// ============= Report Types =============

/// Selects the synthesis prompt template.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    #[default]
    InstaExpert,
}

impl ReportType {
    /// Human-readable title used in report headers
    pub fn title(&self) -> &'static str {
        match self {
            ReportType::InstaExpert => "Insta-Expert",
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
