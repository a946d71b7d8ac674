//! Runtime configuration for the research pipeline
//!
//! Built once at process start from (lowest to highest precedence) built-in
//! defaults, an optional `researcher.toml`, and the environment (a `.env` file
//! is honoured). Components receive the relevant section by reference and never
//! read the environment themselves.

use crate::llm::retry::RetryPolicy;
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearcherConfig {
    pub llm: LLMConfig,
    pub open_web: OpenWebConfig,
    pub deep_source: DeepSourceConfig,
    pub output: OutputConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// Completion provider credential; `None` selects the mock plan and report
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
    /// Backoff applied to plan generation
    pub plan_retry: RetrySettings,
    /// Backoff applied to report synthesis
    pub report_retry: RetrySettings,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-3-pro-preview".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            request_timeout_secs: 300,
            plan_retry: RetrySettings {
                max_retries: 3,
                initial_delay_secs: 10.0,
            },
            report_retry: RetrySettings {
                max_retries: 5,
                initial_delay_secs: 15.0,
            },
        }
    }
}

impl LLMConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// True when a non-empty credential is configured
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay_secs: f64,
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_secs_f64(self.initial_delay_secs.max(0.0)),
        )
    }
}

// ============= Scout Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWebConfig {
    /// Search results fetched per query
    pub max_results: usize,
    pub fetch_timeout_secs: u64,
    /// Paragraph elements kept per page
    pub paragraphs: usize,
}

impl Default for OpenWebConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            fetch_timeout_secs: 5,
            paragraphs: 3,
        }
    }
}

impl OpenWebConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepSourceConfig {
    /// Browser profile holding the authenticated session
    pub profile_path: Option<PathBuf>,
    /// Search results considered when resolving a query to a URL
    pub max_results: usize,
    pub navigation_timeout_secs: u64,
    pub settle_secs: u64,
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
    pub content_cap: usize,
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    pub user_agent: String,
    /// Profile subdirectories skipped when snapshotting
    pub excluded_dirs: Vec<String>,
}

impl Default for DeepSourceConfig {
    fn default() -> Self {
        Self {
            profile_path: None,
            max_results: 1,
            navigation_timeout_secs: 20,
            settle_secs: 2,
            min_delay_secs: 2.0,
            max_delay_secs: 5.0,
            content_cap: crate::types::CONTENT_CAP,
            headless: true,
            chrome_executable: None,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            excluded_dirs: ["Cache", "Code Cache", "GPUCache", "Service Worker"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DeepSourceConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    /// Throttle window as `(min, max)`; an inverted window collapses to `min`
    pub fn delay_range(&self) -> (Duration, Duration) {
        let min = self.min_delay_secs.max(0.0);
        let max = self.max_delay_secs.max(min);
        (Duration::from_secs_f64(min), Duration::from_secs_f64(max))
    }

    /// Same settings with throttling and settling switched off
    pub fn without_delays(mut self) -> Self {
        self.min_delay_secs = 0.0;
        self.max_delay_secs = 0.0;
        self.settle_secs = 0;
        self
    }
}

// ============= Output Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub runs_dir: PathBuf,
    pub latest_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            runs_dir: PathBuf::from("runs"),
            latest_path: PathBuf::from("final_report.md"),
        }
    }
}

// ============= Loading =============

impl ResearcherConfig {
    /// Load configuration from an optional TOML file, then apply the
    /// environment on top.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(p) if p.exists() => Self::from_toml_file(p)?,
            _ => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse TOML content
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = non_empty("GEMINI_MODEL") {
            self.llm.model = model;
        }
        if let Some(base) = non_empty("GEMINI_API_BASE") {
            self.llm.api_base = base;
        }
        if let Some(profile) = non_empty("CHROME_PROFILE_PATH") {
            self.deep_source.profile_path = Some(PathBuf::from(profile));
        }
        if let Some(chrome) = non_empty("CHROME_EXECUTABLE") {
            self.deep_source.chrome_executable = Some(PathBuf::from(chrome));
        }
        if let Some(runs) = non_empty("RESEARCHER_RUNS_DIR") {
            self.output.runs_dir = PathBuf::from(runs);
        }
    }
}
