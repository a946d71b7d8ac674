//! CLI module for the researcher binary
//!
//! Argument parsing with clap, colored terminal output with owo-colors, and
//! the per-run artifact writer.

pub mod artifacts;
pub mod output;

use crate::types::Result;
use crate::utils::config::ResearcherConfig;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TOPIC: &str = "The Future of Synthetic Biology";

/// Insta-Expert researcher
///
/// Plans a research topic, scouts the open web and an authenticated browser
/// profile concurrently, filters the findings and writes a markdown report.
#[derive(Parser, Debug)]
#[command(
    name = "researcher",
    version,
    about = "Insta-Expert automated research pipeline",
    after_help = "EXAMPLES:\n    \
                  researcher --topic \"Solid-state batteries\"\n    \
                  researcher --topic topic.txt --open-limit 5\n    \
                  researcher --profile ~/.config/google-chrome/Default --deep-limit 2"
)]
pub struct Cli {
    /// Research topic, or a path to a file containing it
    #[arg(short, long, default_value = DEFAULT_TOPIC)]
    pub topic: String,

    /// Search results fetched per open-web query
    #[arg(long)]
    pub open_limit: Option<usize>,

    /// Search results considered per deep-source query
    #[arg(long)]
    pub deep_limit: Option<usize>,

    /// Completion model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Browser profile directory to snapshot for authenticated sources
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(short, long, default_value = "researcher.toml")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply flag overrides on top of file and environment configuration
    pub fn apply_to(&self, config: &mut ResearcherConfig) {
        if let Some(limit) = self.open_limit {
            config.open_web.max_results = limit;
        }
        if let Some(limit) = self.deep_limit {
            config.deep_source.max_results = limit;
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(profile) = &self.profile {
            config.deep_source.profile_path = Some(profile.clone());
        }
        if self.verbose {
            config.log_level = "debug".to_string();
        }
    }

    /// The topic text, read from disk when `--topic` names a file
    pub fn resolve_topic(&self) -> Result<String> {
        resolve_topic(&self.topic)
    }
}

/// Treat `arg` as a file path if one exists, otherwise as the topic itself
pub fn resolve_topic(arg: &str) -> Result<String> {
    let path = Path::new(arg);
    if path.is_file() {
        Ok(fs::read_to_string(path)?.trim().to_string())
    } else {
        Ok(arg.to_string())
    }
}
