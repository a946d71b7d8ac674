//! Completion client abstraction
//!
//! The pipeline only needs one capability from a language model: submit a
//! prompt, get text back. Providers implement [`CompletionClient`]; callers
//! pick the output mode per request through [`CompletionOptions`].

use crate::types::Result;
use async_trait::async_trait;

/// Generic completion client trait for provider abstraction
///
/// Failures must carry enough of the provider's error text (HTTP status,
/// status name) for [`crate::llm::retry::is_quota_error`] to classify them.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a completion for a single prompt
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Per-request output controls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionOptions {
    /// Ask for machine-parseable JSON instead of free text
    pub structured_output: bool,
    /// Enable the provider's extended reasoning mode
    pub extended_reasoning: bool,
}

impl CompletionOptions {
    /// JSON output, no extended reasoning
    pub fn structured() -> Self {
        Self {
            structured_output: true,
            extended_reasoning: false,
        }
    }

    /// Plain text output
    pub fn plain() -> Self {
        Self::default()
    }

    /// Plain text output with extended reasoning
    pub fn reasoning() -> Self {
        Self {
            structured_output: false,
            extended_reasoning: true,
        }
    }
}
