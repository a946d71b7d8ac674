//! Gemini completion client
//!
//! Talks to the Generative Language REST API (`models/{model}:generateContent`)
//! over `reqwest`. Errors keep the HTTP status code and the provider's status
//! name in their message so quota rejections can be recognised upstream.
//!
//! # Example
//!
//! ```rust,ignore
//! use researcher::llm::{CompletionClient, CompletionOptions, GeminiClient};
//!
//! let client = GeminiClient::from_config(&config.llm)?;
//! let text = client.complete("Hello!", CompletionOptions::plain()).await?;
//! ```

use crate::llm::client::{CompletionClient, CompletionOptions};
use crate::types::{AppError, Result};
use crate::utils::config::LLMConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Gemini client for API-based inference
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Arguments
    ///
    /// * `api_key` - Generative Language API key
    /// * `model` - Model identifier (e.g., "gemini-3-pro-preview")
    /// * `api_base` - API root, without a trailing `/models`
    /// * `timeout` - Per-request timeout
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::LLM(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Build a client from configuration; `None` if no credential is set
    pub fn from_config(config: &LLMConfig) -> Result<Option<Self>> {
        match config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(Some(Self::new(
                key,
                config.model.clone(),
                config.api_base.clone(),
                config.request_timeout(),
            )?)),
            _ => Ok(None),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn build_body(prompt: &str, options: CompletionOptions) -> serde_json::Value {
        let mime_type = if options.structured_output {
            "application/json"
        } else {
            "text/plain"
        };
        let mut generation_config = serde_json::Map::new();
        generation_config.insert("responseMimeType".to_string(), json!(mime_type));
        if options.extended_reasoning {
            generation_config.insert(
                "thinkingConfig".to_string(),
                json!({ "includeThoughts": true }),
            );
        }

        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": generation_config
        })
    }

    /// Concatenate the answer parts of the first candidate, skipping thoughts
    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLM("Gemini returned no candidates".to_string()))?;

        Ok(candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_body(prompt, options))
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|env| format!("{} {}", env.error.status, env.error.message))
                .unwrap_or(body);
            return Err(AppError::LLM(format!(
                "HTTP {}: {}",
                status.as_u16(),
                detail.trim()
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Invalid Gemini response: {}", e)))?;

        Self::extract_text(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============= Wire Types =============

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}
