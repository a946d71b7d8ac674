//! LLM completion clients and the quota-aware retry wrapper
//!
//! # Architecture
//!
//! - [`CompletionClient`] - The single trait the pipeline depends on
//! - [`GeminiClient`] - Generative Language REST implementation
//! - [`retry`] - Exponential backoff around quota-limited calls
//!
//! The plan generator and report synthesizer always call the client through
//! [`retry::retry_on_quota`], each with its own [`RetryPolicy`].

/// Core completion trait and per-request options.
pub mod client;
/// Gemini `generateContent` client.
pub mod gemini;
/// Retry with exponential backoff.
pub mod retry;

pub use client::{CompletionClient, CompletionOptions};
pub use gemini::GeminiClient;
pub use retry::{is_quota_error, retry_on_quota, with_backoff, RetryPolicy};
