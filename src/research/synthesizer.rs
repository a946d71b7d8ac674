//! Report synthesis from the retained findings

use crate::llm::{retry_on_quota, CompletionClient, CompletionOptions, RetryPolicy};
use crate::types::{ReportType, ResearchFinding, ResearchPlan};
use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ReportSynthesizer {
    client: Option<Arc<dyn CompletionClient>>,
    retry: RetryPolicy,
}

impl ReportSynthesizer {
    pub fn new(client: Option<Arc<dyn CompletionClient>>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Write the final markdown report.
    ///
    /// Falls back to [`mock_report`] when no client is configured or the
    /// completion call fails.
    pub async fn generate_report(
        &self,
        plan: &ResearchPlan,
        findings: &[ResearchFinding],
        report_type: ReportType,
    ) -> String {
        info!(
            sources = findings.len(),
            "Synthesizer: compiling report on '{}'", plan.topic
        );

        let Some(client) = self.client.as_deref() else {
            return mock_report(plan, findings, report_type);
        };

        let prompt = build_report_prompt(plan, findings, report_type);
        let prompt = prompt.as_str();
        let response = retry_on_quota(&self.retry, "generate_report", move || {
            client.complete(prompt, CompletionOptions::reasoning())
        })
        .await;

        match response {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Report synthesis failed, using mock report");
                mock_report(plan, findings, report_type)
            }
        }
    }
}

/// Findings rendered for the prompt, separated by blank lines
pub fn format_findings(findings: &[ResearchFinding]) -> String {
    findings
        .iter()
        .map(|f| {
            format!(
                "Source: {}\nContent: {}\nReliability: {}",
                f.source_url, f.content, f.relevance_score
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_report_prompt(
    plan: &ResearchPlan,
    findings: &[ResearchFinding],
    report_type: ReportType,
) -> String {
    format!(
        r#"You are an expert Research Synthesizer.
Topic: {topic}

Your goal is to write a high-density '{title}' report based ONLY on the provided research findings.

Format: Markdown.
Structure:
1. Executive Summary (The 2-minute download)
2. Key Concepts (Definitions/Ontology)
3. Deep Dive (Synthesis of the main themes)
4. Contrarian Views (If any found)
5. References

Research Findings:
{findings}

Write the report now."#,
        topic = plan.topic,
        title = report_type.title(),
        findings = format_findings(findings),
    )
}

/// Deterministic fallback report: header plus one bullet per source
pub fn mock_report(
    plan: &ResearchPlan,
    findings: &[ResearchFinding],
    report_type: ReportType,
) -> String {
    let mut report = format!(
        "# [MOCK] {} Report: {}\n**Date**: {}\n\n## Note: API Call Failed. Using Mock Output.\n\n",
        report_type.title(),
        plan.topic,
        Local::now().format("%Y-%m-%d %H:%M"),
    );
    for finding in findings {
        report.push_str(&format!("- {}\n", finding.source_url));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::planner::mock_plan;
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct RecordingClient {
        prompts: Mutex<Vec<(String, CompletionOptions)>>,
        fail: bool,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String> {
            self.prompts.lock().push((prompt.to_string(), options));
            if self.fail {
                Err(AppError::LLM("HTTP 500: INTERNAL".to_string()))
            } else {
                Ok("# Report".to_string())
            }
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    fn findings() -> Vec<ResearchFinding> {
        vec![
            ResearchFinding::new("https://a.io/x", "alpha", 0.8, "a"),
            ResearchFinding::new("https://b.io/y", "beta", 0.9, "b"),
        ]
    }

    #[test]
    fn test_format_findings() {
        let text = format_findings(&findings());
        assert_eq!(
            text,
            "Source: https://a.io/x\nContent: alpha\nReliability: 0.8\n\n\
             Source: https://b.io/y\nContent: beta\nReliability: 0.9"
        );
    }

    #[test]
    fn test_mock_report_lists_sources() {
        let report = mock_report(&mock_plan("Test Topic"), &findings(), ReportType::InstaExpert);
        assert!(report.starts_with("# [MOCK] Insta-Expert Report: Test Topic\n**Date**: "));
        assert!(report.contains("## Note: API Call Failed. Using Mock Output.\n\n"));
        assert!(report.ends_with("- https://a.io/x\n- https://b.io/y\n"));
    }

    #[tokio::test]
    async fn test_prompt_embeds_findings_and_uses_reasoning() {
        let client = Arc::new(RecordingClient {
            prompts: Mutex::new(Vec::new()),
            fail: false,
        });
        let synth = ReportSynthesizer::new(Some(client.clone()), RetryPolicy::none());
        let report = synth
            .generate_report(&mock_plan("Fusion"), &findings(), ReportType::InstaExpert)
            .await;

        assert_eq!(report, "# Report");
        let prompts = client.prompts.lock();
        assert_eq!(prompts.len(), 1);
        let (prompt, options) = &prompts[0];
        assert!(prompt.contains("Topic: Fusion"));
        assert!(prompt.contains("4. Contrarian Views"));
        assert!(prompt.contains("Source: https://b.io/y"));
        assert!(options.extended_reasoning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_falls_back_to_mock() {
        let client = Arc::new(RecordingClient {
            prompts: Mutex::new(Vec::new()),
            fail: true,
        });
        let synth = ReportSynthesizer::new(
            Some(client.clone()),
            RetryPolicy::new(5, Duration::from_secs(15)),
        );
        let report = synth
            .generate_report(&mock_plan("Fusion"), &findings(), ReportType::InstaExpert)
            .await;

        assert!(report.contains("[MOCK]"));
        // non-quota errors are not retried
        assert_eq!(client.prompts.lock().len(), 1);
    }
}
