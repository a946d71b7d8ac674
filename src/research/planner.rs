//! Plan generation: topic in, source-tagged sub-tasks out
//!
//! [`PlanGenerator::generate_plan`] never fails. Without a completion client,
//! or when the model's answer cannot be used, it returns [`mock_plan`].

use crate::llm::{retry_on_quota, CompletionClient, CompletionOptions, RetryPolicy};
use crate::types::{AppError, ReportType, ResearchPlan, ResearchTask, Result, SourceType};
use std::sync::Arc;
use tracing::{info, warn};

pub struct PlanGenerator {
    client: Option<Arc<dyn CompletionClient>>,
    retry: RetryPolicy,
}

impl PlanGenerator {
    pub fn new(client: Option<Arc<dyn CompletionClient>>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Model used for planning, if any
    pub fn model_name(&self) -> Option<&str> {
        self.client.as_deref().map(|c| c.model_name())
    }

    /// Decompose `topic` into a research plan
    pub async fn generate_plan(&self, topic: &str, report_type: ReportType) -> ResearchPlan {
        let Some(client) = self.client.as_deref() else {
            info!("No completion credential configured, using mock plan");
            return mock_plan(topic);
        };

        info!(
            model = client.model_name(),
            report = report_type.title(),
            "Analyzing topic '{}'",
            topic
        );

        let prompt = build_plan_prompt(topic);
        let prompt = prompt.as_str();
        let response = retry_on_quota(&self.retry, "generate_plan", move || {
            client.complete(prompt, CompletionOptions::structured())
        })
        .await;

        match response.and_then(|text| parse_plan(&text)) {
            Ok(plan) => {
                info!(
                    sub_tasks = plan.sub_tasks.len(),
                    open_web = plan.count_by_source(SourceType::OpenWeb),
                    authenticated = plan.count_by_source(SourceType::Authenticated),
                    "Plan generated"
                );
                plan
            }
            Err(e) => {
                warn!(error = %e, "Plan generation failed, using mock plan");
                mock_plan(topic)
            }
        }
    }
}

fn build_plan_prompt(topic: &str) -> String {
    format!(
        r#"You are an expert Research Orchestrator.
Your goal is to break down the topic '{topic}' into a concrete research plan.

Create a plan that:
1. Identifies the key questions a report must answer.
2. Breaks the research into 3-5 specific sub-tasks.
3. For each task, specify if it needs 'open_web' search or 'authenticated' (deep/academic) search.
4. Generate specific search queries for each task.

Return the result strictly as a valid JSON object matching this structure:

{{
  "topic": "The Topic",
  "key_questions": ["Question 1?", "Question 2?"],
  "estimated_tokens": 100,
  "sub_tasks": [
    {{
      "id": "task_1",
      "description": "Research specific aspect X",
      "queries": ["query 1", "query 2"],
      "source_type": "open_web"
    }}
  ]
}}"#
    )
}

/// Parse a structured plan response, tolerating a surrounding code fence.
///
/// A plan without sub-tasks is rejected.
pub fn parse_plan(raw: &str) -> Result<ResearchPlan> {
    let json = strip_code_fence(raw);
    let plan: ResearchPlan = serde_json::from_str(json)
        .map_err(|e| AppError::Parse(format!("Invalid plan JSON: {}", e)))?;

    if plan.sub_tasks.is_empty() {
        return Err(AppError::Parse("Plan has no sub-tasks".to_string()));
    }
    Ok(plan)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the language tag line, e.g. ```json
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().trim_end_matches("```").trim()
}

/// Deterministic two-task fallback plan
pub fn mock_plan(topic: &str) -> ResearchPlan {
    ResearchPlan {
        topic: topic.to_string(),
        key_questions: vec![
            "What is the history?".to_string(),
            "Key Players?".to_string(),
            "Future Outlook?".to_string(),
        ],
        estimated_tokens: 0,
        sub_tasks: vec![
            ResearchTask {
                id: uuid::Uuid::new_v4().to_string(),
                description: "Gather historical context".to_string(),
                queries: vec![format!("history of {}", topic)],
                source_type: SourceType::OpenWeb,
            },
            ResearchTask {
                id: uuid::Uuid::new_v4().to_string(),
                description: "Academic Research".to_string(),
                queries: vec![format!("arxiv {}", topic)],
                source_type: SourceType::Authenticated,
            },
        ],
    }
}
