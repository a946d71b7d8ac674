use crate::research::{Analyst, PlanGenerator, ReportSynthesizer};
use crate::scout::ScoutRoster;
use crate::types::{ReportType, ResearchFinding, ResearchPlan};
use tokio::task::JoinSet;
use tracing::{error, info};

/// Fans a plan's sub-tasks out to their scouts
pub struct ResearchCoordinator {
    roster: ScoutRoster,
}

impl ResearchCoordinator {
    pub fn new(roster: ScoutRoster) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &ScoutRoster {
        &self.roster
    }

    /// Run every sub-task concurrently and merge findings in completion order.
    ///
    /// A task whose scout panics contributes nothing; its siblings are unaffected.
    pub async fn dispatch(&self, plan: &ResearchPlan) -> Vec<ResearchFinding> {
        info!(tasks = plan.sub_tasks.len(), "Dispatching scouts");
        let mut set = JoinSet::new();

        for task in &plan.sub_tasks {
            let scout = self.roster.for_source(task.source_type);
            let task = task.clone();

            set.spawn(async move {
                let findings = scout.gather(&task).await;
                info!(
                    task_id = %task.id,
                    scout = scout.name(),
                    findings = findings.len(),
                    "Task finished"
                );
                findings
            });
        }

        let mut findings = Vec::new();
        while let Some(res) = set.join_next().await {
            match res {
                Ok(batch) => findings.extend(batch),
                Err(e) => error!(error = %e, "Scout task failed"),
            }
        }

        info!(findings = findings.len(), "Scouting complete");
        findings
    }
}

/// Everything one pipeline run produced
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    pub plan: ResearchPlan,
    /// All findings returned by the scouts
    pub findings: Vec<ResearchFinding>,
    /// Findings that passed the analyst
    pub gold: Vec<ResearchFinding>,
    pub report: String,
}

/// Plan, scout, analyze, synthesize
pub struct ResearchPipeline {
    planner: PlanGenerator,
    coordinator: ResearchCoordinator,
    analyst: Analyst,
    synthesizer: ReportSynthesizer,
    report_type: ReportType,
}

impl ResearchPipeline {
    pub fn new(
        planner: PlanGenerator,
        coordinator: ResearchCoordinator,
        synthesizer: ReportSynthesizer,
    ) -> Self {
        Self {
            planner,
            coordinator,
            analyst: Analyst::new(),
            synthesizer,
            report_type: ReportType::default(),
        }
    }

    pub fn with_report_type(mut self, report_type: ReportType) -> Self {
        self.report_type = report_type;
        self
    }

    /// Run the whole pipeline for `topic`.
    ///
    /// Scout cleanup runs once every sub-task has finished, before analysis.
    pub async fn run(&self, topic: &str) -> ResearchOutcome {
        info!(topic, "Starting research");

        let plan = self.planner.generate_plan(topic, self.report_type).await;
        info!(sub_tasks = plan.sub_tasks.len(), "Plan ready");

        let findings = self.coordinator.dispatch(&plan).await;
        self.coordinator.roster().cleanup();

        let gold = self.analyst.analyze(&findings);
        info!(gold = gold.len(), "High-value findings retained");

        let report = self
            .synthesizer
            .generate_report(&plan, &gold, self.report_type)
            .await;

        ResearchOutcome {
            plan,
            findings,
            gold,
            report,
        }
    }
}
