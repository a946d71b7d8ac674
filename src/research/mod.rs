//! Research pipeline stages
//!
//! ```text
//! topic -> PlanGenerator -> plan
//!       -> ResearchCoordinator (one scout task per sub-task, concurrently) -> findings
//!       -> Analyst -> gold findings
//!       -> ReportSynthesizer -> markdown report
//! ```
//!
//! [`ResearchPipeline`] chains the stages. Only the planner and synthesizer
//! call the completion provider, and both fall back to deterministic mock
//! output instead of failing the run.
//!
//! # Usage
//!
//! ```ignore
//! use researcher::research::{PlanGenerator, ReportSynthesizer, ResearchCoordinator, ResearchPipeline};
//!
//! let pipeline = ResearchPipeline::new(planner, ResearchCoordinator::new(roster), synthesizer);
//! let outcome = pipeline.run("The Future of Synthetic Biology").await;
//! println!("{}", outcome.report);
//! ```

pub mod analyst;
pub mod coordinator;
pub mod planner;
pub mod synthesizer;

pub use analyst::Analyst;
pub use coordinator::{ResearchCoordinator, ResearchOutcome, ResearchPipeline};
pub use planner::{mock_plan, PlanGenerator};
pub use synthesizer::{mock_report, ReportSynthesizer};
