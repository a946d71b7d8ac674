//! Heuristic quality gate between scouting and synthesis
//!
//! Each finding is scored on its own:
//!
//! ```text
//! score = clamp(base + min(0.1, len / 50000) + depth + jitter, 0, 1)
//! ```
//!
//! where `depth` is 0.05 for URLs with more than three `/`-separated parts and
//! `jitter` is uniform in `[-0.03, 0.03]`. Findings scoring above 0.5 are kept.

use crate::types::ResearchFinding;
use rand::Rng;
use tracing::{debug, info};

pub const GOLD_THRESHOLD: f64 = 0.5;
pub const MAX_DENSITY_BONUS: f64 = 0.1;
pub const DENSITY_DIVISOR: f64 = 50_000.0;
pub const DEPTH_BONUS: f64 = 0.05;
pub const JITTER: f64 = 0.03;

#[derive(Debug, Clone, Copy, Default)]
pub struct Analyst;

impl Analyst {
    pub fn new() -> Self {
        Self
    }

    /// Score `finding` with an explicit jitter term
    pub fn score_with_jitter(&self, finding: &ResearchFinding, jitter: f64) -> f64 {
        let length = finding.content.chars().count() as f64;
        let density = (length / DENSITY_DIVISOR).min(MAX_DENSITY_BONUS);
        let depth = if finding.source_url.split('/').count() > 3 {
            DEPTH_BONUS
        } else {
            0.0
        };

        (finding.relevance_score + density + depth + jitter).clamp(0.0, 1.0)
    }

    /// Keep the findings that clear [`GOLD_THRESHOLD`], using the thread RNG for jitter
    pub fn analyze(&self, findings: &[ResearchFinding]) -> Vec<ResearchFinding> {
        self.analyze_with_rng(findings, &mut rand::rng())
    }

    /// [`Analyst::analyze`] with a caller-supplied RNG
    pub fn analyze_with_rng<R: Rng>(
        &self,
        findings: &[ResearchFinding],
        rng: &mut R,
    ) -> Vec<ResearchFinding> {
        info!(count = findings.len(), "Analyst: processing findings");

        let gold: Vec<ResearchFinding> = findings
            .iter()
            .filter(|finding| {
                let jitter = rng.random_range(-JITTER..=JITTER);
                let score = self.score_with_jitter(finding, jitter);
                let keep = score > GOLD_THRESHOLD;
                if keep {
                    debug!(url = %finding.source_url, score, "Keeping finding");
                } else {
                    debug!(url = %finding.source_url, score, "Discarding finding");
                }
                keep
            })
            .cloned()
            .collect();

        info!(kept = gold.len(), "Analysis complete");
        gold
    }
}
