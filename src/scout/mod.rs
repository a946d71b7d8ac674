//! Scouts: gather findings for one research sub-task
//!
//! Both variants implement [`Scout`]. [`ScoutRoster`] maps every
//! [`SourceType`] to exactly one scout instance.
//!
//! - [`OpenWebScout`] - stateless search + fetch, safe to run concurrently
//! - [`DeepSourceScout`] - one cloned browser profile, one session at a time

pub mod deep_source;
pub mod open_web;
pub mod snapshot;

pub use deep_source::DeepSourceScout;
pub use open_web::OpenWebScout;
pub use snapshot::{FsProfileCloner, ProfileCloner, ProfileSnapshot, SnapshotState};

use crate::types::{ResearchFinding, ResearchTask, SourceType};
use async_trait::async_trait;
use std::sync::Arc;

/// Executes gathering for a single task.
///
/// Failures are contained inside the scout: a query or URL that fails is
/// logged and skipped, and a scout that cannot run at all returns no findings.
#[async_trait]
pub trait Scout: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Gather findings for `task`, processing its queries in order
    async fn gather(&self, task: &ResearchTask) -> Vec<ResearchFinding>;

    /// Release per-run resources once all gathering is finished
    fn cleanup(&self) {}
}

/// The scout assigned to each source type
#[derive(Clone)]
pub struct ScoutRoster {
    pub open_web: Arc<dyn Scout>,
    pub authenticated: Arc<dyn Scout>,
}

impl ScoutRoster {
    pub fn new(open_web: Arc<dyn Scout>, authenticated: Arc<dyn Scout>) -> Self {
        Self {
            open_web,
            authenticated,
        }
    }

    /// Run every scout's cleanup
    pub fn cleanup(&self) {
        self.open_web.cleanup();
        self.authenticated.cleanup();
    }

    /// Route a source type to its scout
    pub fn for_source(&self, source_type: SourceType) -> Arc<dyn Scout> {
        match source_type {
            SourceType::OpenWeb => Arc::clone(&self.open_web),
            SourceType::Authenticated => Arc::clone(&self.authenticated),
        }
    }
}
