//! Job executor service for performing the actual work
//!
//! Every failure of a refresh ends here: it is logged and reported as a
//! [`JobStatus`], never returned to the scheduler or the control loop.

use tracing::{debug, error, info, warn};

use crate::errors::AppResult;
use crate::models::ArtifactKind;
use crate::services::{RefreshOutcome, RefreshService};
use crate::sources::ProviderSession;

/// How a job run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// The artifact was regenerated
    Completed,
    /// The artifact was fresh and left alone
    UpToDate,
    /// The run failed and the previous artifact was kept
    Failed,
}

/// Service responsible for executing the artifact refresh jobs
pub struct JobExecutor<S> {
    refresh_service: RefreshService<S>,
}

impl<S: ProviderSession> JobExecutor<S> {
    pub fn new(refresh_service: RefreshService<S>) -> Self {
        Self { refresh_service }
    }

    pub fn refresh_service(&self) -> &RefreshService<S> {
        &self.refresh_service
    }

    /// Regenerate the artifact if it is stale
    pub async fn execute_ensure_fresh(&self, kind: ArtifactKind) -> JobStatus {
        debug!("Checking whether the {} artifact needs a refresh", kind);
        let result = self.refresh_service.ensure_fresh(kind).await;
        Self::report(kind, result)
    }

    /// Regenerate the artifact unconditionally
    pub async fn execute_refresh(&self, kind: ArtifactKind) -> JobStatus {
        info!("Executing scheduled {} refresh", kind);
        let result = self.refresh_service.refresh(kind).await;
        Self::report(kind, result)
    }

    fn report(kind: ArtifactKind, result: AppResult<RefreshOutcome>) -> JobStatus {
        match result {
            Ok(RefreshOutcome::UpToDate) => JobStatus::UpToDate,
            Ok(RefreshOutcome::Written(_)) => JobStatus::Completed,
            Err(e) if e.is_auth_failure() => {
                warn!("{} refresh skipped, login failed: {}", kind, e);
                JobStatus::Failed
            }
            Err(e) => {
                error!("{} refresh failed: {}", kind, e);
                JobStatus::Failed
            }
        }
    }
}
