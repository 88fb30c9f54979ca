//! Recurring job scheduler
//!
//! Holds the [`JobRegistry`] and runs due jobs one after another. Besides the
//! two daily refresh jobs (tagged `m3u` and `EPG`) three once-a-minute jobs
//! are registered at startup:
//!
//! - at :05 the reconciliation job re-reads the refresh times and moves the
//!   daily job of any artifact whose time changed;
//! - at :15 and :30 the playlist and guide are regenerated if they are stale.

use tracing::{debug, error, info, warn};

use super::job_executor::{JobExecutor, JobStatus};
use super::job_registry::JobRegistry;
use super::types::{Clock, JobType, Trigger};
use crate::config::{RefreshSchedule, ScheduleSource};
use crate::errors::AppResult;
use crate::models::ArtifactKind;
use crate::sources::ProviderSession;

pub const RECONCILE_SECOND: u32 = 5;
pub const PLAYLIST_CHECK_SECOND: u32 = 15;
pub const EPG_CHECK_SECOND: u32 = 30;

/// Result of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Refresh times match the applied schedule
    Unchanged,
    /// The daily jobs of these artifacts were replaced
    Applied(Vec<ArtifactKind>),
    /// The refresh times could not be read or applied; the previous schedule stays
    Failed,
}

/// Cron-style scheduler driven by the control loop
pub struct JobScheduler<S> {
    registry: JobRegistry,
    executor: JobExecutor<S>,
    schedule_source: Box<dyn ScheduleSource + Send>,
    clock: Box<dyn Clock>,
    applied: Option<RefreshSchedule>,
}

impl<S: ProviderSession> JobScheduler<S> {
    pub fn new(
        executor: JobExecutor<S>,
        schedule_source: Box<dyn ScheduleSource + Send>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            registry: JobRegistry::new(),
            executor,
            schedule_source,
            clock,
            applied: None,
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn executor(&self) -> &JobExecutor<S> {
        &self.executor
    }

    /// Refresh times currently in effect
    pub fn applied_schedule(&self) -> Option<RefreshSchedule> {
        self.applied
    }

    /// Apply the configured refresh times, then register the periodic jobs
    pub fn bootstrap(&mut self) -> AppResult<()> {
        self.reconcile();

        let now = self.clock.now();
        let periodic = [
            (RECONCILE_SECOND, JobType::ReconcileSchedule),
            (
                PLAYLIST_CHECK_SECOND,
                JobType::EnsureFresh(ArtifactKind::Playlist),
            ),
            (EPG_CHECK_SECOND, JobType::EnsureFresh(ArtifactKind::Epg)),
        ];
        for (second, job_type) in periodic {
            self.registry
                .schedule(Trigger::EveryMinuteAt { second }, job_type, None, now)?;
        }

        info!("Scheduled {} jobs", self.registry.len());
        Ok(())
    }

    /// Compare the configured refresh times with the applied ones and move
    /// the daily job of every artifact whose time changed
    pub fn reconcile(&mut self) -> ReconcileOutcome {
        let schedule = match self.schedule_source.current_schedule() {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!(
                    "Could not read refresh times, keeping the current schedule: {}",
                    e
                );
                return ReconcileOutcome::Failed;
            }
        };

        let applied = self.applied;
        let changed: Vec<ArtifactKind> = ArtifactKind::ALL
            .into_iter()
            .filter(|kind| {
                applied.map_or(true, |applied| {
                    applied.time_for(*kind) != schedule.time_for(*kind)
                })
            })
            .collect();

        if changed.is_empty() {
            debug!("Refresh times unchanged ({})", schedule);
            return ReconcileOutcome::Unchanged;
        }

        let now = self.clock.now();
        for kind in &changed {
            let trigger = Trigger::DailyAt(schedule.time_for(*kind));
            if let Err(e) = self
                .registry
                .replace(kind.tag(), trigger, JobType::Refresh(*kind), now)
            {
                error!("Failed to reschedule the {} refresh: {}", kind, e);
                return ReconcileOutcome::Failed;
            }
        }

        info!("Applied refresh schedule: {}", schedule);
        self.applied = Some(schedule);
        ReconcileOutcome::Applied(changed)
    }

    /// Run every job that is due, one at a time, returning how many ran
    ///
    /// Jobs removed by a reconciliation earlier in the same pass are skipped.
    pub async fn run_pending(&mut self) -> usize {
        let due = self.registry.due_jobs(self.clock.now());
        let mut ran = 0;

        for (id, job_type) in due {
            if !self.registry.contains(id) {
                debug!("Job {} was replaced during this pass, skipping", id);
                continue;
            }

            self.run_job(job_type).await;
            ran += 1;

            if let Err(e) = self.registry.mark_ran(id, self.clock.now()) {
                debug!("Not rescheduling {}: {}", job_type.job_key(), e);
            }
        }

        ran
    }

    async fn run_job(&mut self, job_type: JobType) {
        debug!("Running job {}", job_type.job_key());
        let status = match job_type {
            JobType::ReconcileSchedule => {
                self.reconcile();
                return;
            }
            JobType::EnsureFresh(kind) => self.executor.execute_ensure_fresh(kind).await,
            JobType::Refresh(kind) => self.executor.execute_refresh(kind).await,
        };
        debug!("Job {} finished: {:?}", job_type.job_key(), status);
        if status == JobStatus::Failed {
            info!(
                "Job {} will be retried at its next occurrence",
                job_type.job_key()
            );
        }
    }
}
