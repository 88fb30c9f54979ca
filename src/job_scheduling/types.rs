//! Job scheduling type definitions

use chrono::{DateTime, Local, NaiveTime};
use cron::Schedule;
use std::fmt;
use uuid::Uuid;

use crate::models::ArtifactKind;
use crate::utils::cron_helper::{
    daily_expression, every_minute_expression, next_occurrence_after, parse_schedule,
};

/// When a job fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Once a day at a local time of day
    DailyAt(NaiveTime),
    /// Once a minute at a fixed second offset
    EveryMinuteAt { second: u32 },
}

impl Trigger {
    /// Six-field cron expression equivalent to this trigger
    pub fn cron_expression(&self) -> String {
        match self {
            Trigger::DailyAt(time) => daily_expression(*time),
            Trigger::EveryMinuteAt { second } => every_minute_expression(*second),
        }
    }

    /// Compile the trigger, rejecting second offsets outside 0..=59
    pub fn compile(&self) -> Result<Schedule, JobSchedulingError> {
        if let Trigger::EveryMinuteAt { second } = self {
            if *second > 59 {
                return Err(JobSchedulingError::InvalidTrigger {
                    reason: format!("second offset {second} is outside 0..=59"),
                });
            }
        }
        parse_schedule(&self.cron_expression())
            .map_err(|reason| JobSchedulingError::InvalidTrigger { reason })
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::DailyAt(time) => write!(f, "daily at {}", time.format("%H:%M")),
            Trigger::EveryMinuteAt { second } => write!(f, "every minute at :{second:02}"),
        }
    }
}

/// Work a job performs when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    /// Re-read the refresh times and move the daily jobs if they changed
    ReconcileSchedule,
    /// Regenerate the artifact only if it is stale
    EnsureFresh(ArtifactKind),
    /// Regenerate the artifact unconditionally
    Refresh(ArtifactKind),
}

impl JobType {
    /// Short name used in logs
    pub fn job_key(&self) -> String {
        match self {
            JobType::ReconcileSchedule => "reconcile".to_string(),
            JobType::EnsureFresh(kind) => format!("ensure-fresh:{kind}"),
            JobType::Refresh(kind) => format!("refresh:{kind}"),
        }
    }
}

/// A registered recurring job
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    /// Unique job instance identifier
    pub id: Uuid,
    pub job_type: JobType,
    pub trigger: Trigger,
    pub tag: Option<String>,
    /// Next time the job is due
    pub next_run: DateTime<Local>,
    pub last_run: Option<DateTime<Local>>,
    schedule: Schedule,
}

impl ScheduledJob {
    /// Create a job whose first run is the trigger's next occurrence after `now`
    pub fn new(
        trigger: Trigger,
        job_type: JobType,
        tag: Option<String>,
        now: DateTime<Local>,
    ) -> Result<Self, JobSchedulingError> {
        let schedule = trigger.compile()?;
        let next_run = next_occurrence_after(&schedule, &now)
            .ok_or_else(|| JobSchedulingError::NoUpcomingRun { trigger })?;
        Ok(Self {
            id: Uuid::new_v4(),
            job_type,
            trigger,
            tag,
            next_run,
            last_run: None,
            schedule,
        })
    }

    /// Check if this job is due
    pub fn is_due(&self, now: DateTime<Local>) -> bool {
        self.next_run <= now
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag.as_deref() == Some(tag)
    }

    /// Record a run that finished at `finished_at` and move to the next
    /// occurrence after it
    pub fn mark_ran(&mut self, finished_at: DateTime<Local>) {
        self.last_run = Some(finished_at);
        if let Some(next_run) = next_occurrence_after(&self.schedule, &finished_at) {
            self.next_run = next_run;
        }
    }
}

/// Source of the current local time for the scheduler
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Errors that can occur in the job scheduling system
#[derive(Debug, thiserror::Error)]
pub enum JobSchedulingError {
    /// Trigger cannot be turned into a schedule
    #[error("Invalid trigger: {reason}")]
    InvalidTrigger { reason: String },

    /// Trigger never fires again
    #[error("Trigger '{trigger}' has no upcoming run")]
    NoUpcomingRun { trigger: Trigger },

    /// Job id is not registered
    #[error("Job {id} is not registered")]
    UnknownJob { id: Uuid },
}
