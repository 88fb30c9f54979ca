//! Registry of recurring jobs

use chrono::{DateTime, Local};
use tracing::debug;
use uuid::Uuid;

use super::types::{JobSchedulingError, JobType, ScheduledJob, Trigger};

/// The set of jobs the scheduler evaluates on each pass
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Vec<ScheduledJob>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job firing on `trigger`, first due after `now`
    pub fn schedule(
        &mut self,
        trigger: Trigger,
        job_type: JobType,
        tag: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<Uuid, JobSchedulingError> {
        let job = ScheduledJob::new(trigger, job_type, tag.map(str::to_string), now)?;
        Ok(self.register(job))
    }

    /// Add an already built job
    pub fn register(&mut self, job: ScheduledJob) -> Uuid {
        debug!(
            "Registered job {} ({}, {}), next run {}",
            job.job_type.job_key(),
            job.id,
            job.trigger,
            job.next_run.format("%Y-%m-%d %H:%M:%S")
        );
        let id = job.id;
        self.jobs.push(job);
        id
    }

    /// Remove every job carrying `tag`, returning how many were removed
    pub fn clear(&mut self, tag: &str) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|job| !job.has_tag(tag));
        before - self.jobs.len()
    }

    /// Swap all jobs tagged `tag` for one new job under the same tag
    ///
    /// The replacement is built first; if the trigger is invalid the registry
    /// is left as it was.
    pub fn replace(
        &mut self,
        tag: &str,
        trigger: Trigger,
        job_type: JobType,
        now: DateTime<Local>,
    ) -> Result<Uuid, JobSchedulingError> {
        let job = ScheduledJob::new(trigger, job_type, Some(tag.to_string()), now)?;
        let removed = self.clear(tag);
        debug!("Replacing {} job(s) tagged '{}' with {}", removed, tag, trigger);
        Ok(self.register(job))
    }

    /// Jobs due at `now`, earliest first
    pub fn due_jobs(&self, now: DateTime<Local>) -> Vec<(Uuid, JobType)> {
        let mut due: Vec<&ScheduledJob> = self.jobs.iter().filter(|job| job.is_due(now)).collect();
        due.sort_by_key(|job| job.next_run);
        due.into_iter().map(|job| (job.id, job.job_type)).collect()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.jobs.iter().any(|job| job.id == id)
    }

    /// Reschedule a job after it ran
    pub fn mark_ran(
        &mut self,
        id: Uuid,
        finished_at: DateTime<Local>,
    ) -> Result<(), JobSchedulingError> {
        let job = self
            .jobs
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or(JobSchedulingError::UnknownJob { id })?;
        job.mark_ran(finished_at);
        Ok(())
    }

    pub fn jobs(&self) -> &[ScheduledJob] {
        &self.jobs
    }

    pub fn jobs_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ScheduledJob> + 'a {
        self.jobs.iter().filter(move |job| job.has_tag(tag))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArtifactKind;
    use chrono::{NaiveTime, TimeZone};

    fn local(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, h, m, s).single().unwrap()
    }

    fn daily(h: u32, m: u32) -> Trigger {
        Trigger::DailyAt(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn test_clear_removes_only_tagged_jobs() {
        let mut registry = JobRegistry::new();
        let now = local(1, 0, 0);
        registry
            .schedule(daily(3, 0), JobType::Refresh(ArtifactKind::Playlist), Some("m3u"), now)
            .unwrap();
        registry
            .schedule(daily(3, 30), JobType::Refresh(ArtifactKind::Epg), Some("EPG"), now)
            .unwrap();
        registry
            .schedule(Trigger::EveryMinuteAt { second: 5 }, JobType::ReconcileSchedule, None, now)
            .unwrap();

        assert_eq!(registry.clear("m3u"), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.jobs_tagged("m3u").count(), 0);
        assert_eq!(registry.jobs_tagged("EPG").count(), 1);
        assert_eq!(registry.clear("m3u"), 0);
    }

    #[test]
    fn test_replace_keeps_a_single_tagged_job() {
        let mut registry = JobRegistry::new();
        let now = local(1, 0, 0);
        let old = registry
            .schedule(daily(3, 0), JobType::Refresh(ArtifactKind::Playlist), Some("m3u"), now)
            .unwrap();

        let new = registry
            .replace("m3u", daily(4, 0), JobType::Refresh(ArtifactKind::Playlist), now)
            .unwrap();

        assert!(!registry.contains(old));
        let tagged: Vec<&ScheduledJob> = registry.jobs_tagged("m3u").collect();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].id, new);
        assert_eq!(tagged[0].trigger, daily(4, 0));
        assert_eq!(tagged[0].next_run, local(4, 0, 0));
    }

    #[test]
    fn test_invalid_replacement_leaves_registry_untouched() {
        let mut registry = JobRegistry::new();
        let now = local(1, 0, 0);
        let old = registry
            .schedule(daily(3, 0), JobType::Refresh(ArtifactKind::Playlist), Some("m3u"), now)
            .unwrap();

        let result = registry.replace(
            "m3u",
            Trigger::EveryMinuteAt { second: 75 },
            JobType::Refresh(ArtifactKind::Playlist),
            now,
        );

        assert!(result.is_err());
        assert!(registry.contains(old));
    }

    #[test]
    fn test_due_jobs_in_next_run_order() {
        let mut registry = JobRegistry::new();
        let now = local(10, 0, 0);
        let epg = registry
            .schedule(Trigger::EveryMinuteAt { second: 30 }, JobType::EnsureFresh(ArtifactKind::Epg), None, now)
            .unwrap();
        let reconcile = registry
            .schedule(Trigger::EveryMinuteAt { second: 5 }, JobType::ReconcileSchedule, None, now)
            .unwrap();

        assert!(registry.due_jobs(local(10, 0, 4)).is_empty());
        assert_eq!(
            registry.due_jobs(local(10, 0, 5)),
            vec![(reconcile, JobType::ReconcileSchedule)]
        );
        let due: Vec<Uuid> = registry
            .due_jobs(local(10, 0, 45))
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(due, vec![reconcile, epg]);
    }

    #[test]
    fn test_mark_ran_unknown_job() {
        let mut registry = JobRegistry::new();
        let err = registry.mark_ran(Uuid::new_v4(), local(1, 0, 0)).unwrap_err();
        assert!(matches!(err, JobSchedulingError::UnknownJob { .. }));
    }
}
