mod common;

use chrono::{DateTime, Local, NaiveTime, TimeZone};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use common::{channel, config_in, config_toml, ScriptedProvider};
use iptv_refresh::config::FileScheduleSource;
use iptv_refresh::job_scheduling::{
    Clock, JobExecutor, JobScheduler, JobType, ReconcileOutcome, Trigger,
};
use iptv_refresh::models::{ArtifactKind, CatalogSection};
use iptv_refresh::services::RefreshService;

#[derive(Clone)]
struct FixedClock(Arc<Mutex<DateTime<Local>>>);

impl FixedClock {
    fn set(&self, now: DateTime<Local>) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.0.lock().unwrap()
    }
}

fn at(h: u32, m: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, 3, h, m, 0).single().unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn test_edited_config_moves_only_the_changed_daily_job() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, config_toml("03:00", "03:30")).unwrap();

    let config = config_in(dir.path());
    let provider = ScriptedProvider::new(vec![CatalogSection::named(
        "stiri",
        "Stiri",
        vec![channel("digi24", Some("1"))],
    )]);
    let clock = FixedClock(Arc::new(Mutex::new(at(1, 0))));
    let mut scheduler = JobScheduler::new(
        JobExecutor::new(RefreshService::new(provider, &config)),
        Box::new(FileScheduleSource::new(&config_path)),
        Box::new(clock.clone()),
    );
    scheduler.bootstrap().unwrap();

    // Three periodic jobs plus one daily job per artifact
    assert_eq!(scheduler.registry().len(), 5);
    let epg_id = scheduler.registry().jobs_tagged("EPG").next().unwrap().id;

    std::fs::write(&config_path, config_toml("04:00", "03:30")).unwrap();
    clock.set(at(1, 30));
    assert_eq!(
        scheduler.reconcile(),
        ReconcileOutcome::Applied(vec![ArtifactKind::Playlist])
    );

    let m3u_jobs: Vec<_> = scheduler.registry().jobs_tagged("m3u").collect();
    assert_eq!(m3u_jobs.len(), 1);
    assert_eq!(m3u_jobs[0].trigger, Trigger::DailyAt(hm(4, 0)));
    assert_eq!(m3u_jobs[0].job_type, JobType::Refresh(ArtifactKind::Playlist));
    assert_eq!(m3u_jobs[0].next_run, at(4, 0));

    let epg_jobs: Vec<_> = scheduler.registry().jobs_tagged("EPG").collect();
    assert_eq!(epg_jobs.len(), 1);
    assert_eq!(epg_jobs[0].id, epg_id);
    assert_eq!(epg_jobs[0].next_run, at(3, 30));

    // Nothing left over at the old time
    assert!(scheduler
        .registry()
        .jobs()
        .iter()
        .all(|job| job.trigger != Trigger::DailyAt(hm(3, 0))));

    // A second pass over the same file changes nothing
    assert_eq!(scheduler.reconcile(), ReconcileOutcome::Unchanged);
    assert_eq!(scheduler.registry().len(), 5);
}

#[test]
fn test_unreadable_config_keeps_the_applied_schedule() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, config_toml("03:00", "03:30")).unwrap();

    let config = config_in(dir.path());
    let clock = FixedClock(Arc::new(Mutex::new(at(1, 0))));
    let mut scheduler = JobScheduler::new(
        JobExecutor::new(RefreshService::new(ScriptedProvider::default(), &config)),
        Box::new(FileScheduleSource::new(&config_path)),
        Box::new(clock),
    );
    scheduler.bootstrap().unwrap();
    let before = scheduler.applied_schedule();

    std::fs::write(&config_path, "[refresh\nm3u_refresh_time = ").unwrap();
    assert_eq!(scheduler.reconcile(), ReconcileOutcome::Failed);
    assert_eq!(scheduler.applied_schedule(), before);
    assert_eq!(scheduler.registry().jobs_tagged("m3u").count(), 1);
    assert_eq!(scheduler.registry().jobs_tagged("EPG").count(), 1);
}
