//! Control loop driving the scheduler
//!
//! Runs on the caller's task: one job at a time, and a slow job delays every
//! check after it. Shutdown is only observed between ticks.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::job_scheduler::JobScheduler;
use crate::config::ServiceConfig;
use crate::errors::AppResult;
use crate::sources::ProviderSession;

pub struct ControlLoop {
    startup_grace: Duration,
    tick_interval: Duration,
    shutdown: CancellationToken,
}

impl ControlLoop {
    pub fn new(startup_grace: Duration, tick_interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            startup_grace,
            tick_interval,
            shutdown,
        }
    }

    pub fn from_config(config: &ServiceConfig, shutdown: CancellationToken) -> Self {
        Self::new(config.startup_grace, config.tick_interval, shutdown)
    }

    /// Wait out the startup grace, bootstrap the scheduler, then tick until
    /// shutdown is requested
    pub async fn run<S: ProviderSession>(&self, scheduler: &mut JobScheduler<S>) -> AppResult<()> {
        info!(
            "Waiting {} for the network to settle",
            humantime::format_duration(self.startup_grace)
        );
        tokio::select! {
            _ = self.shutdown.cancelled() => {
                info!("Shutdown requested during startup");
                return Ok(());
            }
            _ = tokio::time::sleep(self.startup_grace) => {}
        }

        scheduler.bootstrap()?;

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested, leaving the control loop");
                    break;
                }
                _ = tokio::time::sleep(self.tick_interval) => {}
            }

            let ran = scheduler.run_pending().await;
            if ran > 0 {
                debug!("Ran {} job(s) this tick", ran);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, RefreshSchedule, ScheduleSource};
    use crate::job_scheduling::{JobExecutor, SystemClock};
    use crate::services::RefreshService;
    use crate::sources::testing::FakeSession;
    use chrono::NaiveTime;
    use tempfile::TempDir;

    struct FixedSchedule;

    impl ScheduleSource for FixedSchedule {
        fn current_schedule(&self) -> AppResult<RefreshSchedule> {
            Ok(RefreshSchedule::new(
                NaiveTime::from_hms_opt(3, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(3, 30, 0).unwrap(),
            ))
        }
    }

    fn scheduler(dir: &TempDir) -> JobScheduler<FakeSession> {
        let mut config = Config::default();
        config.storage.data_path = dir.path().to_path_buf();
        JobScheduler::new(
            JobExecutor::new(RefreshService::new(FakeSession::default(), &config)),
            Box::new(FixedSchedule),
            Box::new(SystemClock),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_grace_skips_bootstrap() {
        let dir = TempDir::new().unwrap();
        let mut scheduler = scheduler(&dir);
        let shutdown = CancellationToken::new();
        let control = ControlLoop::new(Duration::from_secs(15), Duration::from_secs(1), shutdown.clone());

        let canceller = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            shutdown.cancel();
        };
        let (result, ()) = tokio::join!(control.run(&mut scheduler), canceller);

        assert!(result.is_ok());
        assert!(scheduler.registry().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_bootstraps_and_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let mut scheduler = scheduler(&dir);
        let shutdown = CancellationToken::new();
        let control = ControlLoop::new(Duration::from_secs(15), Duration::from_secs(1), shutdown.clone());

        let canceller = async {
            tokio::time::sleep(Duration::from_secs(20)).await;
            shutdown.cancel();
        };
        let started = tokio::time::Instant::now();
        let (result, ()) = tokio::join!(control.run(&mut scheduler), canceller);

        assert!(result.is_ok());
        assert_eq!(scheduler.registry().len(), 5);
        assert!(started.elapsed() < Duration::from_secs(22));
    }
}
