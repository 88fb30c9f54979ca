//! Refresh schedule snapshots
//!
//! The reconciliation job never looks at shared configuration state. Each pass
//! asks a [`ScheduleSource`] for a fresh [`RefreshSchedule`] and compares it with
//! the snapshot it applied last time.

use chrono::NaiveTime;
use std::fmt;
use std::path::PathBuf;

use super::{Config, RefreshConfig};
use crate::errors::{AppError, AppResult};
use crate::models::ArtifactKind;
use crate::utils::time::parse_time_of_day;

/// Validated refresh times for both artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    pub m3u_time: NaiveTime,
    pub epg_time: NaiveTime,
}

impl RefreshSchedule {
    pub fn new(m3u_time: NaiveTime, epg_time: NaiveTime) -> Self {
        Self { m3u_time, epg_time }
    }

    /// Parse the "HH:MM" strings of the `[refresh]` section
    pub fn from_config(refresh: &RefreshConfig) -> AppResult<Self> {
        let m3u_time = parse_time_of_day(&refresh.m3u_refresh_time).map_err(|e| {
            AppError::configuration(format!("refresh.m3u_refresh_time: {e}"))
        })?;
        let epg_time = parse_time_of_day(&refresh.epg_refresh_time).map_err(|e| {
            AppError::configuration(format!("refresh.epg_refresh_time: {e}"))
        })?;
        Ok(Self { m3u_time, epg_time })
    }

    /// Refresh time for one artifact
    pub fn time_for(&self, kind: ArtifactKind) -> NaiveTime {
        match kind {
            ArtifactKind::Playlist => self.m3u_time,
            ArtifactKind::Epg => self.epg_time,
        }
    }
}

impl fmt::Display for RefreshSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m3u at {}, EPG at {}",
            self.m3u_time.format("%H:%M"),
            self.epg_time.format("%H:%M")
        )
    }
}

/// Where the reconciliation job reads the current refresh times from
pub trait ScheduleSource {
    fn current_schedule(&self) -> AppResult<RefreshSchedule>;
}

/// Re-reads the configuration file on every reconciliation pass
#[derive(Debug, Clone)]
pub struct FileScheduleSource {
    config_file: PathBuf,
}

impl FileScheduleSource {
    pub fn new<P: Into<PathBuf>>(config_file: P) -> Self {
        Self {
            config_file: config_file.into(),
        }
    }
}

impl ScheduleSource for FileScheduleSource {
    fn current_schedule(&self) -> AppResult<RefreshSchedule> {
        let config = Config::read_from_file(&self.config_file)?;
        RefreshSchedule::from_config(&config.refresh)
    }
}
