//! Artifact refresh service
//!
//! Two entry points per artifact: [`RefreshService::ensure_fresh`] only
//! regenerates when the staleness policy says so, [`RefreshService::refresh`]
//! always does. Any failure leaves the previous artifact untouched.

use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::artifacts::{ensure_directory, needs_refresh, write_epg, write_playlist};
use crate::config::Config;
use crate::errors::AppResult;
use crate::ingestor::{fetch_catalog, fetch_guide};
use crate::models::{ArtifactKind, Credentials};
use crate::sources::ProviderSession;

/// What a refresh wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReport {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub channels: usize,
    /// Programmes in the guide; zero for the playlist
    pub programmes: usize,
    pub skipped_channels: usize,
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Result of a refresh request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The artifact was fresh and nothing was fetched
    UpToDate,
    Written(ArtifactReport),
}

/// Regenerates artifacts through one long-lived provider session
pub struct RefreshService<S> {
    session: S,
    credentials: Credentials,
    data_path: PathBuf,
    playlist_path: PathBuf,
    epg_path: PathBuf,
    plugin_id: String,
}

impl<S: ProviderSession> RefreshService<S> {
    pub fn new(session: S, config: &Config) -> Self {
        Self {
            session,
            credentials: config.provider.credentials(),
            data_path: config.storage.data_path.clone(),
            playlist_path: config.storage.artifact_path(ArtifactKind::Playlist),
            epg_path: config.storage.artifact_path(ArtifactKind::Epg),
            plugin_id: config.service.plugin_id.clone(),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Path of the artifact of the given kind
    pub fn artifact_path(&self, kind: ArtifactKind) -> &PathBuf {
        match kind {
            ArtifactKind::Playlist => &self.playlist_path,
            ArtifactKind::Epg => &self.epg_path,
        }
    }

    /// Regenerate the artifact only if it is missing, empty or 24 hours old
    pub async fn ensure_fresh(&self, kind: ArtifactKind) -> AppResult<RefreshOutcome> {
        ensure_directory(&self.data_path).await?;

        let path = self.artifact_path(kind);
        if !needs_refresh(path) {
            debug!("{} artifact {} is fresh", kind, path.display());
            return Ok(RefreshOutcome::UpToDate);
        }

        info!("{} artifact {} needs a refresh", kind, path.display());
        self.refresh(kind).await
    }

    /// Regenerate the artifact unconditionally
    pub async fn refresh(&self, kind: ArtifactKind) -> AppResult<RefreshOutcome> {
        self.refresh_for_date(kind, Local::now().date_naive()).await
    }

    /// Regenerate the artifact with the guide window starting at `today`
    pub async fn refresh_for_date(
        &self,
        kind: ArtifactKind,
        today: NaiveDate,
    ) -> AppResult<RefreshOutcome> {
        let start_time = Instant::now();
        ensure_directory(&self.data_path).await?;

        info!("Starting {} refresh", kind);
        let catalog = fetch_catalog(&self.credentials, &self.session).await?;
        let path = self.artifact_path(kind).clone();

        let report = match kind {
            ArtifactKind::Playlist => {
                let summary = write_playlist(&catalog, &path, &self.plugin_id).await?;
                ArtifactReport {
                    kind,
                    path,
                    channels: summary.channels,
                    programmes: 0,
                    skipped_channels: summary.skipped,
                    bytes: summary.bytes,
                    elapsed: start_time.elapsed(),
                }
            }
            ArtifactKind::Epg => {
                let guide = fetch_guide(&catalog, today, &self.session).await?;
                let summary = write_epg(&guide.channels, &path).await?;
                ArtifactReport {
                    kind,
                    path,
                    channels: summary.channels,
                    programmes: summary.programmes,
                    skipped_channels: guide.skipped_channels,
                    bytes: summary.bytes,
                    elapsed: start_time.elapsed(),
                }
            }
        };

        info!(
            "{} refresh completed: {} channels, {} programmes, {} skipped, {} bytes written to {} in {}ms",
            kind,
            report.channels,
            report.programmes,
            report.skipped_channels,
            report.bytes,
            report.path.display(),
            report.elapsed.as_millis()
        );
        Ok(RefreshOutcome::Written(report))
    }
}
