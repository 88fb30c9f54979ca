//! Artifact staleness policy

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Age at which an artifact is regenerated even if nothing else is wrong
pub const STALE_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

/// Whether an artifact has to be regenerated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    Stale,
}

impl Staleness {
    pub fn is_stale(self) -> bool {
        self == Staleness::Stale
    }
}

/// Classify the artifact at `path` as seen at `now`
///
/// Missing, empty and unreadable files are stale, as is anything last
/// modified `STALE_AFTER` or longer before `now`. A modification time in the
/// future counts as fresh.
pub fn check_artifact(path: &Path, now: SystemTime) -> Staleness {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => {
            debug!("Artifact {} does not exist", path.display());
            return Staleness::Stale;
        }
    };

    if !metadata.is_file() || metadata.len() == 0 {
        debug!("Artifact {} is empty", path.display());
        return Staleness::Stale;
    }

    let modified = match metadata.modified() {
        Ok(modified) => modified,
        Err(e) => {
            debug!(
                "Artifact {} has no readable modification time: {}",
                path.display(),
                e
            );
            return Staleness::Stale;
        }
    };

    match now.duration_since(modified) {
        Ok(age) if age >= STALE_AFTER => {
            debug!(
                "Artifact {} last updated {} ago",
                path.display(),
                humantime::format_duration(Duration::from_secs(age.as_secs()))
            );
            Staleness::Stale
        }
        _ => Staleness::Fresh,
    }
}

/// `true` when the artifact is missing, empty or at least 24 hours old
pub fn needs_refresh(path: &Path) -> bool {
    check_artifact(path, SystemTime::now()).is_stale()
}
