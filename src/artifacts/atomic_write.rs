//! Write-to-temp-then-rename file replacement

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::errors::{StorageError, StorageResult};

/// Sibling temp path used while an artifact is being written (`<path>.tmp`)
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut temp: OsString = path.as_os_str().to_owned();
    temp.push(".tmp");
    PathBuf::from(temp)
}

/// Create the directory (and its parents) if it does not exist yet
pub async fn ensure_directory(dir: &Path) -> StorageResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| StorageError::DirectoryCreation {
            path: dir.to_path_buf(),
            source,
        })
}

/// Replace the file at `path` with `content`
///
/// The content is written and synced to `<path>.tmp` first and then renamed
/// over `path`, so the target is never observed half-written. If anything
/// fails before the rename the previous file is left exactly as it was.
pub async fn write_atomically(path: &Path, content: &[u8]) -> StorageResult<u64> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory(parent).await?;
    }

    let temp_path = temp_path_for(path);
    if let Err(source) = write_and_sync(&temp_path, content).await {
        discard_temp(&temp_path).await;
        return Err(StorageError::Write {
            path: temp_path,
            source,
        });
    }

    if let Err(source) = tokio::fs::rename(&temp_path, path).await {
        discard_temp(&temp_path).await;
        return Err(StorageError::Rename {
            from: temp_path,
            to: path.to_path_buf(),
            source,
        });
    }

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(content.len() as u64)
}

async fn write_and_sync(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

async fn discard_temp(temp_path: &Path) {
    match tokio::fs::remove_file(temp_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "Failed to remove temporary file {}: {}",
            temp_path.display(),
            e
        ),
    }
}
