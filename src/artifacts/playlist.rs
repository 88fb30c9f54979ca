//! M3U playlist artifact

use std::path::Path;
use tracing::{debug, warn};

use super::atomic_write::write_atomically;
use crate::errors::StorageResult;
use crate::models::CatalogSection;
use crate::utils::url::UrlUtils;

/// First line of every playlist
pub const PLAYLIST_HEADER: &str = "#EXTM3U tvg-shift=0";

/// What a playlist render produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaylistSummary {
    /// Channels written, which is also the highest channel number
    pub channels: usize,
    /// Channels left out because their metadata carried no streamId
    pub skipped: usize,
    pub bytes: u64,
}

/// Render the catalog as an M3U document
///
/// Channel numbers run 1..N across the whole catalog in traversal order and
/// are not reset per category. A channel listed in two categories appears
/// twice.
pub fn render_playlist(catalog: &[CatalogSection], plugin_id: &str) -> (String, PlaylistSummary) {
    let mut content = String::from(PLAYLIST_HEADER);
    content.push('\n');
    let mut summary = PlaylistSummary::default();

    for section in catalog {
        for channel in &section.channels {
            let stream_id = match channel.stream_id() {
                Ok(stream_id) => stream_id,
                Err(e) => {
                    warn!("Skipping channel '{}' in playlist: {}", channel.name, e);
                    summary.skipped += 1;
                    continue;
                }
            };

            summary.channels += 1;
            content.push_str(&format!(
                "#EXTINF:0 tvg-id=\"{}\" tvg-name=\"{}\" tvg-logo=\"{}\" tvg-chno=\"{}\" group-title=\"{}\",{}\n",
                stream_id,
                channel.name,
                channel.logo,
                summary.channels,
                section.category.title,
                channel.name
            ));
            content.push_str(&UrlUtils::plugin_play_url(
                plugin_id,
                &channel.endpoint,
                &channel.metadata,
            ));
            content.push('\n');
        }
    }

    summary.bytes = content.len() as u64;
    (content, summary)
}

/// Render the catalog and atomically replace the playlist at `output_path`
pub async fn write_playlist(
    catalog: &[CatalogSection],
    output_path: &Path,
    plugin_id: &str,
) -> StorageResult<PlaylistSummary> {
    let (content, summary) = render_playlist(catalog, plugin_id);
    write_atomically(output_path, content.as_bytes()).await?;
    debug!(
        "Playlist {} written with {} channels",
        output_path.display(),
        summary.channels
    );
    Ok(summary)
}
