//! XMLTV guide artifact
//!
//! The layout is fixed: each channel element is immediately followed by its
//! programmes, and text content is sanitized by replacing angle brackets
//! rather than entity-escaping them, which is what the PVR client has always
//! been fed.

use std::path::Path;
use tracing::{debug, warn};

use super::atomic_write::write_atomically;
use crate::errors::StorageResult;
use crate::models::ChannelEpg;
use crate::utils::time::format_xmltv_timestamp;

const XML_PROLOGUE: &str = "<?xml version=\"1.0\" encoding=\"utf-8\" ?>";

/// What a guide render produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpgSummary {
    pub channels: usize,
    pub programmes: usize,
    pub bytes: u64,
}

/// Replace `<` and `>` with `"` in programme text
pub fn sanitize_text(text: &str) -> String {
    text.replace(['<', '>'], "\"")
}

/// Render the guide of every channel as one XMLTV document
pub fn render_epg(channels: &[ChannelEpg]) -> (String, EpgSummary) {
    let mut xmltv = String::new();
    xmltv.push_str(XML_PROLOGUE);
    xmltv.push('\n');
    xmltv.push_str("<tv>\n");

    let mut summary = EpgSummary::default();

    for channel in channels {
        summary.channels += 1;
        xmltv.push_str(&format!("  <channel id=\"{}\">\n", channel.id));
        xmltv.push_str(&format!(
            "    <display-name>{}</display-name>\n",
            channel.display_name
        ));
        xmltv.push_str("  </channel>\n");

        for programme in channel.programmes() {
            let (start, stop) = match (
                format_xmltv_timestamp(programme.start_ts),
                format_xmltv_timestamp(programme.stop_ts),
            ) {
                (Some(start), Some(stop)) => (start, stop),
                _ => {
                    warn!(
                        "Skipping programme '{}' on channel {}: timestamp {}..{} is out of range",
                        programme.entry.program_name,
                        channel.id,
                        programme.start_ts,
                        programme.stop_ts
                    );
                    continue;
                }
            };

            summary.programmes += 1;
            xmltv.push_str(&format!(
                "  <programme start=\"{}\" stop=\"{}\" channel=\"{}\">\n",
                start, stop, channel.id
            ));
            xmltv.push_str(&format!(
                "    <title>{}</title>\n",
                sanitize_text(&programme.entry.program_name)
            ));
            xmltv.push_str(&format!(
                "    <desc>{}\n\n    {}\n    </desc>\n",
                sanitize_text(&programme.entry.program_description),
                sanitize_text(&programme.entry.program_description_localized)
            ));
            xmltv.push_str("  </programme>\n");
        }
    }

    xmltv.push_str("</tv>\n");
    summary.bytes = xmltv.len() as u64;
    (xmltv, summary)
}

/// Render the guide and atomically replace the file at `output_path`
pub async fn write_epg(channels: &[ChannelEpg], output_path: &Path) -> StorageResult<EpgSummary> {
    let (content, summary) = render_epg(channels);
    write_atomically(output_path, content.as_bytes()).await?;
    debug!(
        "EPG {} written with {} channels and {} programmes",
        output_path.display(),
        summary.channels,
        summary.programmes
    );
    Ok(summary)
}
