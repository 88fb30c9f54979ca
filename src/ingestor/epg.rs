//! EPG fetcher
//!
//! The guide endpoint is unreliable: for some streams and days it answers
//! with the bare text `ERR`, and occasionally with something that is not
//! JSON at all. Either way the day is replaced by an empty schedule for the
//! channel so one bad day never costs the rest of the guide.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::errors::SourceResult;
use crate::models::{CatalogSection, ChannelEpg, EpgDayResponse};
use crate::sources::ProviderSession;
use crate::utils::time::epg_window;

/// Body the provider sends instead of JSON when it has no guide for a day
pub const EPG_SENTINEL: &str = "ERR";

/// One decoded guide day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpgDay {
    pub record: EpgDayResponse,
    /// The provider's answer was unusable and an empty day was put in its place
    pub substituted: bool,
}

/// Decode one day's raw response, substituting an empty schedule when needed
pub fn parse_epg_day(raw: &str, stream_id: &str, channel_name: &str) -> EpgDay {
    let body = raw.trim();
    if body == EPG_SENTINEL {
        debug!(
            "Provider returned {} for '{}' ({}), using an empty schedule",
            EPG_SENTINEL, channel_name, stream_id
        );
        return EpgDay {
            record: EpgDayResponse::empty_for(stream_id, channel_name),
            substituted: true,
        };
    }

    match serde_json::from_str::<EpgDayResponse>(body) {
        Ok(record) => EpgDay {
            record,
            substituted: false,
        },
        Err(e) => {
            warn!(
                "Unparseable EPG response for '{}' ({}): {}, using an empty schedule",
                channel_name, stream_id, e
            );
            EpgDay {
                record: EpgDayResponse::empty_for(stream_id, channel_name),
                substituted: true,
            }
        }
    }
}

/// Fetch and decode one day of one stream
///
/// Transport and HTTP failures are returned as errors; only a bad body is
/// repaired here.
pub async fn fetch_day<S>(
    stream_id: &str,
    channel_name: &str,
    date: NaiveDate,
    session: &S,
) -> SourceResult<EpgDay>
where
    S: ProviderSession + ?Sized,
{
    let raw = session.epg_day_raw(stream_id, date).await?;
    Ok(parse_epg_day(&raw, stream_id, channel_name))
}

/// Fetch today and the next two days for one stream
///
/// Entries are concatenated in day order without sorting, gap filling or
/// overlap checks. The channel id and display name come from today's record.
/// Returns the guide and the number of substituted days.
pub async fn fetch_window<S>(
    stream_id: &str,
    channel_name: &str,
    today: NaiveDate,
    session: &S,
) -> SourceResult<(ChannelEpg, usize)>
where
    S: ProviderSession + ?Sized,
{
    let mut days = Vec::new();
    let mut substituted = 0;

    for date in epg_window(today) {
        let day = fetch_day(stream_id, channel_name, date, session).await?;
        if day.substituted {
            substituted += 1;
        }
        days.push(day.record.data);
    }

    let mut days = days.into_iter();
    let first = days
        .next()
        .unwrap_or_else(|| EpgDayResponse::empty_for(stream_id, channel_name).data);
    let mut guide = ChannelEpg {
        id: first.id_stream,
        display_name: first.stream_desc,
        entries: first.epg,
    };
    for day in days {
        guide.entries.extend(day.epg);
    }
    Ok((guide, substituted))
}

/// Guides of every channel in a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuideFetch {
    pub channels: Vec<ChannelEpg>,
    /// Channels without a usable streamId
    pub skipped_channels: usize,
    /// Days replaced by an empty schedule across all channels
    pub substituted_days: usize,
}

/// Fetch the three-day guide of every channel, in catalog order
///
/// A channel listed in several categories is fetched and emitted once per
/// listing, matching the playlist.
pub async fn fetch_guide<S>(
    catalog: &[CatalogSection],
    today: NaiveDate,
    session: &S,
) -> SourceResult<GuideFetch>
where
    S: ProviderSession + ?Sized,
{
    let mut fetch = GuideFetch::default();

    for section in catalog {
        for channel in &section.channels {
            let stream_id = match channel.stream_id() {
                Ok(stream_id) => stream_id,
                Err(e) => {
                    warn!("Skipping channel '{}' in EPG: {}", channel.name, e);
                    fetch.skipped_channels += 1;
                    continue;
                }
            };

            let (guide, substituted) =
                fetch_window(&stream_id, &channel.name, today, session).await?;
            debug!(
                "Channel '{}' ({}) has {} programmes",
                channel.name,
                stream_id,
                guide.entries.len()
            );
            fetch.substituted_days += substituted;
            fetch.channels.push(guide);
        }
    }

    if fetch.substituted_days > 0 {
        info!(
            "{} guide days were unavailable and left empty",
            fetch.substituted_days
        );
    }
    Ok(fetch)
}
