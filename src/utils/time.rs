//! Time-of-day parsing and guide timestamp helpers

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};

/// Number of consecutive days covered by the EPG artifact, starting today
pub const EPG_WINDOW_DAYS: u64 = 3;

/// XMLTV timestamp layout used for programme start and stop attributes
pub const XMLTV_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Parse a user-supplied "HH:MM" time of day
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("time of day must not be empty".to_string());
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|e| format!("invalid time of day '{trimmed}', expected HH:MM: {e}"))
}

/// Format a unix timestamp as a UTC XMLTV timestamp
///
/// Returns `None` when the timestamp is outside chrono's representable range.
pub fn format_xmltv_timestamp(unix_seconds: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(unix_seconds, 0)
        .map(|instant| instant.format(XMLTV_TIMESTAMP_FORMAT).to_string())
}

/// The dates of the guide window: today, today + 1, today + 2
pub fn epg_window(today: NaiveDate) -> Vec<NaiveDate> {
    (0..EPG_WINDOW_DAYS)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .collect()
}
