//! Cron utility functions for calculating next scheduled times
//!
//! Job triggers are compiled to six-field cron expressions
//! (`sec min hour day-of-month month day-of-week`) and evaluated with the
//! `cron` crate in whatever time zone the caller works in.

use chrono::{DateTime, NaiveTime, TimeZone, Timelike};
use cron::Schedule;
use std::str::FromStr;

/// Cron expression firing once a day at the given time of day
pub fn daily_expression(at: NaiveTime) -> String {
    format!("{} {} {} * * *", at.second(), at.minute(), at.hour())
}

/// Cron expression firing once a minute at the given second
pub fn every_minute_expression(second: u32) -> String {
    format!("{second} * * * * *")
}

/// Parse a cron expression with a readable error
pub fn parse_schedule(cron_expression: &str) -> Result<Schedule, String> {
    Schedule::from_str(cron_expression)
        .map_err(|e| format!("Invalid cron expression '{cron_expression}': {e}"))
}

/// First occurrence strictly after `after`
///
/// # Returns
/// * `Some(DateTime<Z>)` - The next scheduled time
/// * `None` - The schedule has no further occurrences
pub fn next_occurrence_after<Z: TimeZone>(
    schedule: &Schedule,
    after: &DateTime<Z>,
) -> Option<DateTime<Z>> {
    schedule.after(after).next()
}
