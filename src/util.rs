use crate::error::{BugmapError, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::time::Duration;

/// RFC3339, `YYYY-MM-DD`, "N days ago", or a humantime duration like `90d`.
pub fn parse_reference_time(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    // RFC3339
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    // YYYY-MM-DD
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&datetime));
        }
    }

    let duration = parse_natural_duration(input)
        .or_else(|| humantime::parse_duration(input.trim().trim_start_matches('-')).ok())
        .ok_or_else(|| BugmapError::InvalidDate(format!("Unrecognised time '{input}'")))?;

    let delta = chrono::Duration::from_std(duration)
        .map_err(|_| BugmapError::InvalidDate(format!("Duration overflow for '{input}'")))?;
    now.checked_sub_signed(delta)
        .ok_or_else(|| BugmapError::InvalidDate(format!("Duration overflow for '{input}'")))
}

fn parse_natural_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();

    if let Some(days) = input.strip_suffix(" days ago") {
        if let Ok(n) = days.trim().parse::<u64>() {
            return n.checked_mul(86400).map(Duration::from_secs);
        }
    }

    if let Some(weeks) = input.strip_suffix(" weeks ago") {
        if let Ok(n) = weeks.trim().parse::<u64>() {
            return n.checked_mul(7 * 86400).map(Duration::from_secs);
        }
    }

    if let Some(months) = input.strip_suffix(" months ago") {
        if let Ok(n) = months.trim().parse::<u64>() {
            return n.checked_mul(30 * 86400).map(Duration::from_secs);
        }
    }

    None
}
