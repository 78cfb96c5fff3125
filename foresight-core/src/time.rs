//! Time utilities: calendar dates and the user's notion of "today".

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

/// Parse an ISO calendar date like "2026-11-03".
///
/// Anything after the first 10 characters (e.g. "T00:00:00Z") is ignored, so
/// timestamps stored by the backend resolve to their calendar date.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// The calendar date at `now` in an IANA timezone like "America/Chicago".
pub fn today_in_timezone(tz: &str, now: DateTime<Utc>) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(now.with_timezone(&tz).date_naive())
}

/// Whole days from `today` until `date`. Negative when `date` is in the past.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}
