// Date helpers for due dates.
// Accepts "YYYY-MM-DD" (midnight UTC) and full RFC3339 timestamps.

use anyhow::{Context, Result};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

pub fn parse_day(s: &str) -> Result<OffsetDateTime> {
    let s = s.trim();
    let date = Date::parse(s, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date {s:?}, expected YYYY-MM-DD"))?;
    Ok(date.midnight().assume_utc())
}

pub fn parse_due(s: &str) -> Result<OffsetDateTime> {
    let s = s.trim();
    if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
        return Ok(ts);
    }
    parse_day(s)
}

/// True when `ts` falls on the calendar day of `day`, read in `day`'s offset.
pub fn same_day(ts: OffsetDateTime, day: OffsetDateTime) -> bool {
    ts.checked_to_offset(day.offset())
        .is_some_and(|t| t.date() == day.date())
}

pub fn format_day(ts: OffsetDateTime) -> String {
    ts.date().to_string()
}
