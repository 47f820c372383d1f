//! Timestamp helpers shared by storage and aggregation
//!
//! Timestamps are stored as fixed-width RFC 3339 strings in UTC
//! (microsecond precision, `Z` suffix) so that lexicographic order in
//! SQLite equals chronological order.

use chrono::{DateTime, Local, SecondsFormat, SubsecRound, Timelike, Utc};

/// Current time at storage precision, so records read back compare equal
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Format a timestamp for storage
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp, accepting any RFC 3339 offset
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Calendar day of a timestamp in the server's local timezone
pub fn local_day(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Hour of day (0-23) of a timestamp in the server's local timezone
pub fn local_hour(dt: &DateTime<Utc>) -> u32 {
    dt.with_timezone(&Local).hour()
}
