// ABOUTME: Shared utility functions for the todo backend
// ABOUTME: Millisecond timestamps, RFC 3339 formatting and timezone helpers

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert a millisecond timestamp into a UTC datetime.
/// Returns `None` when the value is outside chrono's representable range.
pub fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Format a millisecond timestamp as RFC 3339. Zero means "unset" and yields `None`.
pub fn format_millis(millis: i64) -> Option<String> {
    if millis == 0 {
        return None;
    }
    millis_to_datetime(millis).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Build a fixed UTC offset from a number of minutes east of UTC
pub fn utc_offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
}
