//! Parsing and storage helpers for transaction timestamps.
//!
//! Timestamps are stored as unix milliseconds so that the database can
//! compare them numerically.

use time::{
    Date, OffsetDateTime, Time, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};

use crate::Error;

/// Parse a timestamp from either an RFC 3339 string (e.g. `2024-05-01T09:30:00Z`)
/// or a plain date (e.g. `2024-05-01`), which is taken as midnight UTC.
///
/// The result is always converted to UTC.
///
/// # Errors
///
/// Returns [Error::InvalidDate] if `text` is in neither format.
pub fn parse_timestamp(text: &str) -> Result<OffsetDateTime, Error> {
    let text = text.trim();

    if let Ok(timestamp) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(timestamp.to_offset(UtcOffset::UTC));
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map(|date| date.with_time(Time::MIDNIGHT).assume_utc())
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Convert `timestamp` to the number of milliseconds since the unix epoch.
///
/// Sub-millisecond precision is discarded.
pub(crate) fn to_unix_millis(timestamp: OffsetDateTime) -> i64 {
    timestamp.unix_timestamp_nanos().div_euclid(1_000_000) as i64
}

/// Convert milliseconds since the unix epoch back into a UTC timestamp.
pub(crate) fn from_unix_millis(millis: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
}
