//! Elapsed-day computation between tracker timestamps.
//!
//! Tracker timestamps look like `2024-01-15T10:30:00.000+0000`: a
//! whole-second wall-clock value optionally followed by fractional seconds
//! and a zone offset. Everything after the whole-second mark is ignored for
//! the subtraction, so two timestamps compare as naive local instants.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{InsightsError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Length of the whole-second prefix, `YYYY-MM-DDTHH:MM:SS`.
const TIMESTAMP_PREFIX_LEN: usize = 19;

/// Parse a tracker timestamp, truncated to whole-second resolution.
///
/// Fractional seconds and zone suffixes are stripped rather than
/// interpreted. A string too short or malformed within the prefix is a hard
/// error; nothing is silently coerced.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let prefix = raw
        .get(..TIMESTAMP_PREFIX_LEN)
        .ok_or_else(|| InsightsError::TimestampParse(raw.to_string()))?;
    NaiveDateTime::parse_from_str(prefix, TIMESTAMP_FORMAT)
        .map_err(|_| InsightsError::TimestampParse(raw.to_string()))
}

/// Whole days from `created` to `resolved`, floor semantics: partial days
/// truncate, matching calendar-day subtraction.
///
/// An inconsistent pair where resolution precedes creation clamps to zero
/// instead of excluding the issue.
pub fn elapsed_days(created: &str, resolved: &str) -> Result<i64> {
    let created = parse_timestamp(created)?;
    let resolved = parse_timestamp(resolved)?;
    Ok((resolved - created).num_days().max(0))
}

/// The calendar-date portion of a tracker timestamp.
pub fn date_of(raw: &str) -> Result<NaiveDate> {
    Ok(parse_timestamp(raw)?.date())
}
