use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Handles parsing timestamps and day bounds from the formats used in
/// storage snapshots and on the CLI
pub struct TimestampParser;

impl TimestampParser {
    /// Parse a timestamp string into a DateTime<Utc>
    /// Handles Z suffix, explicit offsets, and naive datetimes assumed UTC
    pub fn parse(timestamp_str: &str) -> Result<DateTime<Utc>> {
        let timestamp = if timestamp_str.ends_with('Z') {
            timestamp_str.replace('Z', "+00:00")
        } else {
            timestamp_str.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&timestamp) {
            return Ok(dt.with_timezone(&Utc));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(&timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }

        anyhow::bail!("Failed to parse timestamp: {}", timestamp_str)
    }

    /// Parse a `YYYY-MM-DD` or full timestamp string to the start of that day.
    /// Used for the `from` bound of custom ranges.
    pub fn parse_day_start(value: &str) -> Result<DateTime<Utc>> {
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Ok(date
                .and_hms_opt(0, 0, 0)
                .unwrap_or_default()
                .and_utc());
        }
        let instant = Self::parse(value)?;
        Ok(crate::time_range::start_of_day(instant))
    }

    /// Parse a `YYYY-MM-DD` or full timestamp string to the end of that day.
    /// Used for the `to` bound of custom ranges.
    pub fn parse_day_end(value: &str) -> Result<DateTime<Utc>> {
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Ok(date
                .and_hms_milli_opt(23, 59, 59, 999)
                .unwrap_or_default()
                .and_utc());
        }
        let instant = Self::parse(value)?;
        Ok(crate::time_range::end_of_day(instant))
    }
}
