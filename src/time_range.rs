//! Time Range Resolution
//!
//! Maps dashboard range tokens (`today`, `last7`, `ytd`, ...) plus optional
//! custom bounds to concrete start/end instants. Every resolution takes `now`
//! as an explicit parameter so callers and tests stay deterministic; nothing
//! in this module reads the wall clock.
//!
//! Day boundaries are taken on the calendar of the timestamps themselves,
//! which storage has already normalized to the venue's local clock (see
//! [`TimeRange`]). Weeks start on Sunday, fixed.

use crate::models::TimeRange;
use crate::timestamp::TimestampParser;
use anyhow::Result;
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

/// A dashboard range token. Unknown tokens resolve like [`RangePreset::All`],
/// matching how tiles fall back when handed a stale saved filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    Today,
    Yesterday,
    ThisWeek,
    Last7,
    Last14,
    Last30,
    YearToDate,
    /// Everything on record. With no lookback configured this starts at the
    /// epoch; a venue can cap it to N months back (see
    /// `EngineConfig::all_lookback_months`).
    All,
    Custom,
}

impl RangePreset {
    /// Total: any unrecognized token is `All`.
    pub fn parse(token: &str) -> Self {
        match token {
            "today" => Self::Today,
            "yesterday" => Self::Yesterday,
            "thisWeek" => Self::ThisWeek,
            "last7" => Self::Last7,
            "last14" => Self::Last14,
            "last30" => Self::Last30,
            "ytd" => Self::YearToDate,
            "custom" => Self::Custom,
            _ => Self::All,
        }
    }
}

/// A range request as it arrives from a tile: a preset plus the custom
/// bounds that only apply when the preset is `custom`.
#[derive(Debug, Clone, Default)]
pub struct RangeQuery {
    pub preset: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

pub fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_default()
        .and_utc()
}

/// Midnight of the previous-or-current Sunday.
pub fn week_start(instant: DateTime<Utc>) -> DateTime<Utc> {
    let days_back = instant.weekday().num_days_from_sunday() as i64;
    start_of_day(instant - chrono::Duration::days(days_back))
}

/// Resolve a range request to concrete bounds.
///
/// `all_lookback_months` restricts the `all` preset (and unknown tokens) to a
/// trailing window; `None` means epoch-start. Fails only on unparseable
/// custom bound strings.
pub fn resolve(
    query: &RangeQuery,
    now: DateTime<Utc>,
    all_lookback_months: Option<u32>,
) -> Result<TimeRange> {
    let preset = query
        .preset
        .as_deref()
        .map(RangePreset::parse)
        .unwrap_or(RangePreset::All);

    let range = match preset {
        RangePreset::Today => TimeRange {
            start: start_of_day(now),
            end: end_of_day(now),
        },
        RangePreset::Yesterday => {
            let yesterday = now - chrono::Duration::days(1);
            TimeRange {
                start: start_of_day(yesterday),
                end: end_of_day(yesterday),
            }
        }
        RangePreset::ThisWeek => TimeRange {
            start: week_start(now),
            end: now,
        },
        RangePreset::Last7 => trailing_days(now, 7),
        RangePreset::Last14 => trailing_days(now, 14),
        RangePreset::Last30 => trailing_days(now, 30),
        RangePreset::YearToDate => {
            let jan_first = NaiveDate::from_ymd_opt(now.year(), 1, 1)
                .unwrap_or_default()
                .and_hms_opt(0, 0, 0)
                .unwrap_or_default()
                .and_utc();
            TimeRange {
                start: jan_first,
                end: now,
            }
        }
        RangePreset::All => {
            let start = match all_lookback_months {
                Some(months) => start_of_day(
                    now.checked_sub_months(Months::new(months))
                        .unwrap_or(DateTime::UNIX_EPOCH),
                ),
                None => DateTime::UNIX_EPOCH,
            };
            TimeRange {
                start,
                end: end_of_day(now),
            }
        }
        RangePreset::Custom => {
            let start = match query.from.as_deref() {
                Some(from) => TimestampParser::parse_day_start(from)?,
                None => DateTime::UNIX_EPOCH,
            };
            let end = match query.to.as_deref() {
                Some(to) => TimestampParser::parse_day_end(to)?,
                None => now,
            };
            TimeRange { start, end }
        }
    };

    Ok(range)
}

/// N calendar days inclusive of today: midnight N-1 days back through
/// end of today.
fn trailing_days(now: DateTime<Utc>, days: i64) -> TimeRange {
    TimeRange {
        start: start_of_day(now - chrono::Duration::days(days - 1)),
        end: end_of_day(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        // A Wednesday
        Utc.with_ymd_and_hms(2025, 6, 11, 12, 0, 0).unwrap()
    }

    fn query(preset: &str) -> RangeQuery {
        RangeQuery {
            preset: Some(preset.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_today_spans_calendar_day() {
        let range = resolve(&query("today"), noon(), None).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap());
        assert!(range.end > noon());
        assert_eq!(range.end.date_naive(), noon().date_naive());
    }

    #[test]
    fn test_yesterday_is_previous_full_day() {
        let range = resolve(&query("yesterday"), noon(), None).unwrap();
        assert_eq!(range.start.date_naive(), noon().date_naive().pred_opt().unwrap());
        assert_eq!(range.end.date_naive(), range.start.date_naive());
    }

    #[test]
    fn test_last7_covers_seven_calendar_days() {
        let range = resolve(&query("last7"), noon(), None).unwrap();
        let days = (range.end.date_naive() - range.start.date_naive()).num_days() + 1;
        assert_eq!(days, 7);
    }

    #[test]
    fn test_this_week_starts_sunday() {
        let range = resolve(&query("thisWeek"), noon(), None).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap());
        assert_eq!(range.end, noon());
    }

    #[test]
    fn test_ytd_starts_january_first() {
        let range = resolve(&query("ytd"), noon(), None).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_unknown_token_acts_like_all() {
        let all = resolve(&query("all"), noon(), None).unwrap();
        let unknown = resolve(&query("sometime"), noon(), None).unwrap();
        assert_eq!(all, unknown);
        assert_eq!(all.start, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_all_with_lookback_cap() {
        let range = resolve(&query("all"), noon(), Some(3)).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_custom_defaults_open_bounds() {
        let range = resolve(&query("custom"), noon(), None).unwrap();
        assert_eq!(range.start, DateTime::UNIX_EPOCH);
        assert_eq!(range.end, noon());
    }

    #[test]
    fn test_custom_explicit_bounds() {
        let q = RangeQuery {
            preset: Some("custom".to_string()),
            from: Some("2025-06-01".to_string()),
            to: Some("2025-06-10".to_string()),
        };
        let range = resolve(&q, noon(), None).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(range.end.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
    }

    #[test]
    fn test_custom_bad_bound_errors() {
        let q = RangeQuery {
            preset: Some("custom".to_string()),
            from: Some("not-a-date".to_string()),
            to: None,
        };
        assert!(resolve(&q, noon(), None).is_err());
    }

    #[test]
    fn test_week_start_on_sunday_is_identity_day() {
        let sunday = Utc.with_ymd_and_hms(2025, 6, 8, 15, 0, 0).unwrap();
        assert_eq!(week_start(sunday), Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap());
    }
}
