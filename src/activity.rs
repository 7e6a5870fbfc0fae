//! Peak Activity Analysis
//!
//! Hour-of-day and day-of-week activity histograms over feedback items, peak
//! identification, and the ordinal activity-level ladder used on summary
//! tiles.

use crate::models::FeedbackItem;
use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Session-count thresholds for the activity ladder. Below `steady` is
/// quiet; at or above `peak` is peak. Single- and multi-venue dashboards
/// carry different tables (see `EngineConfig`), so this stays data rather
/// than two hardcoded ladders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityThresholds {
    pub steady: usize,
    pub busy: usize,
    pub peak: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Quiet,
    Steady,
    Busy,
    Peak,
}

impl ActivityLevel {
    pub fn from_count(session_count: usize, thresholds: &ActivityThresholds) -> Self {
        if session_count >= thresholds.peak {
            Self::Peak
        } else if session_count >= thresholds.busy {
            Self::Busy
        } else if session_count >= thresholds.steady {
            Self::Steady
        } else {
            Self::Quiet
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Quiet => "Quiet",
            Self::Steady => "Steady",
            Self::Busy => "Busy",
            Self::Peak => "Peak",
        }
    }
}

/// One histogram cell: item count plus the mean of ratings landing there.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ActivityBucket {
    pub count: usize,
    #[serde(rename = "avgRating")]
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    /// Hours 0-23.
    pub hourly: Vec<ActivityBucket>,
    /// Days 0=Sunday through 6=Saturday.
    pub weekly: Vec<ActivityBucket>,
    /// Busiest hour index; `None` when there is no activity at all.
    #[serde(rename = "peakHour")]
    pub peak_hour: Option<usize>,
    /// Busiest day index; `None` when there is no activity at all.
    #[serde(rename = "peakDay")]
    pub peak_day: Option<usize>,
}

#[derive(Default)]
struct BucketAccumulator {
    count: usize,
    rating_sum: f64,
    rating_count: usize,
}

impl BucketAccumulator {
    fn push(&mut self, rating: Option<u8>) {
        self.count += 1;
        if let Some(r) = rating {
            self.rating_sum += r as f64;
            self.rating_count += 1;
        }
    }

    fn finish(&self) -> ActivityBucket {
        ActivityBucket {
            count: self.count,
            avg_rating: if self.rating_count == 0 {
                None
            } else {
                Some(self.rating_sum / self.rating_count as f64)
            },
        }
    }
}

pub fn analyze(items: &[FeedbackItem]) -> ActivityReport {
    let mut hours: [BucketAccumulator; 24] = Default::default();
    let mut days: [BucketAccumulator; 7] = Default::default();

    for item in items {
        let hour = item.created_at.hour() as usize;
        let day = item.created_at.weekday().num_days_from_sunday() as usize;
        hours[hour].push(item.valid_rating());
        days[day].push(item.valid_rating());
    }

    let hourly: Vec<ActivityBucket> = hours.iter().map(|a| a.finish()).collect();
    let weekly: Vec<ActivityBucket> = days.iter().map(|a| a.finish()).collect();

    ActivityReport {
        peak_hour: peak_index(&hourly),
        peak_day: peak_index(&weekly),
        hourly,
        weekly,
    }
}

/// Index of the maximum count; ties resolve to the lowest index.
fn peak_index(buckets: &[ActivityBucket]) -> Option<usize> {
    let mut peak: Option<usize> = None;
    for (idx, bucket) in buckets.iter().enumerate() {
        if bucket.count == 0 {
            continue;
        }
        match peak {
            Some(best) if buckets[best].count >= bucket.count => {}
            _ => peak = Some(idx),
        }
    }
    peak
}

/// `14` -> `"2 PM"`, matching the dashboard's hour labels.
pub fn hour_label(hour: usize) -> String {
    let hour = hour % 24;
    match hour {
        0 => "12 AM".to_string(),
        1..=11 => format!("{} AM", hour),
        12 => "12 PM".to_string(),
        _ => format!("{} PM", hour - 12),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(day: u32, hour: u32, rating: Option<u8>) -> FeedbackItem {
        FeedbackItem {
            id: format!("{}-{}", day, hour),
            session_id: "s".to_string(),
            venue_id: "v1".to_string(),
            question_id: None,
            rating,
            additional_feedback: None,
            table_number: "1".to_string(),
            // June 2025: the 1st is a Sunday.
            created_at: Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap(),
            is_actioned: false,
            dismissed: false,
            resolved_at: None,
            resolved_by: None,
            actioned_at: None,
        }
    }

    #[test]
    fn test_hour_and_day_bucketing() {
        let items = vec![
            item(1, 13, Some(4)), // Sunday 1 PM
            item(1, 13, Some(2)),
            item(2, 9, None), // Monday 9 AM
        ];
        let report = analyze(&items);
        assert_eq!(report.hourly[13].count, 2);
        assert_eq!(report.hourly[13].avg_rating, Some(3.0));
        assert_eq!(report.hourly[9].count, 1);
        assert_eq!(report.hourly[9].avg_rating, None);
        assert_eq!(report.weekly[0].count, 2);
        assert_eq!(report.weekly[1].count, 1);
    }

    #[test]
    fn test_peak_selection_first_index_wins_ties() {
        let items = vec![item(1, 9, None), item(1, 18, None)];
        let report = analyze(&items);
        assert_eq!(report.peak_hour, Some(9));
    }

    #[test]
    fn test_peak_none_when_empty() {
        let report = analyze(&[]);
        assert_eq!(report.peak_hour, None);
        assert_eq!(report.peak_day, None);
    }

    #[test]
    fn test_activity_ladder() {
        let thresholds = ActivityThresholds {
            steady: 5,
            busy: 15,
            peak: 30,
        };
        assert_eq!(ActivityLevel::from_count(0, &thresholds), ActivityLevel::Quiet);
        assert_eq!(ActivityLevel::from_count(4, &thresholds), ActivityLevel::Quiet);
        assert_eq!(ActivityLevel::from_count(5, &thresholds), ActivityLevel::Steady);
        assert_eq!(ActivityLevel::from_count(15, &thresholds), ActivityLevel::Busy);
        assert_eq!(ActivityLevel::from_count(30, &thresholds), ActivityLevel::Peak);
        assert_eq!(ActivityLevel::from_count(500, &thresholds), ActivityLevel::Peak);
    }

    #[test]
    fn test_hour_labels() {
        assert_eq!(hour_label(0), "12 AM");
        assert_eq!(hour_label(9), "9 AM");
        assert_eq!(hour_label(12), "12 PM");
        assert_eq!(hour_label(14), "2 PM");
        assert_eq!(hour_label(23), "11 PM");
    }
}
