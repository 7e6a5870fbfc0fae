//! Trend Calculation
//!
//! Relates a current and prior-period metric value to a direction (up, down,
//! neutral) plus whether that direction is good for the specific metric. The
//! up/down logic lives once here; per-metric "higher is better" vs "lower is
//! better" arrives as a [`Polarity`] parameter instead of being duplicated at
//! every tile.
//!
//! Two call styles exist. [`pct_trend`] compares by percentage change and is
//! used for counts, response times and ratios. [`delta_trend`] compares raw
//! differences and is used for satisfaction/rating values, where a 2%
//! change of a 5-point scale means nothing but a 0.2-point drop does.

use crate::models::MetricSnapshot;
use serde::Serialize;

/// Whether an upward move in this metric is good news.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    /// Whether the move is good for this metric. `true` for neutral trends
    /// so tiles never color a flat metric as a regression.
    pub positive: bool,
    #[serde(rename = "displayValue")]
    pub display_value: String,
}

/// Neutral band for percentage trends: under one percent reads as flat.
const PCT_NEUTRAL_BAND: f64 = 1.0;

/// Neutral band for satisfaction deltas on the 1-5 scale.
pub const SATISFACTION_NEUTRAL_BAND: f64 = 0.1;

/// Tighter band used for per-question rating deltas.
pub const RATING_NEUTRAL_BAND: f64 = 0.05;

/// Percentage-change trend.
///
/// Returns `None` when either value is missing or `previous` is zero (the
/// division guard); callers fall back to a current-only label like `"+4"`
/// in that case rather than showing an infinite percentage.
pub fn pct_trend(
    current: Option<f64>,
    previous: Option<f64>,
    polarity: Polarity,
) -> Option<TrendResult> {
    let current = current?;
    let previous = previous?;
    if previous == 0.0 {
        return None;
    }

    let pct_change = (current - previous) / previous * 100.0;
    if pct_change.abs() < PCT_NEUTRAL_BAND {
        return Some(TrendResult {
            direction: TrendDirection::Neutral,
            positive: true,
            display_value: "~0%".to_string(),
        });
    }

    let direction = if pct_change > 0.0 {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };

    Some(TrendResult {
        direction,
        positive: is_positive(direction, polarity),
        display_value: format!("{:+.0}%", pct_change),
    })
}

/// Raw-difference trend with a caller-chosen neutral band. No zero guard:
/// nothing is divided here, so a zero prior value is a valid comparison.
pub fn delta_trend(
    current: Option<f64>,
    previous: Option<f64>,
    polarity: Polarity,
    neutral_band: f64,
) -> Option<TrendResult> {
    let current = current?;
    let previous = previous?;

    let delta = current - previous;
    if delta.abs() < neutral_band {
        return Some(TrendResult {
            direction: TrendDirection::Neutral,
            positive: true,
            display_value: "~0".to_string(),
        });
    }

    let direction = if delta > 0.0 {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };

    Some(TrendResult {
        direction,
        positive: is_positive(direction, polarity),
        display_value: format!("{:+.1}", delta),
    })
}

fn is_positive(direction: TrendDirection, polarity: Polarity) -> bool {
    match polarity {
        Polarity::HigherIsBetter => direction == TrendDirection::Up,
        Polarity::LowerIsBetter => direction == TrendDirection::Down,
    }
}

/// The trend row for a set of dashboard tiles: today vs yesterday, or
/// current vs prior period.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotTrends {
    pub sessions: Option<TrendResult>,
    pub satisfaction: Option<TrendResult>,
    #[serde(rename = "responseTime")]
    pub response_time: Option<TrendResult>,
    pub completion: Option<TrendResult>,
}

pub fn compare_snapshots(current: &MetricSnapshot, previous: &MetricSnapshot) -> SnapshotTrends {
    SnapshotTrends {
        sessions: pct_trend(
            Some(current.session_count as f64),
            Some(previous.session_count as f64),
            Polarity::HigherIsBetter,
        ),
        satisfaction: delta_trend(
            current.avg_satisfaction,
            previous.avg_satisfaction,
            Polarity::HigherIsBetter,
            SATISFACTION_NEUTRAL_BAND,
        ),
        response_time: pct_trend(
            current.avg_response_time_ms,
            previous.avg_response_time_ms,
            Polarity::LowerIsBetter,
        ),
        completion: pct_trend(
            current.completion_rate_pct,
            previous.completion_rate_pct,
            Polarity::HigherIsBetter,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_previous_returns_none() {
        for current in [0.0, 1.0, 100.0, -3.0] {
            assert!(pct_trend(Some(current), Some(0.0), Polarity::HigherIsBetter).is_none());
        }
    }

    #[test]
    fn test_missing_values_return_none() {
        assert!(pct_trend(None, Some(10.0), Polarity::HigherIsBetter).is_none());
        assert!(pct_trend(Some(10.0), None, Polarity::HigherIsBetter).is_none());
        assert!(delta_trend(None, Some(4.0), Polarity::HigherIsBetter, 0.1).is_none());
    }

    #[test]
    fn test_equal_values_are_neutral() {
        let result = pct_trend(Some(42.0), Some(42.0), Polarity::HigherIsBetter).unwrap();
        assert_eq!(result.direction, TrendDirection::Neutral);
        assert_eq!(result.display_value, "~0%");
    }

    #[test]
    fn test_slower_response_is_negative() {
        // 150ms now vs 100ms before: up 50% and bad.
        let result = pct_trend(Some(150.0), Some(100.0), Polarity::LowerIsBetter).unwrap();
        assert_eq!(result.direction, TrendDirection::Up);
        assert!(!result.positive);
        assert_eq!(result.display_value, "+50%");
    }

    #[test]
    fn test_more_sessions_is_positive() {
        let result = pct_trend(Some(123.0), Some(100.0), Polarity::HigherIsBetter).unwrap();
        assert_eq!(result.direction, TrendDirection::Up);
        assert!(result.positive);
        assert_eq!(result.display_value, "+23%");
    }

    #[test]
    fn test_sub_percent_change_is_neutral() {
        let result = pct_trend(Some(1005.0), Some(1000.0), Polarity::HigherIsBetter).unwrap();
        assert_eq!(result.direction, TrendDirection::Neutral);
    }

    #[test]
    fn test_delta_band_and_sign() {
        let flat = delta_trend(Some(4.25), Some(4.2), Polarity::HigherIsBetter, 0.1).unwrap();
        assert_eq!(flat.direction, TrendDirection::Neutral);

        let drop = delta_trend(Some(3.8), Some(4.2), Polarity::HigherIsBetter, 0.1).unwrap();
        assert_eq!(drop.direction, TrendDirection::Down);
        assert!(!drop.positive);
        assert_eq!(drop.display_value, "-0.4");
    }

    #[test]
    fn test_delta_allows_zero_previous() {
        let result = delta_trend(Some(0.5), Some(0.0), Polarity::HigherIsBetter, 0.05).unwrap();
        assert_eq!(result.direction, TrendDirection::Up);
    }
}
