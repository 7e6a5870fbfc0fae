//! Venue Metrics Aggregation
//!
//! Orchestrates the engine for one venue and composes N venue results into a
//! fleet-wide rollup with per-venue breakdowns.
//!
//! The combined rollup is session-weighted: `avg_satisfaction` is the mean of
//! every individual rating across the fleet, not the mean of per-venue means,
//! and ratio metrics are computed over the combined counts. Averaging
//! already-averaged per-venue numbers distorts the picture whenever venues
//! differ in volume, so the combined pass runs over the raw rows once.

use crate::activity::{self, ActivityLevel, ActivityThresholds};
use crate::alerts::{classify, AlertCategory};
use crate::config::EngineConfig;
use crate::models::{
    AssistanceRequest, ExternalRating, ExternalRatingSummary, FeedbackItem, MetricSnapshot,
    RatingSource, TimeRange, VenueMetrics,
};
use crate::response_time;
use crate::sessions::group_sessions;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Aggregate a window of rows for the given venues.
///
/// With zero or one venue id this is the plain single-venue snapshot. With
/// several, the combined snapshot is computed over the union of rows (using
/// the scaled multi-venue activity ladder) and `breakdowns` carries an
/// independently computed single-venue snapshot per requested venue - venues
/// with no rows in the window included, with empty metrics, so the
/// per-venue list never silently shrinks.
///
/// An empty `venue_ids` slice means "whatever venues appear in the rows".
pub fn aggregate(
    feedback: &[FeedbackItem],
    assistance: &[AssistanceRequest],
    venue_ids: &[String],
    range: TimeRange,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> VenueMetrics {
    let venues: BTreeSet<String> = if venue_ids.is_empty() {
        feedback
            .iter()
            .map(|f| f.venue_id.clone())
            .chain(assistance.iter().map(|a| a.venue_id.clone()))
            .collect()
    } else {
        venue_ids.iter().cloned().collect()
    };

    let in_scope = |venue_id: &str| venues.is_empty() || venues.contains(venue_id);

    let feedback_rows: Vec<FeedbackItem> = feedback
        .iter()
        .filter(|f| range.contains(f.created_at) && in_scope(&f.venue_id))
        .cloned()
        .collect();
    let assistance_rows: Vec<AssistanceRequest> = assistance
        .iter()
        .filter(|a| range.contains(a.created_at) && in_scope(&a.venue_id))
        .cloned()
        .collect();

    debug!(
        venues = venues.len(),
        feedback_rows = feedback_rows.len(),
        assistance_rows = assistance_rows.len(),
        "Aggregating venue metrics"
    );

    let multi_venue = venues.len() > 1;
    let ladder = if multi_venue {
        &config.multi_venue_activity
    } else {
        &config.single_venue_activity
    };
    let snapshot = snapshot_for(&feedback_rows, &assistance_rows, now, config, ladder);

    let mut breakdowns = BTreeMap::new();
    if multi_venue {
        for venue_id in &venues {
            let venue_feedback: Vec<FeedbackItem> = feedback_rows
                .iter()
                .filter(|f| &f.venue_id == venue_id)
                .cloned()
                .collect();
            let venue_assistance: Vec<AssistanceRequest> = assistance_rows
                .iter()
                .filter(|a| &a.venue_id == venue_id)
                .cloned()
                .collect();
            let slice = if venue_feedback.is_empty() && venue_assistance.is_empty() {
                MetricSnapshot::empty()
            } else {
                snapshot_for(
                    &venue_feedback,
                    &venue_assistance,
                    now,
                    config,
                    &config.single_venue_activity,
                )
            };
            breakdowns.insert(venue_id.clone(), slice);
        }
    }

    VenueMetrics {
        snapshot,
        breakdowns,
    }
}

/// One snapshot over an already-filtered set of rows. Single reduction pass
/// over raw rows; nothing here averages pre-averaged values.
fn snapshot_for(
    feedback: &[FeedbackItem],
    assistance: &[AssistanceRequest],
    now: DateTime<Utc>,
    config: &EngineConfig,
    ladder: &ActivityThresholds,
) -> MetricSnapshot {
    let sessions = group_sessions(feedback, now, config);

    let ratings: Vec<f64> = feedback
        .iter()
        .filter_map(|f| f.valid_rating())
        .map(|r| r as f64)
        .collect();
    let avg_satisfaction = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    };

    let response = response_time::analyze(assistance, config);
    let resolved_count = assistance.iter().filter(|a| a.is_resolved()).count();
    let completion_rate_pct = if assistance.is_empty() {
        None
    } else {
        Some(resolved_count as f64 / assistance.len() as f64 * 100.0)
    };

    let active_alert_count = sessions
        .iter()
        .filter(|s| classify(s) == AlertCategory::Alerts)
        .count();

    let peak_hour_label = activity::analyze(feedback)
        .peak_hour
        .map(activity::hour_label);

    MetricSnapshot {
        session_count: sessions.len(),
        avg_satisfaction,
        avg_response_time_ms: response.avg_ms,
        completion_rate_pct,
        active_alert_count,
        resolved_count,
        peak_hour_label,
        activity_level: ActivityLevel::from_count(sessions.len(), ladder),
    }
}

/// Roll pre-populated provider snapshots up per source: count-weighted mean
/// rating across venues plus the total review count. Pass-through only; the
/// engine never ingests from providers.
pub fn rollup_external(
    ratings: &[ExternalRating],
) -> BTreeMap<RatingSource, ExternalRatingSummary> {
    let mut by_source: BTreeMap<RatingSource, Vec<&ExternalRating>> = BTreeMap::new();
    for rating in ratings {
        by_source.entry(rating.source).or_default().push(rating);
    }

    by_source
        .into_iter()
        .map(|(source, rows)| {
            let total_count: u64 = rows.iter().map(|r| r.ratings_count).sum();
            let rating = if total_count == 0 {
                None
            } else {
                let weighted: f64 = rows
                    .iter()
                    .map(|r| r.rating * r.ratings_count as f64)
                    .sum();
                Some(weighted / total_count as f64)
            };
            let venue_count = rows
                .iter()
                .map(|r| r.venue_id.as_str())
                .collect::<BTreeSet<_>>()
                .len();
            (
                source,
                ExternalRatingSummary {
                    rating,
                    ratings_count: total_count,
                    venue_count,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 11, 12, 0, 0).unwrap()
    }

    fn all_day() -> TimeRange {
        TimeRange {
            start: Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 6, 11, 23, 59, 59).unwrap(),
        }
    }

    fn item(venue: &str, session: &str, rating: u8) -> FeedbackItem {
        FeedbackItem {
            id: format!("{}-{}", venue, session),
            session_id: session.to_string(),
            venue_id: venue.to_string(),
            question_id: None,
            rating: Some(rating),
            additional_feedback: None,
            table_number: "1".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 11, 11, 30, 0).unwrap(),
            is_actioned: false,
            dismissed: false,
            resolved_at: None,
            resolved_by: None,
            actioned_at: None,
        }
    }

    #[test]
    fn test_session_weighted_satisfaction() {
        // Venue a: four 5s. Venue b: one 1. Mean of per-venue means would be
        // 3.0; the session-weighted mean over all five ratings is 4.2.
        let feedback = vec![
            item("a", "a1", 5),
            item("a", "a2", 5),
            item("a", "a3", 5),
            item("a", "a4", 5),
            item("b", "b1", 1),
        ];
        let venues = vec!["a".to_string(), "b".to_string()];
        let metrics = aggregate(
            &feedback,
            &[],
            &venues,
            all_day(),
            now(),
            &EngineConfig::default(),
        );
        assert_eq!(metrics.snapshot.avg_satisfaction, Some(4.2));
        assert_eq!(metrics.breakdowns["a"].avg_satisfaction, Some(5.0));
        assert_eq!(metrics.breakdowns["b"].avg_satisfaction, Some(1.0));
    }

    #[test]
    fn test_empty_venue_still_in_breakdowns() {
        let feedback = vec![item("a", "a1", 4)];
        let venues = vec!["a".to_string(), "ghost".to_string()];
        let metrics = aggregate(
            &feedback,
            &[],
            &venues,
            all_day(),
            now(),
            &EngineConfig::default(),
        );
        assert!(metrics.breakdowns.contains_key("ghost"));
        assert_eq!(metrics.breakdowns["ghost"], MetricSnapshot::empty());
    }

    #[test]
    fn test_single_venue_has_no_breakdowns() {
        let feedback = vec![item("a", "a1", 4)];
        let metrics = aggregate(
            &feedback,
            &[],
            &["a".to_string()],
            all_day(),
            now(),
            &EngineConfig::default(),
        );
        assert!(metrics.breakdowns.is_empty());
        assert_eq!(metrics.snapshot.session_count, 1);
    }

    #[test]
    fn test_window_filters_rows() {
        let mut old = item("a", "old", 1);
        old.created_at = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();
        let feedback = vec![old, item("a", "a1", 4)];
        let metrics = aggregate(
            &feedback,
            &[],
            &["a".to_string()],
            all_day(),
            now(),
            &EngineConfig::default(),
        );
        assert_eq!(metrics.snapshot.session_count, 1);
        assert_eq!(metrics.snapshot.avg_satisfaction, Some(4.0));
    }

    #[test]
    fn test_external_rollup_is_count_weighted() {
        let recorded = Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap();
        let ratings = vec![
            ExternalRating {
                venue_id: "a".to_string(),
                source: RatingSource::Google,
                rating: 5.0,
                ratings_count: 300,
                recorded_at: recorded,
            },
            ExternalRating {
                venue_id: "b".to_string(),
                source: RatingSource::Google,
                rating: 3.0,
                ratings_count: 100,
                recorded_at: recorded,
            },
        ];
        let rollup = rollup_external(&ratings);
        let google = &rollup[&RatingSource::Google];
        assert_eq!(google.rating, Some(4.5));
        assert_eq!(google.ratings_count, 400);
        assert_eq!(google.venue_count, 2);
    }
}
