//! Core Data Models
//!
//! This module defines the primary data structures used throughout the feedback
//! metrics engine. These models represent the complete pipeline from raw storage
//! rows to derived dashboard values.
//!
//! ## Data Flow
//!
//! The data flows through these models in the following sequence:
//!
//! 1. **Raw Rows**: [`FeedbackItem`], [`AssistanceRequest`], [`ExternalRating`] -
//!    immutable records fetched by the surrounding application
//! 2. **Derivation**: [`FeedbackSession`] - feedback rows grouped by session id
//!    with status flags computed on every read
//! 3. **Rollups**: [`MetricSnapshot`] - one venue (or a fleet of venues) over one
//!    time window
//! 4. **Tiles**: trend results relating a current and prior-period snapshot
//!
//! The engine never mutates or persists any of these: raw rows are read-only
//! input, and everything derived is recomputed per invocation.
//!
//! ## Serialization
//!
//! Wire-facing types use camelCase field names to match the storage layer's JSON
//! shape. Derived types serialize the same way so the CLI's `--json` output can
//! be consumed directly by dashboard tooling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single feedback row as fetched from storage. One customer submission
/// (a "session") may produce several of these, one per rated question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub id: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "venueId")]
    pub venue_id: String,
    #[serde(rename = "questionId", default)]
    pub question_id: Option<String>,
    /// Star rating 1-5. `None` for free-text-only answers; out-of-range
    /// values are treated as unrated rather than rejected.
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(rename = "additionalFeedback", default)]
    pub additional_feedback: Option<String>,
    #[serde(rename = "tableNumber")]
    pub table_number: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "isActioned", default)]
    pub is_actioned: bool,
    #[serde(default)]
    pub dismissed: bool,
    #[serde(rename = "resolvedAt", default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(rename = "resolvedBy", default)]
    pub resolved_by: Option<String>,
    #[serde(rename = "actionedAt", default)]
    pub actioned_at: Option<DateTime<Utc>>,
}

impl FeedbackItem {
    /// Rating restricted to the valid 1-5 band. Out-of-range rows come from a
    /// known storage integrity issue and must not skew averages.
    pub fn valid_rating(&self) -> Option<u8> {
        self.rating.filter(|r| (1..=5).contains(r))
    }

    /// An item no longer needing attention, either handled or dismissed.
    pub fn is_settled(&self) -> bool {
        self.is_actioned || self.dismissed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Acknowledged,
    Resolved,
}

/// A table-side assistance call. `resolved_at` is authoritative for
/// resolution; `status` is a secondary, sometimes-redundant signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistanceRequest {
    pub id: String,
    #[serde(rename = "venueId")]
    pub venue_id: String,
    #[serde(rename = "tableNumber")]
    pub table_number: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "acknowledgedAt", default)]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(rename = "resolvedAt", default)]
    pub resolved_at: Option<DateTime<Utc>>,
    pub status: RequestStatus,
}

impl AssistanceRequest {
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }

    /// Resolution duration, or `None` for unresolved requests and for rows
    /// resolved before they were created (a data integrity issue - such rows
    /// are excluded from analytics, never clamped to zero).
    pub fn resolution_duration(&self) -> Option<chrono::Duration> {
        let resolved = self.resolved_at?;
        let duration = resolved - self.created_at;
        if duration < chrono::Duration::zero() {
            return None;
        }
        Some(duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingSource {
    Google,
    Tripadvisor,
}

/// A pre-populated snapshot of a venue's rating on an external provider.
/// The engine rolls these up but never fetches them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalRating {
    #[serde(rename = "venueId")]
    pub venue_id: String,
    pub source: RatingSource,
    pub rating: f64,
    #[serde(rename = "ratingsCount")]
    pub ratings_count: u64,
    #[serde(rename = "recordedAt")]
    pub recorded_at: DateTime<Utc>,
}

/// All feedback items sharing one session id, with status flags derived at
/// read time. Never cached: flags like [`FeedbackSession::is_expired`] depend
/// on `now` and go stale immediately.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackSession {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub items: Vec<FeedbackItem>,
    /// Earliest `created_at` among the session's items. Computed as a
    /// minimum rather than taken from the first row, so fetch order never
    /// changes the result.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Every item actioned or dismissed.
    #[serde(rename = "isActioned")]
    pub is_actioned: bool,
    /// Some rated item at or below the alert threshold.
    #[serde(rename = "lowScore")]
    pub low_score: bool,
    /// Session age exceeds the venue's timeout. Monotonic in `now`.
    #[serde(rename = "isExpired")]
    pub is_expired: bool,
    /// Mean of rated items only; `None` when nothing was rated.
    #[serde(rename = "avgRating")]
    pub avg_rating: Option<f64>,
}

/// One venue-and-window slice of the dashboard. Pure function of the rows,
/// the window and `now`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    #[serde(rename = "sessionCount")]
    pub session_count: usize,
    #[serde(rename = "avgSatisfaction")]
    pub avg_satisfaction: Option<f64>,
    #[serde(rename = "avgResponseTimeMs")]
    pub avg_response_time_ms: Option<f64>,
    #[serde(rename = "completionRatePct")]
    pub completion_rate_pct: Option<f64>,
    #[serde(rename = "activeAlertCount")]
    pub active_alert_count: usize,
    #[serde(rename = "resolvedCount")]
    pub resolved_count: usize,
    #[serde(rename = "peakHourLabel")]
    pub peak_hour_label: Option<String>,
    #[serde(rename = "activityLevel")]
    pub activity_level: crate::activity::ActivityLevel,
}

impl MetricSnapshot {
    /// The "no rows in window" snapshot. Venues with no data still get an
    /// entry in multi-venue breakdowns, carrying this.
    pub fn empty() -> Self {
        Self {
            session_count: 0,
            avg_satisfaction: None,
            avg_response_time_ms: None,
            completion_rate_pct: None,
            active_alert_count: 0,
            resolved_count: 0,
            peak_hour_label: None,
            activity_level: crate::activity::ActivityLevel::Quiet,
        }
    }
}

/// Per-venue slices keyed by venue id, shown alongside a combined rollup.
/// BTreeMap keeps display and test output deterministic.
pub type VenueBreakdown = BTreeMap<String, MetricSnapshot>;

/// Combined fleet rollup plus its per-venue slices.
#[derive(Debug, Clone, Serialize)]
pub struct VenueMetrics {
    pub snapshot: MetricSnapshot,
    pub breakdowns: VenueBreakdown,
}

/// An inclusive window of instants, produced by the time range resolver.
///
/// All timestamps handed to the engine are expected to already be normalized
/// to the venue's local clock by the storage layer; day boundaries here are
/// taken on that same clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Count-weighted rollup of one external provider across venues.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalRatingSummary {
    pub rating: Option<f64>,
    #[serde(rename = "ratingsCount")]
    pub ratings_count: u64,
    #[serde(rename = "venueCount")]
    pub venue_count: usize,
}
