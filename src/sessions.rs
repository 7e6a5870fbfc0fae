//! Session Aggregation
//!
//! Groups a flat fetch of feedback rows into logical sessions and derives the
//! per-session status flags the rest of the engine works from. Grouping is
//! recomputed on every read; nothing here caches across invocations.
//!
//! ## Low-score thresholds
//!
//! Two predicates exist and both are load-bearing:
//!
//! - [`ALERT_THRESHOLD`]: `rating <= 2`, the canonical "low score" used for
//!   alert classification and active-alert counts.
//! - [`URGENT_THRESHOLD`]: `rating < 3`, a looser predicate used by the
//!   unresolved-alerts view only.
//!
//! For integer 1-5 ratings the two are currently equivalent, but historical
//! call sites diverged and it has not been settled whether different tiles
//! genuinely want different sensitivity. Keep them separate until that is
//! decided.

use crate::config::EngineConfig;
use crate::models::{FeedbackItem, FeedbackSession};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Canonical low-score bound: a rating at or below this raises an alert.
pub const ALERT_THRESHOLD: u8 = 2;

/// Looser bound for the unresolved-alerts view: ratings strictly below this.
pub const URGENT_THRESHOLD: u8 = 3;

/// Partition feedback rows by session id and derive per-session flags.
///
/// Rows with an empty session id are dropped (a corrupt row must not blank
/// the dashboard). Input order is irrelevant: `created_at` is the minimum
/// timestamp across the session's items, never the first row of the fetch.
/// Output is sorted newest-first for stable display.
pub fn group_sessions(
    items: &[FeedbackItem],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<FeedbackSession> {
    let mut partitions: HashMap<&str, Vec<FeedbackItem>> = HashMap::new();
    let mut dropped = 0usize;

    for item in items {
        if item.session_id.is_empty() {
            dropped += 1;
            continue;
        }
        partitions
            .entry(item.session_id.as_str())
            .or_default()
            .push(item.clone());
    }

    if dropped > 0 {
        warn!(dropped, "Dropped feedback rows with missing session id");
    }

    let timeout = Duration::minutes(config.session_timeout_minutes);
    let mut sessions: Vec<FeedbackSession> = partitions
        .into_iter()
        .map(|(session_id, items)| build_session(session_id, items, now, timeout, config))
        .collect();

    sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    debug!(
        session_count = sessions.len(),
        item_count = items.len(),
        "Grouped feedback into sessions"
    );

    sessions
}

fn build_session(
    session_id: &str,
    items: Vec<FeedbackItem>,
    now: DateTime<Utc>,
    timeout: Duration,
    config: &EngineConfig,
) -> FeedbackSession {
    // Partitions are non-empty by construction; min() only as a guard.
    let created_at = items
        .iter()
        .map(|i| i.created_at)
        .min()
        .unwrap_or(now);

    let is_actioned = items.iter().all(|i| i.is_settled());
    let low_score = items
        .iter()
        .filter_map(|i| i.valid_rating())
        .any(|r| r <= config.alert_rating_threshold);
    let is_expired = now - created_at > timeout;

    let ratings: Vec<u8> = items.iter().filter_map(|i| i.valid_rating()).collect();
    let avg_rating = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().map(|&r| r as f64).sum::<f64>() / ratings.len() as f64)
    };

    FeedbackSession {
        session_id: session_id.to_string(),
        items,
        created_at,
        is_actioned,
        low_score,
        is_expired,
        avg_rating,
    }
}

/// The unresolved-alerts variant: sessions not yet settled that carry any
/// rating below [`URGENT_THRESHOLD`], regardless of expiry.
pub fn unresolved_urgent_sessions(sessions: &[FeedbackSession]) -> Vec<&FeedbackSession> {
    sessions
        .iter()
        .filter(|s| !s.is_actioned)
        .filter(|s| {
            s.items
                .iter()
                .filter_map(|i| i.valid_rating())
                .any(|r| r < URGENT_THRESHOLD)
        })
        .collect()
}
