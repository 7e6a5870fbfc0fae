//! Alert Classification
//!
//! Assigns each session to exactly one triage category and derives the tab
//! badge counts the dashboard shows. Categories are evaluated in priority
//! order, not as independent flags: a session that was actioned stays
//! "actioned" even if it also carries a low score or has expired.

use crate::models::FeedbackSession;
use serde::Serialize;

/// Mutually exclusive triage categories, in evaluation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    /// Fully handled or dismissed. Wins over everything else.
    Actioned,
    /// Low score, still inside the attention window.
    Alerts,
    /// Past the timeout without resolution.
    Expired,
    /// Rated fine, not expired, not actioned. Only visible under "all".
    None,
}

/// Classify one session. First match wins.
pub fn classify(session: &FeedbackSession) -> AlertCategory {
    if session.is_actioned {
        AlertCategory::Actioned
    } else if session.low_score && !session.is_expired {
        AlertCategory::Alerts
    } else if session.is_expired {
        AlertCategory::Expired
    } else {
        AlertCategory::None
    }
}

/// Dashboard tab selection. `All` shows every session regardless of category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTab {
    Alerts,
    Actioned,
    Expired,
    All,
}

impl AlertTab {
    pub fn parse(token: &str) -> Self {
        match token {
            "alerts" => Self::Alerts,
            "actioned" => Self::Actioned,
            "expired" => Self::Expired,
            _ => Self::All,
        }
    }

    /// Sessions visible under this tab.
    pub fn filter<'a>(&self, sessions: &'a [FeedbackSession]) -> Vec<&'a FeedbackSession> {
        sessions
            .iter()
            .filter(|s| match self {
                Self::Alerts => classify(s) == AlertCategory::Alerts,
                Self::Actioned => classify(s) == AlertCategory::Actioned,
                Self::Expired => classify(s) == AlertCategory::Expired,
                Self::All => true,
            })
            .collect()
    }
}

/// Badge counts per tab. Always computed over the full unfiltered session
/// set so switching tabs never changes the other tabs' badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TabCounts {
    pub alerts: usize,
    pub actioned: usize,
    pub expired: usize,
    pub none: usize,
    pub all: usize,
}

pub fn tab_counts(sessions: &[FeedbackSession]) -> TabCounts {
    let mut counts = TabCounts::default();
    for session in sessions {
        match classify(session) {
            AlertCategory::Alerts => counts.alerts += 1,
            AlertCategory::Actioned => counts.actioned += 1,
            AlertCategory::Expired => counts.expired += 1,
            AlertCategory::None => counts.none += 1,
        }
        counts.all += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn session(is_actioned: bool, low_score: bool, is_expired: bool) -> FeedbackSession {
        FeedbackSession {
            session_id: "s".to_string(),
            items: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 11, 10, 0, 0).unwrap(),
            is_actioned,
            low_score,
            is_expired,
            avg_rating: None,
        }
    }

    #[test]
    fn test_actioned_wins_over_low_score_and_expiry() {
        assert_eq!(classify(&session(true, true, true)), AlertCategory::Actioned);
    }

    #[test]
    fn test_expiry_wins_over_low_score() {
        assert_eq!(classify(&session(false, true, true)), AlertCategory::Expired);
    }

    #[test]
    fn test_live_low_score_is_alert() {
        assert_eq!(classify(&session(false, true, false)), AlertCategory::Alerts);
    }

    #[test]
    fn test_quiet_session_is_none() {
        assert_eq!(classify(&session(false, false, false)), AlertCategory::None);
    }

    #[test]
    fn test_counts_partition_the_set() {
        let sessions = vec![
            session(true, true, false),
            session(false, true, false),
            session(false, false, true),
            session(false, false, false),
            session(false, true, true),
        ];
        let counts = tab_counts(&sessions);
        assert_eq!(
            counts.alerts + counts.actioned + counts.expired + counts.none,
            sessions.len()
        );
        assert_eq!(counts.all, sessions.len());
        assert_eq!(counts.expired, 2);
    }

    #[test]
    fn test_all_tab_shows_everything() {
        let sessions = vec![session(true, false, false), session(false, false, false)];
        assert_eq!(AlertTab::All.filter(&sessions).len(), 2);
        assert_eq!(AlertTab::Alerts.filter(&sessions).len(), 0);
    }

    #[test]
    fn test_unknown_tab_token_is_all() {
        assert_eq!(AlertTab::parse("whatever"), AlertTab::All);
    }
}
