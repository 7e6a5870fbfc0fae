#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use table_pulse::models::{AssistanceRequest, FeedbackItem, RequestStatus};

/// June 2025 instant; the 1st is a Sunday, which the week-start tests rely on.
pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, hour, minute, 0).unwrap()
}

pub fn feedback_item(
    session_id: &str,
    venue_id: &str,
    rating: Option<u8>,
    created_at: DateTime<Utc>,
) -> FeedbackItem {
    FeedbackItem {
        id: format!("{}-{}", session_id, created_at.timestamp()),
        session_id: session_id.to_string(),
        venue_id: venue_id.to_string(),
        question_id: None,
        rating,
        additional_feedback: None,
        table_number: "1".to_string(),
        created_at,
        is_actioned: false,
        dismissed: false,
        resolved_at: None,
        resolved_by: None,
        actioned_at: None,
    }
}

pub fn assistance(
    id: &str,
    venue_id: &str,
    created_at: DateTime<Utc>,
    resolved_after_minutes: Option<i64>,
) -> AssistanceRequest {
    let resolved_at = resolved_after_minutes.map(|m| created_at + Duration::minutes(m));
    AssistanceRequest {
        id: id.to_string(),
        venue_id: venue_id.to_string(),
        table_number: "1".to_string(),
        created_at,
        acknowledged_at: None,
        resolved_at,
        status: if resolved_at.is_some() {
            RequestStatus::Resolved
        } else {
            RequestStatus::Pending
        },
    }
}

/// A snapshot JSON document matching the storage export shape.
pub fn snapshot_json() -> String {
    serde_json::json!({
        "feedback": [
            {
                "id": "f1",
                "sessionId": "s1",
                "venueId": "v1",
                "rating": 1,
                "tableNumber": "4",
                "createdAt": "2025-06-11T11:00:00Z"
            },
            {
                "id": "f2",
                "sessionId": "s1",
                "venueId": "v1",
                "rating": 5,
                "tableNumber": "4",
                "createdAt": "2025-06-11T11:01:00Z"
            },
            {
                "id": "f3",
                "sessionId": "s2",
                "venueId": "v1",
                "rating": 4,
                "tableNumber": "2",
                "createdAt": "2025-06-11T11:30:00Z"
            }
        ],
        "assistance": [
            {
                "id": "a1",
                "venueId": "v1",
                "tableNumber": "4",
                "createdAt": "2025-06-11T10:05:00Z",
                "resolvedAt": "2025-06-11T10:35:00Z",
                "status": "resolved"
            },
            {
                "id": "a2",
                "venueId": "v1",
                "tableNumber": "2",
                "createdAt": "2025-06-11T11:40:00Z",
                "status": "pending"
            }
        ],
        "externalRatings": [
            {
                "venueId": "v1",
                "source": "google",
                "rating": 4.4,
                "ratingsCount": 210,
                "recordedAt": "2025-06-11T00:00:00Z"
            }
        ]
    })
    .to_string()
}
