//! Event model and request types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::session::SessionSummary;
use super::status::EventStatus;

/// A multi-day happening that owns dated sessions.
///
/// Status is derived from the sessions except for Cancelled, which is only
/// ever set administratively.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: EventStatus,
    pub start_date: NaiveDate,
    /// Missing end date means a single-day event.
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_locked(&self) -> bool {
        self.status.is_locked()
    }

    /// Last calendar day of the event.
    pub fn last_date(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date)
    }

    pub fn duration_days(&self) -> i64 {
        (self.last_date() - self.start_date).num_days() + 1
    }

    pub fn covers_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.last_date()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Admins may create on behalf of another organizer; defaults to the actor.
    pub owner_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl UpdateEventRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// Aggregated read model for an event dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct EventOverview {
    pub event: Event,
    pub sessions: Vec<SessionSummary>,
    pub total_attendances: i64,
    pub distinct_participants: i64,
    pub certificates_issued: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        Event {
            id: 1,
            title: "Formation régionale".to_string(),
            description: None,
            status: EventStatus::Scheduled,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            end_date: Some(NaiveDate::from_ymd_opt(2026, 3, 4).unwrap()),
            location: Some("Casablanca".to_string()),
            owner_id: 10,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_duration_days_is_inclusive() {
        let event = sample_event();
        assert_eq!(event.duration_days(), 3);
    }

    #[test]
    fn test_single_day_when_end_date_missing() {
        let mut event = sample_event();
        event.end_date = None;
        assert_eq!(event.duration_days(), 1);
        assert_eq!(event.last_date(), event.start_date);
    }

    #[test]
    fn test_covers_date_bounds() {
        let event = sample_event();
        assert!(event.covers_date(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()));
        assert!(event.covers_date(NaiveDate::from_ymd_opt(2026, 3, 4).unwrap()));
        assert!(!event.covers_date(NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()));
        assert!(!event.covers_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
    }

    #[test]
    fn test_update_request_emptiness() {
        assert!(UpdateEventRequest::default().is_empty());
        let update = UpdateEventRequest {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
