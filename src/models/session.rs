//! Session model and request types

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::event::Event;
use super::status::SessionStatus;

/// One dated occurrence of an event. Check-ins always target a session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: i64,
    pub event_id: i64,
    /// 1-based position within the event, assigned at insert time.
    pub session_number: i32,
    pub title: String,
    pub session_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub status: SessionStatus,
    pub qr_token: Option<String>,
    pub qr_generated_at: Option<DateTime<Utc>>,
    pub qr_scan_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn is_locked(&self) -> bool {
        self.status.is_locked()
    }

    /// Check-ins are only admitted while the session runs.
    pub fn accepts_check_ins(&self) -> bool {
        self.status == SessionStatus::Ongoing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub event_id: i64,
    /// Defaults to a date-derived title when missing.
    pub title: Option<String>,
    pub session_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub session_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
}

impl UpdateSessionRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.session_date.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.location.is_none()
    }
}

/// Insert payload used by the session repository. The session number is not
/// part of it: the store allocates the next number per event at insert time.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub event_id: i64,
    pub title: String,
    pub session_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
}

/// Outcome of bulk daily-session generation over an event's date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionGenerationReport {
    pub total_days: i64,
    pub created: i64,
    /// Days skipped because a session already existed on that date.
    pub skipped: i64,
}

/// Session plus its attendance count, for the event overview.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session: Session,
    pub attendance_count: i64,
}

/// What a scanned QR token resolves to.
///
/// `can_check_in` is computed at validation time and never persisted; it
/// reflects the session and event state at the moment of the scan.
#[derive(Debug, Clone, Serialize)]
pub struct QrValidation {
    pub event: Event,
    pub session: Session,
    pub can_check_in: bool,
}
