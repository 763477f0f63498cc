//! Attendance model and check-in request types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::participant::ParticipantDetails;

/// How an attendance row came into existence. The admission chain always
/// records QR check-ins; manual rows are entered by administrators through
/// the outer layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "check_in_mode", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckInMode {
    QrCode,
    Manual,
}

/// Image format declared by the signature data URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "signature_format", rename_all = "snake_case")]
#[serde(rename_all = "lowercase")]
pub enum SignatureFormat {
    Png,
    Jpeg,
}

/// One participant's presence at one session.
///
/// Uniqueness over (participant_id, session_id) is enforced by the store;
/// rows are only ever created through the check-in admission chain.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attendance {
    pub id: i64,
    pub event_id: i64,
    pub session_id: i64,
    pub participant_id: i64,
    pub check_in_time: DateTime<Utc>,
    pub check_in_mode: CheckInMode,
    pub signature_data: String,
    pub signature_format: SignatureFormat,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Check-in request as received from the public QR link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub event_id: i64,
    pub session_id: i64,
    pub participant: ParticipantDetails,
    /// `data:image/(png|jpeg|jpg);base64,<payload>` URI captured on-device.
    pub signature: String,
    pub notes: Option<String>,
}

/// Insert payload used by the attendance repository; the check-in time is
/// stamped at insert.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub event_id: i64,
    pub session_id: i64,
    pub participant_id: i64,
    pub check_in_mode: CheckInMode,
    pub signature_data: String,
    pub signature_format: SignatureFormat,
    pub notes: Option<String>,
}

/// Attendance joined with event, session and participant projections.
///
/// The signature payload is deliberately left out; the attendance row keeps
/// it for the export layer.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CheckInRecord {
    pub id: i64,
    pub event_id: i64,
    pub session_id: i64,
    pub participant_id: i64,
    pub check_in_time: DateTime<Utc>,
    pub check_in_mode: CheckInMode,
    pub signature_format: SignatureFormat,
    pub notes: Option<String>,
    pub event_title: String,
    pub session_number: i32,
    pub session_title: String,
    pub session_date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub cni_number: Option<String>,
    pub organization: Option<String>,
}

impl CheckInRecord {
    pub fn participant_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
