//! Certificate model and bulk issuance types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Issued certificate of attendance.
///
/// Event fields are frozen copies taken at issuance time so later event
/// edits never alter what an issued certificate says. The certificate
/// number comes from a store sequence and is never reused.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Certificate {
    pub id: i64,
    pub event_id: i64,
    pub participant_id: i64,
    /// First attendance that earned the certificate, when resolvable.
    pub attendance_id: Option<i64>,
    pub certificate_number: i64,
    pub event_title: String,
    pub event_start_date: NaiveDate,
    pub event_end_date: Option<NaiveDate>,
    pub event_location: Option<String>,
    pub signatory_name: Option<String>,
    pub signatory_title: Option<String>,
    pub issued_by: i64,
    pub issued_at: DateTime<Utc>,
}

/// Bulk issuance request for one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateIssueRequest {
    pub event_id: i64,
    pub participant_ids: Vec<i64>,
    pub signatory_name: Option<String>,
    pub signatory_title: Option<String>,
}

/// Insert payload used by the certificate repository. The certificate
/// number is allocated by the store at insert.
#[derive(Debug, Clone)]
pub struct NewCertificate {
    pub event_id: i64,
    pub participant_id: i64,
    pub attendance_id: Option<i64>,
    pub event_title: String,
    pub event_start_date: NaiveDate,
    pub event_end_date: Option<NaiveDate>,
    pub event_location: Option<String>,
    pub signatory_name: Option<String>,
    pub signatory_title: Option<String>,
    pub issued_by: i64,
}

/// Result of a bulk issuance run. Re-running the same request moves
/// everything into `already_issued` and changes nothing.
#[derive(Debug, Clone, Serialize)]
pub struct BulkCertificateOutcome {
    pub certificates: Vec<Certificate>,
    pub newly_issued: usize,
    pub already_issued: usize,
}
