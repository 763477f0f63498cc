//! Certificate repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::certificate::{Certificate, NewCertificate};
use crate::utils::errors::EmargeError;

#[derive(Clone)]
pub struct CertificateRepository {
    pool: PgPool,
}

impl CertificateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a certificate; the number comes from the store sequence.
    ///
    /// A concurrent issuance for the same (event, participant) trips the
    /// unique constraint and surfaces as Conflict; the caller decides whether
    /// to re-fetch the winner.
    pub async fn create(&self, new: NewCertificate) -> Result<Certificate, EmargeError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"
            INSERT INTO certificates (event_id, participant_id, attendance_id, event_title, event_start_date, event_end_date, event_location, signatory_name, signatory_title, issued_by, issued_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, event_id, participant_id, attendance_id, certificate_number, event_title, event_start_date, event_end_date, event_location, signatory_name, signatory_title, issued_by, issued_at
            "#
        )
        .bind(new.event_id)
        .bind(new.participant_id)
        .bind(new.attendance_id)
        .bind(new.event_title)
        .bind(new.event_start_date)
        .bind(new.event_end_date)
        .bind(new.event_location)
        .bind(new.signatory_name)
        .bind(new.signatory_title)
        .bind(new.issued_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e, "uq_certificates_event_participant") {
                EmargeError::Conflict(
                    "Certificate already issued for this participant".to_string(),
                )
            } else {
                EmargeError::from(e)
            }
        })?;

        Ok(certificate)
    }

    /// Find certificate by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Certificate>, EmargeError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            "SELECT id, event_id, participant_id, attendance_id, certificate_number, event_title, event_start_date, event_end_date, event_location, signatory_name, signatory_title, issued_by, issued_at FROM certificates WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(certificate)
    }

    /// Find the certificate of one participant for one event
    pub async fn find_by_event_and_participant(
        &self,
        event_id: i64,
        participant_id: i64,
    ) -> Result<Option<Certificate>, EmargeError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            "SELECT id, event_id, participant_id, attendance_id, certificate_number, event_title, event_start_date, event_end_date, event_location, signatory_name, signatory_title, issued_by, issued_at FROM certificates WHERE event_id = $1 AND participant_id = $2"
        )
        .bind(event_id)
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(certificate)
    }

    /// Existing certificates for a set of participants on one event.
    pub async fn find_for_event_participants(
        &self,
        event_id: i64,
        participant_ids: &[i64],
    ) -> Result<Vec<Certificate>, EmargeError> {
        let certificates = sqlx::query_as::<_, Certificate>(
            "SELECT id, event_id, participant_id, attendance_id, certificate_number, event_title, event_start_date, event_end_date, event_location, signatory_name, signatory_title, issued_by, issued_at FROM certificates WHERE event_id = $1 AND participant_id = ANY($2)"
        )
        .bind(event_id)
        .bind(participant_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(certificates)
    }

    /// All certificates of an event in issuance order
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<Certificate>, EmargeError> {
        let certificates = sqlx::query_as::<_, Certificate>(
            "SELECT id, event_id, participant_id, attendance_id, certificate_number, event_title, event_start_date, event_end_date, event_location, signatory_name, signatory_title, issued_by, issued_at FROM certificates WHERE event_id = $1 ORDER BY certificate_number ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(certificates)
    }

    /// All certificates held by a participant
    pub async fn list_for_participant(
        &self,
        participant_id: i64,
    ) -> Result<Vec<Certificate>, EmargeError> {
        let certificates = sqlx::query_as::<_, Certificate>(
            "SELECT id, event_id, participant_id, attendance_id, certificate_number, event_title, event_start_date, event_end_date, event_location, signatory_name, signatory_title, issued_by, issued_at FROM certificates WHERE participant_id = $1 ORDER BY issued_at DESC"
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(certificates)
    }

    /// Count certificates issued for an event
    pub async fn count_for_event(&self, event_id: i64) -> Result<i64, EmargeError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM certificates WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
