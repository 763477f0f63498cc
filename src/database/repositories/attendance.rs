//! Attendance repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::attendance::{Attendance, CheckInRecord, NewAttendance};
use crate::utils::errors::EmargeError;

const RECORD_SELECT: &str = r#"
SELECT a.id, a.event_id, a.session_id, a.participant_id, a.check_in_time, a.check_in_mode, a.signature_format, a.notes,
       e.title AS event_title, s.session_number, s.title AS session_title, s.session_date,
       p.first_name, p.last_name, p.email, p.cni_number, p.organization
FROM attendances a
JOIN events e ON e.id = a.event_id
JOIN sessions s ON s.id = a.session_id
JOIN participants p ON p.id = a.participant_id
"#;

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pre-check for an existing check-in. Advisory only; the unique
    /// constraint decides under concurrency.
    pub async fn exists(&self, participant_id: i64, session_id: i64) -> Result<bool, EmargeError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM attendances WHERE participant_id = $1 AND session_id = $2",
        )
        .bind(participant_id)
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Insert an attendance, stamping the check-in time.
    ///
    /// A write-time unique violation on (participant_id, session_id) is
    /// translated to the same Conflict the pre-check produces.
    pub async fn create(&self, new: NewAttendance) -> Result<Attendance, EmargeError> {
        let attendance = sqlx::query_as::<_, Attendance>(
            r#"
            INSERT INTO attendances (event_id, session_id, participant_id, check_in_time, check_in_mode, signature_data, signature_format, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, event_id, session_id, participant_id, check_in_time, check_in_mode, signature_data, signature_format, notes, created_at
            "#
        )
        .bind(new.event_id)
        .bind(new.session_id)
        .bind(new.participant_id)
        .bind(Utc::now())
        .bind(new.check_in_mode)
        .bind(new.signature_data)
        .bind(new.signature_format)
        .bind(new.notes)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e, "uq_attendances_participant_session") {
                EmargeError::Conflict("Participant already checked in to this session".to_string())
            } else {
                EmargeError::from(e)
            }
        })?;

        Ok(attendance)
    }

    /// Find attendance by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Attendance>, EmargeError> {
        let attendance = sqlx::query_as::<_, Attendance>(
            "SELECT id, event_id, session_id, participant_id, check_in_time, check_in_mode, signature_data, signature_format, notes, created_at FROM attendances WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendance)
    }

    /// Attendance joined with its event, session and participant.
    pub async fn record(&self, id: i64) -> Result<Option<CheckInRecord>, EmargeError> {
        let record = sqlx::query_as::<_, CheckInRecord>(&format!("{RECORD_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Check-in records of one session in arrival order.
    pub async fn records_for_session(
        &self,
        session_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CheckInRecord>, EmargeError> {
        let records = sqlx::query_as::<_, CheckInRecord>(&format!(
            "{RECORD_SELECT} WHERE a.session_id = $1 ORDER BY a.check_in_time ASC LIMIT $2 OFFSET $3"
        ))
        .bind(session_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Check-in records across all sessions of an event.
    pub async fn records_for_event(
        &self,
        event_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CheckInRecord>, EmargeError> {
        let records = sqlx::query_as::<_, CheckInRecord>(&format!(
            "{RECORD_SELECT} WHERE a.event_id = $1 ORDER BY s.session_number ASC, a.check_in_time ASC LIMIT $2 OFFSET $3"
        ))
        .bind(event_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Count check-ins for a session
    pub async fn count_for_session(&self, session_id: i64) -> Result<i64, EmargeError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM attendances WHERE session_id = $1")
                .bind(session_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    /// Count check-ins for an event
    pub async fn count_for_event(&self, event_id: i64) -> Result<i64, EmargeError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attendances WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Per-session check-in counts for an event, as (session_id, count) pairs.
    pub async fn counts_by_session(&self, event_id: i64) -> Result<Vec<(i64, i64)>, EmargeError> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            "SELECT session_id, COUNT(*) FROM attendances WHERE event_id = $1 GROUP BY session_id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// How many distinct participants checked in to an event at least once.
    pub async fn distinct_participants(&self, event_id: i64) -> Result<i64, EmargeError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT participant_id) FROM attendances WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Earliest attendance per participant for an event, as
    /// (participant_id, attendance_id) pairs. Used to link certificates to
    /// the check-in that earned them.
    pub async fn first_for_event_participants(
        &self,
        event_id: i64,
        participant_ids: &[i64],
    ) -> Result<Vec<(i64, i64)>, EmargeError> {
        let pairs = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT DISTINCT ON (participant_id) participant_id, id
            FROM attendances
            WHERE event_id = $1 AND participant_id = ANY($2)
            ORDER BY participant_id ASC, check_in_time ASC
            "#,
        )
        .bind(event_id)
        .bind(participant_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(pairs)
    }

    /// Delete attendance; never touches session status or scan counters.
    pub async fn delete(&self, id: i64) -> Result<(), EmargeError> {
        sqlx::query("DELETE FROM attendances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
