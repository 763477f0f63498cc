//! Session repository implementation

use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};

use crate::models::session::{NewSession, Session, UpdateSessionRequest};
use crate::models::status::SessionStatus;
use crate::utils::errors::EmargeError;

#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new session.
    ///
    /// The session number is allocated inside the INSERT (max existing + 1
    /// for the event); the unique constraint on (event_id, session_number)
    /// backstops concurrent allocations and surfaces as Conflict.
    pub async fn create(&self, new_session: NewSession) -> Result<Session, EmargeError> {
        let mut conn = self.pool.acquire().await?;
        Self::create_with(&mut conn, new_session).await
    }

    /// Transaction-aware variant of [`SessionRepository::create`].
    pub async fn create_with(
        conn: &mut PgConnection,
        new_session: NewSession,
    ) -> Result<Session, EmargeError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (event_id, session_number, title, session_date, start_time, end_time, location, created_at, updated_at)
            VALUES ($1, (SELECT COALESCE(MAX(session_number), 0) + 1 FROM sessions WHERE event_id = $1), $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, event_id, session_number, title, session_date, start_time, end_time, location, status, qr_token, qr_generated_at, qr_scan_count, created_at, updated_at
            "#
        )
        .bind(new_session.event_id)
        .bind(new_session.title)
        .bind(new_session.session_date)
        .bind(new_session.start_time)
        .bind(new_session.end_time)
        .bind(new_session.location)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e, "uq_sessions_event_number") {
                EmargeError::Conflict("Session number already allocated for this event".to_string())
            } else {
                EmargeError::from(e)
            }
        })?;

        Ok(session)
    }

    /// Find session by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Session>, EmargeError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, event_id, session_number, title, session_date, start_time, end_time, location, status, qr_token, qr_generated_at, qr_scan_count, created_at, updated_at FROM sessions WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Find the session holding a QR token, without touching the scan counter.
    pub async fn find_by_qr_token(&self, token: &str) -> Result<Option<Session>, EmargeError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, event_id, session_number, title, session_date, start_time, end_time, location, status, qr_token, qr_generated_at, qr_scan_count, created_at, updated_at FROM sessions WHERE qr_token = $1"
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Get all sessions of an event in session-number order
    pub async fn find_by_event(&self, event_id: i64) -> Result<Vec<Session>, EmargeError> {
        let sessions = sqlx::query_as::<_, Session>(
            "SELECT id, event_id, session_number, title, session_date, start_time, end_time, location, status, qr_token, qr_generated_at, qr_scan_count, created_at, updated_at FROM sessions WHERE event_id = $1 ORDER BY session_number ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Partial update; status and QR fields move through their own methods.
    pub async fn update(
        &self,
        id: i64,
        request: UpdateSessionRequest,
    ) -> Result<Session, EmargeError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET title = COALESCE($2, title),
                session_date = COALESCE($3, session_date),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                location = COALESCE($6, location),
                updated_at = $7
            WHERE id = $1
            RETURNING id, event_id, session_number, title, session_date, start_time, end_time, location, status, qr_token, qr_generated_at, qr_scan_count, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.title)
        .bind(request.session_date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.location)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Persist a status value; transition legality is checked by the caller.
    pub async fn set_status(&self, id: i64, status: SessionStatus) -> Result<Session, EmargeError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, event_id, session_number, title, session_date, start_time, end_time, location, status, qr_token, qr_generated_at, qr_scan_count, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Snapshot of sibling statuses used for event-status derivation.
    pub async fn statuses_for_event(
        &self,
        event_id: i64,
    ) -> Result<Vec<SessionStatus>, EmargeError> {
        let statuses = sqlx::query_scalar::<_, SessionStatus>(
            "SELECT status FROM sessions WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(statuses)
    }

    /// Dates that already have a session, used to skip days in bulk generation.
    pub async fn dates_for_event_with(
        conn: &mut PgConnection,
        event_id: i64,
    ) -> Result<Vec<NaiveDate>, EmargeError> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT session_date FROM sessions WHERE event_id = $1 ORDER BY session_date ASC",
        )
        .bind(event_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(dates)
    }

    /// Install a fresh QR token, invalidating any prior one and resetting the
    /// scan counter.
    pub async fn assign_qr_token(&self, id: i64, token: &str) -> Result<Session, EmargeError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET qr_token = $2, qr_generated_at = $3, qr_scan_count = 0, updated_at = $3
            WHERE id = $1
            RETURNING id, event_id, session_number, title, session_date, start_time, end_time, location, status, qr_token, qr_generated_at, qr_scan_count, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Count a scan in a single UPDATE; returns None if the token was
    /// invalidated between lookup and increment.
    pub async fn increment_scan_by_token(
        &self,
        token: &str,
    ) -> Result<Option<Session>, EmargeError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET qr_scan_count = qr_scan_count + 1
            WHERE qr_token = $1
            RETURNING id, event_id, session_number, title, session_date, start_time, end_time, location, status, qr_token, qr_generated_at, qr_scan_count, created_at, updated_at
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Delete session; its attendances cascade.
    pub async fn delete(&self, id: i64) -> Result<(), EmargeError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
