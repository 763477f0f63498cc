//! Event repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::event::{CreateEventRequest, Event, UpdateEventRequest};
use crate::models::status::EventStatus;
use crate::utils::errors::EmargeError;

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event; status always starts at Scheduled.
    pub async fn create(
        &self,
        request: CreateEventRequest,
        owner_id: i64,
    ) -> Result<Event, EmargeError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, start_date, end_date, location, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, description, status, start_date, end_date, location, owner_id, created_at, updated_at
            "#
        )
        .bind(request.title)
        .bind(request.description)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.location)
        .bind(owner_id)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, EmargeError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, title, description, status, start_date, end_date, location, owner_id, created_at, updated_at FROM events WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Partial update; status is never touched here, it only moves through
    /// [`EventRepository::set_status`].
    pub async fn update(
        &self,
        id: i64,
        request: UpdateEventRequest,
    ) -> Result<Event, EmargeError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                updated_at = $7
            WHERE id = $1
            RETURNING id, title, description, status, start_date, end_date, location, owner_id, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.location)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Persist a status value; transition legality is checked by the caller.
    pub async fn set_status(&self, id: i64, status: EventStatus) -> Result<Event, EmargeError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, title, description, status, start_date, end_date, location, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Delete event; sessions, attendances and certificates cascade.
    pub async fn delete(&self, id: i64) -> Result<(), EmargeError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List events with pagination, most recent first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Event>, EmargeError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, title, description, status, start_date, end_date, location, owner_id, created_at, updated_at FROM events ORDER BY start_date DESC, id DESC LIMIT $1 OFFSET $2"
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Count total events
    pub async fn count(&self) -> Result<i64, EmargeError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
