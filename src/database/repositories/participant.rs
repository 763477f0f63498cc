//! Participant repository implementation
//!
//! Identity-resolving writes take an explicit connection so the resolver can
//! run lookup + merge/create as one transaction; plain reads go through the
//! pool.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use crate::models::participant::{Participant, ParticipantDetails};
use crate::utils::errors::EmargeError;

#[derive(Clone)]
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find participant by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Participant>, EmargeError> {
        let participant = sqlx::query_as::<_, Participant>(
            "SELECT id, cni_number, email, first_name, last_name, phone, organization, function, origin_locality, created_at, updated_at FROM participants WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Find participant by CNI number
    pub async fn find_by_cni(
        conn: &mut PgConnection,
        cni_number: &str,
    ) -> Result<Option<Participant>, EmargeError> {
        let participant = sqlx::query_as::<_, Participant>(
            "SELECT id, cni_number, email, first_name, last_name, phone, organization, function, origin_locality, created_at, updated_at FROM participants WHERE cni_number = $1"
        )
        .bind(cni_number)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(participant)
    }

    /// Find participant by email
    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<Participant>, EmargeError> {
        let participant = sqlx::query_as::<_, Participant>(
            "SELECT id, cni_number, email, first_name, last_name, phone, organization, function, origin_locality, created_at, updated_at FROM participants WHERE email = $1"
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(participant)
    }

    /// Create a new participant from the supplied details.
    ///
    /// A concurrent creation with the same CNI or email trips the unique
    /// constraint and surfaces as Conflict.
    pub async fn create_with(
        conn: &mut PgConnection,
        details: &ParticipantDetails,
    ) -> Result<Participant, EmargeError> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (cni_number, email, first_name, last_name, phone, organization, function, origin_locality, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, cni_number, email, first_name, last_name, phone, organization, function, origin_locality, created_at, updated_at
            "#
        )
        .bind(details.cni_number.clone())
        .bind(details.email.clone())
        .bind(details.first_name.clone())
        .bind(details.last_name.clone())
        .bind(details.phone.clone())
        .bind(details.organization.clone())
        .bind(details.function.clone())
        .bind(details.origin_locality.clone())
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(map_identity_violation)?;

        Ok(participant)
    }

    /// Merge supplied details onto an existing participant.
    ///
    /// The stored CNI is never written here; optional fields only overwrite
    /// when supplied.
    pub async fn merge_details(
        conn: &mut PgConnection,
        id: i64,
        details: &ParticipantDetails,
    ) -> Result<Participant, EmargeError> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            UPDATE participants
            SET first_name = $2,
                last_name = $3,
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                organization = COALESCE($6, organization),
                function = COALESCE($7, function),
                origin_locality = COALESCE($8, origin_locality),
                updated_at = $9
            WHERE id = $1
            RETURNING id, cni_number, email, first_name, last_name, phone, organization, function, origin_locality, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(details.first_name.clone())
        .bind(details.last_name.clone())
        .bind(details.email.clone())
        .bind(details.phone.clone())
        .bind(details.organization.clone())
        .bind(details.function.clone())
        .bind(details.origin_locality.clone())
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(map_identity_violation)?;

        Ok(participant)
    }

    /// List all participants with pagination
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Participant>, EmargeError> {
        let participants = sqlx::query_as::<_, Participant>(
            "SELECT id, cni_number, email, first_name, last_name, phone, organization, function, origin_locality, created_at, updated_at FROM participants ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Find participants by name pattern
    pub async fn search_by_name(
        &self,
        pattern: &str,
        limit: i64,
    ) -> Result<Vec<Participant>, EmargeError> {
        let participants = sqlx::query_as::<_, Participant>(
            "SELECT id, cni_number, email, first_name, last_name, phone, organization, function, origin_locality, created_at, updated_at FROM participants WHERE first_name ILIKE $1 OR last_name ILIKE $1 ORDER BY last_name ASC, first_name ASC LIMIT $2"
        )
        .bind(format!("%{}%", pattern))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Which participant ids exist, out of the requested set.
    pub async fn existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>, EmargeError> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM participants WHERE id = ANY($1) ORDER BY id ASC",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(found)
    }

    /// Count total participants
    pub async fn count(&self) -> Result<i64, EmargeError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM participants")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

fn map_identity_violation(e: sqlx::Error) -> EmargeError {
    if super::is_unique_violation(&e, "uq_participants_cni") {
        EmargeError::Conflict("A participant with this CNI already exists".to_string())
    } else if super::is_unique_violation(&e, "uq_participants_email") {
        EmargeError::Conflict("A participant with this email already exists".to_string())
    } else {
        EmargeError::from(e)
    }
}
