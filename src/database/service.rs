//! Database service layer
//!
//! Bundles the repositories behind one handle; the pool stays accessible for
//! callers that open their own transactions.

use crate::database::{
    AttendanceRepository, CertificateRepository, DatabasePool, EventRepository,
    ParticipantRepository, SessionRepository,
};
use crate::utils::errors::EmargeError;

#[derive(Clone)]
pub struct DatabaseService {
    pub pool: DatabasePool,
    pub events: EventRepository,
    pub sessions: SessionRepository,
    pub participants: ParticipantRepository,
    pub attendances: AttendanceRepository,
    pub certificates: CertificateRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool.clone()),
            attendances: AttendanceRepository::new(pool.clone()),
            certificates: CertificateRepository::new(pool.clone()),
            pool,
        }
    }

    /// Row counts per table, for the provisioning report.
    pub async fn store_counts(&self) -> Result<serde_json::Value, EmargeError> {
        let events = self.events.count().await?;
        let participants = self.participants.count().await?;

        let sessions: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(&self.pool)
            .await?;
        let attendances: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attendances")
            .fetch_one(&self.pool)
            .await?;
        let certificates: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM certificates")
            .fetch_one(&self.pool)
            .await?;

        let counts = serde_json::json!({
            "events": events,
            "sessions": sessions.0,
            "participants": participants,
            "attendances": attendances.0,
            "certificates": certificates.0
        });

        Ok(counts)
    }
}
