//! QR token issuance and validation service
//!
//! Each session holds at most one opaque token; regenerating replaces the
//! prior token, so stale printed codes stop resolving. Validation is the
//! public side: it never mutates anything beyond the scan counter.

use tracing::{debug, info};
use url::Url;

use crate::config::settings::QrConfig;
use crate::database::DatabaseService;
use crate::models::actor::Actor;
use crate::models::session::{QrValidation, Session};
use crate::models::status::LifecycleStatus;
use crate::services::auth::AuthService;
use crate::utils::errors::{EmargeError, Result};
use crate::utils::helpers::generate_token;

/// QR service for token lifecycle management
#[derive(Clone)]
pub struct QrService {
    db: DatabaseService,
    auth: AuthService,
    config: QrConfig,
}

impl QrService {
    /// Create a new QrService instance
    pub fn new(db: DatabaseService, config: QrConfig) -> Self {
        Self {
            db,
            auth: AuthService::new(),
            config,
        }
    }

    /// Issue a fresh token for a session, invalidating any prior one and
    /// resetting the scan counter.
    pub async fn generate(&self, actor: &Actor, session_id: i64) -> Result<Session> {
        let session = self
            .db
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(EmargeError::SessionNotFound { session_id })?;
        let event = self
            .db
            .events
            .find_by_id(session.event_id)
            .await?
            .ok_or(EmargeError::EventNotFound {
                event_id: session.event_id,
            })?;
        self.auth.require_event_manager(actor, &event)?;

        if event.status == LifecycleStatus::Cancelled {
            return Err(EmargeError::Forbidden(
                "Cannot generate a QR code for a cancelled event".to_string(),
            ));
        }
        if session.is_locked() {
            return Err(EmargeError::Forbidden(format!(
                "Cannot generate a QR code for a {} session",
                session.status
            )));
        }

        let token = generate_token(self.config.token_length);
        let session = self.db.sessions.assign_qr_token(session_id, &token).await?;
        info!(
            session_id = session_id,
            event_id = event.id,
            user_id = actor.user_id,
            "QR token generated"
        );

        Ok(session)
    }

    /// Validate a scanned token and count the scan.
    ///
    /// Tokens of cancelled events are inert: the scan is rejected without
    /// touching the counter. `can_check_in` is computed from the two
    /// statuses and never persisted.
    pub async fn validate(&self, token: &str) -> Result<QrValidation> {
        let session = self
            .db
            .sessions
            .find_by_qr_token(token)
            .await?
            .ok_or(EmargeError::QrTokenNotFound)?;
        let event = self
            .db
            .events
            .find_by_id(session.event_id)
            .await?
            .ok_or(EmargeError::EventNotFound {
                event_id: session.event_id,
            })?;

        if event.status == LifecycleStatus::Cancelled {
            return Err(EmargeError::Validation(
                "Event is cancelled; this QR code is no longer valid".to_string(),
            ));
        }

        // Token may have been regenerated since the lookup; the UPDATE only
        // matches the current one.
        let session = self
            .db
            .sessions
            .increment_scan_by_token(token)
            .await?
            .ok_or(EmargeError::QrTokenNotFound)?;

        let can_check_in =
            event.status == LifecycleStatus::Ongoing && session.accepts_check_ins();
        debug!(
            session_id = session.id,
            scan_count = session.qr_scan_count,
            can_check_in = can_check_in,
            "QR token validated"
        );

        Ok(QrValidation {
            event,
            session,
            can_check_in,
        })
    }

    /// Public check-in URL a QR image encodes for this token.
    pub fn check_in_url(&self, token: &str) -> Result<String> {
        build_check_in_url(&self.config.public_base_url, token)
    }
}

fn build_check_in_url(base_url: &str, token: &str) -> Result<String> {
    let mut url = Url::parse(base_url)?;
    url.path_segments_mut()
        .map_err(|_| {
            EmargeError::Config(format!("QR public base URL cannot carry paths: {base_url}"))
        })?
        .extend(["checkin", token]);
    Ok(url.to_string())
}
