//! Check-in admission service
//!
//! Orders the admission checks so that a scanner gets the most specific
//! rejection available: event gates before session gates, session status
//! before identity, identity before the duplicate check, and the signature
//! payload last. The database unique constraint remains the final word on
//! duplicates under concurrency.

use tracing::{debug, info, warn};

use crate::database::DatabaseService;
use crate::models::actor::Actor;
use crate::models::attendance::{Attendance, CheckInMode, CheckInRecord, CheckInRequest, NewAttendance};
use crate::models::status::LifecycleStatus;
use crate::services::auth::AuthService;
use crate::services::identity::IdentityService;
use crate::services::notification::{Notification, NotificationService};
use crate::utils::errors::{EmargeError, Result};
use crate::utils::logging::{log_admin_action, log_check_in};
use crate::utils::signature::validate_signature;

const MAX_PAGE_SIZE: i64 = 100;

/// Check-in service for session admission
#[derive(Clone)]
pub struct CheckInService {
    db: DatabaseService,
    identity: IdentityService,
    auth: AuthService,
    notifications: NotificationService,
    max_signature_bytes: usize,
}

impl CheckInService {
    /// Create a new CheckInService instance
    pub fn new(
        db: DatabaseService,
        identity: IdentityService,
        notifications: NotificationService,
        max_signature_bytes: usize,
    ) -> Self {
        Self {
            db,
            identity,
            auth: AuthService::new(),
            notifications,
            max_signature_bytes,
        }
    }

    /// Admit a participant into a session.
    ///
    /// Resolves the participant identity, enforces one attendance per
    /// participant per session and stores the signature as submitted.
    pub async fn check_in(&self, request: CheckInRequest) -> Result<CheckInRecord> {
        debug!(
            event_id = request.event_id,
            session_id = request.session_id,
            "Processing check-in"
        );

        let event = self
            .db
            .events
            .find_by_id(request.event_id)
            .await?
            .ok_or(EmargeError::EventNotFound {
                event_id: request.event_id,
            })?;
        if event.status == LifecycleStatus::Cancelled {
            return Err(EmargeError::Validation(
                "Event is cancelled; check-ins are closed".to_string(),
            ));
        }

        let session = self
            .db
            .sessions
            .find_by_id(request.session_id)
            .await?
            .ok_or(EmargeError::SessionNotFound {
                session_id: request.session_id,
            })?;
        if session.event_id != event.id {
            return Err(EmargeError::Validation(
                "Session does not belong to this event".to_string(),
            ));
        }
        match session.status {
            LifecycleStatus::Ongoing => {}
            LifecycleStatus::Scheduled => {
                return Err(EmargeError::Validation(
                    "Session has not started yet".to_string(),
                ))
            }
            LifecycleStatus::Completed => {
                return Err(EmargeError::Validation(
                    "Session is already completed".to_string(),
                ))
            }
            LifecycleStatus::Cancelled => {
                return Err(EmargeError::Validation(
                    "Session is cancelled".to_string(),
                ))
            }
        }

        let participant = self.identity.resolve(&request.participant).await?;

        if self
            .db
            .attendances
            .exists(participant.id, session.id)
            .await?
        {
            warn!(
                session_id = session.id,
                participant_id = participant.id,
                "Duplicate check-in rejected"
            );
            return Err(EmargeError::Conflict(
                "Participant already checked in to this session".to_string(),
            ));
        }

        let signature = validate_signature(&request.signature, self.max_signature_bytes)?;

        let attendance = self
            .db
            .attendances
            .create(NewAttendance {
                event_id: event.id,
                session_id: session.id,
                participant_id: participant.id,
                check_in_mode: CheckInMode::QrCode,
                signature_data: request.signature.clone(),
                signature_format: signature.format,
                notes: request.notes.clone(),
            })
            .await?;

        log_check_in(event.id, session.id, participant.id, attendance.id);

        self.db
            .attendances
            .record(attendance.id)
            .await?
            .ok_or(EmargeError::AttendanceNotFound {
                attendance_id: attendance.id,
            })
    }

    /// Get an attendance by ID
    pub async fn get_attendance(&self, attendance_id: i64) -> Result<Attendance> {
        self.db
            .attendances
            .find_by_id(attendance_id)
            .await?
            .ok_or(EmargeError::AttendanceNotFound { attendance_id })
    }

    /// List enriched attendance records for one session
    pub async fn list_session_attendances(
        &self,
        session_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CheckInRecord>> {
        check_page_size(limit)?;
        let session = self
            .db
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(EmargeError::SessionNotFound { session_id })?;
        self.db
            .attendances
            .records_for_session(session.id, limit, offset)
            .await
    }

    /// List enriched attendance records across all sessions of an event
    pub async fn list_event_attendances(
        &self,
        event_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CheckInRecord>> {
        check_page_size(limit)?;
        let event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(EmargeError::EventNotFound { event_id })?;
        self.db
            .attendances
            .records_for_event(event.id, limit, offset)
            .await
    }

    /// Count attendances for a session
    pub async fn count_for_session(&self, session_id: i64) -> Result<i64> {
        self.db.attendances.count_for_session(session_id).await
    }

    /// Count distinct participants seen across an event
    pub async fn distinct_participants(&self, event_id: i64) -> Result<i64> {
        self.db.attendances.distinct_participants(event_id).await
    }

    /// Remove an attendance record. Administrators only.
    pub async fn delete_attendance(&self, actor: &Actor, attendance_id: i64) -> Result<()> {
        self.auth.require_admin(actor)?;
        let attendance = self
            .db
            .attendances
            .find_by_id(attendance_id)
            .await?
            .ok_or(EmargeError::AttendanceNotFound { attendance_id })?;
        let session = self
            .db
            .sessions
            .find_by_id(attendance.session_id)
            .await?
            .ok_or(EmargeError::SessionNotFound {
                session_id: attendance.session_id,
            })?;
        let event = self
            .db
            .events
            .find_by_id(session.event_id)
            .await?
            .ok_or(EmargeError::EventNotFound {
                event_id: session.event_id,
            })?;

        self.db.attendances.delete(attendance_id).await?;
        log_admin_action(
            actor.user_id,
            "delete_attendance",
            Some(format!("attendance {attendance_id}").as_str()),
        );
        info!(
            attendance_id = attendance_id,
            session_id = session.id,
            user_id = actor.user_id,
            "Attendance deleted"
        );

        self.notifications.notify(
            actor,
            event.owner_id,
            Notification::AttendanceDeleted {
                event_id: event.id,
                attendance_id,
                participant_id: attendance.participant_id,
                actor_id: actor.user_id,
            },
        );

        Ok(())
    }
}

fn check_page_size(limit: i64) -> Result<()> {
    if limit > MAX_PAGE_SIZE {
        return Err(EmargeError::Validation(format!(
            "Limit cannot exceed {MAX_PAGE_SIZE}"
        )));
    }
    Ok(())
}
