//! Event and session lifecycle service
//!
//! Holds the paired state machines and the cascading status derivation: any
//! session mutation ends with an explicit, synchronous
//! [`LifecycleService::recompute_event_status`] call. The recompute is
//! read-modify-write over the current sibling snapshot and idempotent, so
//! concurrent session mutations converge once all writers finish.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::database::repositories::SessionRepository;
use crate::database::DatabaseService;
use crate::models::actor::Actor;
use crate::models::event::{CreateEventRequest, Event, EventOverview, UpdateEventRequest};
use crate::models::session::{
    CreateSessionRequest, NewSession, Session, SessionGenerationReport, SessionSummary,
    UpdateSessionRequest,
};
use crate::models::status::{derive_event_status, EventStatus, LifecycleStatus, SessionStatus};
use crate::services::auth::AuthService;
use crate::services::notification::{Notification, NotificationService};
use crate::utils::errors::{EmargeError, Result};
use crate::utils::helpers::daily_session_title;
use crate::utils::logging::log_status_change;

const MAX_PAGE_SIZE: i64 = 100;

/// Lifecycle service for events and their sessions
#[derive(Clone)]
pub struct LifecycleService {
    db: DatabaseService,
    auth: AuthService,
    notifications: NotificationService,
}

impl LifecycleService {
    /// Create a new LifecycleService instance
    pub fn new(db: DatabaseService, notifications: NotificationService) -> Self {
        Self {
            db,
            auth: AuthService::new(),
            notifications,
        }
    }

    // --- events ---

    /// Create a new event; always starts Scheduled.
    pub async fn create_event(&self, actor: &Actor, request: CreateEventRequest) -> Result<Event> {
        debug!(user_id = actor.user_id, title = %request.title, "Creating event");

        if request.title.trim().is_empty() {
            return Err(EmargeError::Validation("Event title is required".to_string()));
        }
        validate_date_range(request.start_date, request.end_date)?;

        let owner_id = match request.owner_id {
            Some(owner) if owner != actor.user_id && !actor.is_admin() => {
                return Err(EmargeError::Forbidden(
                    "Only an administrator can create an event for another owner".to_string(),
                ));
            }
            Some(owner) => owner,
            None => actor.user_id,
        };

        let event = self.db.events.create(request, owner_id).await?;
        info!(event_id = event.id, owner_id = owner_id, "Event created");

        self.notifications.notify(
            actor,
            event.owner_id,
            Notification::EventCreated {
                event_id: event.id,
                title: event.title.clone(),
                actor_id: actor.user_id,
            },
        );

        Ok(event)
    }

    /// Get event by ID
    pub async fn get_event(&self, event_id: i64) -> Result<Event> {
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(EmargeError::EventNotFound { event_id })
    }

    /// List events with pagination
    pub async fn list_events(&self, limit: i64, offset: i64) -> Result<Vec<Event>> {
        check_page_size(limit)?;
        self.db.events.list(limit, offset).await
    }

    /// Update event fields; status never moves through here.
    pub async fn update_event(
        &self,
        actor: &Actor,
        event_id: i64,
        request: UpdateEventRequest,
    ) -> Result<Event> {
        let event = self.get_event(event_id).await?;
        self.auth.require_event_manager(actor, &event)?;

        if event.is_locked() {
            return Err(EmargeError::Forbidden(format!(
                "Event is {} and can no longer be modified",
                event.status
            )));
        }
        if request.is_empty() {
            return Ok(event);
        }
        if let Some(title) = &request.title {
            if title.trim().is_empty() {
                return Err(EmargeError::Validation("Event title is required".to_string()));
            }
        }

        let start = request.start_date.unwrap_or(event.start_date);
        let end = request.end_date.or(event.end_date);
        validate_date_range(start, end)?;

        let updated = self.db.events.update(event_id, request).await?;
        info!(event_id = event_id, user_id = actor.user_id, "Event updated");
        Ok(updated)
    }

    /// Request an event status transition.
    ///
    /// Cancellation is the administrative terminal path; other legal targets
    /// are reconciled by the next session-triggered recompute.
    pub async fn change_event_status(
        &self,
        actor: &Actor,
        event_id: i64,
        new_status: EventStatus,
    ) -> Result<Event> {
        let event = self.get_event(event_id).await?;
        self.auth.require_event_manager(actor, &event)?;

        if !event.status.can_transition_to(new_status) {
            return Err(EmargeError::IllegalStateTransition {
                entity: "event",
                from: event.status.to_string(),
                to: new_status.to_string(),
            });
        }

        let updated = self.db.events.set_status(event_id, new_status).await?;
        log_status_change(
            "event",
            event_id,
            event.status.as_str(),
            new_status.as_str(),
            actor.user_id,
        );

        if new_status == LifecycleStatus::Cancelled {
            self.notifications.notify(
                actor,
                updated.owner_id,
                Notification::EventCancelled {
                    event_id: updated.id,
                    title: updated.title.clone(),
                    actor_id: actor.user_id,
                },
            );
        }

        Ok(updated)
    }

    /// Delete an event and everything under it. Admin only.
    pub async fn delete_event(&self, actor: &Actor, event_id: i64) -> Result<()> {
        let event = self.get_event(event_id).await?;
        self.auth.require_admin(actor)?;

        self.db.events.delete(event_id).await?;
        info!(event_id = event_id, admin_id = actor.user_id, "Event deleted");

        self.notifications.notify(
            actor,
            event.owner_id,
            Notification::EventDeleted {
                event_id: event.id,
                title: event.title,
                actor_id: actor.user_id,
            },
        );

        Ok(())
    }

    /// Event with its sessions and attendance aggregates.
    pub async fn event_overview(&self, event_id: i64) -> Result<EventOverview> {
        let event = self.get_event(event_id).await?;
        let sessions = self.db.sessions.find_by_event(event_id).await?;
        let counts: HashMap<i64, i64> = self
            .db
            .attendances
            .counts_by_session(event_id)
            .await?
            .into_iter()
            .collect();

        let sessions = sessions
            .into_iter()
            .map(|session| {
                let attendance_count = counts.get(&session.id).copied().unwrap_or(0);
                SessionSummary {
                    session,
                    attendance_count,
                }
            })
            .collect();

        let total_attendances = self.db.attendances.count_for_event(event_id).await?;
        let distinct_participants = self.db.attendances.distinct_participants(event_id).await?;
        let certificates_issued = self.db.certificates.count_for_event(event_id).await?;

        Ok(EventOverview {
            event,
            sessions,
            total_attendances,
            distinct_participants,
            certificates_issued,
        })
    }

    // --- sessions ---

    /// Create a session under an event.
    pub async fn create_session(
        &self,
        actor: &Actor,
        request: CreateSessionRequest,
    ) -> Result<Session> {
        let event = self.get_event(request.event_id).await?;
        self.auth.require_event_manager(actor, &event)?;

        if event.is_locked() {
            return Err(EmargeError::Forbidden(format!(
                "Event is {} and can no longer receive sessions",
                event.status
            )));
        }
        validate_time_range(request.start_time, request.end_time)?;
        if !event.covers_date(request.session_date) {
            return Err(EmargeError::Validation(format!(
                "Session date {} is outside the event period",
                request.session_date
            )));
        }

        let title = request
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| daily_session_title(request.session_date));

        let session = self
            .db
            .sessions
            .create(NewSession {
                event_id: request.event_id,
                title,
                session_date: request.session_date,
                start_time: request.start_time,
                end_time: request.end_time,
                location: request.location,
            })
            .await?;

        info!(
            event_id = event.id,
            session_id = session.id,
            session_number = session.session_number,
            "Session created"
        );
        self.recompute_event_status(event.id).await?;

        Ok(session)
    }

    /// Get session by ID
    pub async fn get_session(&self, session_id: i64) -> Result<Session> {
        self.db
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(EmargeError::SessionNotFound { session_id })
    }

    /// List the sessions of an event in number order
    pub async fn list_sessions(&self, event_id: i64) -> Result<Vec<Session>> {
        self.get_event(event_id).await?;
        self.db.sessions.find_by_event(event_id).await
    }

    /// Update session fields; status never moves through here.
    pub async fn update_session(
        &self,
        actor: &Actor,
        session_id: i64,
        request: UpdateSessionRequest,
    ) -> Result<Session> {
        let session = self.get_session(session_id).await?;
        let event = self.get_event(session.event_id).await?;
        self.auth.require_event_manager(actor, &event)?;

        if session.is_locked() {
            return Err(EmargeError::Forbidden(format!(
                "Session is {} and can no longer be modified",
                session.status
            )));
        }
        if event.is_locked() {
            return Err(EmargeError::Forbidden(format!(
                "Event is {} and its sessions can no longer be modified",
                event.status
            )));
        }
        if request.is_empty() {
            return Ok(session);
        }

        let start = request.start_time.or(session.start_time);
        let end = request.end_time.or(session.end_time);
        validate_time_range(start, end)?;
        if let Some(date) = request.session_date {
            if !event.covers_date(date) {
                return Err(EmargeError::Validation(format!(
                    "Session date {} is outside the event period",
                    date
                )));
            }
        }

        let updated = self.db.sessions.update(session_id, request).await?;
        info!(session_id = session_id, user_id = actor.user_id, "Session updated");
        self.recompute_event_status(event.id).await?;

        Ok(updated)
    }

    /// Request a session status transition; cascades into the parent event.
    pub async fn change_session_status(
        &self,
        actor: &Actor,
        session_id: i64,
        new_status: SessionStatus,
    ) -> Result<Session> {
        let session = self.get_session(session_id).await?;
        let event = self.get_event(session.event_id).await?;
        self.auth.require_event_manager(actor, &event)?;

        if event.status == LifecycleStatus::Cancelled {
            return Err(EmargeError::Forbidden(
                "Event is cancelled; its sessions can no longer change status".to_string(),
            ));
        }
        if !session.status.can_transition_to(new_status) {
            return Err(EmargeError::IllegalStateTransition {
                entity: "session",
                from: session.status.to_string(),
                to: new_status.to_string(),
            });
        }

        let updated = self.db.sessions.set_status(session_id, new_status).await?;
        log_status_change(
            "session",
            session_id,
            session.status.as_str(),
            new_status.as_str(),
            actor.user_id,
        );
        self.recompute_event_status(event.id).await?;

        if new_status == LifecycleStatus::Cancelled {
            self.notifications.notify(
                actor,
                event.owner_id,
                Notification::SessionCancelled {
                    event_id: event.id,
                    session_id: updated.id,
                    session_number: updated.session_number,
                    actor_id: actor.user_id,
                },
            );
        }

        Ok(updated)
    }

    /// Delete a session; its attendances go with it.
    pub async fn delete_session(&self, actor: &Actor, session_id: i64) -> Result<()> {
        let session = self.get_session(session_id).await?;
        let event = self.get_event(session.event_id).await?;
        self.auth.require_event_manager(actor, &event)?;

        if session.is_locked() {
            return Err(EmargeError::Forbidden(format!(
                "Session is {} and can no longer be deleted",
                session.status
            )));
        }
        if event.status == LifecycleStatus::Cancelled {
            return Err(EmargeError::Forbidden(
                "Event is cancelled; its sessions can no longer be deleted".to_string(),
            ));
        }

        self.db.sessions.delete(session_id).await?;
        info!(session_id = session_id, event_id = event.id, user_id = actor.user_id, "Session deleted");
        self.recompute_event_status(event.id).await?;

        Ok(())
    }

    /// Recompute the event status from the current sibling snapshot.
    ///
    /// No-op when the event is administratively Cancelled; otherwise derives
    /// and persists only on change. The derived write is not a requested
    /// transition, so it bypasses the transition table.
    pub async fn recompute_event_status(&self, event_id: i64) -> Result<EventStatus> {
        let event = self.get_event(event_id).await?;
        if event.status == LifecycleStatus::Cancelled {
            return Ok(event.status);
        }

        let statuses = self.db.sessions.statuses_for_event(event_id).await?;
        let derived = derive_event_status(&statuses);

        if derived != event.status {
            self.db.events.set_status(event_id, derived).await?;
            info!(
                event_id = event_id,
                from = event.status.as_str(),
                to = derived.as_str(),
                "Event status derived from sessions"
            );
        }

        Ok(derived)
    }

    /// Create one session per calendar day of the event period.
    ///
    /// Days that already have a session are skipped; the whole batch is one
    /// transaction, followed by exactly one recompute.
    pub async fn generate_daily_sessions(
        &self,
        actor: &Actor,
        event_id: i64,
    ) -> Result<SessionGenerationReport> {
        let event = self.get_event(event_id).await?;
        self.auth.require_event_manager(actor, &event)?;

        if event.is_locked() {
            return Err(EmargeError::Forbidden(format!(
                "Event is {} and can no longer receive sessions",
                event.status
            )));
        }

        let mut tx = self.db.pool.begin().await?;
        let existing = SessionRepository::dates_for_event_with(&mut tx, event_id).await?;
        let days = plan_daily_sessions(event.start_date, event.last_date(), &existing);

        for day in &days {
            SessionRepository::create_with(
                &mut tx,
                NewSession {
                    event_id,
                    title: daily_session_title(*day),
                    session_date: *day,
                    start_time: None,
                    end_time: None,
                    location: event.location.clone(),
                },
            )
            .await?;
        }
        tx.commit().await?;

        self.recompute_event_status(event_id).await?;

        let report = SessionGenerationReport {
            total_days: event.duration_days(),
            created: days.len() as i64,
            skipped: event.duration_days() - days.len() as i64,
        };
        info!(
            event_id = event_id,
            created = report.created,
            skipped = report.skipped,
            "Daily sessions generated"
        );

        Ok(report)
    }
}

/// Days in `[start, end]` that do not yet have a session, in order.
fn plan_daily_sessions(start: NaiveDate, end: NaiveDate, existing: &[NaiveDate]) -> Vec<NaiveDate> {
    let taken: HashSet<NaiveDate> = existing.iter().copied().collect();
    let mut days = Vec::new();
    let mut day = start;

    while day <= end {
        if !taken.contains(&day) {
            days.push(day);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    days
}

fn validate_date_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<()> {
    if let Some(end) = end {
        if end < start {
            return Err(EmargeError::Validation(
                "Event end date cannot be before its start date".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_time_range(
    start: Option<chrono::NaiveTime>,
    end: Option<chrono::NaiveTime>,
) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(EmargeError::Validation(
                "Session start time must be before its end time".to_string(),
            ));
        }
    }
    Ok(())
}

fn check_page_size(limit: i64) -> Result<()> {
    if limit > MAX_PAGE_SIZE {
        return Err(EmargeError::Validation(format!(
            "Limit cannot exceed {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(())
}
