//! Notification service implementation
//!
//! The engine only decides *that* something is announced and *to whom*;
//! delivery transport lives outside. The default sink writes structured log
//! lines, which is also what operators follow in production.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::settings::Settings;
use crate::models::actor::Actor;
use crate::utils::errors::Result;

/// Events announced to interested humans.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notification {
    EventCreated {
        event_id: i64,
        title: String,
        actor_id: i64,
    },
    EventCancelled {
        event_id: i64,
        title: String,
        actor_id: i64,
    },
    EventDeleted {
        event_id: i64,
        title: String,
        actor_id: i64,
    },
    SessionCancelled {
        event_id: i64,
        session_id: i64,
        session_number: i32,
        actor_id: i64,
    },
    AttendanceDeleted {
        event_id: i64,
        attendance_id: i64,
        participant_id: i64,
        actor_id: i64,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::EventCreated { .. } => "event_created",
            Notification::EventCancelled { .. } => "event_cancelled",
            Notification::EventDeleted { .. } => "event_deleted",
            Notification::SessionCancelled { .. } => "session_cancelled",
            Notification::AttendanceDeleted { .. } => "attendance_deleted",
        }
    }
}

/// Delivery sink for notifications. Implementations are synchronous and must
/// not block on network I/O; anything slow belongs behind a queue in the
/// transport layer.
pub trait Notifier: Send + Sync {
    fn dispatch(&self, notification: &Notification, recipients: &[i64]) -> Result<()>;
}

/// Default sink: one structured log line per notification.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn dispatch(&self, notification: &Notification, recipients: &[i64]) -> Result<()> {
        info!(
            kind = notification.kind(),
            recipients = ?recipients,
            payload = %serde_json::to_string(notification).unwrap_or_default(),
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Notification service for recipient computation and dispatch
#[derive(Clone)]
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
    admin_ids: Vec<i64>,
}

impl NotificationService {
    /// Create a new NotificationService with the logging sink
    pub fn new(settings: &Settings) -> Self {
        Self::with_notifier(Arc::new(LogNotifier), settings)
    }

    /// Create a NotificationService with a custom sink
    pub fn with_notifier(notifier: Arc<dyn Notifier>, settings: &Settings) -> Self {
        Self {
            notifier,
            admin_ids: settings.notifications.admin_ids.clone(),
        }
    }

    /// Number of configured administrator recipients
    pub fn admin_count(&self) -> usize {
        self.admin_ids.len()
    }

    /// Recipients are role-computed: an administrator's action notifies the
    /// event's organizer, an organizer's action notifies the configured
    /// administrators. Actors never notify themselves.
    pub fn recipients(&self, actor: &Actor, event_owner_id: i64) -> Vec<i64> {
        if actor.is_admin() {
            if event_owner_id == actor.user_id {
                vec![]
            } else {
                vec![event_owner_id]
            }
        } else {
            self.admin_ids
                .iter()
                .copied()
                .filter(|id| *id != actor.user_id)
                .collect()
        }
    }

    /// Fire-and-forget dispatch; failures are logged and never propagated to
    /// the triggering operation.
    pub fn notify(&self, actor: &Actor, event_owner_id: i64, notification: Notification) {
        let recipients = self.recipients(actor, event_owner_id);
        if recipients.is_empty() {
            debug!(
                kind = notification.kind(),
                "No notification recipients, skipping dispatch"
            );
            return;
        }

        if let Err(e) = self.notifier.dispatch(&notification, &recipients) {
            warn!(
                kind = notification.kind(),
                error = %e,
                "Notification dispatch failed"
            );
        }
    }
}
