//! Authorization service implementation
//!
//! Roles are established by the excluded authentication layer and arrive as
//! an [`Actor`]; this service only enforces the admin-or-owner rule on
//! mutating engine operations.

use tracing::warn;

use crate::models::actor::Actor;
use crate::models::event::Event;
use crate::utils::errors::{EmargeError, Result};

#[derive(Clone, Default)]
pub struct AuthService;

impl AuthService {
    pub fn new() -> Self {
        Self
    }

    /// Require the administrator role
    pub fn require_admin(&self, actor: &Actor) -> Result<()> {
        if actor.is_admin() {
            Ok(())
        } else {
            warn!(user_id = actor.user_id, "Admin-only operation rejected");
            Err(EmargeError::Forbidden(
                "Administrator role required".to_string(),
            ))
        }
    }

    /// Require an administrator or the organizer who owns the event
    pub fn require_event_manager(&self, actor: &Actor, event: &Event) -> Result<()> {
        if actor.can_manage_event(event.owner_id) {
            Ok(())
        } else {
            warn!(
                user_id = actor.user_id,
                event_id = event.id,
                owner_id = event.owner_id,
                "Operation rejected: actor does not manage this event"
            );
            Err(EmargeError::Forbidden(
                "Only an administrator or the event owner may perform this operation".to_string(),
            ))
        }
    }
}
