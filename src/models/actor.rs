//! Caller identity as established by the outer authentication layer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Admin,
    Organizer,
}

/// Authenticated caller of a mutating operation.
///
/// Authentication itself happens upstream. This engine only decides whether
/// an already-identified actor may perform a given operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: i64,
    pub role: ActorRole,
}

impl Actor {
    pub fn admin(user_id: i64) -> Self {
        Self {
            user_id,
            role: ActorRole::Admin,
        }
    }

    pub fn organizer(user_id: i64) -> Self {
        Self {
            user_id,
            role: ActorRole::Organizer,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }

    /// Admins manage everything; organizers only what they own.
    pub fn can_manage_event(&self, organizer_id: i64) -> bool {
        self.is_admin() || self.user_id == organizer_id
    }
}
