//! Lifecycle status state machine
//!
//! Events and Sessions share one status domain and one transition table.
//! The table is data, not scattered conditionals, so the state machine is
//! unit-testable on its own. Cancellation is an administrative terminal
//! state: nothing ever derives it and nothing leaves it.

use serde::{Deserialize, Serialize};

/// Status domain shared by Events and Sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lifecycle_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

pub type EventStatus = LifecycleStatus;
pub type SessionStatus = LifecycleStatus;

impl LifecycleStatus {
    /// Allowed outgoing transitions. Completed and Cancelled are terminal.
    pub fn allowed_transitions(self) -> &'static [LifecycleStatus] {
        match self {
            LifecycleStatus::Scheduled => {
                &[LifecycleStatus::Ongoing, LifecycleStatus::Cancelled]
            }
            LifecycleStatus::Ongoing => {
                &[LifecycleStatus::Completed, LifecycleStatus::Cancelled]
            }
            LifecycleStatus::Completed => &[],
            LifecycleStatus::Cancelled => &[],
        }
    }

    /// Whether a requested transition is in the table.
    pub fn can_transition_to(self, to: LifecycleStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Locked entities reject all further mutation except read.
    pub fn is_locked(self) -> bool {
        matches!(self, LifecycleStatus::Completed | LifecycleStatus::Cancelled)
    }

    pub fn is_terminal(self) -> bool {
        self.is_locked()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleStatus::Scheduled => "scheduled",
            LifecycleStatus::Ongoing => "ongoing",
            LifecycleStatus::Completed => "completed",
            LifecycleStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive an Event's status from its sessions' statuses.
///
/// Only applies when the Event is not administratively Cancelled: Ongoing if
/// any session is Ongoing, Completed if there is at least one session and all
/// are Completed or Cancelled, Scheduled otherwise (including zero sessions).
pub fn derive_event_status(session_statuses: &[LifecycleStatus]) -> LifecycleStatus {
    if session_statuses
        .iter()
        .any(|s| *s == LifecycleStatus::Ongoing)
    {
        return LifecycleStatus::Ongoing;
    }
    if !session_statuses.is_empty() && session_statuses.iter().all(|s| s.is_terminal()) {
        return LifecycleStatus::Completed;
    }
    LifecycleStatus::Scheduled
}
