//! Participant model and identity resolution types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A person who attends sessions, shared across events.
///
/// `cni_number` is the national identity card number and is the strongest
/// identifier; once stored it is never overwritten. Email is the fallback
/// identifier. Both are globally unique when present.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: i64,
    pub cni_number: Option<String>,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub function: Option<String>,
    pub origin_locality: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Identity details supplied at check-in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cni_number: Option<String>,
    pub organization: Option<String>,
    pub function: Option<String>,
    pub origin_locality: Option<String>,
}

impl ParticipantDetails {
    /// Whether the supplied details carry any identifier at all.
    pub fn is_anonymous(&self) -> bool {
        self.cni_number.is_none() && self.email.is_none()
    }
}

/// Which identifier matched an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKey {
    Cni,
    Email,
}

impl IdentityKey {
    pub fn as_str(self) -> &'static str {
        match self {
            IdentityKey::Cni => "cni",
            IdentityKey::Email => "email",
        }
    }
}

/// Outcome of matching supplied details against stored participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityResolution {
    /// An existing participant matched without contradiction.
    Found {
        participant_id: i64,
        matched_by: IdentityKey,
    },
    /// The supplied identifiers contradict a stored record.
    Conflict { reason: String },
    /// No identifier matched; a new participant may be created.
    NotFound,
}
