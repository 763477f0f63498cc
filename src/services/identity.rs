//! Participant identity resolution service
//!
//! Find-or-create-or-conflict over the two identity keys. The CNI is the
//! durable government identifier and always wins; email is mutable and
//! secondary. The ordering stops a reused or spoofed email from silently
//! hijacking a CNI-anchored identity, while a returning participant can
//! still update contact details by CNI.
//!
//! The decision itself is a pure function over the two lookups; persistence
//! happens afterwards, inside one transaction per call.

use tracing::{debug, info, warn};

use crate::database::repositories::ParticipantRepository;
use crate::database::DatabaseService;
use crate::models::participant::{
    IdentityKey, IdentityResolution, Participant, ParticipantDetails,
};
use crate::utils::errors::{EmargeError, Result};
use crate::utils::helpers::is_valid_email;

const MAX_PAGE_SIZE: i64 = 100;
const SEARCH_LIMIT: i64 = 50;

/// Identity service for participant resolution
#[derive(Clone)]
pub struct IdentityService {
    db: DatabaseService,
}

impl IdentityService {
    /// Create a new IdentityService instance
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Resolve the supplied details to exactly one participant, creating or
    /// merging as needed. Lookup and write run in one transaction so two
    /// concurrent calls for the same identity cannot interleave partial
    /// writes.
    pub async fn resolve(&self, details: &ParticipantDetails) -> Result<Participant> {
        if details.first_name.trim().is_empty() || details.last_name.trim().is_empty() {
            return Err(EmargeError::Validation(
                "Participant first and last name are required".to_string(),
            ));
        }
        if let Some(email) = &details.email {
            if !is_valid_email(email) {
                return Err(EmargeError::Validation(format!(
                    "Invalid email address: {}",
                    email
                )));
            }
        }

        let mut tx = self.db.pool.begin().await?;

        let cni_match = match &details.cni_number {
            Some(cni) => ParticipantRepository::find_by_cni(&mut tx, cni).await?,
            None => None,
        };
        let email_match = match (&cni_match, &details.email) {
            (None, Some(email)) => ParticipantRepository::find_by_email(&mut tx, email).await?,
            _ => None,
        };

        match resolve_identity(details, cni_match.as_ref(), email_match.as_ref()) {
            IdentityResolution::Found {
                participant_id,
                matched_by,
            } => {
                let participant =
                    ParticipantRepository::merge_details(&mut tx, participant_id, details).await?;
                tx.commit().await?;
                debug!(
                    participant_id = participant.id,
                    matched_by = matched_by.as_str(),
                    "Participant resolved to existing record"
                );
                Ok(participant)
            }
            IdentityResolution::Conflict { reason } => {
                tx.rollback().await?;
                warn!(reason = %reason, "Participant identity conflict");
                Err(EmargeError::Conflict(reason))
            }
            IdentityResolution::NotFound => {
                let participant = ParticipantRepository::create_with(&mut tx, details).await?;
                tx.commit().await?;
                info!(participant_id = participant.id, "New participant created");
                Ok(participant)
            }
        }
    }

    // --- read side; all writes go through resolve ---

    /// Get participant by ID
    pub async fn get_participant(&self, participant_id: i64) -> Result<Participant> {
        self.db
            .participants
            .find_by_id(participant_id)
            .await?
            .ok_or(EmargeError::ParticipantNotFound { participant_id })
    }

    /// List participants with pagination
    pub async fn list_participants(&self, limit: i64, offset: i64) -> Result<Vec<Participant>> {
        if limit > MAX_PAGE_SIZE {
            return Err(EmargeError::Validation(format!(
                "Limit cannot exceed {}",
                MAX_PAGE_SIZE
            )));
        }
        self.db.participants.list(limit, offset).await
    }

    /// Search participants by name pattern
    pub async fn search_participants(&self, pattern: &str) -> Result<Vec<Participant>> {
        if pattern.trim().len() < 2 {
            return Err(EmargeError::Validation(
                "Search pattern must be at least 2 characters".to_string(),
            ));
        }
        self.db
            .participants
            .search_by_name(pattern.trim(), SEARCH_LIMIT)
            .await
    }
}

/// Pure identity decision over the two lookups.
///
/// CNI match wins outright. On an email match, a supplied CNI that differs
/// from the stored one is a conflict, and a record with no stored CNI counts
/// as differing: backfilling a CNI through the email path would let anyone
/// claiming a known email anchor an arbitrary CNI onto it.
pub fn resolve_identity(
    details: &ParticipantDetails,
    cni_match: Option<&Participant>,
    email_match: Option<&Participant>,
) -> IdentityResolution {
    if let Some(participant) = cni_match {
        return IdentityResolution::Found {
            participant_id: participant.id,
            matched_by: IdentityKey::Cni,
        };
    }

    if let Some(participant) = email_match {
        if let Some(supplied_cni) = &details.cni_number {
            match &participant.cni_number {
                Some(stored_cni) if stored_cni == supplied_cni => {}
                _ => {
                    return IdentityResolution::Conflict {
                        reason: format!(
                            "Email {} belongs to a participant with a different CNI",
                            details.email.as_deref().unwrap_or_default()
                        ),
                    };
                }
            }
        }
        return IdentityResolution::Found {
            participant_id: participant.id,
            matched_by: IdentityKey::Email,
        };
    }

    IdentityResolution::NotFound
}
