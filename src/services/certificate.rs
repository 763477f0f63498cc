//! Certificate issuance service
//!
//! Issuance freezes the event fields onto each certificate row, so
//! re-reading a certificate after the event was edited still shows what
//! was printed. Bulk issuance is idempotent per (event, participant):
//! rows that already exist are returned untouched.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::actor::Actor;
use crate::models::certificate::{
    BulkCertificateOutcome, Certificate, CertificateIssueRequest, NewCertificate,
};
use crate::models::event::Event;
use crate::services::auth::AuthService;
use crate::utils::errors::{EmargeError, Result};

/// Certificate service for attendance certificates
#[derive(Clone)]
pub struct CertificateService {
    db: DatabaseService,
    auth: AuthService,
}

impl CertificateService {
    /// Create a new CertificateService instance
    pub fn new(db: DatabaseService) -> Self {
        Self {
            db,
            auth: AuthService::new(),
        }
    }

    /// Issue certificates for a batch of participants of one event.
    ///
    /// Participants that already hold a certificate for the event keep the
    /// one they have. The returned list follows the request order.
    pub async fn generate_bulk(
        &self,
        actor: &Actor,
        request: CertificateIssueRequest,
    ) -> Result<BulkCertificateOutcome> {
        let event = self
            .db
            .events
            .find_by_id(request.event_id)
            .await?
            .ok_or(EmargeError::EventNotFound {
                event_id: request.event_id,
            })?;
        self.auth.require_event_manager(actor, &event)?;

        if request.participant_ids.is_empty() {
            return Err(EmargeError::Validation(
                "At least one participant is required".to_string(),
            ));
        }
        let participant_ids = dedupe_preserving_order(&request.participant_ids);

        let known = self.db.participants.existing_ids(&participant_ids).await?;
        if known.len() != participant_ids.len() {
            let missing = participant_ids
                .iter()
                .find(|id| !known.contains(id))
                .copied()
                .unwrap_or_default();
            return Err(EmargeError::ParticipantNotFound {
                participant_id: missing,
            });
        }

        let mut issued: HashMap<i64, Certificate> = self
            .db
            .certificates
            .find_for_event_participants(event.id, &participant_ids)
            .await?
            .into_iter()
            .map(|c| (c.participant_id, c))
            .collect();
        let already_issued = issued.len();

        let pending: Vec<i64> = participant_ids
            .iter()
            .copied()
            .filter(|id| !issued.contains_key(id))
            .collect();
        let first_attendances: HashMap<i64, i64> = if pending.is_empty() {
            HashMap::new()
        } else {
            self.db
                .attendances
                .first_for_event_participants(event.id, &pending)
                .await?
                .into_iter()
                .collect()
        };

        let mut newly_issued = 0;
        for participant_id in pending {
            let new = new_certificate(
                &event,
                participant_id,
                first_attendances.get(&participant_id).copied(),
                request.signatory_name.clone(),
                request.signatory_title.clone(),
                actor.user_id,
            );
            let certificate = match self.db.certificates.create(new).await {
                Ok(certificate) => {
                    newly_issued += 1;
                    certificate
                }
                // Lost an issuance race; the winner's row is the certificate.
                Err(EmargeError::Conflict(reason)) => self
                    .db
                    .certificates
                    .find_by_event_and_participant(event.id, participant_id)
                    .await?
                    .ok_or(EmargeError::Conflict(reason))?,
                Err(e) => return Err(e),
            };
            issued.insert(participant_id, certificate);
        }

        let certificates: Vec<Certificate> = participant_ids
            .iter()
            .filter_map(|id| issued.remove(id))
            .collect();
        info!(
            event_id = event.id,
            user_id = actor.user_id,
            newly_issued = newly_issued,
            already_issued = already_issued,
            "Bulk certificate issuance complete"
        );

        Ok(BulkCertificateOutcome {
            certificates,
            newly_issued,
            already_issued,
        })
    }

    /// Issue a single certificate. Unlike bulk issuance, asking again for a
    /// participant that already holds one is a conflict.
    pub async fn create(
        &self,
        actor: &Actor,
        event_id: i64,
        participant_id: i64,
        signatory_name: Option<String>,
        signatory_title: Option<String>,
    ) -> Result<Certificate> {
        let event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(EmargeError::EventNotFound { event_id })?;
        self.auth.require_event_manager(actor, &event)?;
        self.db
            .participants
            .find_by_id(participant_id)
            .await?
            .ok_or(EmargeError::ParticipantNotFound { participant_id })?;

        if self
            .db
            .certificates
            .find_by_event_and_participant(event.id, participant_id)
            .await?
            .is_some()
        {
            return Err(EmargeError::Conflict(
                "Certificate already issued for this participant".to_string(),
            ));
        }

        let attendance_id = self
            .db
            .attendances
            .first_for_event_participants(event.id, &[participant_id])
            .await?
            .into_iter()
            .next()
            .map(|(_, attendance_id)| attendance_id);

        let certificate = self
            .db
            .certificates
            .create(new_certificate(
                &event,
                participant_id,
                attendance_id,
                signatory_name,
                signatory_title,
                actor.user_id,
            ))
            .await?;
        debug!(
            certificate_id = certificate.id,
            certificate_number = certificate.certificate_number,
            "Certificate issued"
        );

        Ok(certificate)
    }

    /// Get a certificate by ID
    pub async fn get_certificate(&self, certificate_id: i64) -> Result<Certificate> {
        self.db
            .certificates
            .find_by_id(certificate_id)
            .await?
            .ok_or(EmargeError::CertificateNotFound { certificate_id })
    }

    /// List certificates for an event in issuance order
    pub async fn list_event_certificates(&self, event_id: i64) -> Result<Vec<Certificate>> {
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(EmargeError::EventNotFound { event_id })?;
        self.db.certificates.list_for_event(event_id).await
    }

    /// List certificates held by a participant, most recent first
    pub async fn list_participant_certificates(
        &self,
        participant_id: i64,
    ) -> Result<Vec<Certificate>> {
        self.db
            .participants
            .find_by_id(participant_id)
            .await?
            .ok_or(EmargeError::ParticipantNotFound { participant_id })?;
        self.db.certificates.list_for_participant(participant_id).await
    }

    /// The certificate a participant holds for an event, if any
    pub async fn find_for_participant(
        &self,
        event_id: i64,
        participant_id: i64,
    ) -> Result<Option<Certificate>> {
        self.db
            .certificates
            .find_by_event_and_participant(event_id, participant_id)
            .await
    }
}

fn new_certificate(
    event: &Event,
    participant_id: i64,
    attendance_id: Option<i64>,
    signatory_name: Option<String>,
    signatory_title: Option<String>,
    issued_by: i64,
) -> NewCertificate {
    NewCertificate {
        event_id: event.id,
        participant_id,
        attendance_id,
        event_title: event.title.clone(),
        event_start_date: event.start_date,
        event_end_date: event.end_date,
        event_location: event.location.clone(),
        signatory_name,
        signatory_title,
        issued_by,
    }
}

fn dedupe_preserving_order(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_preserves_first_occurrence_order() {
        assert_eq!(dedupe_preserving_order(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }

    #[test]
    fn test_dedupe_passes_unique_input_through() {
        assert_eq!(dedupe_preserving_order(&[5, 6, 7]), vec![5, 6, 7]);
    }
}
