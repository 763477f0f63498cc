//! Certificate issuance integration tests
//!
//! Covers idempotent bulk issuance, input-order preservation, frozen event
//! fields, attendance linking and the sequence-backed certificate numbers.

mod helpers;

use helpers::*;
use serial_test::serial;

use emarge::models::certificate::CertificateIssueRequest;
use emarge::models::status::LifecycleStatus;
use emarge::utils::errors::EmargeError;

/// Create an event with one ongoing session and check in `count` fresh
/// participants. Returns (event_id, participant_ids in check-in order).
async fn event_with_attendees(app: &TestApp, title: &str, count: usize) -> (i64, Vec<i64>) {
    let lifecycle = &app.services.lifecycle_service;
    let event = lifecycle
        .create_event(&organizer(), three_day_event(title))
        .await
        .expect("Failed to create event");
    lifecycle
        .generate_daily_sessions(&organizer(), event.id)
        .await
        .expect("Failed to generate sessions");
    let sessions = lifecycle
        .list_sessions(event.id)
        .await
        .expect("Failed to list sessions");
    lifecycle
        .change_session_status(&organizer(), sessions[0].id, LifecycleStatus::Ongoing)
        .await
        .expect("Failed to start session");

    let mut participant_ids = Vec::new();
    for _ in 0..count {
        let record = app
            .services
            .checkin_service
            .check_in(check_in_request(
                event.id,
                sessions[0].id,
                participant_details(Some(&random_cni()), None),
            ))
            .await
            .expect("Failed to check in");
        participant_ids.push(record.participant_id);
    }
    (event.id, participant_ids)
}

fn issue_request(event_id: i64, participant_ids: Vec<i64>) -> CertificateIssueRequest {
    CertificateIssueRequest {
        event_id,
        participant_ids,
        signatory_name: Some("Le Maire".to_string()),
        signatory_title: Some("Maire de la commune".to_string()),
    }
}

#[tokio::test]
#[serial]
async fn test_bulk_issuance_is_idempotent() {
    let Some(app) = setup_app().await else { return };
    let certificates = &app.services.certificate_service;

    let (event_id, participants) = event_with_attendees(&app, "Attestations en lot", 2).await;

    let first = certificates
        .generate_bulk(&organizer(), issue_request(event_id, participants.clone()))
        .await
        .expect("Failed to issue");
    assert_eq!(first.newly_issued, 2);
    assert_eq!(first.already_issued, 0);
    assert_eq!(first.certificates.len(), 2);

    let numbers: Vec<i64> = first
        .certificates
        .iter()
        .map(|c| c.certificate_number)
        .collect();
    assert_ne!(numbers[0], numbers[1]);

    // Re-running the same request changes nothing
    let second = certificates
        .generate_bulk(&organizer(), issue_request(event_id, participants.clone()))
        .await
        .expect("Failed to re-issue");
    assert_eq!(second.newly_issued, 0);
    assert_eq!(second.already_issued, 2);
    assert_eq!(
        second
            .certificates
            .iter()
            .map(|c| c.certificate_number)
            .collect::<Vec<_>>(),
        numbers
    );
    assert_eq!(app.db.count_records("certificates").await.unwrap(), 2);

    let held = certificates
        .find_for_participant(event_id, participants[0])
        .await
        .expect("Failed to look up certificate")
        .expect("Participant should hold a certificate");
    assert_eq!(held.certificate_number, numbers[0]);
}

#[tokio::test]
#[serial]
async fn test_bulk_rejects_unknown_participants() {
    let Some(app) = setup_app().await else { return };

    let (event_id, mut participants) = event_with_attendees(&app, "Participant inconnu", 1).await;
    participants.push(99_999);

    let result = app
        .services
        .certificate_service
        .generate_bulk(&organizer(), issue_request(event_id, participants))
        .await;
    assert!(matches!(
        result,
        Err(EmargeError::ParticipantNotFound {
            participant_id: 99_999
        })
    ));
    assert_eq!(app.db.count_records("certificates").await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_bulk_preserves_input_order_and_dedupes() {
    let Some(app) = setup_app().await else { return };

    let (event_id, participants) = event_with_attendees(&app, "Ordre de la demande", 2).await;
    let request = issue_request(
        event_id,
        vec![participants[1], participants[0], participants[1]],
    );

    let outcome = app
        .services
        .certificate_service
        .generate_bulk(&organizer(), request)
        .await
        .expect("Failed to issue");

    assert_eq!(outcome.newly_issued, 2);
    assert_eq!(
        outcome
            .certificates
            .iter()
            .map(|c| c.participant_id)
            .collect::<Vec<_>>(),
        vec![participants[1], participants[0]]
    );
}

#[tokio::test]
#[serial]
async fn test_attendance_is_not_required_for_issuance() {
    let Some(app) = setup_app().await else { return };

    let (event_id, attendees) = event_with_attendees(&app, "Sans émargement", 1).await;
    // A participant registered outside this event
    let outsider = app
        .services
        .identity_service
        .resolve(&participant_details(Some(&random_cni()), None))
        .await
        .expect("Failed to create participant");

    let outcome = app
        .services
        .certificate_service
        .generate_bulk(
            &organizer(),
            issue_request(event_id, vec![attendees[0], outsider.id]),
        )
        .await
        .expect("Failed to issue");

    assert_eq!(outcome.newly_issued, 2);
    // The attendee's certificate links to their first check-in
    assert!(outcome.certificates[0].attendance_id.is_some());
    // The outsider's certificate simply has no attendance link
    assert!(outcome.certificates[1].attendance_id.is_none());
}

#[tokio::test]
#[serial]
async fn test_certificate_freezes_event_fields() {
    let Some(app) = setup_app().await else { return };
    let lifecycle = &app.services.lifecycle_service;

    let (event_id, participants) = event_with_attendees(&app, "Titre d'origine", 1).await;
    let outcome = app
        .services
        .certificate_service
        .generate_bulk(&organizer(), issue_request(event_id, participants))
        .await
        .expect("Failed to issue");
    let certificate = &outcome.certificates[0];
    assert_eq!(certificate.event_title, "Titre d'origine");
    assert_eq!(certificate.signatory_name.as_deref(), Some("Le Maire"));

    // Rename the event after issuance; the certificate keeps the old title
    lifecycle
        .update_event(
            &organizer(),
            event_id,
            emarge::models::event::UpdateEventRequest {
                title: Some("Titre modifié".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to rename event");

    let reloaded = app
        .services
        .certificate_service
        .get_certificate(certificate.id)
        .await
        .expect("Failed to reload certificate");
    assert_eq!(reloaded.event_title, "Titre d'origine");
}

#[tokio::test]
#[serial]
async fn test_individual_issuance_conflicts_when_already_issued() {
    let Some(app) = setup_app().await else { return };
    let certificates = &app.services.certificate_service;

    let (event_id, participants) = event_with_attendees(&app, "Attestation unique", 1).await;

    let certificate = certificates
        .create(&organizer(), event_id, participants[0], None, None)
        .await
        .expect("Failed to issue");
    assert_eq!(certificate.participant_id, participants[0]);
    assert!(certificate.attendance_id.is_some());

    let result = certificates
        .create(&organizer(), event_id, participants[0], None, None)
        .await;
    assert!(matches!(result, Err(EmargeError::Conflict(_))));
}

#[tokio::test]
#[serial]
async fn test_issuance_requires_event_manager() {
    let Some(app) = setup_app().await else { return };

    let (event_id, participants) = event_with_attendees(&app, "Gestionnaire requis", 1).await;

    let result = app
        .services
        .certificate_service
        .generate_bulk(&other_organizer(), issue_request(event_id, participants.clone()))
        .await;
    assert!(matches!(result, Err(EmargeError::Forbidden(_))));

    // The admin is always allowed
    app.services
        .certificate_service
        .generate_bulk(&admin(), issue_request(event_id, participants))
        .await
        .expect("Admin should issue");
}

#[tokio::test]
#[serial]
async fn test_empty_bulk_request_rejected() {
    let Some(app) = setup_app().await else { return };

    let (event_id, _) = event_with_attendees(&app, "Lot vide", 1).await;
    let result = app
        .services
        .certificate_service
        .generate_bulk(&organizer(), issue_request(event_id, vec![]))
        .await;
    assert!(matches!(result, Err(EmargeError::Validation(_))));
}

#[tokio::test]
#[serial]
async fn test_certificate_numbers_are_unique_across_events() {
    let Some(app) = setup_app().await else { return };
    let certificates = &app.services.certificate_service;

    let (event_a, participants_a) = event_with_attendees(&app, "Événement A", 1).await;
    let (event_b, participants_b) = event_with_attendees(&app, "Événement B", 1).await;

    let a = certificates
        .generate_bulk(&organizer(), issue_request(event_a, participants_a))
        .await
        .expect("Failed to issue for A");
    let b = certificates
        .generate_bulk(&organizer(), issue_request(event_b, participants_b))
        .await
        .expect("Failed to issue for B");

    assert_ne!(
        a.certificates[0].certificate_number,
        b.certificates[0].certificate_number
    );

    let listed = certificates
        .list_event_certificates(event_a)
        .await
        .expect("Failed to list");
    assert_eq!(listed.len(), 1);
}
