//! Event and session lifecycle integration tests
//!
//! Covers event creation, the shared transition table, cascade derivation of
//! event status from session statuses, daily session generation and the
//! lock-on-terminal rules.

mod helpers;

use std::sync::Arc;

use chrono::NaiveDate;
use helpers::*;
use serial_test::serial;

use emarge::models::event::UpdateEventRequest;
use emarge::models::session::UpdateSessionRequest;
use emarge::models::status::LifecycleStatus;
use emarge::services::lifecycle::LifecycleService;
use emarge::services::notification::NotificationService;
use emarge::utils::errors::EmargeError;

#[tokio::test]
#[serial]
async fn test_create_event_starts_scheduled() {
    let Some(app) = setup_app().await else { return };
    let lifecycle = &app.services.lifecycle_service;

    let event = lifecycle
        .create_event(&organizer(), three_day_event("Atelier budget participatif"))
        .await
        .expect("Failed to create event");

    assert_eq!(event.status, LifecycleStatus::Scheduled);
    assert_eq!(event.owner_id, ORGANIZER_ID);
    assert_eq!(event.duration_days(), 3);

    let overview = lifecycle
        .event_overview(event.id)
        .await
        .expect("Failed to load overview");
    assert!(overview.sessions.is_empty());
    assert_eq!(overview.total_attendances, 0);
    assert_eq!(overview.distinct_participants, 0);
    assert_eq!(overview.certificates_issued, 0);
}

#[tokio::test]
#[serial]
async fn test_create_event_rejects_inverted_date_range() {
    let Some(app) = setup_app().await else { return };

    let request = event_request(
        "Dates inversées",
        NaiveDate::from_ymd_opt(2026, 6, 3).unwrap(),
        Some(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()),
    );
    let result = app
        .services
        .lifecycle_service
        .create_event(&organizer(), request)
        .await;

    assert!(matches!(result, Err(EmargeError::Validation(_))));
}

#[tokio::test]
#[serial]
async fn test_only_admin_creates_events_for_another_owner() {
    let Some(app) = setup_app().await else { return };
    let lifecycle = &app.services.lifecycle_service;

    let mut request = one_day_event("Pour un autre organisateur");
    request.owner_id = Some(OTHER_ORGANIZER_ID);
    let result = lifecycle.create_event(&organizer(), request.clone()).await;
    assert!(matches!(result, Err(EmargeError::Forbidden(_))));

    let event = lifecycle
        .create_event(&admin(), request)
        .await
        .expect("Admin should create for another owner");
    assert_eq!(event.owner_id, OTHER_ORGANIZER_ID);
}

#[tokio::test]
#[serial]
async fn test_generate_daily_sessions_covers_every_day() {
    let Some(app) = setup_app().await else { return };
    let lifecycle = &app.services.lifecycle_service;

    let event = lifecycle
        .create_event(&organizer(), three_day_event("Formation régionale"))
        .await
        .expect("Failed to create event");
    let report = lifecycle
        .generate_daily_sessions(&organizer(), event.id)
        .await
        .expect("Failed to generate sessions");

    assert_eq!(report.total_days, 3);
    assert_eq!(report.created, 3);
    assert_eq!(report.skipped, 0);

    let sessions = lifecycle
        .list_sessions(event.id)
        .await
        .expect("Failed to list sessions");
    assert_eq!(sessions.len(), 3);
    assert_eq!(
        sessions.iter().map(|s| s.session_number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(sessions[0].title, "Session du 2026-06-01");
    assert_eq!(sessions[2].title, "Session du 2026-06-03");
    // Generated sessions inherit the event location
    assert_eq!(sessions[0].location, event.location);

    // A second run creates nothing and skips the covered days
    let rerun = lifecycle
        .generate_daily_sessions(&organizer(), event.id)
        .await
        .expect("Failed to re-run generation");
    assert_eq!(rerun.total_days, 3);
    assert_eq!(rerun.created, 0);
    assert_eq!(rerun.skipped, 3);
}

#[tokio::test]
#[serial]
async fn test_generate_daily_sessions_for_single_day_event() {
    let Some(app) = setup_app().await else { return };
    let lifecycle = &app.services.lifecycle_service;

    let event = lifecycle
        .create_event(&organizer(), one_day_event("Journée unique"))
        .await
        .expect("Failed to create event");
    let report = lifecycle
        .generate_daily_sessions(&organizer(), event.id)
        .await
        .expect("Failed to generate sessions");

    assert_eq!(report.total_days, 1);
    assert_eq!(report.created, 1);
}

#[tokio::test]
#[serial]
async fn test_event_status_derives_from_sessions() {
    let Some(app) = setup_app().await else { return };
    let lifecycle = &app.services.lifecycle_service;

    let event = lifecycle
        .create_event(&organizer(), three_day_event("Cycle de formation"))
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

    // One ongoing session pulls the event to ongoing
    lifecycle
        .change_session_status(&organizer(), sessions[0].id, LifecycleStatus::Ongoing)
        .await
        .expect("Failed to start session");
    let event = lifecycle.get_event(event.id).await.expect("Failed to get event");
    assert_eq!(event.status, LifecycleStatus::Ongoing);

    // Completing it with the others still scheduled drops back to scheduled
    lifecycle
        .change_session_status(&organizer(), sessions[0].id, LifecycleStatus::Completed)
        .await
        .expect("Failed to complete session");
    let event = lifecycle.get_event(event.id).await.expect("Failed to get event");
    assert_eq!(event.status, LifecycleStatus::Scheduled);

    // Cancelling one of the remaining sessions and completing the other
    // makes every session terminal, so the event completes
    lifecycle
        .change_session_status(&organizer(), sessions[1].id, LifecycleStatus::Cancelled)
        .await
        .expect("Failed to cancel session");
    lifecycle
        .change_session_status(&organizer(), sessions[2].id, LifecycleStatus::Ongoing)
        .await
        .expect("Failed to start session");
    lifecycle
        .change_session_status(&organizer(), sessions[2].id, LifecycleStatus::Completed)
        .await
        .expect("Failed to complete session");

    let event = lifecycle.get_event(event.id).await.expect("Failed to get event");
    assert_eq!(event.status, LifecycleStatus::Completed);
    assert!(event.is_locked());

    // Locked events reject further edits
    let update = UpdateEventRequest {
        title: Some("Trop tard".to_string()),
        ..Default::default()
    };
    let result = lifecycle.update_event(&organizer(), event.id, update).await;
    assert!(matches!(result, Err(EmargeError::Forbidden(_))));
}

#[tokio::test]
#[serial]
async fn test_transition_table_is_enforced() {
    let Some(app) = setup_app().await else { return };
    let lifecycle = &app.services.lifecycle_service;

    let event = lifecycle
        .create_event(&organizer(), one_day_event("Transitions"))
        .await
        .expect("Failed to create event");

    // Scheduled cannot jump straight to completed
    let result = lifecycle
        .change_event_status(&organizer(), event.id, LifecycleStatus::Completed)
        .await;
    assert!(matches!(
        result,
        Err(EmargeError::IllegalStateTransition { .. })
    ));

    // Scheduled to cancelled is allowed and terminal
    let event = lifecycle
        .change_event_status(&organizer(), event.id, LifecycleStatus::Cancelled)
        .await
        .expect("Failed to cancel event");
    assert_eq!(event.status, LifecycleStatus::Cancelled);

    let result = lifecycle
        .change_event_status(&organizer(), event.id, LifecycleStatus::Ongoing)
        .await;
    assert!(matches!(
        result,
        Err(EmargeError::IllegalStateTransition { .. })
    ));
}

#[tokio::test]
#[serial]
async fn test_cancelled_event_ignores_session_derivation() {
    let Some(app) = setup_app().await else { return };
    let lifecycle = &app.services.lifecycle_service;

    let event = lifecycle
        .create_event(&organizer(), three_day_event("Annulé en amont"))
        .await
        .expect("Failed to create event");
    lifecycle
        .generate_daily_sessions(&organizer(), event.id)
        .await
        .expect("Failed to generate sessions");
    lifecycle
        .change_event_status(&organizer(), event.id, LifecycleStatus::Cancelled)
        .await
        .expect("Failed to cancel event");

    // Recomputation is a no-op on a cancelled event
    let derived = lifecycle
        .recompute_event_status(event.id)
        .await
        .expect("Failed to recompute");
    assert_eq!(derived, LifecycleStatus::Cancelled);

    let event = lifecycle.get_event(event.id).await.expect("Failed to get event");
    assert_eq!(event.status, LifecycleStatus::Cancelled);

    // And session status changes under a cancelled event are forbidden
    let sessions = lifecycle
        .list_sessions(event.id)
        .await
        .expect("Failed to list sessions");
    let result = lifecycle
        .change_session_status(&organizer(), sessions[0].id, LifecycleStatus::Ongoing)
        .await;
    assert!(matches!(result, Err(EmargeError::Forbidden(_))));
}

#[tokio::test]
#[serial]
async fn test_session_date_must_fall_within_event_period() {
    let Some(app) = setup_app().await else { return };
    let lifecycle = &app.services.lifecycle_service;

    let event = lifecycle
        .create_event(&organizer(), three_day_event("Période stricte"))
        .await
        .expect("Failed to create event");

    let outside = session_request(event.id, NaiveDate::from_ymd_opt(2026, 6, 10).unwrap());
    let result = lifecycle.create_session(&organizer(), outside).await;
    assert!(matches!(result, Err(EmargeError::Validation(_))));

    let inside = session_request(event.id, NaiveDate::from_ymd_opt(2026, 6, 2).unwrap());
    let session = lifecycle
        .create_session(&organizer(), inside)
        .await
        .expect("Failed to create session");
    assert_eq!(session.session_number, 1);

    // Moving it outside the period is rejected the same way
    let update = UpdateSessionRequest {
        session_date: Some(NaiveDate::from_ymd_opt(2026, 5, 30).unwrap()),
        ..Default::default()
    };
    let result = lifecycle
        .update_session(&organizer(), session.id, update)
        .await;
    assert!(matches!(result, Err(EmargeError::Validation(_))));
}

#[tokio::test]
#[serial]
async fn test_locked_session_rejects_mutation_and_deletion() {
    let Some(app) = setup_app().await else { return };
    let lifecycle = &app.services.lifecycle_service;

    let event = lifecycle
        .create_event(&organizer(), three_day_event("Sessions verrouillées"))
        .await
        .expect("Failed to create event");
    let session = lifecycle
        .create_session(
            &organizer(),
            session_request(event.id, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()),
        )
        .await
        .expect("Failed to create session");

    lifecycle
        .change_session_status(&organizer(), session.id, LifecycleStatus::Cancelled)
        .await
        .expect("Failed to cancel session");

    let update = UpdateSessionRequest {
        title: Some("Renommée".to_string()),
        ..Default::default()
    };
    let result = lifecycle
        .update_session(&organizer(), session.id, update)
        .await;
    assert!(matches!(result, Err(EmargeError::Forbidden(_))));

    let result = lifecycle.delete_session(&organizer(), session.id).await;
    assert!(matches!(result, Err(EmargeError::Forbidden(_))));
}

#[tokio::test]
#[serial]
async fn test_delete_session_recomputes_event_status() {
    let Some(app) = setup_app().await else { return };
    let lifecycle = &app.services.lifecycle_service;

    let event = lifecycle
        .create_event(&organizer(), three_day_event("Recalcul après suppression"))
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

    // Complete two sessions, leave one scheduled: event stays scheduled
    for session in &sessions[..2] {
        lifecycle
            .change_session_status(&organizer(), session.id, LifecycleStatus::Ongoing)
            .await
            .expect("Failed to start session");
        lifecycle
            .change_session_status(&organizer(), session.id, LifecycleStatus::Completed)
            .await
            .expect("Failed to complete session");
    }
    let event_now = lifecycle.get_event(event.id).await.expect("Failed to get event");
    assert_eq!(event_now.status, LifecycleStatus::Scheduled);

    // Deleting the scheduled session leaves only terminal ones: completed
    lifecycle
        .delete_session(&organizer(), sessions[2].id)
        .await
        .expect("Failed to delete session");
    let event_now = lifecycle.get_event(event.id).await.expect("Failed to get event");
    assert_eq!(event_now.status, LifecycleStatus::Completed);
}

#[tokio::test]
#[serial]
async fn test_delete_event_requires_admin() {
    let Some(app) = setup_app().await else { return };
    let lifecycle = &app.services.lifecycle_service;

    let event = lifecycle
        .create_event(&organizer(), one_day_event("À supprimer"))
        .await
        .expect("Failed to create event");

    let result = lifecycle.delete_event(&organizer(), event.id).await;
    assert!(matches!(result, Err(EmargeError::Forbidden(_))));

    lifecycle
        .delete_event(&admin(), event.id)
        .await
        .expect("Admin should delete the event");
    let result = lifecycle.get_event(event.id).await;
    assert!(matches!(result, Err(EmargeError::EventNotFound { .. })));
}

#[tokio::test]
#[serial]
async fn test_cancellation_notifies_admins_of_organizer_action() {
    let Some(app) = setup_app().await else { return };

    // Wire a recording sink in place of the default log notifier
    let recorder = Arc::new(RecordingNotifier::default());
    let settings = test_settings(&app.db.database_url);
    let notifications = NotificationService::with_notifier(recorder.clone(), &settings);
    let lifecycle = LifecycleService::new(app.database.clone(), notifications);

    let event = lifecycle
        .create_event(&organizer(), one_day_event("Annulation annoncée"))
        .await
        .expect("Failed to create event");
    lifecycle
        .change_event_status(&organizer(), event.id, LifecycleStatus::Cancelled)
        .await
        .expect("Failed to cancel event");

    assert_eq!(recorder.kinds(), vec!["event_created", "event_cancelled"]);
    // Organizer actions notify the configured administrators
    assert_eq!(
        recorder.recipients_of("event_cancelled"),
        vec![ADMIN_ID, SECOND_ADMIN_ID]
    );
}
