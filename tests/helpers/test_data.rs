//! Test data helpers for creating test objects
//!
//! This module provides builder functions for requests and participant
//! details, fixed actor identities, and a recording notification sink for
//! asserting on dispatched notifications.

use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{NaiveDate, NaiveTime};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use uuid::Uuid;

use emarge::config::Settings;
use emarge::models::actor::Actor;
use emarge::models::attendance::CheckInRequest;
use emarge::models::event::CreateEventRequest;
use emarge::models::participant::ParticipantDetails;
use emarge::models::session::CreateSessionRequest;
use emarge::services::notification::{Notification, Notifier};
use emarge::utils::errors::Result as EmargeResult;

pub const ADMIN_ID: i64 = 9001;
pub const SECOND_ADMIN_ID: i64 = 9002;
pub const ORGANIZER_ID: i64 = 501;
pub const OTHER_ORGANIZER_ID: i64 = 502;

/// Settings pointing at the test database, with two known administrators
pub fn test_settings(database_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.database.url = database_url.to_string();
    settings.notifications.admin_ids = vec![ADMIN_ID, SECOND_ADMIN_ID];
    settings
}

pub fn admin() -> Actor {
    Actor::admin(ADMIN_ID)
}

pub fn organizer() -> Actor {
    Actor::organizer(ORGANIZER_ID)
}

pub fn other_organizer() -> Actor {
    Actor::organizer(OTHER_ORGANIZER_ID)
}

/// Build an event creation request; the owner defaults to the actor
pub fn event_request(title: &str, start: NaiveDate, end: Option<NaiveDate>) -> CreateEventRequest {
    CreateEventRequest {
        title: title.to_string(),
        description: Some("Integration test event".to_string()),
        location: Some("Salle des fêtes".to_string()),
        start_date: start,
        end_date: end,
        owner_id: None,
    }
}

/// A three-day event from 2026-06-01 to 2026-06-03
pub fn three_day_event(title: &str) -> CreateEventRequest {
    event_request(
        title,
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        Some(NaiveDate::from_ymd_opt(2026, 6, 3).unwrap()),
    )
}

/// A single-day event on 2026-06-01 with no end date
pub fn one_day_event(title: &str) -> CreateEventRequest {
    event_request(title, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(), None)
}

pub fn session_request(event_id: i64, date: NaiveDate) -> CreateSessionRequest {
    CreateSessionRequest {
        event_id,
        title: None,
        session_date: date,
        start_time: NaiveTime::from_hms_opt(9, 0, 0),
        end_time: NaiveTime::from_hms_opt(17, 0, 0),
        location: None,
    }
}

/// Participant details with random names and the given identifiers
pub fn participant_details(cni: Option<&str>, email: Option<&str>) -> ParticipantDetails {
    ParticipantDetails {
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
        email: email.map(str::to_string),
        phone: None,
        cni_number: cni.map(str::to_string),
        organization: Some("Commune de test".to_string()),
        function: None,
        origin_locality: None,
    }
}

/// A CNI number that will not collide across tests
pub fn random_cni() -> String {
    format!("CNI-{}", &Uuid::new_v4().simple().to_string()[..10])
}

/// An email address that will not collide across tests
pub fn random_email() -> String {
    format!("p-{}@example.org", &Uuid::new_v4().simple().to_string()[..8])
}

/// A small valid PNG signature data URI
pub fn png_signature() -> String {
    format!(
        "data:image/png;base64,{}",
        STANDARD.encode(b"test-signature-strokes")
    )
}

/// A PNG signature data URI whose decoded payload has the given size
pub fn signature_of_size(bytes: usize) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(vec![7u8; bytes]))
}

pub fn check_in_request(
    event_id: i64,
    session_id: i64,
    participant: ParticipantDetails,
) -> CheckInRequest {
    CheckInRequest {
        event_id,
        session_id,
        participant,
        signature: png_signature(),
        notes: None,
    }
}

/// Notification sink that records every dispatch for later assertions
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(Notification, Vec<i64>)>>,
}

impl RecordingNotifier {
    pub fn kinds(&self) -> Vec<&'static str> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(notification, _)| notification.kind())
            .collect()
    }

    pub fn recipients_of(&self, kind: &str) -> Vec<i64> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .find(|(notification, _)| notification.kind() == kind)
            .map(|(_, recipients)| recipients.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn dispatch(&self, notification: &Notification, recipients: &[i64]) -> EmargeResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((notification.clone(), recipients.to_vec()));
        Ok(())
    }
}
