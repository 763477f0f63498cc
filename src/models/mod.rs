//! Data models module
//!
//! This module contains all data structures used throughout the engine

pub mod actor;
pub mod attendance;
pub mod certificate;
pub mod event;
pub mod participant;
pub mod session;
pub mod status;

// Re-export commonly used models
pub use actor::{Actor, ActorRole};
pub use attendance::{
    Attendance, CheckInMode, CheckInRecord, CheckInRequest, NewAttendance, SignatureFormat,
};
pub use certificate::{
    BulkCertificateOutcome, Certificate, CertificateIssueRequest, NewCertificate,
};
pub use event::{CreateEventRequest, Event, EventOverview, UpdateEventRequest};
pub use participant::{
    IdentityKey, IdentityResolution, Participant, ParticipantDetails,
};
pub use session::{
    CreateSessionRequest, NewSession, QrValidation, Session, SessionGenerationReport,
    SessionSummary, UpdateSessionRequest,
};
pub use status::{derive_event_status, EventStatus, LifecycleStatus, SessionStatus};
