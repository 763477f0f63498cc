//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod attendance;
pub mod certificate;
pub mod event;
pub mod participant;
pub mod session;

// Re-export repositories
pub use attendance::AttendanceRepository;
pub use certificate::CertificateRepository;
pub use event::EventRepository;
pub use participant::ParticipantRepository;
pub use session::SessionRepository;

/// True when `err` is a unique-constraint violation on the named constraint.
///
/// The store constraint is the authoritative mutual-exclusion mechanism for
/// duplicate check-ins, certificates and identity keys; repositories use this
/// to translate the write-time error into a domain `Conflict`.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation()
                && db_err.constraint().map_or(true, |name| name == constraint)
        }
        _ => false,
    }
}
