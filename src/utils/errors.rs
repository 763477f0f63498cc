//! Error handling for the emarge engine
//!
//! This module defines the error taxonomy surfaced to callers of the engine
//! and provides a unified error handling strategy. Nothing is silently
//! swallowed; the transport layer maps [`ErrorKind`] onto its own status
//! codes.

use thiserror::Error;

/// Main error type for emarge operations
#[derive(Error, Debug)]
pub enum EmargeError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: i64 },

    #[error("Participant not found: {participant_id}")]
    ParticipantNotFound { participant_id: i64 },

    #[error("Attendance not found: {attendance_id}")]
    AttendanceNotFound { attendance_id: i64 },

    #[error("Certificate not found: {certificate_id}")]
    CertificateNotFound { certificate_id: i64 },

    #[error("Unknown or expired QR token")]
    QrTokenNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Illegal {entity} transition: {from} -> {to}")]
    IllegalStateTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for emarge operations
pub type Result<T> = std::result::Result<T, EmargeError>;

/// Coarse classification used by the transport layer to pick a response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Forbidden,
    IllegalStateTransition,
    Internal,
}

impl EmargeError {
    /// Classify the error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EmargeError::EventNotFound { .. }
            | EmargeError::SessionNotFound { .. }
            | EmargeError::ParticipantNotFound { .. }
            | EmargeError::AttendanceNotFound { .. }
            | EmargeError::CertificateNotFound { .. }
            | EmargeError::QrTokenNotFound => ErrorKind::NotFound,
            EmargeError::Validation(_) => ErrorKind::Validation,
            EmargeError::Conflict(_) => ErrorKind::Conflict,
            EmargeError::Forbidden(_) => ErrorKind::Forbidden,
            EmargeError::IllegalStateTransition { .. } => ErrorKind::IllegalStateTransition,
            EmargeError::Database(_)
            | EmargeError::Migration(_)
            | EmargeError::Config(_)
            | EmargeError::Serialization(_)
            | EmargeError::UrlParse(_)
            | EmargeError::Io(_) => ErrorKind::Internal,
        }
    }

    /// Whether the failure is a caller mistake rather than an engine fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "NOT_FOUND"),
            ErrorKind::Validation => write!(f, "VALIDATION"),
            ErrorKind::Conflict => write!(f, "CONFLICT"),
            ErrorKind::Forbidden => write!(f, "FORBIDDEN"),
            ErrorKind::IllegalStateTransition => write!(f, "ILLEGAL_STATE_TRANSITION"),
            ErrorKind::Internal => write!(f, "INTERNAL"),
        }
    }
}
