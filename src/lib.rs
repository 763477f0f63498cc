//! Emarge attendance engine
//!
//! A lifecycle and consistency engine for multi-day event attendance.
//! This library provides modular components for event and session lifecycle
//! management, QR-token based check-in, participant identity resolution,
//! and attendance certificate issuance.

pub mod config;
pub mod services;
pub mod models;
pub mod database;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EmargeError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
