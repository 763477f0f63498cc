//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub qr: QrConfig,
    pub checkin: CheckInConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// QR code configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QrConfig {
    /// Base URL the check-in links are built on, e.g. `https://emarge.example.org`.
    pub public_base_url: String,
    pub token_length: usize,
}

/// Check-in configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckInConfig {
    /// Upper bound on the decoded signature image size, in bytes.
    pub max_signature_bytes: usize,
}

/// Notification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Administrators notified when an organizer acts on an event.
    pub admin_ids: Vec<i64>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory the rolling log files are written to.
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("EMARGE"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load settings from an explicit TOML file, without environment overrides.
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::EmargeError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/emarge".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            qr: QrConfig {
                public_base_url: "http://localhost:8080".to_string(),
                token_length: 32,
            },
            checkin: CheckInConfig {
                max_signature_bytes: 100 * 1024,
            },
            notifications: NotificationConfig { admin_ids: vec![] },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/emarge".to_string(),
            },
        }
    }
}
