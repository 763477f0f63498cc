//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{EmargeError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_qr_config(&settings.qr)?;
    validate_checkin_config(&settings.checkin)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EmargeError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(EmargeError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EmargeError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate QR configuration
fn validate_qr_config(config: &super::QrConfig) -> Result<()> {
    if config.public_base_url.is_empty() {
        return Err(EmargeError::Config(
            "QR public base URL is required".to_string(),
        ));
    }

    url::Url::parse(&config.public_base_url).map_err(|e| {
        EmargeError::Config(format!("QR public base URL is not a valid URL: {}", e))
    })?;

    if config.token_length < 16 {
        return Err(EmargeError::Config(
            "QR token length must be at least 16 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate check-in configuration
fn validate_checkin_config(config: &super::CheckInConfig) -> Result<()> {
    if config.max_signature_bytes == 0 {
        return Err(EmargeError::Config(
            "Max signature size must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EmargeError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(EmargeError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}
