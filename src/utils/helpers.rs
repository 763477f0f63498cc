//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the engine.

use chrono::{DateTime, NaiveDate, Utc};

/// Generate a random URL-safe token.
///
/// `rand::thread_rng` is a CSPRNG, so tokens are suitable for the public
/// QR check-in links. The alphabet is alphanumeric only; tokens embed into
/// URLs without any escaping.
pub fn generate_token(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                            abcdefghijklmnopqrstuvwxyz\
                            0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Default title for an auto-generated daily session
pub fn daily_session_title(date: NaiveDate) -> String {
    format!("Session du {}", date.format("%Y-%m-%d"))
}

/// Validate email format (basic validation)
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@') && email.contains('.') && email.len() > 5
}
