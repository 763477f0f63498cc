//! Signature payload validation
//!
//! Check-in signatures arrive as `data:image/(png|jpeg|jpg);base64,<data>`
//! URIs captured on-device. This module parses the declared mime, decodes the
//! payload and enforces the configured size bound. Rendering and storage of
//! the image are outside the engine.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::attendance::SignatureFormat;
use crate::utils::errors::{EmargeError, Result};

static SIGNATURE_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/(png|jpeg|jpg);base64,([A-Za-z0-9+/=\r\n]+)$")
        .expect("signature data-URI pattern is valid")
});

/// A validated signature payload.
#[derive(Debug, Clone)]
pub struct DecodedSignature {
    pub format: SignatureFormat,
    pub byte_len: usize,
}

/// Validate a signature data URI against the configured size bound.
///
/// The decoded bytes are not retained; the attendance row stores the original
/// URI and the derived format, which is all the export layer needs.
pub fn validate_signature(data_uri: &str, max_bytes: usize) -> Result<DecodedSignature> {
    let captures = SIGNATURE_URI.captures(data_uri).ok_or_else(|| {
        EmargeError::Validation(
            "signature must be a data:image/(png|jpeg|jpg);base64 URI".to_string(),
        )
    })?;

    let format = match &captures[1] {
        "jpeg" | "jpg" => SignatureFormat::Jpeg,
        _ => SignatureFormat::Png,
    };

    let payload: String = captures[2]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let decoded = STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| EmargeError::Validation(format!("signature payload is not base64: {}", e)))?;

    if decoded.is_empty() {
        return Err(EmargeError::Validation(
            "signature payload is empty".to_string(),
        ));
    }
    if decoded.len() > max_bytes {
        return Err(EmargeError::Validation(format!(
            "signature exceeds maximum size: {} > {} bytes",
            decoded.len(),
            max_bytes
        )));
    }

    Ok(DecodedSignature {
        format,
        byte_len: decoded.len(),
    })
}
