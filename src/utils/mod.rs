//! Utility modules
//!
//! This module contains common utilities used throughout the engine,
//! including error handling, logging setup, signature validation and helper
//! functions.

pub mod errors;
pub mod helpers;
pub mod logging;
pub mod signature;

pub use errors::{EmargeError, ErrorKind, Result};
