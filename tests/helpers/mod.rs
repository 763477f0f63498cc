//! Test helpers module
//!
//! This module provides utilities and helpers for testing the emarge engine:
//! database provisioning, service construction and test data builders.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_data;

pub use database_helper::*;
pub use test_data::*;
