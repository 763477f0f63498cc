//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging
//! utilities for the emarge engine.

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration.
///
/// Returns the appender guard; dropping it stops the background writer, so
/// the caller must keep it alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "emarge.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a successful check-in with structured data
pub fn log_check_in(event_id: i64, session_id: i64, participant_id: i64, attendance_id: i64) {
    info!(
        event_id = event_id,
        session_id = session_id,
        participant_id = participant_id,
        attendance_id = attendance_id,
        "Participant checked in"
    );
}

/// Log a lifecycle status change
pub fn log_status_change(entity: &str, id: i64, from: &str, to: &str, actor_id: i64) {
    info!(
        entity = entity,
        id = id,
        from = from,
        to = to,
        actor_id = actor_id,
        "Status changed"
    );
}

/// Log admin actions (kept at warn level so they stand out in aggregates)
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        "Admin action performed"
    );
}
