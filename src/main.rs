//! Emarge attendance engine
//!
//! Main application entry point: provisions the store, verifies
//! connectivity and reports the table counts.

use tracing::info;

use emarge::{
    config::Settings,
    database::{
        connection::{create_pool, health_check, run_migrations, DatabaseConfig},
        DatabaseService,
    },
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment overrides may live in a local .env file
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard must outlive main for the file appender
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting emarge v{}...", emarge::VERSION);

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = DatabaseConfig::from_settings(&settings.database);
    let db_pool = create_pool(&db_config).await?;

    // Run database migrations
    run_migrations(&db_pool).await?;
    health_check(&db_pool).await?;

    // Initialize database service and business services
    let database_service = DatabaseService::new(db_pool);
    let services = ServiceFactory::new(database_service.clone(), settings);

    let counts = database_service.store_counts().await?;
    info!(counts = %counts, "Store provisioned");
    info!(
        admin_ids = services.notification_service.admin_count(),
        "emarge is ready"
    );

    Ok(())
}
