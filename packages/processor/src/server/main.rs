// Main entry point for the job processor service

use std::sync::Arc;

use anyhow::{Context, Result};
use processor_core::kernel::{
    create_text_generator, BaseDocumentStore, MemoryDocumentStore, PostgresDocumentStore,
    ServerDeps,
};
use processor_core::server::{build_app, shutdown_signal};
use processor_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize logging (RUST_LOG wins over LOG_LEVEL)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},processor_core=debug,sqlx=warn", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Application startup...");

    // Document store
    let store: Arc<dyn BaseDocumentStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let store = PostgresDocumentStore::new(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connected");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory document store");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    // Text generator
    let generator =
        create_text_generator(&config).context("Failed to initialize text generator")?;

    let deps = ServerDeps::new(store, generator).with_config(&config);
    let app = build_app(deps);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Push endpoint: http://localhost:{}/pubsub/push", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Application shutdown...");
    Ok(())
}
