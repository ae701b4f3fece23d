use std::sync::Arc;

use anyhow::Context;
use storage::services::AccessPolicy;
use storage::{Database, MemoryRegistry, PgRegistry, Registry, RegistryEvent};
use tokio::sync::broadcast;
use web::config::Config;
use web::middleware::auth::ApiKeys;
use web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting competition registry API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let policy = AccessPolicy::new(config.registry_owner.clone(), config.vote_visibility);
    if config.registry_owner.is_none() {
        tracing::warn!("REGISTRY_OWNER is not set, deactivation is disabled");
    }

    let registry: Arc<dyn Registry> = match &config.database_url {
        Some(database_url) => {
            tracing::info!(
                "Connecting to database at: {}",
                database_url.split('@').next_back().unwrap_or("unknown")
            );
            let db = Database::new(database_url)
                .await
                .context("Failed to initialize database")?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations");
            db.run_migrations()
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Database migrations completed successfully");

            Arc::new(PgRegistry::new(db, policy))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, using the in-memory registry");
            Arc::new(MemoryRegistry::new(policy))
        }
    };

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("No API keys configured, every mutating endpoint will reject requests");
    } else {
        tracing::info!("Loaded {} API keys", api_keys.len());
    }

    tokio::spawn(log_events(registry.subscribe()));

    let app = web::router(AppState::new(registry, api_keys));

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn log_events(mut receiver: broadcast::Receiver<RegistryEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => tracing::info!(
                event = event.name(),
                competition_id = event.competition_id(),
                "registry event"
            ),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "event logger lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
