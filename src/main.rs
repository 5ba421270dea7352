use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use lyceum_api::auth::IdentityVerifier;
use lyceum_api::config::AppConfig;
use lyceum_api::database::{DatabaseManager, PgProfileStore};
use lyceum_api::server::{app, AppState};

#[derive(Parser)]
#[command(name = "lyceum-api")]
#[command(about = "Lyceum onboarding and dashboard API server")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides PORT / SERVER_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SUPABASE_JWT_SECRET, etc.
    if dotenvy::dotenv().is_err() {
        eprintln!("No .env file found, using environment variables");
    }

    lyceum_api::init_tracing();

    let args = Args::parse();
    let config = AppConfig::from_env().context("could not load config")?;
    info!(
        environment = ?config.environment,
        service_key = config.auth.service_key.is_some(),
        "Starting Lyceum API"
    );

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("unable to connect to database")?;
    if config.database.run_migrations {
        DatabaseManager::run_migrations(&pool)
            .await
            .context("failed to apply migrations")?;
    }
    info!("Successfully connected to the database");

    let state = AppState::new(
        IdentityVerifier::new(config.auth.clone()),
        Arc::new(PgProfileStore::new(pool.clone())),
    );
    let router = app(state, &config.api);

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Lyceum API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
