use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use users_api::config::config;
use users_api::database::{DatabaseManager, PgUserRepository};
use users_api::{app, AppState};

#[derive(Parser)]
#[command(name = "users-api")]
#[command(about = "CRUD HTTP API for user records")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Port to listen on (overrides USERS_API_PORT / PORT)")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up POSTGRES_* and DATABASE_URL
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("users_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config();
    tracing::info!("Starting Users API in {:?} mode", config.environment);

    let database = DatabaseManager::connect(&config.database)
        .await
        .context("unable to initialize database sources")?;

    tracing::info!("Injecting dependencies");
    let repository = Arc::new(PgUserRepository::new(database.pool().clone()));
    let router = app(AppState::new(repository), config);

    let port = cli.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    let grace = Duration::from_secs(config.api.shutdown_timeout_secs);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Shutting down server...");
    if tokio::time::timeout(grace, database.close()).await.is_err() {
        tracing::warn!("Database pool did not close within {:?}", grace);
    }

    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
