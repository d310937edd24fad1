//! Wallet auth server
//!
//! Serves the nonce/login endpoints over HTTP, backed by PostgreSQL.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;

use nonce_auth_server::{
    auth::{AuthService, TokenIssuer},
    config::Config,
    db, middleware, routes,
    state::AppState,
    store::PgNonceStore,
};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    if let Err(e) = run(config).await {
        tracing::error!(error = ?e, "Server failed to start");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!(environment = config.environment.as_str(), "Starting auth server");

    let tokens = TokenIssuer::new(&config.jwt_secret, config.jwt_ttl_seconds)
        .context("invalid token configuration")?;

    let db_pool = db::create_pool(&config).await?;
    db::run_migrations(&db_pool).await?;
    db::check_health(&db_pool).await?;
    tracing::info!("Database connected successfully");

    let auth_service = Arc::new(AuthService::new(
        Arc::new(PgNonceStore::new(db_pool)),
        tokens,
        config.store_timeout,
    ));

    let mut app = routes::app_router(AppState::new(auth_service))
        .layer(middleware::cors_layer(&config.cors_allowed_origins));
    if config.environment.is_production() {
        app = app.layer(axum::middleware::from_fn(middleware::hsts_header));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
