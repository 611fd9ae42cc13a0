//! crowdfund-analytics server entry point.
//!
//! Loads configuration, installs the ledger backend and serves the REST API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crowdfund_analytics::api;
use crowdfund_analytics::app_state::AppState;
use crowdfund_analytics::config::{AnalyticsConfig, LedgerBackend, LogFormat};
use crowdfund_analytics::domain::{Ledger, LedgerHandle, Normalizer};
use crowdfund_analytics::persistence::{InMemoryKvStore, InMemoryLedger, PostgresLedger};
use crowdfund_analytics::service::{AnalyticsService, BookmarkService};

const MAX_CONNECT_BACKOFF: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config =
        AnalyticsConfig::from_env().map_err(|e| anyhow::anyhow!("loading configuration: {e}"))?;

    init_tracing(config.log_format);
    tracing::info!(
        addr = %config.listen_addr,
        backend = ?config.ledger_backend,
        "starting crowdfund-analytics"
    );

    // Ledger slot starts empty; reads degrade until a backend is installed
    let ledger = LedgerHandle::new();
    match config.ledger_backend {
        LedgerBackend::Memory => {
            let normalizer = Normalizer::new(config.token_decimals);
            let memory = match &config.ledger_seed_file {
                Some(path) => InMemoryLedger::load(path, normalizer)
                    .await
                    .with_context(|| format!("loading ledger seed {}", path.display()))?,
                None => {
                    tracing::warn!("LEDGER_SEED_FILE not set; serving an empty ledger");
                    InMemoryLedger::new(normalizer)
                }
            };
            ledger.install(Arc::new(memory)).await;
        }
        LedgerBackend::Postgres => {
            tokio::spawn(connect_postgres(config.clone(), ledger.clone()));
        }
    }

    // Build service layer
    let analytics = Arc::new(AnalyticsService::from_config(&config, ledger));
    let bookmarks = Arc::new(BookmarkService::new(Arc::new(InMemoryKvStore::new())));
    let app_state = AppState {
        analytics,
        bookmarks,
    };

    let app = api::build_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    config.request_timeout(),
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Connects to PostgreSQL with exponential backoff, then installs the
/// ledger. Runs until it succeeds.
async fn connect_postgres(config: AnalyticsConfig, handle: LedgerHandle) {
    let mut backoff = Duration::from_secs(1);
    loop {
        match PostgresLedger::connect(&config).await {
            Ok(ledger) => {
                let migrated = if config.database_run_migrations {
                    ledger.migrate().await
                } else {
                    Ok(())
                };
                if let Err(e) = migrated {
                    tracing::error!(error = %e, "database migration failed");
                    return;
                }
                let ledger: Arc<dyn Ledger> = Arc::new(ledger);
                handle.install(ledger).await;
                tracing::info!("postgres ledger ready");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, retry_in = ?backoff, "postgres ledger unavailable");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_CONNECT_BACKOFF);
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
