//! System endpoints: health check, sort-key catalog.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::SortKey;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    ledger_ready: bool,
    ledger_backend: Option<String>,
    timestamp: String,
    version: String,
}

/// `GET /health` reports service health and ledger readiness.
///
/// Always 200: a not-yet-initialized ledger is reported as `"starting"`.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service status, ledger readiness, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.analytics.ledger_handle().get().await;
    let status = if ledger.is_some() { "healthy" } else { "starting" };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: status.to_string(),
            ledger_ready: ledger.is_some(),
            ledger_backend: ledger.map(|l| l.backend_name().to_string()),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Supported sort key info.
#[derive(Debug, Serialize, ToSchema)]
struct SortKeyInfo {
    key: &'static str,
    description: &'static str,
}

/// `GET /config/sort-keys` lists the accepted `sort` values.
#[utoipa::path(
    get,
    path = "/config/sort-keys",
    tag = "System",
    summary = "List sort keys",
    description = "Returns every value accepted by the `sort` parameter of the campaign list. Ties are always broken by ascending campaign id.",
    responses(
        (status = 200, description = "Sort key catalog", body = Vec<SortKeyInfo>),
    )
)]
pub async fn sort_keys_handler() -> impl IntoResponse {
    let keys: Vec<SortKeyInfo> = SortKey::ALL
        .into_iter()
        .map(|key| SortKeyInfo {
            key: key.as_str(),
            description: describe(key),
        })
        .collect();
    (StatusCode::OK, Json(keys))
}

fn describe(key: SortKey) -> &'static str {
    match key {
        SortKey::Newest => "Most recently created first",
        SortKey::Oldest => "Earliest created first",
        SortKey::EndingSoon => "Nearest deadline first",
        SortKey::MostFunded => "Largest amount collected first",
        SortKey::LeastFunded => "Smallest amount collected first",
        SortKey::PercentFunded => "Highest share of target first; zero targets last",
        SortKey::Alphabetical => "Title A to Z, case-insensitive",
    }
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/sort-keys", get(sort_keys_handler))
}
