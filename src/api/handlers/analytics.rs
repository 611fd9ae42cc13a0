//! Platform analytics handlers: dashboard, leaderboard, time series, profiles.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use super::campaign::parse_series;
use crate::api::dto::{
    DashboardResponse, LeaderboardQuery, LeaderboardResponse, ProfileResponse, TimeSeriesQuery,
    TimeSeriesResponse,
};
use crate::app_state::AppState;
use crate::domain::Address;
use crate::error::{AnalyticsError, ErrorResponse};

/// Largest leaderboard a request may ask for.
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

/// `GET /analytics/dashboard` returns platform-wide totals.
///
/// # Errors
///
/// Returns [`AnalyticsError::Fetch`] when campaigns cannot be read.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/dashboard",
    tag = "Analytics",
    summary = "Platform dashboard",
    description = "Campaign counts, funding totals, donor statistics and top donors. Before the ledger is initialized every figure is zero and `ready` is false. Campaigns whose donations could not be read count as zero and are listed in `failed_campaigns`.",
    responses(
        (status = 200, description = "Dashboard figures", body = DashboardResponse),
        (status = 502, description = "Ledger backend error", body = ErrorResponse),
    )
)]
pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, AnalyticsError> {
    let summary = state.analytics.dashboard().await?;
    Ok(Json(DashboardResponse::from(&summary)))
}

/// `GET /analytics/leaderboard` ranks donors by total donated.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidRequest`] for a limit outside
/// `1..=100`.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/leaderboard",
    tag = "Analytics",
    summary = "Donor leaderboard",
    description = "Donors ordered by total donated, descending. Equal totals are ordered by ascending address.",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked donors", body = LeaderboardResponse),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
    )
)]
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AnalyticsError> {
    if query
        .limit
        .is_some_and(|limit| limit == 0 || limit > MAX_LEADERBOARD_LIMIT)
    {
        return Err(AnalyticsError::InvalidRequest(format!(
            "limit must be between 1 and {MAX_LEADERBOARD_LIMIT}"
        )));
    }
    let board = state.analytics.leaderboard(query.limit).await?;
    Ok(Json(LeaderboardResponse::from(&board)))
}

/// `GET /analytics/timeseries` buckets every donation on the platform.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidRequest`] on out-of-range parameters.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/timeseries",
    tag = "Analytics",
    summary = "Platform donation time series",
    description = "Buckets all donations into fixed intervals with running totals and a least-squares forecast.",
    params(TimeSeriesQuery),
    responses(
        (status = 200, description = "Time series with forecast", body = TimeSeriesResponse),
        (status = 400, description = "Invalid interval or forecast length", body = ErrorResponse),
    )
)]
pub async fn platform_timeseries(
    State(state): State<AppState>,
    Query(query): Query<TimeSeriesQuery>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let (interval_days, forecast_days) = parse_series(&query)?;
    let report = state
        .analytics
        .platform_time_series(interval_days, forecast_days)
        .await?;
    Ok(Json(TimeSeriesResponse::from(&report)))
}

/// `GET /profiles/{address}` returns an address's campaigns and donations.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidRequest`] for a blank address.
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{address}",
    tag = "Analytics",
    summary = "User profile",
    description = "Campaigns created by the address (newest first) and the campaigns it donated to (largest first).",
    params(("address" = String, Path, description = "Account address")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 400, description = "Invalid address", body = ErrorResponse),
        (status = 503, description = "Ledger not initialized", body = ErrorResponse),
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let address = parse_address(&address)?;
    let profile = state.analytics.profile(address).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

/// Parses a path address, rejecting blanks.
pub(crate) fn parse_address(raw: &str) -> Result<Address, AnalyticsError> {
    Address::parse(raw)
        .ok_or_else(|| AnalyticsError::InvalidRequest("address must not be empty".to_string()))
}

/// Analytics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/dashboard", get(dashboard))
        .route("/analytics/leaderboard", get(leaderboard))
        .route("/analytics/timeseries", get(platform_timeseries))
        .route("/profiles/{address}", get(profile))
}
