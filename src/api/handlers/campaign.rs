//! Campaign handlers: list, detail, time series.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    CampaignDetailResponse, CampaignDto, CampaignListResponse, CampaignQuery, PaginationParams,
    TimeSeriesQuery, TimeSeriesResponse,
};
use crate::app_state::AppState;
use crate::domain::timeseries::MAX_INTERVAL_DAYS;
use crate::domain::{Address, CampaignFilter, CampaignId, SortKey, StatusFilter};
use crate::error::{AnalyticsError, ErrorResponse};

/// Forecast length when the query leaves it unset.
pub const DEFAULT_FORECAST_DAYS: usize = 7;

/// Longest forecast a request may ask for.
pub const MAX_FORECAST_DAYS: usize = 365;

/// `GET /campaigns` lists campaigns with filtering, sorting and pagination.
///
/// # Errors
///
/// Returns [`AnalyticsError`] on a bad sort key or status, or when the
/// ledger is unavailable.
#[utoipa::path(
    get,
    path = "/api/v1/campaigns",
    tag = "Campaigns",
    summary = "List campaigns",
    description = "Returns campaigns filtered by status, search text and owner, ordered by the requested sort key. Ties are broken by ascending campaign id.",
    params(CampaignQuery),
    responses(
        (status = 200, description = "Paginated campaign list", body = CampaignListResponse),
        (status = 400, description = "Unknown sort key or status filter", body = ErrorResponse),
        (status = 503, description = "Ledger not initialized", body = ErrorResponse),
    )
)]
pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<CampaignQuery>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let (filter, sort) = parse_listing(&query)?;
    let pagination = PaginationParams {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };

    let listing = state.analytics.list_campaigns(&filter, sort).await?;
    let (page, meta) = pagination.paginate(listing.campaigns);
    let now = Utc::now();

    Ok(Json(CampaignListResponse {
        data: page
            .iter()
            .map(|c| CampaignDto::from_campaign(c, now))
            .collect(),
        pagination: meta,
        sort: sort.to_string(),
        rejected_records: listing.rejected.len(),
    }))
}

/// `GET /campaigns/{id}` returns one campaign with its donations.
///
/// # Errors
///
/// Returns [`AnalyticsError::CampaignNotFound`] if no campaign has this id.
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{id}",
    tag = "Campaigns",
    summary = "Get campaign detail",
    description = "Returns the campaign, its donation history, totals and top supporters. `partial` is set when the donation history could not be read.",
    params(("id" = u64, Path, description = "Campaign index")),
    responses(
        (status = 200, description = "Campaign detail", body = CampaignDetailResponse),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 503, description = "Ledger not initialized", body = ErrorResponse),
    )
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let detail = state.analytics.campaign_detail(CampaignId::new(id)).await?;
    Ok(Json(CampaignDetailResponse::from(&detail)))
}

/// `GET /campaigns/{id}/timeseries` buckets one campaign's donations.
///
/// # Errors
///
/// Returns [`AnalyticsError`] on invalid parameters or an unknown campaign.
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{id}/timeseries",
    tag = "Campaigns",
    summary = "Campaign donation time series",
    description = "Buckets the campaign's donations into fixed intervals with running totals and a least-squares forecast.",
    params(("id" = u64, Path, description = "Campaign index"), TimeSeriesQuery),
    responses(
        (status = 200, description = "Time series with forecast", body = TimeSeriesResponse),
        (status = 400, description = "Invalid interval or forecast length", body = ErrorResponse),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 503, description = "Ledger not initialized", body = ErrorResponse),
    )
)]
pub async fn campaign_timeseries(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<TimeSeriesQuery>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let (interval_days, forecast_days) = parse_series(&query)?;
    let report = state
        .analytics
        .campaign_time_series(CampaignId::new(id), interval_days, forecast_days)
        .await?;
    Ok(Json(TimeSeriesResponse::from(&report)))
}

/// Turns listing query strings into a filter and sort key.
pub(crate) fn parse_listing(
    query: &CampaignQuery,
) -> Result<(CampaignFilter, SortKey), AnalyticsError> {
    let sort = match query.sort.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw
            .parse::<SortKey>()
            .map_err(|e| AnalyticsError::InvalidSortKey(e.0))?,
        _ => SortKey::default(),
    };
    let status = match query.status.as_deref() {
        Some(raw) => raw
            .parse::<StatusFilter>()
            .map_err(AnalyticsError::InvalidRequest)?,
        None => StatusFilter::All,
    };
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let owner = query.owner.as_deref().and_then(Address::parse);
    Ok((
        CampaignFilter {
            status,
            search,
            owner,
        },
        sort,
    ))
}

/// Validates time-series knobs; `None` interval means the configured default.
pub(crate) fn parse_series(query: &TimeSeriesQuery) -> Result<(Option<u32>, usize), AnalyticsError> {
    if query
        .interval_days
        .is_some_and(|days| days == 0 || days > MAX_INTERVAL_DAYS)
    {
        return Err(AnalyticsError::InvalidRequest(format!(
            "interval_days must be between 1 and {MAX_INTERVAL_DAYS}"
        )));
    }
    let forecast_days = query.forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS);
    if forecast_days > MAX_FORECAST_DAYS {
        return Err(AnalyticsError::InvalidRequest(format!(
            "forecast_days must be at most {MAX_FORECAST_DAYS}"
        )));
    }
    Ok((query.interval_days, forecast_days))
}

/// Campaign routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/campaigns", get(list_campaigns))
        .route("/campaigns/{id}", get(get_campaign))
        .route("/campaigns/{id}/timeseries", get(campaign_timeseries))
}
