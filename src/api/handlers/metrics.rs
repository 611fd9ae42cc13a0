//! Stateless ratio calculators.

use axum::extract::Query;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    EngagementMetricsRequest, EngagementMetricsResponse, FinancialMetricsRequest,
    FinancialMetricsResponse, SuccessRateQuery, SuccessRateResponse,
};
use crate::app_state::AppState;
use crate::domain::metrics;

/// `GET /metrics/success-rate` computes collected over target.
#[utoipa::path(
    get,
    path = "/api/v1/metrics/success-rate",
    tag = "Metrics",
    summary = "Success rate",
    description = "Collected amount as a percentage of the target, clamped to 0..=100. A non-positive target yields 0.",
    params(SuccessRateQuery),
    responses(
        (status = 200, description = "Success rate", body = SuccessRateResponse),
    )
)]
pub async fn success_rate(Query(query): Query<SuccessRateQuery>) -> impl IntoResponse {
    Json(SuccessRateResponse {
        success_rate: metrics::success_rate(query.target, query.collected),
    })
}

/// `POST /metrics/financial` computes cost and return ratios.
#[utoipa::path(
    post,
    path = "/api/v1/metrics/financial",
    tag = "Metrics",
    summary = "Financial metrics",
    description = "Cost-to-raise ratio, ROI, target efficiency and net proceeds. A non-positive amount raised yields all zeros.",
    request_body = FinancialMetricsRequest,
    responses(
        (status = 200, description = "Financial metrics", body = FinancialMetricsResponse),
    )
)]
pub async fn financial(Json(req): Json<FinancialMetricsRequest>) -> impl IntoResponse {
    Json(FinancialMetricsResponse::from(metrics::financial_metrics(
        req.raised, req.target, req.costs,
    )))
}

/// `POST /metrics/engagement` computes audience conversion ratios.
#[utoipa::path(
    post,
    path = "/api/v1/metrics/engagement",
    tag = "Metrics",
    summary = "Engagement metrics",
    description = "Conversion, share and share-to-conversion rates. Zero views yield all zeros.",
    request_body = EngagementMetricsRequest,
    responses(
        (status = 200, description = "Engagement metrics", body = EngagementMetricsResponse),
    )
)]
pub async fn engagement(Json(req): Json<EngagementMetricsRequest>) -> impl IntoResponse {
    Json(EngagementMetricsResponse::from(metrics::engagement_metrics(
        req.views, req.donors, req.shares,
    )))
}

/// Metrics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/metrics/success-rate", get(success_rate))
        .route("/metrics/financial", post(financial))
        .route("/metrics/engagement", post(engagement))
}
