//! OpenAPI document covering every REST endpoint.

use utoipa::OpenApi;

use super::handlers::{analytics, bookmark, campaign, metrics, system};

/// Path the OpenAPI JSON document is served at.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Generated OpenAPI description of the service.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "crowdfund-analytics",
        description = "Read-only aggregation and derived metrics over a crowdfunding contract ledger."
    ),
    paths(
        system::health_handler,
        system::sort_keys_handler,
        campaign::list_campaigns,
        campaign::get_campaign,
        campaign::campaign_timeseries,
        analytics::dashboard,
        analytics::leaderboard,
        analytics::platform_timeseries,
        analytics::profile,
        metrics::success_rate,
        metrics::financial,
        metrics::engagement,
        bookmark::list_bookmarks,
        bookmark::add_bookmark,
        bookmark::remove_bookmark,
    ),
    tags(
        (name = "System", description = "Health and configuration"),
        (name = "Campaigns", description = "Campaign listing, detail and history"),
        (name = "Analytics", description = "Platform-wide aggregates and profiles"),
        (name = "Metrics", description = "Stateless ratio calculators"),
        (name = "Bookmarks", description = "Per-user bookmarked campaigns"),
    )
)]
pub struct ApiDoc;
