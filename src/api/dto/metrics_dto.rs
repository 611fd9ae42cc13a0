//! Ratio calculator request/response types.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::metrics::{EngagementMetrics, FinancialMetrics};

/// Query parameters for `GET /metrics/success-rate`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuccessRateQuery {
    /// Funding goal.
    pub target: f64,
    /// Amount collected.
    pub collected: f64,
}

/// Success-rate result.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessRateResponse {
    /// Collected share of the target in percent, clamped to 0..=100.
    pub success_rate: f64,
}

/// Request body for `POST /metrics/financial`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FinancialMetricsRequest {
    /// Amount raised.
    pub raised: f64,
    /// Funding goal.
    pub target: f64,
    /// Campaign costs.
    #[serde(default)]
    pub costs: f64,
}

/// Financial ratios. Guarded ratios are `0`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FinancialMetricsResponse {
    /// Costs as a percentage of the amount raised.
    pub cost_to_raise_ratio: f64,
    /// Net proceeds as a percentage of costs.
    pub return_on_investment: f64,
    /// Amount raised as a percentage of the target.
    pub target_efficiency: f64,
    /// Amount raised minus costs.
    pub net_proceeds: f64,
}

impl From<FinancialMetrics> for FinancialMetricsResponse {
    fn from(m: FinancialMetrics) -> Self {
        Self {
            cost_to_raise_ratio: m.cost_to_raise_ratio,
            return_on_investment: m.return_on_investment,
            target_efficiency: m.target_efficiency,
            net_proceeds: m.net_proceeds,
        }
    }
}

/// Request body for `POST /metrics/engagement`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EngagementMetricsRequest {
    /// Page views.
    pub views: f64,
    /// Distinct donors.
    pub donors: f64,
    /// Shares.
    #[serde(default)]
    pub shares: f64,
}

/// Engagement ratios. All zero when there were no views.
#[derive(Debug, Serialize, ToSchema)]
pub struct EngagementMetricsResponse {
    /// Donors per view in percent.
    pub conversion_rate: f64,
    /// Shares per view in percent.
    pub share_rate: f64,
    /// Donors per share in percent.
    pub share_to_conversion_rate: f64,
}

impl From<EngagementMetrics> for EngagementMetricsResponse {
    fn from(m: EngagementMetrics) -> Self {
        Self {
            conversion_rate: m.conversion_rate,
            share_rate: m.share_rate,
            share_to_conversion_rate: m.share_to_conversion_rate,
        }
    }
}
