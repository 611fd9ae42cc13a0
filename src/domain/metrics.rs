//! Ratio calculators for dashboards.
//!
//! Every function returns finite values. Where a denominator is not
//! positive the affected ratio is `0.0`; the guarded cases are part of each
//! function's contract rather than an error path.

use serde::Serialize;

/// Percentage of the target collected, clamped to `0..=100`.
///
/// A non-positive target yields `0.0`.
#[must_use]
pub fn success_rate(target: f64, collected: f64) -> f64 {
    if !target.is_finite() || target <= 0.0 || !collected.is_finite() {
        return 0.0;
    }
    finite_or_zero(collected / target * 100.0).clamp(0.0, 100.0)
}

/// Cost efficiency of a campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FinancialMetrics {
    /// Costs as a percentage of the amount raised.
    pub cost_to_raise_ratio: f64,
    /// Net proceeds as a percentage of costs.
    pub return_on_investment: f64,
    /// Amount raised as a percentage of the target (not clamped).
    pub target_efficiency: f64,
    /// Amount raised minus costs.
    pub net_proceeds: f64,
}

/// Computes [`FinancialMetrics`] for `(raised, target, costs)`.
///
/// `raised <= 0` yields all zeros. With positive `raised`, a non-positive
/// `costs` zeroes the ROI and a non-positive `target` zeroes the target
/// efficiency.
#[must_use]
pub fn financial_metrics(raised: f64, target: f64, costs: f64) -> FinancialMetrics {
    if !raised.is_finite() || raised <= 0.0 {
        return FinancialMetrics::default();
    }
    let costs = if costs.is_finite() { costs } else { 0.0 };
    let net_proceeds = raised - costs;
    FinancialMetrics {
        cost_to_raise_ratio: finite_or_zero(costs / raised * 100.0),
        return_on_investment: if costs > 0.0 {
            finite_or_zero(net_proceeds / costs * 100.0)
        } else {
            0.0
        },
        target_efficiency: if target > 0.0 {
            finite_or_zero(raised / target * 100.0)
        } else {
            0.0
        },
        net_proceeds,
    }
}

/// Audience engagement ratios, all in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EngagementMetrics {
    /// Donors per view.
    pub conversion_rate: f64,
    /// Shares per view.
    pub share_rate: f64,
    /// Donors per share.
    pub share_to_conversion_rate: f64,
}

/// Computes [`EngagementMetrics`] for `(views, donors, shares)`.
///
/// `views <= 0` yields all zeros; `shares <= 0` zeroes the
/// share-to-conversion rate.
#[must_use]
pub fn engagement_metrics(views: f64, donors: f64, shares: f64) -> EngagementMetrics {
    if !views.is_finite() || views <= 0.0 {
        return EngagementMetrics::default();
    }
    EngagementMetrics {
        conversion_rate: finite_or_zero(donors / views * 100.0),
        share_rate: finite_or_zero(shares / views * 100.0),
        share_to_conversion_rate: if shares > 0.0 {
            finite_or_zero(donors / shares * 100.0)
        } else {
            0.0
        },
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
