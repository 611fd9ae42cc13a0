//! REST endpoint handlers organized by resource.

pub mod analytics;
pub mod bookmark;
pub mod campaign;
pub mod metrics;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(campaign::routes())
        .merge(analytics::routes())
        .merge(metrics::routes())
        .merge(bookmark::routes())
}
