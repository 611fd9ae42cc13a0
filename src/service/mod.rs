//! Service layer: business logic orchestration.
//!
//! [`AnalyticsService`] reads through the [`crate::domain::LedgerHandle`]
//! and runs the normalizer, aggregator and view engines for each request.
//! [`BookmarkService`] owns the presentation-side bookmark state.

pub mod analytics_service;
pub mod bookmark_service;

pub use analytics_service::{AnalyticsService, AnalyticsSettings};
pub use bookmark_service::BookmarkService;
