//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{AnalyticsService, BookmarkService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Read-only analytics over the ledger.
    pub analytics: Arc<AnalyticsService>,
    /// Per-user bookmarks.
    pub bookmarks: Arc<BookmarkService>,
}
