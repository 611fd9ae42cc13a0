//! Bookmark DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// A user's bookmarked campaigns.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookmarksResponse {
    /// User address.
    pub user: String,
    /// Bookmarked campaign indices, ascending.
    pub campaign_ids: Vec<u64>,
}

/// Result of removing a bookmark.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookmarkRemovedResponse {
    /// User address.
    pub user: String,
    /// Campaign index.
    pub campaign_id: u64,
    /// Whether the bookmark existed.
    pub removed: bool,
}
