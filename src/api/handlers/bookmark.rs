//! Bookmark handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use super::analytics::parse_address;
use crate::api::dto::{BookmarkRemovedResponse, BookmarksResponse};
use crate::app_state::AppState;
use crate::domain::CampaignId;
use crate::error::{AnalyticsError, ErrorResponse};

/// `GET /users/{user}/bookmarks` lists a user's bookmarks.
///
/// # Errors
///
/// Returns [`AnalyticsError`] on a blank user or store failure.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user}/bookmarks",
    tag = "Bookmarks",
    summary = "List bookmarks",
    params(("user" = String, Path, description = "User address")),
    responses(
        (status = 200, description = "Bookmarked campaign ids", body = BookmarksResponse),
        (status = 400, description = "Invalid user", body = ErrorResponse),
    )
)]
pub async fn list_bookmarks(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let user = parse_address(&user)?;
    let ids = state.bookmarks.list(&user).await?;
    Ok(Json(BookmarksResponse {
        user: user.to_string(),
        campaign_ids: ids.into_iter().map(CampaignId::get).collect(),
    }))
}

/// `PUT /users/{user}/bookmarks/{id}` bookmarks a campaign.
///
/// # Errors
///
/// Returns [`AnalyticsError`] on a blank user or store failure.
#[utoipa::path(
    put,
    path = "/api/v1/users/{user}/bookmarks/{id}",
    tag = "Bookmarks",
    summary = "Add bookmark",
    description = "Idempotent. Returns the full bookmark list.",
    params(
        ("user" = String, Path, description = "User address"),
        ("id" = u64, Path, description = "Campaign index"),
    ),
    responses(
        (status = 200, description = "Updated bookmark list", body = BookmarksResponse),
        (status = 400, description = "Invalid user", body = ErrorResponse),
    )
)]
pub async fn add_bookmark(
    State(state): State<AppState>,
    Path((user, id)): Path<(String, u64)>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let user = parse_address(&user)?;
    let ids = state.bookmarks.add(&user, CampaignId::new(id)).await?;
    Ok(Json(BookmarksResponse {
        user: user.to_string(),
        campaign_ids: ids.into_iter().map(CampaignId::get).collect(),
    }))
}

/// `DELETE /users/{user}/bookmarks/{id}` removes a bookmark.
///
/// # Errors
///
/// Returns [`AnalyticsError`] on a blank user or store failure.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user}/bookmarks/{id}",
    tag = "Bookmarks",
    summary = "Remove bookmark",
    params(
        ("user" = String, Path, description = "User address"),
        ("id" = u64, Path, description = "Campaign index"),
    ),
    responses(
        (status = 200, description = "Removal result", body = BookmarkRemovedResponse),
        (status = 400, description = "Invalid user", body = ErrorResponse),
    )
)]
pub async fn remove_bookmark(
    State(state): State<AppState>,
    Path((user, id)): Path<(String, u64)>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let user = parse_address(&user)?;
    let removed = state.bookmarks.remove(&user, CampaignId::new(id)).await?;
    Ok(Json(BookmarkRemovedResponse {
        user: user.to_string(),
        campaign_id: id,
        removed,
    }))
}

/// Bookmark routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{user}/bookmarks", get(list_bookmarks))
        .route(
            "/users/{user}/bookmarks/{id}",
            put(add_bookmark).delete(remove_bookmark),
        )
}
