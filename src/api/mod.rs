//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; health and
//! configuration live at the root.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;
use openapi::{ApiDoc, OPENAPI_PATH};

/// Builds the complete API router with all REST endpoints and the OpenAPI
/// document. With the `swagger-ui` feature the interactive UI is served at
/// `/swagger-ui`.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()),
    );

    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route(
        OPENAPI_PATH,
        axum::routing::get(|| async { axum::Json(ApiDoc::openapi()) }),
    );

    router
}
