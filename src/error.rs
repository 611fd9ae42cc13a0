//! Error types for the analytics service.
//!
//! Three layers of failure exist:
//!
//! - [`NormalizeError`]: a raw ledger record is missing a field or carries
//!   a malformed value. Non-fatal; the record is skipped and reported.
//! - [`FetchError`]: an injected ledger capability failed, timed out, or is
//!   not initialized. Treated as a zero contribution by the aggregator.
//! - [`AnalyticsError`]: the API-level error enum. Each variant maps to an
//!   HTTP status code and a structured JSON error response.
//!
//! Degenerate computations (division by zero, empty input, single-point
//! regressions) are never errors; they resolve to documented fallback
//! values in the domain functions themselves.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "campaign not found: 7",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A raw ledger record could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but its value cannot be interpreted.
    #[error("malformed field `{field}`: {reason}")]
    Malformed {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl NormalizeError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            field,
            reason: reason.into(),
        }
    }
}

/// An injected ledger capability did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The fetch did not complete within the configured timeout.
    #[error("fetch timed out after {0} ms")]
    Timeout(u64),

    /// The backend reported a failure.
    #[error("ledger backend error: {0}")]
    Backend(String),
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                   |
/// |-----------|-----------------|-------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request               |
/// | 2000–2999 | Not Found       | 404 Not Found                 |
/// | 3000–3999 | Server/Upstream | 500 / 502 / 503 / 504         |
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown sort key string.
    #[error("invalid sort key: {0}")]
    InvalidSortKey(String),

    /// Campaign with the given id was not found.
    #[error("campaign not found: {0}")]
    CampaignNotFound(u64),

    /// The ledger capability is not initialized yet.
    #[error("ledger source is not ready")]
    SourceNotReady,

    /// The ledger capability failed on a request that cannot degrade.
    #[error("ledger fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AnalyticsError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidSortKey(_) => 1002,
            Self::CampaignNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::SourceNotReady => 3002,
            Self::Fetch(_) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidSortKey(_) => StatusCode::BAD_REQUEST,
            Self::CampaignNotFound(_) => StatusCode::NOT_FOUND,
            Self::SourceNotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::Fetch(FetchError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Fetch(FetchError::Backend(_)) => StatusCode::BAD_GATEWAY,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
