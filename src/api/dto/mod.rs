//! Data Transfer Objects for REST request/response serialization.
//!
//! Amounts are plain JSON numbers denominated in ETH; identifiers and
//! addresses are flattened to primitives.

pub mod analytics_dto;
pub mod bookmark_dto;
pub mod campaign_dto;
pub mod common_dto;
pub mod metrics_dto;

pub use analytics_dto::*;
pub use bookmark_dto::*;
pub use campaign_dto::*;
pub use common_dto::*;
pub use metrics_dto::*;
