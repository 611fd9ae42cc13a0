//! # crowdfund-analytics
//!
//! Read-only aggregation and derived-metrics service for a blockchain
//! crowdfunding platform.
//!
//! Raw campaign and donation records come from an injected ledger
//! (in-memory seed or a PostgreSQL mirror of the contract). Every request
//! normalizes them, fans out donation fetches concurrently, and derives
//! sorted listings, donor leaderboards, time series with forecasts and
//! ratio metrics. Nothing derived is cached or written back.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── AnalyticsService, BookmarkService (service/)
//!     │
//!     ├── Normalizer, DonationAggregator, sort/rank/series/metrics (domain/)
//!     ├── LedgerHandle (domain/ledger)
//!     │
//!     └── InMemoryLedger | PostgresLedger, KeyValueStore (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
