//! Persistence layer: ledger backends and the bookmark key-value store.
//!
//! Ledger backends implement [`crate::domain::Ledger`]: an in-memory one
//! seeded from JSON and a read-only PostgreSQL mirror accessed through
//! `sqlx::PgPool`.

pub mod kv_store;
pub mod memory;
pub mod models;
pub mod postgres;

pub use kv_store::{InMemoryKvStore, KeyValueStore};
pub use memory::InMemoryLedger;
pub use postgres::PostgresLedger;
