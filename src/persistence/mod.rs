//! Persistence layer: PostgreSQL event log and ledger snapshots.
//!
//! The original dashboard kept everything in volatile memory and lost it
//! on reload; this layer gives the ledger durability. Every published
//! [`crate::domain::LedgerEvent`] is appended to an event log, and the
//! full ledger state is snapshotted periodically and restored on boot.
//! The concrete implementation uses `sqlx::PgPool` for async PostgreSQL
//! access; the whole layer is optional at runtime.

pub mod models;
pub mod postgres;

pub use postgres::PostgresPersistence;
