//! # airdrop-gateway
//!
//! REST API and WebSocket gateway for an airdrop task & points ledger.
//!
//! End users register, complete tasks to earn points, connect wallet
//! identifiers, and request a withdrawal once their balance clears the
//! eligibility threshold. Administrators manage the task catalog, correct
//! balances, decide withdrawal requests, and set campaign dates. Every
//! point movement is recorded in an append-only audit log.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── LedgerService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── UserRegistry / TaskCatalog / TransactionLog / WithdrawalQueue (domain/)
//!     │
//!     └── PostgreSQL Persistence (optional)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
