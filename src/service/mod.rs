//! Service layer: the ledger orchestrator behind every endpoint.

pub mod ledger_service;

pub use ledger_service::{LedgerService, LedgerState};
