//! Domain layer: core types, ledger stores, and the event system.
//!
//! This module contains the server-side domain model: typed identifiers,
//! the entity records (users, tasks, transactions, withdrawal requests,
//! settings), the event bus for broadcasting state changes, and the
//! concurrent stores the ledger service mutates.

pub mod event_bus;
pub mod ledger_event;
pub mod settings;
pub mod task;
pub mod task_catalog;
pub mod transaction;
pub mod transaction_log;
pub mod user;
pub mod user_id;
pub mod user_registry;
pub mod withdrawal;
pub mod withdrawal_queue;

pub use event_bus::EventBus;
pub use ledger_event::LedgerEvent;
pub use settings::AdminSettings;
pub use task::{Task, TaskDraft, TaskId};
pub use task_catalog::TaskCatalog;
pub use transaction::{Transaction, TransactionKind};
pub use transaction_log::TransactionLog;
pub use user::{TaskProgress, User, WalletUpdate, WithdrawalStatus};
pub use user_id::UserId;
pub use user_registry::UserRegistry;
pub use withdrawal::{RequestStatus, WithdrawalDecision, WithdrawalRequest};
pub use withdrawal_queue::WithdrawalQueue;
