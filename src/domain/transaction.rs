//! Append-only audit transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Direction of a point movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Points added to the user's balance.
    Credit,
    /// Points removed from the user's balance.
    Debit,
}

impl TransactionKind {
    /// Returns the kind as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

/// One immutable entry in the audit log.
///
/// Ids are assigned by the log, monotonically increasing from 1; ordering
/// equals creation order. Entries are never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Monotonically increasing identifier.
    pub id: u64,
    /// Owner of the balance this entry moved.
    pub user_id: UserId,
    /// Credit or debit.
    pub kind: TransactionKind,
    /// Moved amount; always strictly positive.
    pub amount: i64,
    /// Free-text audit reason (a task title, or the admin's note).
    pub reason: String,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Signed effect of this entry on the owner's balance.
    #[must_use]
    pub const fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionKind::Credit => self.amount,
            TransactionKind::Debit => -self.amount,
        }
    }
}
