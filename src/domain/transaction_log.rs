//! Append-only transaction log, the audit trail for every point movement.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;

use super::{Transaction, TransactionKind, UserId};

/// The ledger's audit log.
///
/// Entries are appended with monotonically increasing ids starting at 1 and
/// are never mutated or deleted; ordering equals creation order. Balances
/// are derivable at any time by folding the log, which is the consistency
/// invariant the tests pin down.
#[derive(Debug)]
pub struct TransactionLog {
    entries: RwLock<Vec<Transaction>>,
    next_id: AtomicU64,
}

impl TransactionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Appends one entry. `amount` must already be positive; the sign is
    /// carried by `kind`.
    pub async fn append(
        &self,
        user_id: UserId,
        kind: TransactionKind,
        amount: i64,
        reason: String,
    ) -> Transaction {
        let tx = Transaction {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            kind,
            amount,
            reason,
            timestamp: Utc::now(),
        };
        self.entries.write().await.push(tx.clone());
        tx
    }

    /// Returns the whole log in creation order.
    pub async fn list(&self) -> Vec<Transaction> {
        self.entries.read().await.clone()
    }

    /// Returns the entries for one user, in creation order.
    pub async fn for_user(&self, user_id: UserId) -> Vec<Transaction> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Folds the log into a balance for one user: credits minus debits.
    pub async fn balance_for(&self, user_id: UserId) -> i64 {
        self.entries
            .read()
            .await
            .iter()
            .filter(|t| t.user_id == user_id)
            .map(Transaction::signed_amount)
            .sum()
    }

    /// Replaces the whole log (snapshot restore), resuming the id sequence
    /// after the highest restored id.
    pub async fn replace_all(&self, entries: Vec<Transaction>) {
        let next = entries.iter().map(|t| t.id).max().map_or(1, |max| max + 1);
        self.next_id.store(next, Ordering::Relaxed);
        *self.entries.write().await = entries;
    }

    /// Returns the number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_monotonic_from_one() {
        let log = TransactionLog::new();
        let user = UserId::new();
        let a = log
            .append(user, TransactionKind::Credit, 500, "a".to_string())
            .await;
        let b = log
            .append(user, TransactionKind::Debit, 100, "b".to_string())
            .await;
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn balance_is_credits_minus_debits() {
        let log = TransactionLog::new();
        let user = UserId::new();
        let other = UserId::new();

        let _ = log
            .append(user, TransactionKind::Credit, 500, "task".to_string())
            .await;
        let _ = log
            .append(user, TransactionKind::Debit, 100, "fee".to_string())
            .await;
        let _ = log
            .append(other, TransactionKind::Credit, 999, "task".to_string())
            .await;

        assert_eq!(log.balance_for(user).await, 400);
        assert_eq!(log.balance_for(other).await, 999);
        assert_eq!(log.balance_for(UserId::new()).await, 0);
    }

    #[tokio::test]
    async fn for_user_filters_and_keeps_order() {
        let log = TransactionLog::new();
        let user = UserId::new();
        let _ = log
            .append(user, TransactionKind::Credit, 1, "first".to_string())
            .await;
        let _ = log
            .append(UserId::new(), TransactionKind::Credit, 2, "noise".to_string())
            .await;
        let _ = log
            .append(user, TransactionKind::Credit, 3, "second".to_string())
            .await;

        let mine = log.for_user(user).await;
        assert_eq!(mine.len(), 2);
        let reasons: Vec<&str> = mine.iter().map(|t| t.reason.as_str()).collect();
        assert_eq!(reasons, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn replace_all_resumes_id_sequence() {
        let log = TransactionLog::new();
        let user = UserId::new();
        let seeded = vec![Transaction {
            id: 41,
            user_id: user,
            kind: TransactionKind::Credit,
            amount: 10,
            reason: "restored".to_string(),
            timestamp: Utc::now(),
        }];
        log.replace_all(seeded).await;

        let next = log
            .append(user, TransactionKind::Credit, 5, "new".to_string())
            .await;
        assert_eq!(next.id, 42);
        assert_eq!(log.len().await, 2);
    }
}
