//! Ledger service: orchestrates all state mutations and emits events.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::{
    AdminSettings, EventBus, LedgerEvent, Task, TaskCatalog, TaskDraft, TaskId, TaskProgress,
    Transaction, TransactionKind, TransactionLog, User, UserId, UserRegistry, WalletUpdate,
    WithdrawalDecision, WithdrawalQueue, WithdrawalRequest,
};
use crate::error::GatewayError;

/// Serializable snapshot of the whole ledger, used by the persistence
/// layer for periodic snapshots and restore-on-boot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerState {
    /// All registered users.
    pub users: Vec<User>,
    /// The task catalog in creation order.
    pub tasks: Vec<Task>,
    /// The full audit log.
    pub transactions: Vec<Transaction>,
    /// All withdrawal requests ever made.
    pub withdrawals: Vec<WithdrawalRequest>,
    /// The settings singleton.
    pub settings: AdminSettings,
}

/// Orchestration layer for all ledger operations.
///
/// Owns the task catalog, transaction log, withdrawal queue and settings
/// singleton, plus references to the [`UserRegistry`] for per-user state
/// and the [`EventBus`] for event emission. Every mutation method follows
/// the pattern: validate → acquire lock → mutate → append audit entry →
/// emit events → return the updated entity. Failures are typed
/// [`GatewayError`]s; nothing in here aborts the process.
#[derive(Debug)]
pub struct LedgerService {
    registry: Arc<UserRegistry>,
    catalog: TaskCatalog,
    log: TransactionLog,
    withdrawals: WithdrawalQueue,
    settings: RwLock<AdminSettings>,
    event_bus: EventBus,
    withdrawal_threshold: i64,
}

impl LedgerService {
    /// Creates a new `LedgerService` with empty stores.
    #[must_use]
    pub fn new(registry: Arc<UserRegistry>, event_bus: EventBus, withdrawal_threshold: i64) -> Self {
        Self {
            registry,
            catalog: TaskCatalog::new(),
            log: TransactionLog::new(),
            withdrawals: WithdrawalQueue::new(),
            settings: RwLock::new(AdminSettings::default()),
            event_bus,
            withdrawal_threshold,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`UserRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<UserRegistry> {
        &self.registry
    }

    /// Returns the configured withdrawal eligibility threshold.
    #[must_use]
    pub const fn withdrawal_threshold(&self) -> i64 {
        self.withdrawal_threshold
    }

    // ── User operations ─────────────────────────────────────────────────

    /// Returns the user with this username, registering a fresh one on miss.
    ///
    /// A new user starts with zero points and one incomplete progress entry
    /// per existing task. Atomic per username: concurrent registrations of
    /// the same name yield the same user.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the username is empty.
    pub async fn register_or_fetch_user(&self, username: &str) -> Result<User, GatewayError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "username must not be empty".to_string(),
            ));
        }

        let tasks = self.catalog.list().await;
        let candidate = User::register(username.to_string(), &tasks);
        let (entry, created) = self.registry.get_or_insert(candidate).await;
        let user = entry.read().await.clone();

        if created {
            let _ = self.event_bus.publish(LedgerEvent::UserRegistered {
                user_id: user.id,
                username: user.username.clone(),
                timestamp: Utc::now(),
            });
            tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        }

        Ok(user)
    }

    /// Returns a snapshot of one user.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] if the user does not exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, GatewayError> {
        let entry = self.registry.get(user_id).await?;
        let user = entry.read().await.clone();
        Ok(user)
    }

    /// Marks a task completed for a user and credits its points.
    ///
    /// Exactly-once per (user, task): if the progress entry is already
    /// completed (or absent), this is a no-op returning the current user,
    /// so double submissions never double-credit. The first completion
    /// appends one credit transaction with the task title as reason.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] or
    /// [`GatewayError::TaskNotFound`] when either id is unknown.
    pub async fn complete_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
    ) -> Result<User, GatewayError> {
        let task = self.catalog.get(task_id).await?;
        let entry = self.registry.get(user_id).await?;
        let mut user = entry.write().await;

        let now = Utc::now();
        let credited = match user.progress_for_mut(task_id) {
            Some(progress) if !progress.completed => {
                progress.completed = true;
                progress.completed_at = Some(now);
                true
            }
            // Already completed, or no progress entry: nothing to credit.
            _ => false,
        };
        if !credited {
            return Ok(user.clone());
        }

        user.points += i64::from(task.points);
        let new_balance = user.points;

        let _ = self
            .log
            .append(
                user_id,
                TransactionKind::Credit,
                i64::from(task.points),
                task.title.clone(),
            )
            .await;

        let updated = user.clone();
        drop(user);

        let _ = self.event_bus.publish(LedgerEvent::TaskCompleted {
            user_id,
            task_id,
            points_awarded: task.points,
            new_balance,
            timestamp: now,
        });

        tracing::info!(%user_id, %task_id, points = task.points, "task completed");
        Ok(updated)
    }

    /// Applies a partial wallet update; empty fields keep stored values.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] if the user does not exist.
    pub async fn update_user_wallet(
        &self,
        user_id: UserId,
        update: WalletUpdate,
    ) -> Result<User, GatewayError> {
        let entry = self.registry.get(user_id).await?;
        let mut user = entry.write().await;
        user.apply_wallet_update(update);
        let updated = user.clone();
        drop(user);

        let _ = self.event_bus.publish(LedgerEvent::WalletUpdated {
            user_id,
            timestamp: Utc::now(),
        });

        Ok(updated)
    }

    /// Manually corrects a user's balance, fully audited.
    ///
    /// Every call appends exactly one transaction: a credit for positive
    /// `amount`, a debit (of the absolute value) for negative.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a zero amount or empty
    /// reason, or [`GatewayError::UserNotFound`] for an unknown user.
    pub async fn adjust_user_points(
        &self,
        user_id: UserId,
        amount: i64,
        reason: &str,
    ) -> Result<User, GatewayError> {
        if amount == 0 {
            return Err(GatewayError::InvalidRequest(
                "amount must be nonzero".to_string(),
            ));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "reason must not be empty".to_string(),
            ));
        }

        let entry = self.registry.get(user_id).await?;
        let mut user = entry.write().await;
        user.points += amount;
        let new_balance = user.points;

        let kind = if amount > 0 {
            TransactionKind::Credit
        } else {
            TransactionKind::Debit
        };
        let _ = self
            .log
            .append(user_id, kind, amount.abs(), reason.to_string())
            .await;

        let updated = user.clone();
        drop(user);

        let _ = self.event_bus.publish(LedgerEvent::PointsAdjusted {
            user_id,
            amount,
            reason: reason.to_string(),
            new_balance,
            timestamp: Utc::now(),
        });

        tracing::info!(%user_id, amount, new_balance, "points adjusted");
        Ok(updated)
    }

    /// Returns the audit log entries for one user, in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] if the user does not exist.
    pub async fn transactions_for(&self, user_id: UserId) -> Result<Vec<Transaction>, GatewayError> {
        let _ = self.registry.get(user_id).await?;
        Ok(self.log.for_user(user_id).await)
    }

    /// Returns the whole audit log in creation order.
    pub async fn all_transactions(&self) -> Vec<Transaction> {
        self.log.list().await
    }

    /// Returns snapshots of all users.
    pub async fn list_users(&self) -> Vec<User> {
        self.registry.list().await
    }

    // ── Task operations ─────────────────────────────────────────────────

    /// Returns the full task sequence in creation order.
    pub async fn list_tasks(&self) -> Vec<Task> {
        self.catalog.list().await
    }

    /// Adds a task to the catalog and seeds an incomplete progress entry
    /// for every existing user, keeping progress sets in sync with the
    /// live task set.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the title is empty.
    pub async fn add_task(&self, draft: TaskDraft) -> Result<Task, GatewayError> {
        if draft.title.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "title must not be empty".to_string(),
            ));
        }

        let task = self.catalog.add(draft).await;

        for entry in self.registry.entries().await {
            let mut user = entry.write().await;
            if user.progress_for(task.id).is_none() {
                user.tasks.push(TaskProgress::incomplete(task.id));
            }
        }

        let _ = self.event_bus.publish(LedgerEvent::TaskAdded {
            task_id: task.id,
            title: task.title.clone(),
            points: task.points,
            timestamp: Utc::now(),
        });

        tracing::info!(task_id = %task.id, title = %task.title, "task added");
        Ok(task)
    }

    /// Replaces a stored task wholesale. Points already credited for
    /// completed progress entries are not recalculated.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for an empty title or
    /// [`GatewayError::TaskNotFound`] for an unknown id.
    pub async fn update_task(&self, task: Task) -> Result<Task, GatewayError> {
        if task.title.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "title must not be empty".to_string(),
            ));
        }

        let updated = self.catalog.update(task).await?;

        let _ = self.event_bus.publish(LedgerEvent::TaskUpdated {
            task_id: updated.id,
            timestamp: Utc::now(),
        });

        Ok(updated)
    }

    /// Deletes a task, cascading removal of its progress entry from every
    /// user. Earned points and transaction history are left untouched.
    /// Returns `false` if the id did not exist.
    pub async fn delete_task(&self, task_id: TaskId) -> bool {
        let removed = self.catalog.remove(task_id).await;
        if !removed {
            return false;
        }

        for entry in self.registry.entries().await {
            let mut user = entry.write().await;
            user.tasks.retain(|p| p.task_id != task_id);
        }

        let _ = self.event_bus.publish(LedgerEvent::TaskRemoved {
            task_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%task_id, "task removed");
        true
    }

    // ── Withdrawal operations ───────────────────────────────────────────

    /// Opens a withdrawal request for an eligible user.
    ///
    /// The request snapshots the username and current balance; the user's
    /// status moves to pending. No points are deducted.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] for an unknown user,
    /// [`GatewayError::NotEligible`] below the threshold, or
    /// [`GatewayError::PendingWithdrawalExists`] if a request is already
    /// awaiting a decision.
    pub async fn request_withdrawal(
        &self,
        user_id: UserId,
    ) -> Result<WithdrawalRequest, GatewayError> {
        let entry = self.registry.get(user_id).await?;
        let mut user = entry.write().await;

        if !user.is_eligible(self.withdrawal_threshold) {
            return Err(GatewayError::NotEligible {
                points: user.points,
                threshold: self.withdrawal_threshold,
            });
        }

        let request = self
            .withdrawals
            .open(user_id, user.username.clone(), user.points)
            .await?;
        user.withdrawal_status = crate::domain::WithdrawalStatus::Pending;
        drop(user);

        let _ = self.event_bus.publish(LedgerEvent::WithdrawalRequested {
            request_id: request.id,
            user_id,
            points: request.points,
            timestamp: request.timestamp,
        });

        tracing::info!(%user_id, request_id = request.id, points = request.points, "withdrawal requested");
        Ok(request)
    }

    /// Applies an admin decision to a pending withdrawal request and
    /// mirrors it onto the user's status.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::WithdrawalNotFound`] for an unknown id,
    /// [`GatewayError::AlreadyProcessed`] if the request was already
    /// resolved, or [`GatewayError::UserNotFound`] if the referenced user
    /// is missing from a restored snapshot.
    pub async fn process_withdrawal(
        &self,
        request_id: u64,
        decision: WithdrawalDecision,
    ) -> Result<WithdrawalRequest, GatewayError> {
        let request = self.withdrawals.process(request_id, decision).await?;

        let entry = self.registry.get(request.user_id).await?;
        entry.write().await.withdrawal_status = decision.into();

        let _ = self.event_bus.publish(LedgerEvent::WithdrawalProcessed {
            request_id,
            user_id: request.user_id,
            decision,
            timestamp: Utc::now(),
        });

        tracing::info!(request_id, user_id = %request.user_id, ?decision, "withdrawal processed");
        Ok(request)
    }

    /// Returns all withdrawal requests in creation order.
    pub async fn list_withdrawals(&self) -> Vec<WithdrawalRequest> {
        self.withdrawals.list().await
    }

    // ── Settings ────────────────────────────────────────────────────────

    /// Returns the settings singleton.
    pub async fn settings(&self) -> AdminSettings {
        *self.settings.read().await
    }

    /// Replaces the settings singleton wholesale.
    pub async fn update_settings(&self, new_settings: AdminSettings) -> AdminSettings {
        *self.settings.write().await = new_settings;

        let _ = self.event_bus.publish(LedgerEvent::SettingsUpdated {
            timestamp: Utc::now(),
        });

        tracing::info!("settings updated");
        new_settings
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    /// Exports the whole ledger for a persistence snapshot.
    pub async fn export_state(&self) -> LedgerState {
        LedgerState {
            users: self.registry.list().await,
            tasks: self.catalog.list().await,
            transactions: self.log.list().await,
            withdrawals: self.withdrawals.list().await,
            settings: self.settings().await,
        }
    }

    /// Replaces the whole ledger from a restored snapshot.
    pub async fn import_state(&self, state: LedgerState) {
        self.registry.replace_all(state.users).await;
        self.catalog.replace_all(state.tasks).await;
        self.log.replace_all(state.transactions).await;
        self.withdrawals.replace_all(state.withdrawals).await;
        *self.settings.write().await = state.settings;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{RequestStatus, WithdrawalStatus};

    fn make_service() -> LedgerService {
        let registry = Arc::new(UserRegistry::new());
        let event_bus = EventBus::new(1000);
        LedgerService::new(registry, event_bus, 2000)
    }

    fn draft(title: &str, points: u32) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: format!("{title} description"),
            points,
            link: None,
        }
    }

    async fn audited_balance(service: &LedgerService, user_id: UserId) -> i64 {
        let txs = service.transactions_for(user_id).await;
        let Ok(txs) = txs else {
            panic!("user not found");
        };
        txs.iter().map(Transaction::signed_amount).sum()
    }

    #[tokio::test]
    async fn register_seeds_progress_and_is_idempotent_by_username() {
        let service = make_service();
        for i in 0..6 {
            let added = service.add_task(draft(&format!("task {i}"), 100)).await;
            assert!(added.is_ok());
        }

        let alice = service.register_or_fetch_user("alice").await;
        let Ok(alice) = alice else {
            panic!("registration failed");
        };
        assert_eq!(alice.points, 0);
        assert_eq!(alice.tasks.len(), 6);
        assert_eq!(alice.withdrawal_status, WithdrawalStatus::None);

        let again = service.register_or_fetch_user("alice").await;
        let Ok(again) = again else {
            panic!("fetch failed");
        };
        assert_eq!(again.id, alice.id);
        assert_eq!(service.list_users().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_username_is_rejected() {
        let service = make_service();
        let result = service.register_or_fetch_user("   ").await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn complete_task_credits_once_and_is_idempotent() {
        let service = make_service();
        let task = service.add_task(draft("join channel", 500)).await;
        let Ok(task) = task else {
            panic!("add_task failed");
        };
        let user = service.register_or_fetch_user("alice").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };

        let first = service.complete_task(user.id, task.id).await;
        let Ok(first) = first else {
            panic!("complete failed");
        };
        assert_eq!(first.points, 500);

        // Double submission: same total, still exactly one transaction.
        let second = service.complete_task(user.id, task.id).await;
        let Ok(second) = second else {
            panic!("complete failed");
        };
        assert_eq!(second.points, 500);

        let txs = service.transactions_for(user.id).await;
        let Ok(txs) = txs else {
            panic!("transactions failed");
        };
        assert_eq!(txs.len(), 1);
        assert_eq!(txs.first().map(|t| t.reason.as_str()), Some("join channel"));
        assert_eq!(txs.first().map(|t| t.kind), Some(TransactionKind::Credit));

        let progress = second.progress_for(task.id);
        let Some(progress) = progress else {
            panic!("progress missing");
        };
        assert!(progress.completed);
        assert!(progress.completed_at.is_some());
    }

    #[tokio::test]
    async fn complete_task_unknown_ids_error() {
        let service = make_service();
        let task = service.add_task(draft("t", 10)).await;
        let Ok(task) = task else {
            panic!("add_task failed");
        };
        let user = service.register_or_fetch_user("alice").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };

        let bad_user = service.complete_task(UserId::new(), task.id).await;
        assert!(matches!(bad_user, Err(GatewayError::UserNotFound(_))));

        let bad_task = service.complete_task(user.id, TaskId::from_raw(99)).await;
        assert!(matches!(bad_task, Err(GatewayError::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn points_always_equal_audited_balance() {
        let service = make_service();
        let t1 = service.add_task(draft("a", 500)).await;
        let t2 = service.add_task(draft("b", 300)).await;
        let (Ok(t1), Ok(t2)) = (t1, t2) else {
            panic!("add_task failed");
        };
        let user = service.register_or_fetch_user("alice").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };

        let _ = service.complete_task(user.id, t1.id).await;
        let _ = service.adjust_user_points(user.id, -150, "correction").await;
        let _ = service.complete_task(user.id, t2.id).await;
        let _ = service.complete_task(user.id, t1.id).await; // duplicate, no-op
        let _ = service.adjust_user_points(user.id, 25, "bonus").await;

        let current = service.get_user(user.id).await;
        let Ok(current) = current else {
            panic!("get_user failed");
        };
        assert_eq!(current.points, 675);
        assert_eq!(audited_balance(&service, user.id).await, current.points);
    }

    #[tokio::test]
    async fn adjust_round_trip_restores_balance_with_two_transactions() {
        let service = make_service();
        let user = service.register_or_fetch_user("alice").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };

        let down = service.adjust_user_points(user.id, -50, "correction").await;
        let Ok(down) = down else {
            panic!("adjust failed");
        };
        assert_eq!(down.points, -50);

        let up = service.adjust_user_points(user.id, 50, "correction").await;
        let Ok(up) = up else {
            panic!("adjust failed");
        };
        assert_eq!(up.points, 0);

        let txs = service.transactions_for(user.id).await;
        let Ok(txs) = txs else {
            panic!("transactions failed");
        };
        assert_eq!(txs.len(), 2);
        let kinds: Vec<TransactionKind> = txs.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TransactionKind::Debit, TransactionKind::Credit]);
        assert!(txs.iter().all(|t| t.amount == 50));
    }

    #[tokio::test]
    async fn adjust_rejects_zero_amount_and_empty_reason() {
        let service = make_service();
        let user = service.register_or_fetch_user("alice").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };

        let zero = service.adjust_user_points(user.id, 0, "why").await;
        assert!(matches!(zero, Err(GatewayError::InvalidRequest(_))));

        let blank = service.adjust_user_points(user.id, 10, "  ").await;
        assert!(matches!(blank, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn add_task_seeds_every_existing_user() {
        let service = make_service();
        for name in ["alice", "bob", "carol"] {
            let _ = service.register_or_fetch_user(name).await;
        }

        let task = service.add_task(draft("new task", 10)).await;
        let Ok(task) = task else {
            panic!("add_task failed");
        };

        for user in service.list_users().await {
            let progress = user.progress_for(task.id);
            let Some(progress) = progress else {
                panic!("user {} missing progress", user.username);
            };
            assert!(!progress.completed);
        }
    }

    #[tokio::test]
    async fn delete_task_cascades_progress_but_keeps_history() {
        let service = make_service();
        let task = service.add_task(draft("ephemeral", 500)).await;
        let Ok(task) = task else {
            panic!("add_task failed");
        };
        let user = service.register_or_fetch_user("alice").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };
        let _ = service.complete_task(user.id, task.id).await;

        assert!(service.delete_task(task.id).await);
        assert!(!service.delete_task(task.id).await);

        let current = service.get_user(user.id).await;
        let Ok(current) = current else {
            panic!("get_user failed");
        };
        // Progress entry is gone, earned points and the audit entry are not.
        assert!(current.progress_for(task.id).is_none());
        assert_eq!(current.points, 500);

        let txs = service.transactions_for(user.id).await;
        let Ok(txs) = txs else {
            panic!("transactions failed");
        };
        assert_eq!(txs.len(), 1);
        assert_eq!(txs.first().map(|t| t.reason.as_str()), Some("ephemeral"));
    }

    #[tokio::test]
    async fn update_task_does_not_recalculate_earned_points() {
        let service = make_service();
        let task = service.add_task(draft("t", 500)).await;
        let Ok(task) = task else {
            panic!("add_task failed");
        };
        let user = service.register_or_fetch_user("alice").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };
        let _ = service.complete_task(user.id, task.id).await;

        let updated = service
            .update_task(Task {
                points: 9000,
                ..task
            })
            .await;
        assert!(updated.is_ok());

        let current = service.get_user(user.id).await;
        let Ok(current) = current else {
            panic!("get_user failed");
        };
        assert_eq!(current.points, 500);
    }

    #[tokio::test]
    async fn withdrawal_below_threshold_is_rejected() {
        let service = make_service();
        let user = service.register_or_fetch_user("alice").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };
        let _ = service.adjust_user_points(user.id, 400, "seed").await;

        let result = service.request_withdrawal(user.id).await;
        assert!(matches!(
            result,
            Err(GatewayError::NotEligible {
                points: 400,
                threshold: 2000
            })
        ));
    }

    #[tokio::test]
    async fn withdrawal_lifecycle_processes_exactly_once() {
        let service = make_service();
        let user = service.register_or_fetch_user("alice").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };
        let _ = service.adjust_user_points(user.id, 2500, "seed").await;

        let request = service.request_withdrawal(user.id).await;
        let Ok(request) = request else {
            panic!("request failed");
        };
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.points, 2500);
        assert_eq!(request.username, "alice");

        let pending_again = service.request_withdrawal(user.id).await;
        assert!(matches!(
            pending_again,
            Err(GatewayError::PendingWithdrawalExists(_))
        ));

        let processed = service
            .process_withdrawal(request.id, WithdrawalDecision::Approved)
            .await;
        let Ok(processed) = processed else {
            panic!("process failed");
        };
        assert_eq!(processed.status, RequestStatus::Approved);

        let mirrored = service.get_user(user.id).await;
        let Ok(mirrored) = mirrored else {
            panic!("get_user failed");
        };
        assert_eq!(mirrored.withdrawal_status, WithdrawalStatus::Approved);

        // Re-processing an already approved request conflicts and changes
        // nothing.
        let again = service
            .process_withdrawal(request.id, WithdrawalDecision::Approved)
            .await;
        assert!(matches!(again, Err(GatewayError::AlreadyProcessed(_))));
        assert_eq!(service.list_withdrawals().await.len(), 1);
    }

    #[tokio::test]
    async fn alice_scenario_end_to_end() {
        let service = make_service();
        for i in 1..=6 {
            let _ = service.add_task(draft(&format!("task {i}"), 250)).await;
        }
        let first = service
            .update_task(Task {
                id: TaskId::from_raw(1),
                title: "register on partner site".to_string(),
                description: String::new(),
                points: 500,
                link: None,
            })
            .await;
        assert!(first.is_ok());

        let alice = service.register_or_fetch_user("alice").await;
        let Ok(alice) = alice else {
            panic!("registration failed");
        };
        assert_eq!(alice.points, 0);
        assert_eq!(alice.tasks.len(), 6);

        let after_task = service.complete_task(alice.id, TaskId::from_raw(1)).await;
        let Ok(after_task) = after_task else {
            panic!("complete failed");
        };
        assert_eq!(after_task.points, 500);

        let after_fee = service.adjust_user_points(alice.id, -100, "fee").await;
        let Ok(after_fee) = after_fee else {
            panic!("adjust failed");
        };
        assert_eq!(after_fee.points, 400);

        let txs = service.transactions_for(alice.id).await;
        let Ok(txs) = txs else {
            panic!("transactions failed");
        };
        assert_eq!(txs.len(), 2);
        assert_eq!(txs.last().map(|t| t.kind), Some(TransactionKind::Debit));
        assert_eq!(txs.last().map(|t| t.amount), Some(100));

        let denied = service.request_withdrawal(alice.id).await;
        assert!(matches!(denied, Err(GatewayError::NotEligible { .. })));
        assert_eq!(audited_balance(&service, alice.id).await, 400);
    }

    #[tokio::test]
    async fn new_task_after_six_gets_id_seven_and_seeds_users() {
        let service = make_service();
        for i in 1..=6 {
            let _ = service.add_task(draft(&format!("task {i}"), 100)).await;
        }
        let user = service.register_or_fetch_user("bob").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };

        let task = service.add_task(draft("X", 10)).await;
        let Ok(task) = task else {
            panic!("add_task failed");
        };
        assert_eq!(task.id, TaskId::from_raw(7));

        let current = service.get_user(user.id).await;
        let Ok(current) = current else {
            panic!("get_user failed");
        };
        let progress = current.progress_for(task.id);
        let Some(progress) = progress else {
            panic!("progress missing");
        };
        assert!(!progress.completed);
    }

    #[tokio::test]
    async fn wallet_update_preserves_unset_fields() {
        let service = make_service();
        let user = service.register_or_fetch_user("alice").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };

        let first = service
            .update_user_wallet(
                user.id,
                WalletUpdate {
                    melbet_id: Some("12345678".to_string()),
                    ..WalletUpdate::default()
                },
            )
            .await;
        assert!(first.is_ok());

        let second = service
            .update_user_wallet(
                user.id,
                WalletUpdate {
                    wallet_id: Some("0xabc".to_string()),
                    melbet_id: Some(String::new()),
                    ..WalletUpdate::default()
                },
            )
            .await;
        let Ok(second) = second else {
            panic!("update failed");
        };
        assert_eq!(second.wallet_id.as_deref(), Some("0xabc"));
        assert_eq!(second.melbet_id.as_deref(), Some("12345678"));
    }

    #[tokio::test]
    async fn settings_replace_wholesale() {
        let service = make_service();
        let parsed: Result<AdminSettings, _> = serde_json::from_str(
            r#"{"listing_date":"2024-12-01","withdrawal_start_date":"2024-12-15"}"#,
        );
        let Ok(new_settings) = parsed else {
            panic!("settings parse failed");
        };

        let stored = service.update_settings(new_settings).await;
        assert_eq!(stored, new_settings);
        assert_eq!(service.settings().await, new_settings);
    }

    #[tokio::test]
    async fn export_import_round_trips_the_ledger() {
        let service = make_service();
        let task = service.add_task(draft("t", 500)).await;
        let Ok(task) = task else {
            panic!("add_task failed");
        };
        let user = service.register_or_fetch_user("alice").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };
        let _ = service.complete_task(user.id, task.id).await;

        let state = service.export_state().await;

        let restored = make_service();
        restored.import_state(state).await;

        let current = restored.get_user(user.id).await;
        let Ok(current) = current else {
            panic!("restored user missing");
        };
        assert_eq!(current.points, 500);
        assert_eq!(restored.list_tasks().await.len(), 1);
        assert_eq!(audited_balance(&restored, user.id).await, 500);

        // Id sequences resume after the restored maxima.
        let next = restored.adjust_user_points(user.id, -1, "post-restore").await;
        let Ok(_) = next else {
            panic!("adjust failed");
        };
        let txs = restored.transactions_for(user.id).await;
        let Ok(txs) = txs else {
            panic!("transactions failed");
        };
        assert_eq!(txs.last().map(|t| t.id), Some(2));
    }

    #[tokio::test]
    async fn mutations_emit_events() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();

        let task = service.add_task(draft("t", 500)).await;
        let Ok(task) = task else {
            panic!("add_task failed");
        };
        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "task_added");

        let user = service.register_or_fetch_user("alice").await;
        let Ok(user) = user else {
            panic!("registration failed");
        };
        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "user_registered");

        let _ = service.complete_task(user.id, task.id).await;
        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "task_completed");
        assert_eq!(event.user_id(), Some(user.id));
    }
}
