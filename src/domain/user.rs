//! User accounts, per-task progress, and wallet identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Task, TaskId, UserId};

/// Where a user stands in the withdrawal lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    /// No withdrawal request has been made.
    None,
    /// A request is awaiting an admin decision.
    Pending,
    /// The latest request was approved.
    Approved,
    /// The latest request was rejected.
    Rejected,
}

/// Completion state of one task for one user.
///
/// Once `completed` flips to `true` it is never reverted; `completed_at`
/// is set exactly once, at that moment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskProgress {
    /// The task this entry tracks.
    pub task_id: TaskId,
    /// Whether the user has completed the task.
    pub completed: bool,
    /// Completion timestamp; present iff `completed` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskProgress {
    /// Creates an incomplete progress entry for the given task.
    #[must_use]
    pub const fn incomplete(task_id: TaskId) -> Self {
        Self {
            task_id,
            completed: false,
            completed_at: None,
        }
    }
}

/// Partial wallet update: `None` or empty fields leave the stored value
/// untouched, non-empty fields overwrite it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct WalletUpdate {
    /// Crypto wallet address.
    pub wallet_id: Option<String>,
    /// Natcash account identifier.
    pub natcash_id: Option<String>,
    /// Melbet account identifier.
    pub melbet_id: Option<String>,
}

/// A registered end user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier (immutable after registration).
    pub id: UserId,
    /// Display name chosen at registration; also the login key.
    pub username: String,
    /// Current point balance. Always equals the sum of credit transaction
    /// amounts minus the sum of debit transaction amounts for this user.
    pub points: i64,
    /// One progress entry per currently existing task.
    pub tasks: Vec<TaskProgress>,
    /// Crypto wallet address, if connected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<String>,
    /// Natcash account identifier, if connected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natcash_id: Option<String>,
    /// Melbet account identifier, if connected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub melbet_id: Option<String>,
    /// Withdrawal lifecycle state.
    pub withdrawal_status: WithdrawalStatus,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a fresh user with zero points and one incomplete progress
    /// entry per task in `tasks`.
    #[must_use]
    pub fn register(username: String, tasks: &[Task]) -> Self {
        Self {
            id: UserId::new(),
            username,
            points: 0,
            tasks: tasks
                .iter()
                .map(|t| TaskProgress::incomplete(t.id))
                .collect(),
            wallet_id: None,
            natcash_id: None,
            melbet_id: None,
            withdrawal_status: WithdrawalStatus::None,
            created_at: Utc::now(),
        }
    }

    /// Returns the progress entry for `task_id`, if any.
    #[must_use]
    pub fn progress_for(&self, task_id: TaskId) -> Option<&TaskProgress> {
        self.tasks.iter().find(|p| p.task_id == task_id)
    }

    /// Mutable variant of [`User::progress_for`].
    pub fn progress_for_mut(&mut self, task_id: TaskId) -> Option<&mut TaskProgress> {
        self.tasks.iter_mut().find(|p| p.task_id == task_id)
    }

    /// Number of completed tasks.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|p| p.completed).count()
    }

    /// Pure eligibility check: balance at or above the threshold.
    #[must_use]
    pub const fn is_eligible(&self, threshold: i64) -> bool {
        self.points >= threshold
    }

    /// Applies a partial wallet update. Empty or missing fields never null
    /// out an existing value.
    pub fn apply_wallet_update(&mut self, update: WalletUpdate) {
        if let Some(wallet_id) = non_empty(update.wallet_id) {
            self.wallet_id = Some(wallet_id);
        }
        if let Some(natcash_id) = non_empty(update.natcash_id) {
            self.natcash_id = Some(natcash_id);
        }
        if let Some(melbet_id) = non_empty(update.melbet_id) {
            self.melbet_id = Some(melbet_id);
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
