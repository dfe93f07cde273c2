//! Domain events reflecting ledger state mutations.
//!
//! Every state change emits a [`LedgerEvent`] through the [`super::EventBus`].
//! Events are broadcast to WebSocket subscribers and optionally persisted
//! to the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{TaskId, UserId, WithdrawalDecision};

/// Domain event emitted after every state mutation.
///
/// Catalog-wide events (task and settings changes) carry no user id and are
/// delivered to wildcard subscribers only.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Emitted when a new user registers.
    UserRegistered {
        /// User identifier.
        user_id: UserId,
        /// Chosen username.
        username: String,
        /// Registration timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted on the first completion of a task by a user.
    TaskCompleted {
        /// User identifier.
        user_id: UserId,
        /// Completed task.
        task_id: TaskId,
        /// Points credited.
        points_awarded: u32,
        /// Balance after the credit.
        new_balance: i64,
        /// Completion timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a manual admin balance correction.
    PointsAdjusted {
        /// User identifier.
        user_id: UserId,
        /// Signed adjustment amount.
        amount: i64,
        /// Audit reason supplied by the admin.
        reason: String,
        /// Balance after the adjustment.
        new_balance: i64,
        /// Adjustment timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a user updates their wallet identifiers.
    WalletUpdated {
        /// User identifier.
        user_id: UserId,
        /// Update timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when an admin adds a task to the catalog.
    TaskAdded {
        /// New task identifier.
        task_id: TaskId,
        /// Task title.
        title: String,
        /// Points the task awards.
        points: u32,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when an admin replaces a task's fields.
    TaskUpdated {
        /// Updated task identifier.
        task_id: TaskId,
        /// Update timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when an admin deletes a task.
    TaskRemoved {
        /// Removed task identifier.
        task_id: TaskId,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a user opens a withdrawal request.
    WithdrawalRequested {
        /// Request identifier.
        request_id: u64,
        /// Requesting user.
        user_id: UserId,
        /// Balance snapshot on the request.
        points: i64,
        /// Request timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when an admin resolves a withdrawal request.
    WithdrawalProcessed {
        /// Request identifier.
        request_id: u64,
        /// Requesting user.
        user_id: UserId,
        /// The decision taken.
        decision: WithdrawalDecision,
        /// Decision timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when an admin replaces the campaign settings.
    SettingsUpdated {
        /// Update timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// Returns the user this event concerns, if it concerns one.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::UserRegistered { user_id, .. }
            | Self::TaskCompleted { user_id, .. }
            | Self::PointsAdjusted { user_id, .. }
            | Self::WalletUpdated { user_id, .. }
            | Self::WithdrawalRequested { user_id, .. }
            | Self::WithdrawalProcessed { user_id, .. } => Some(*user_id),
            Self::TaskAdded { .. }
            | Self::TaskUpdated { .. }
            | Self::TaskRemoved { .. }
            | Self::SettingsUpdated { .. } => None,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "user_registered",
            Self::TaskCompleted { .. } => "task_completed",
            Self::PointsAdjusted { .. } => "points_adjusted",
            Self::WalletUpdated { .. } => "wallet_updated",
            Self::TaskAdded { .. } => "task_added",
            Self::TaskUpdated { .. } => "task_updated",
            Self::TaskRemoved { .. } => "task_removed",
            Self::WithdrawalRequested { .. } => "withdrawal_requested",
            Self::WithdrawalProcessed { .. } => "withdrawal_processed",
            Self::SettingsUpdated { .. } => "settings_updated",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn task_completed_event_type() {
        let event = LedgerEvent::TaskCompleted {
            user_id: UserId::new(),
            task_id: TaskId::from_raw(1),
            points_awarded: 500,
            new_balance: 500,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "task_completed");
    }

    #[test]
    fn points_adjusted_serializes() {
        let event = LedgerEvent::PointsAdjusted {
            user_id: UserId::new(),
            amount: -100,
            reason: "fee".to_string(),
            new_balance: 400,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event);
        assert!(json.is_ok());
        let json_str = json.unwrap_or_default();
        assert!(json_str.contains("points_adjusted"));
        assert!(json_str.contains("-100"));
    }

    #[test]
    fn user_id_accessor_distinguishes_catalog_events() {
        let id = UserId::new();
        let user_event = LedgerEvent::WalletUpdated {
            user_id: id,
            timestamp: Utc::now(),
        };
        assert_eq!(user_event.user_id(), Some(id));

        let catalog_event = LedgerEvent::TaskRemoved {
            task_id: TaskId::from_raw(3),
            timestamp: Utc::now(),
        };
        assert_eq!(catalog_event.user_id(), None);
    }
}
