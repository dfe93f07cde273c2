//! User-facing DTOs for registration and dashboard payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{TaskProgress, User, UserId, WithdrawalStatus};

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    /// Desired username; also the login key for returning users.
    pub username: String,
}

/// Full user payload returned by user-facing endpoints.
///
/// Mirrors the domain [`User`] plus the computed `eligible` flag so the
/// dashboard never re-implements the threshold comparison.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Current point balance.
    pub points: i64,
    /// Whether the balance meets the withdrawal threshold.
    pub eligible: bool,
    /// Per-task completion state.
    pub tasks: Vec<TaskProgress>,
    /// Crypto wallet address, if connected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<String>,
    /// Natcash account identifier, if connected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natcash_id: Option<String>,
    /// Melbet account identifier, if connected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melbet_id: Option<String>,
    /// Withdrawal lifecycle state.
    pub withdrawal_status: WithdrawalStatus,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    /// Builds the payload from a domain user and the configured threshold.
    #[must_use]
    pub fn from_user(user: User, threshold: i64) -> Self {
        let eligible = user.is_eligible(threshold);
        Self {
            id: user.id,
            username: user.username,
            points: user.points,
            eligible,
            tasks: user.tasks,
            wallet_id: user.wallet_id,
            natcash_id: user.natcash_id,
            melbet_id: user.melbet_id,
            withdrawal_status: user.withdrawal_status,
            created_at: user.created_at,
        }
    }
}
