//! Withdrawal requests and their single-shot decision lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;
use super::user::WithdrawalStatus;

/// State of a withdrawal request.
///
/// Transitions pending→approved or pending→rejected exactly once; there are
/// no transitions out of a resolved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Approved by an admin.
    Approved,
    /// Rejected by an admin.
    Rejected,
}

/// An admin's decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalDecision {
    /// Approve the request.
    Approved,
    /// Reject the request.
    Rejected,
}

impl From<WithdrawalDecision> for RequestStatus {
    fn from(decision: WithdrawalDecision) -> Self {
        match decision {
            WithdrawalDecision::Approved => Self::Approved,
            WithdrawalDecision::Rejected => Self::Rejected,
        }
    }
}

impl From<WithdrawalDecision> for WithdrawalStatus {
    fn from(decision: WithdrawalDecision) -> Self {
        match decision {
            WithdrawalDecision::Approved => Self::Approved,
            WithdrawalDecision::Rejected => Self::Rejected,
        }
    }
}

/// A user's request to withdraw their accumulated points.
///
/// The username is a denormalized snapshot taken at request time so the
/// display name survives later changes to the user record. `points` is the
/// balance at request time; approval does not deduct it (disbursement is
/// external to the ledger).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalRequest {
    /// Monotonically increasing identifier.
    pub id: u64,
    /// Requesting user.
    pub user_id: UserId,
    /// Username snapshot at request time.
    pub username: String,
    /// Point balance at request time.
    pub points: i64,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
}
