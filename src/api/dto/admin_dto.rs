//! Admin-facing DTOs: login, adjustments, withdrawal decisions, overview.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common_dto::PaginationMeta;
use super::user_dto::UserResponse;
use crate::domain::{AdminSettings, Task, Transaction, WithdrawalDecision, WithdrawalRequest};

/// Request body for `POST /admin/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// The shared admin password.
    pub password: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Opaque bearer token for subsequent admin calls.
    pub token: Uuid,
}

/// Request body for `POST /admin/users/{id}/adjust`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustPointsRequest {
    /// Signed adjustment; negative values debit the balance.
    pub amount: i64,
    /// Audit reason recorded on the transaction.
    pub reason: String,
}

/// Request body for `POST /admin/withdrawals/{id}/process`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessWithdrawalRequest {
    /// Approve or reject the pending request.
    pub decision: WithdrawalDecision,
}

/// Paginated user list for `GET /admin/users`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    /// User payloads for the requested page.
    pub data: Vec<UserResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Everything the admin dashboard renders, in one payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct OverviewResponse {
    /// All registered users.
    pub users: Vec<UserResponse>,
    /// The task catalog in creation order.
    pub tasks: Vec<Task>,
    /// The settings singleton.
    pub settings: AdminSettings,
    /// The full audit log.
    pub transactions: Vec<Transaction>,
    /// All withdrawal requests.
    pub withdrawals: Vec<WithdrawalRequest>,
}
