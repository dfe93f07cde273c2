//! User-facing handlers: registration, dashboard data, task completion,
//! wallet updates, withdrawal requests.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{RegisterUserRequest, UserResponse};
use crate::app_state::AppState;
use crate::domain::{TaskId, UserId, WalletUpdate};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /users` — Register a user, or fetch the existing one by username.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for an empty username.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    summary = "Register or fetch a user",
    description = "Looks the username up and returns the existing user, or registers a fresh one with zero points and an incomplete progress entry per task.",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "Registered or existing user", body = UserResponse),
        (status = 400, description = "Empty username", body = ErrorResponse),
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state.ledger.register_or_fetch_user(&req.username).await?;
    let threshold = state.ledger.withdrawal_threshold();
    Ok(Json(UserResponse::from_user(user, threshold)))
}

/// `GET /users/:id` — Get a user's dashboard payload.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] if the user does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Get user data",
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "User payload", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state.ledger.get_user(UserId::from_uuid(id)).await?;
    let threshold = state.ledger.withdrawal_threshold();
    Ok(Json(UserResponse::from_user(user, threshold)))
}

/// `GET /users/:id/transactions` — The user's audit log entries.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] if the user does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/transactions",
    tag = "Users",
    summary = "List a user's transactions",
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "Transactions in creation order", body = Vec<crate::domain::Transaction>),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn user_transactions(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let transactions = state
        .ledger
        .transactions_for(UserId::from_uuid(id))
        .await?;
    Ok(Json(transactions))
}

/// `POST /users/:id/tasks/:task_id/complete` — Complete a task.
///
/// Idempotent: repeating the call never credits twice.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] or [`GatewayError::TaskNotFound`]
/// when either id is unknown.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/tasks/{task_id}/complete",
    tag = "Users",
    summary = "Complete a task",
    description = "Marks the task completed for this user and credits its points exactly once; duplicate submissions are no-ops.",
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
        ("task_id" = u64, Path, description = "Task id"),
    ),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 404, description = "User or task not found", body = ErrorResponse),
    )
)]
pub async fn complete_task(
    State(state): State<AppState>,
    Path((id, task_id)): Path<(uuid::Uuid, u64)>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state
        .ledger
        .complete_task(UserId::from_uuid(id), TaskId::from_raw(task_id))
        .await?;
    let threshold = state.ledger.withdrawal_threshold();
    Ok(Json(UserResponse::from_user(user, threshold)))
}

/// `PATCH /users/:id/wallet` — Partially update wallet identifiers.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] if the user does not exist.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/wallet",
    tag = "Users",
    summary = "Update wallet identifiers",
    description = "Non-empty fields overwrite stored values; omitted or empty fields are left untouched.",
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    request_body = WalletUpdate,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn update_wallet(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(update): Json<WalletUpdate>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state
        .ledger
        .update_user_wallet(UserId::from_uuid(id), update)
        .await?;
    let threshold = state.ledger.withdrawal_threshold();
    Ok(Json(UserResponse::from_user(user, threshold)))
}

/// `POST /users/:id/withdrawals` — Request a withdrawal.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] for an unknown user,
/// [`GatewayError::NotEligible`] below the threshold, or
/// [`GatewayError::PendingWithdrawalExists`] when one is already open.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/withdrawals",
    tag = "Users",
    summary = "Request a withdrawal",
    description = "Opens a pending withdrawal request snapshotting the username and balance. Requires the balance to meet the eligibility threshold.",
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 201, description = "Pending request created", body = crate::domain::WithdrawalRequest),
        (status = 400, description = "Below the eligibility threshold", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "A pending request already exists", body = ErrorResponse),
    )
)]
pub async fn request_withdrawal(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let request = state
        .ledger
        .request_withdrawal(UserId::from_uuid(id))
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// User-facing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/transactions", get(user_transactions))
        .route("/users/{id}/tasks/{task_id}/complete", post(complete_task))
        .route("/users/{id}/wallet", patch(update_wallet))
        .route("/users/{id}/withdrawals", post(request_withdrawal))
}
