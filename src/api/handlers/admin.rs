//! Admin handlers: login, overview, user adjustments, task management,
//! withdrawal decisions, settings.
//!
//! Every handler except `login` requires a valid [`AdminSession`] bearer
//! token.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::auth::AdminSession;
use crate::api::dto::{
    AdjustPointsRequest, LoginRequest, LoginResponse, OverviewResponse, PaginationMeta,
    PaginationParams, ProcessWithdrawalRequest, UserListResponse, UserResponse,
};
use crate::app_state::AppState;
use crate::domain::{AdminSettings, Task, TaskDraft, TaskId, UserId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /admin/login` — Exchange the shared password for a session token.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] on a wrong password.
#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    tag = "Admin",
    summary = "Admin login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if req.password != *state.admin_password {
        return Err(GatewayError::Unauthorized);
    }
    let token = state.sessions.issue().await;
    tracing::info!("admin session issued");
    Ok(Json(LoginResponse { token }))
}

/// `POST /admin/logout` — Revoke the presented session token.
#[utoipa::path(
    post,
    path = "/api/v1/admin/logout",
    tag = "Admin",
    summary = "Admin logout",
    responses(
        (status = 204, description = "Session revoked"),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
    )
)]
pub async fn logout(State(state): State<AppState>, session: AdminSession) -> impl IntoResponse {
    let _ = state.sessions.revoke(session.token).await;
    StatusCode::NO_CONTENT
}

/// `GET /admin/overview` — Everything the admin dashboard renders.
#[utoipa::path(
    get,
    path = "/api/v1/admin/overview",
    tag = "Admin",
    summary = "Admin overview",
    description = "Returns users, tasks, settings, the full audit log, and all withdrawal requests in one payload.",
    responses(
        (status = 200, description = "Dashboard payload", body = OverviewResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
    )
)]
pub async fn overview(State(state): State<AppState>, _session: AdminSession) -> impl IntoResponse {
    let threshold = state.ledger.withdrawal_threshold();
    let users = state
        .ledger
        .list_users()
        .await
        .into_iter()
        .map(|u| UserResponse::from_user(u, threshold))
        .collect();

    Json(OverviewResponse {
        users,
        tasks: state.ledger.list_tasks().await,
        settings: state.ledger.settings().await,
        transactions: state.ledger.all_transactions().await,
        withdrawals: state.ledger.list_withdrawals().await,
    })
}

/// `GET /admin/users` — Paginated user list.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    summary = "List users",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated users", body = UserListResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let params = params.clamped();
    let threshold = state.ledger.withdrawal_threshold();
    let users = state.ledger.list_users().await;

    let total = users.len() as u32;
    let per_page = params.per_page;
    let page = params.page;
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(per_page)
    };

    let start = ((page - 1) * per_page) as usize;
    let data: Vec<UserResponse> = users
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .map(|u| UserResponse::from_user(u, threshold))
        .collect();

    Json(UserListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    })
}

/// `POST /admin/users/:id/adjust` — Manual balance correction.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a zero amount or empty
/// reason, or [`GatewayError::UserNotFound`] for an unknown user.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/adjust",
    tag = "Admin",
    summary = "Adjust a user's points",
    description = "Adds the signed amount to the balance and appends exactly one audit transaction.",
    params(
        ("id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    request_body = AdjustPointsRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Zero amount or empty reason", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn adjust_points(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AdjustPointsRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state
        .ledger
        .adjust_user_points(UserId::from_uuid(id), req.amount, &req.reason)
        .await?;
    let threshold = state.ledger.withdrawal_threshold();
    Ok(Json(UserResponse::from_user(user, threshold)))
}

/// `POST /admin/tasks` — Add a task to the catalog.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for an empty title.
#[utoipa::path(
    post,
    path = "/api/v1/admin/tasks",
    tag = "Admin",
    summary = "Add a task",
    description = "Assigns the next id and seeds an incomplete progress entry for every existing user.",
    request_body = TaskDraft,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Empty title", body = ErrorResponse),
    )
)]
pub async fn add_task(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(draft): Json<TaskDraft>,
) -> Result<impl IntoResponse, GatewayError> {
    let task = state.ledger.add_task(draft).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PUT /admin/tasks/:id` — Replace a task wholesale.
///
/// # Errors
///
/// Returns [`GatewayError::TaskNotFound`] for an unknown id or
/// [`GatewayError::InvalidRequest`] for an empty title.
#[utoipa::path(
    put,
    path = "/api/v1/admin/tasks/{id}",
    tag = "Admin",
    summary = "Update a task",
    description = "Replaces the stored task. Points already credited for completed progress entries are not recalculated.",
    params(
        ("id" = u64, Path, description = "Task id"),
    ),
    request_body = TaskDraft,
    responses(
        (status = 200, description = "Updated task", body = Task),
        (status = 404, description = "Task not found", body = ErrorResponse),
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<u64>,
    Json(draft): Json<TaskDraft>,
) -> Result<impl IntoResponse, GatewayError> {
    let task = state
        .ledger
        .update_task(Task {
            id: TaskId::from_raw(id),
            title: draft.title,
            description: draft.description,
            points: draft.points,
            link: draft.link,
        })
        .await?;
    Ok(Json(task))
}

/// `DELETE /admin/tasks/:id` — Delete a task.
///
/// # Errors
///
/// Returns [`GatewayError::TaskNotFound`] if the id did not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/tasks/{id}",
    tag = "Admin",
    summary = "Delete a task",
    description = "Removes the task and its progress entry from every user. Earned points and transaction history are untouched.",
    params(
        ("id" = u64, Path, description = "Task id"),
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found", body = ErrorResponse),
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, GatewayError> {
    let task_id = TaskId::from_raw(id);
    if state.ledger.delete_task(task_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(GatewayError::TaskNotFound(task_id))
    }
}

/// `GET /admin/withdrawals` — All withdrawal requests.
#[utoipa::path(
    get,
    path = "/api/v1/admin/withdrawals",
    tag = "Admin",
    summary = "List withdrawal requests",
    responses(
        (status = 200, description = "Requests in creation order", body = Vec<crate::domain::WithdrawalRequest>),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
    )
)]
pub async fn list_withdrawals(
    State(state): State<AppState>,
    _session: AdminSession,
) -> impl IntoResponse {
    Json(state.ledger.list_withdrawals().await)
}

/// `POST /admin/withdrawals/:id/process` — Resolve a pending request.
///
/// # Errors
///
/// Returns [`GatewayError::WithdrawalNotFound`] for an unknown id or
/// [`GatewayError::AlreadyProcessed`] if it was already resolved.
#[utoipa::path(
    post,
    path = "/api/v1/admin/withdrawals/{id}/process",
    tag = "Admin",
    summary = "Process a withdrawal request",
    description = "Applies the decision to a pending request exactly once and mirrors it onto the user's status.",
    params(
        ("id" = u64, Path, description = "Withdrawal request id"),
    ),
    request_body = ProcessWithdrawalRequest,
    responses(
        (status = 200, description = "Resolved request", body = crate::domain::WithdrawalRequest),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Already processed", body = ErrorResponse),
    )
)]
pub async fn process_withdrawal(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<u64>,
    Json(req): Json<ProcessWithdrawalRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let request = state.ledger.process_withdrawal(id, req.decision).await?;
    Ok(Json(request))
}

/// `PUT /admin/settings` — Replace the settings singleton.
#[utoipa::path(
    put,
    path = "/api/v1/admin/settings",
    tag = "Admin",
    summary = "Update settings",
    description = "Replaces the singleton wholesale; no partial merge.",
    request_body = AdminSettings,
    responses(
        (status = 200, description = "Stored settings", body = AdminSettings),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
    )
)]
pub async fn update_settings(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(settings): Json<AdminSettings>,
) -> impl IntoResponse {
    Json(state.ledger.update_settings(settings).await)
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(login))
        .route("/admin/logout", post(logout))
        .route("/admin/overview", get(overview))
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}/adjust", post(adjust_points))
        .route("/admin/tasks", post(add_task))
        .route("/admin/tasks/{id}", put(update_task).delete(delete_task))
        .route("/admin/withdrawals", get(list_withdrawals))
        .route("/admin/withdrawals/{id}/process", post(process_withdrawal))
        .route("/admin/settings", put(update_settings))
}
