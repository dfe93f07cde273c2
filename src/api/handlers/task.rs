//! Public task listing.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::Task;

/// `GET /tasks` — The full task sequence in creation order.
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "Tasks",
    summary = "List tasks",
    description = "Returns every task in creation order. Not paginated; the catalog is small by design.",
    responses(
        (status = 200, description = "Task list", body = Vec<Task>),
    )
)]
pub async fn list_tasks(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.ledger.list_tasks().await)
}

/// Task routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/tasks", get(list_tasks))
}
