//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod system;
pub mod task;
pub mod user;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(user::routes())
        .merge(task::routes())
        .merge(admin::routes())
}
