//! System endpoints: health check and public campaign configuration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Public campaign configuration.
#[derive(Debug, Serialize, ToSchema)]
struct EligibilityResponse {
    withdrawal_threshold: i64,
    listing_date: NaiveDate,
    withdrawal_start_date: NaiveDate,
}

/// `GET /config/eligibility` — Threshold and campaign dates.
#[utoipa::path(
    get,
    path = "/config/eligibility",
    tag = "System",
    summary = "Eligibility configuration",
    description = "Returns the withdrawal point threshold plus the listing and withdrawal start dates, for dashboard display.",
    responses(
        (status = 200, description = "Campaign configuration", body = EligibilityResponse),
    )
)]
pub async fn eligibility_handler(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.ledger.settings().await;
    (
        StatusCode::OK,
        Json(EligibilityResponse {
            withdrawal_threshold: state.ledger.withdrawal_threshold(),
            listing_date: settings.listing_date,
            withdrawal_start_date: settings.withdrawal_start_date,
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/eligibility", get(eligibility_handler))
}
