//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Every failure is a normal returned outcome; nothing here aborts the
//! process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{TaskId, UserId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: amount must be nonzero",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status                |
/// |-----------|------------|----------------------------|
/// | 1000–1999 | Validation | 400 Bad Request            |
/// | 2000–2999 | Not Found  | 404 Not Found              |
/// | 3000–3999 | Server     | 500 Internal Server Error  |
/// | 4000–4999 | Conflict   | 409 Conflict               |
/// | 4100–4199 | Auth       | 401 Unauthorized           |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed (bad input shape or value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// User's balance is below the withdrawal eligibility threshold.
    #[error("not eligible for withdrawal: {points} points, threshold is {threshold}")]
    NotEligible {
        /// Current point balance.
        points: i64,
        /// Required minimum balance.
        threshold: i64,
    },

    /// User with the given ID was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// Task with the given ID was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Withdrawal request with the given ID was not found.
    #[error("withdrawal request not found: {0}")]
    WithdrawalNotFound(u64),

    /// Withdrawal request has already left the pending state.
    #[error("withdrawal request {0} already processed")]
    AlreadyProcessed(u64),

    /// User already has a withdrawal request awaiting a decision.
    #[error("user {0} already has a pending withdrawal request")]
    PendingWithdrawalExists(UserId),

    /// Missing or invalid admin session credential.
    #[error("unauthorized: valid admin session required")]
    Unauthorized,

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::NotEligible { .. } => 1002,
            Self::UserNotFound(_) => 2001,
            Self::TaskNotFound(_) => 2002,
            Self::WithdrawalNotFound(_) => 2003,
            Self::AlreadyProcessed(_) => 4001,
            Self::PendingWithdrawalExists(_) => 4002,
            Self::Unauthorized => 4101,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::NotEligible { .. } => StatusCode::BAD_REQUEST,
            Self::UserNotFound(_) | Self::TaskNotFound(_) | Self::WithdrawalNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::AlreadyProcessed(_) | Self::PendingWithdrawalExists(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = GatewayError::InvalidRequest("reason must not be empty".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
    }

    #[test]
    fn not_eligible_is_validation_class() {
        let err = GatewayError::NotEligible {
            points: 400,
            threshold: 2000,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("2000"));
    }

    #[test]
    fn not_found_variants_map_to_404() {
        let user = GatewayError::UserNotFound(UserId::new());
        let task = GatewayError::TaskNotFound(TaskId::from_raw(7));
        assert_eq!(user.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(task.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn already_processed_is_conflict() {
        let err = GatewayError::AlreadyProcessed(3);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 4001);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        assert_eq!(
            GatewayError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
