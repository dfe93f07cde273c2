//! Admin session tokens and the extractor guarding admin routes.
//!
//! The login endpoint checks the shared admin password and issues an
//! opaque UUID bearer token. Every admin handler takes an [`AdminSession`]
//! argument, which rejects requests without a valid token. A single shared
//! password is acceptable only for a low-stakes demo; this layer is
//! deliberately not security-hardened.

use std::collections::HashSet;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::GatewayError;

/// Live admin session tokens.
#[derive(Debug, Default)]
pub struct SessionStore {
    tokens: RwLock<HashSet<Uuid>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh session token.
    pub async fn issue(&self) -> Uuid {
        let token = Uuid::new_v4();
        self.tokens.write().await.insert(token);
        token
    }

    /// Returns `true` if the token belongs to a live session.
    pub async fn is_valid(&self, token: Uuid) -> bool {
        self.tokens.read().await.contains(&token)
    }

    /// Revokes a session token. Returns `false` if it was not live.
    pub async fn revoke(&self, token: Uuid) -> bool {
        self.tokens.write().await.remove(&token)
    }
}

/// Proof of a valid admin session, extracted from the
/// `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession {
    /// The presented session token.
    pub token: Uuid,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(GatewayError::Unauthorized)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(GatewayError::Unauthorized)?;
        let token: Uuid = token
            .trim()
            .parse()
            .map_err(|_| GatewayError::Unauthorized)?;
        if state.sessions.is_valid(token).await {
            Ok(Self { token })
        } else {
            Err(GatewayError::Unauthorized)
        }
    }
}
