//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::api::auth::SessionStore;
use crate::domain::EventBus;
use crate::service::LedgerService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Ledger service for all business logic.
    pub ledger: Arc<LedgerService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Admin session tokens issued by the login endpoint.
    pub sessions: Arc<SessionStore>,
    /// Shared admin password checked at login.
    pub admin_password: Arc<str>,
}
