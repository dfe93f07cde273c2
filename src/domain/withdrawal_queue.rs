//! Withdrawal request storage and its pending→resolved transition.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;

use super::{RequestStatus, UserId, WithdrawalDecision, WithdrawalRequest};
use crate::error::GatewayError;

/// All withdrawal requests, in creation order.
///
/// Requests are append-only except for the one-shot status transition out
/// of `Pending`; resolved requests are kept forever as history.
#[derive(Debug)]
pub struct WithdrawalQueue {
    requests: RwLock<Vec<WithdrawalRequest>>,
    next_id: AtomicU64,
}

impl WithdrawalQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Opens a new pending request snapshotting the user's name and balance.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PendingWithdrawalExists`] if the user already
    /// has a request awaiting a decision.
    pub async fn open(
        &self,
        user_id: UserId,
        username: String,
        points: i64,
    ) -> Result<WithdrawalRequest, GatewayError> {
        let mut requests = self.requests.write().await;
        if requests
            .iter()
            .any(|r| r.user_id == user_id && r.status == RequestStatus::Pending)
        {
            return Err(GatewayError::PendingWithdrawalExists(user_id));
        }
        let request = WithdrawalRequest {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            username,
            points,
            status: RequestStatus::Pending,
            timestamp: Utc::now(),
        };
        requests.push(request.clone());
        Ok(request)
    }

    /// Applies an admin decision to a pending request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::WithdrawalNotFound`] for an unknown id, or
    /// [`GatewayError::AlreadyProcessed`] if the request has already left
    /// the pending state.
    pub async fn process(
        &self,
        request_id: u64,
        decision: WithdrawalDecision,
    ) -> Result<WithdrawalRequest, GatewayError> {
        let mut requests = self.requests.write().await;
        let request = requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or(GatewayError::WithdrawalNotFound(request_id))?;
        if request.status != RequestStatus::Pending {
            return Err(GatewayError::AlreadyProcessed(request_id));
        }
        request.status = RequestStatus::from(decision);
        Ok(request.clone())
    }

    /// Returns all requests in creation order.
    pub async fn list(&self) -> Vec<WithdrawalRequest> {
        self.requests.read().await.clone()
    }

    /// Returns `true` if the user has a request awaiting a decision.
    pub async fn has_pending(&self, user_id: UserId) -> bool {
        self.requests
            .read()
            .await
            .iter()
            .any(|r| r.user_id == user_id && r.status == RequestStatus::Pending)
    }

    /// Replaces the queue contents (snapshot restore), resuming the id
    /// sequence after the highest restored id.
    pub async fn replace_all(&self, requests: Vec<WithdrawalRequest>) {
        let next = requests.iter().map(|r| r.id).max().map_or(1, |max| max + 1);
        self.next_id.store(next, Ordering::Relaxed);
        *self.requests.write().await = requests;
    }

    /// Returns the number of requests ever made.
    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Returns `true` if no request was ever made.
    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }
}

impl Default for WithdrawalQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_pending_request() {
        let queue = WithdrawalQueue::new();
        let user = UserId::new();
        let request = queue.open(user, "alice".to_string(), 2500).await;
        let Ok(request) = request else {
            panic!("open failed");
        };
        assert_eq!(request.id, 1);
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.points, 2500);
        assert!(queue.has_pending(user).await);
    }

    #[tokio::test]
    async fn second_pending_request_is_rejected() {
        let queue = WithdrawalQueue::new();
        let user = UserId::new();
        let _ = queue.open(user, "alice".to_string(), 2500).await;
        let second = queue.open(user, "alice".to_string(), 2500).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn resolved_user_may_request_again() {
        let queue = WithdrawalQueue::new();
        let user = UserId::new();
        let first = queue.open(user, "alice".to_string(), 2500).await;
        let Ok(first) = first else {
            panic!("open failed");
        };
        let _ = queue.process(first.id, WithdrawalDecision::Rejected).await;

        let second = queue.open(user, "alice".to_string(), 2600).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn process_transitions_exactly_once() {
        let queue = WithdrawalQueue::new();
        let user = UserId::new();
        let request = queue.open(user, "alice".to_string(), 2500).await;
        let Ok(request) = request else {
            panic!("open failed");
        };

        let processed = queue
            .process(request.id, WithdrawalDecision::Approved)
            .await;
        let Ok(processed) = processed else {
            panic!("process failed");
        };
        assert_eq!(processed.status, RequestStatus::Approved);

        // Any further attempt conflicts, including with the same decision.
        let again = queue
            .process(request.id, WithdrawalDecision::Approved)
            .await;
        assert!(matches!(again, Err(GatewayError::AlreadyProcessed(_))));
    }

    #[tokio::test]
    async fn process_unknown_id_errors() {
        let queue = WithdrawalQueue::new();
        let result = queue.process(99, WithdrawalDecision::Approved).await;
        assert!(matches!(result, Err(GatewayError::WithdrawalNotFound(99))));
    }
}
