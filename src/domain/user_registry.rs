//! Concurrent user storage with per-user fine-grained locking.
//!
//! [`UserRegistry`] stores all registered users in a `HashMap` where each
//! entry is individually protected by a [`tokio::sync::RwLock`]. This
//! allows concurrent reads on the same user and concurrent writes on
//! different users, while point mutations for the same user are serialized.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{User, UserId};
use crate::error::GatewayError;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, Arc<RwLock<User>>>,
    // Username lookup for register-or-fetch; usernames are immutable.
    by_username: HashMap<String, UserId>,
}

/// Central store for all registered users.
///
/// Uses a `RwLock` for the outer maps and per-entry `Arc<RwLock<User>>`
/// for fine-grained per-user locking.
///
/// # Concurrency
///
/// - Multiple tasks may read the same user concurrently.
/// - Writes to different users are concurrent.
/// - Writes to the same user are serialized, which keeps task completion
///   exactly-once under concurrent duplicate submissions.
#[derive(Debug, Default)]
pub struct UserRegistry {
    inner: RwLock<Inner>,
}

impl UserRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `user` unless the username is already registered, in which
    /// case the existing entry is returned instead.
    ///
    /// Returns the entry and whether it was freshly created. Atomic under
    /// the outer write lock, so two concurrent registrations of the same
    /// username yield the same user.
    pub async fn get_or_insert(&self, user: User) -> (Arc<RwLock<User>>, bool) {
        let mut inner = self.inner.write().await;
        if let Some(id) = inner.by_username.get(&user.username)
            && let Some(existing) = inner.users.get(id)
        {
            return (Arc::clone(existing), false);
        }
        let id = user.id;
        let username = user.username.clone();
        let entry = Arc::new(RwLock::new(user));
        inner.users.insert(id, Arc::clone(&entry));
        inner.by_username.insert(username, id);
        (entry, true)
    }

    /// Returns a shared reference to the user entry behind its per-user lock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] if no user with the given ID
    /// exists.
    pub async fn get(&self, user_id: UserId) -> Result<Arc<RwLock<User>>, GatewayError> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(&user_id)
            .cloned()
            .ok_or(GatewayError::UserNotFound(user_id))
    }

    /// Looks a user up by username.
    pub async fn find_by_username(&self, username: &str) -> Option<Arc<RwLock<User>>> {
        let inner = self.inner.read().await;
        inner
            .by_username
            .get(username)
            .and_then(|id| inner.users.get(id))
            .cloned()
    }

    /// Returns every user entry for cross-user sweeps (e.g. task cascades).
    pub async fn entries(&self) -> Vec<Arc<RwLock<User>>> {
        let inner = self.inner.read().await;
        inner.users.values().cloned().collect()
    }

    /// Returns a cloned snapshot of all users, sorted by registration time.
    pub async fn list(&self) -> Vec<User> {
        let entries = self.entries().await;
        let mut users = Vec::with_capacity(entries.len());
        for entry in &entries {
            users.push(entry.read().await.clone());
        }
        users.sort_by_key(|u| u.created_at);
        users
    }

    /// Replaces the whole registry contents (snapshot restore).
    pub async fn replace_all(&self, users: Vec<User>) {
        let mut inner = self.inner.write().await;
        inner.users.clear();
        inner.by_username.clear();
        for user in users {
            let id = user.id;
            inner.by_username.insert(user.username.clone(), id);
            inner.users.insert(id, Arc::new(RwLock::new(user)));
        }
    }

    /// Returns the number of registered users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// Returns `true` if the registry contains no users.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.users.is_empty()
    }
}
