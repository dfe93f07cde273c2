//! Per-connection subscription manager.
//!
//! Tracks which user ids a WebSocket client is subscribed to and provides
//! server-side event filtering.

use std::collections::HashSet;

use crate::domain::UserId;

/// Manages the set of user subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed user ids. If `subscribe_all` is true, this set is ignored.
    user_ids: HashSet<UserId>,
    /// Whether the client subscribes to all events (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds user ids to the subscription set. `"*"` enables the wildcard.
    pub fn subscribe(&mut self, ids: &[UserId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for id in ids {
            self.user_ids.insert(*id);
        }
    }

    /// Removes user ids from the subscription set.
    pub fn unsubscribe(&mut self, ids: &[UserId]) {
        for id in ids {
            self.user_ids.remove(id);
        }
    }

    /// Returns `true` if an event owned by `user_id` matches the filter.
    ///
    /// Catalog-wide events carry no user id and match only the wildcard.
    #[must_use]
    pub fn matches(&self, user_id: Option<UserId>) -> bool {
        match user_id {
            _ if self.subscribe_all => true,
            Some(id) => self.user_ids.contains(&id),
            None => false,
        }
    }

    /// Returns the number of explicitly subscribed user ids.
    #[must_use]
    pub fn count(&self) -> usize {
        self.user_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
