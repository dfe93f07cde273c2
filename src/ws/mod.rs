//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` pushes ledger events to dashboards so
//! they do not have to refetch after every mutation.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
