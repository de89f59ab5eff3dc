//! # Notification Services
//!
//! This crate persists notification records and pushes them to the target
//! user's live sessions over per-user broadcast channels.

/// Live-session channel registry keyed by user id.
pub mod dispatcher;
/// Notification persistence and delivery operations.
pub mod service;
/// Types and structures used in notification services.
pub mod types;

pub use dispatcher::Dispatcher;
pub use service::NotificationService;
pub use types::{LiveEvent, Notification, NotificationError};
