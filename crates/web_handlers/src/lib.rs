//! # Web Handlers for the Staynest Marketplace Backend
//!
//! This crate provides the actix-web route handlers for the marketplace API.

/// Authentication handlers (register, login)
mod auth_handlers;
pub use auth_handlers::*;

/// User profile handlers (get/update own profile)
mod profile_handlers;
pub use profile_handlers::*;

/// Property CRUD, search, and availability handlers
mod property_handlers;
pub use property_handlers::*;

/// Booking lifecycle handlers
mod booking_handlers;
pub use booking_handlers::*;

/// Review handlers
mod review_handlers;
pub use review_handlers::*;

/// Conversation and message handlers
mod conversation_handlers;
pub use conversation_handlers::*;

/// Notification handlers
mod notification_handlers;
pub use notification_handlers::*;

/// Admin moderation handlers
mod admin_handlers;
pub use admin_handlers::*;
