//! # Booking Services
//!
//! The booking lifecycle: creation with its conversation and host
//! notification in one transaction, explicit status transitions with
//! per-edge authority, messaging between the parties, and completed-stay
//! reviews.

/// Booking, conversation, message, and review operations.
pub mod service;
/// The booking status state machine.
pub mod state;
/// Types and structures used in booking services.
pub mod types;

pub use service::BookingService;
pub use state::{BookingParty, BookingStatus};
pub use types::{Booking, BookingError};
