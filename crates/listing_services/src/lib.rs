//! # Listing Services
//!
//! Property CRUD, search, and the per-property availability ledger.
//! The ledger records exceptions only: a date with no record is open.

/// Property and availability operations.
pub mod service;
/// Types and structures used in listing services.
pub mod types;

pub use service::ListingService;
pub use types::{ListingError, Property};
