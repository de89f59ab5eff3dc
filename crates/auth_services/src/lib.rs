//! # Auth Services
//!
//! This crate provides authentication services for the marketplace backend.
//! It includes JWT token handling, middleware for request authentication, and user account services.

/// JWT token handling and claims definitions.
pub mod jwt;
/// Middleware for request authentication and the authenticated-user extractor.
pub mod middleware;
/// Service definitions for user management and authentication operations.
pub mod service;
/// Types and structures used in authentication services.
pub mod types;
