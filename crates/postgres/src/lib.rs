//! # Postgres
//!
//! This crate provides a client for the Staynest marketplace backend to interact with a PostgreSQL database.

/// Database client for the marketplace backend.
pub mod database;
