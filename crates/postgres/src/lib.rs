//! # Postgres
//!
//! This crate owns the PostgreSQL connection pool and the campground schema
//! used by the rest of the workspace.

/// Connection pool creation, connection test, and schema bootstrap.
pub mod database;
