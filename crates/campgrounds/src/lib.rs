//! # Campgrounds
//!
//! The campground domain: the persisted record and its request/response
//! types, the repository over PostgreSQL, the ownership capability check,
//! and the uniform error type every handler returns.

/// Ownership capability check for owner-only operations.
pub mod ownership;
/// Policy for repository read failures on the read-only routes.
pub mod policy;
/// Repository operations over the campground tables.
pub mod service;
/// Models, request/response types, and the domain error.
pub mod types;

pub use ownership::{OwnershipDecision, check_campground_ownership};
pub use policy::ReadFailurePolicy;
pub use service::CampgroundService;
pub use types::*;
