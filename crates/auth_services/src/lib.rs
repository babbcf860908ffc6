//! # Auth Services
//!
//! This crate provides the authentication boundary for the campground API:
//! JWT token verification, a middleware gating authenticated-only routes,
//! and the `CurrentUser` extractor handlers use to identify the caller.
//!
//! User registration, password storage and session management live outside
//! this service; any bearer token signed with the shared secret identifies
//! a user.

/// JWT encoding and verification.
pub mod jwt;
/// Request-gating middleware and the authenticated-user extractor.
pub mod middleware;
/// Claims, the authenticated identity, and the auth error type.
pub mod types;

pub use jwt::JwtService;
pub use middleware::AuthMiddleware;
pub use types::{AuthError, Claims, CurrentUser};
