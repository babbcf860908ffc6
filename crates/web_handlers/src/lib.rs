//! # Web Handlers
//!
//! The campground route handlers and the multipart upload receiver they
//! share. Each handler composes the upload receiver, the geocoding client,
//! the media store client and the campground repository into a sequential
//! pipeline and returns the uniform campground error on any failure.

/// The seven campground route handlers.
pub mod handlers;
/// Multipart intake: form-field parsing and image staging.
pub mod upload;

pub use handlers::*;
pub use upload::{ALLOWED_IMAGE_EXTENSIONS, StagedUpload, is_allowed_image};
