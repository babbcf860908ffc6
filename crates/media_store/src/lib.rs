//! # Media Store
//!
//! This crate provides a client for a Cloudinary-compatible image hosting
//! API: uploading a local file in exchange for a public URL plus an opaque
//! asset identifier, and destroying an asset by that identifier.

mod client;

pub use client::{MediaStoreClient, MediaStoreError, UploadedAsset};
