//! # Geocoder
//!
//! This crate provides a client for the Google Maps Geocoding API, which is
//! used to resolve free-text locations into coordinates and a normalized
//! formatted address.

mod client;

pub use client::{GeocodeError, GeocodeResult, GeocoderClient};
