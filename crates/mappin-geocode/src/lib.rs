//! Mappin Geocode - Geocoding port adapters
//!
//! Provides a Mapbox-compatible HTTP geocoder and an in-memory geocoder for
//! development and testing.

pub mod mapbox;
pub mod memory;

pub use mapbox::MapboxGeocoder;
pub use memory::StaticGeocoder;
