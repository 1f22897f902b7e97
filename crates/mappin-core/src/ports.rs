//! Port trait definitions
//!
//! These traits define the interfaces that map, geocoder, and host-form
//! adapters must implement.

pub mod form;
pub mod geocoding;
pub mod map;

pub use form::{FormElement, HostForm};
pub use geocoding::{GeocodeCandidate, GeocodingPort};
pub use map::{MapOptions, MapPort, MarkerStyle};
