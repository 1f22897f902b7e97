use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Coordinate, GeocoderId};

/// A single forward-geocoding match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub coordinate: Coordinate,
    pub label: String,
}

/// Port for forward and reverse geocoding
#[async_trait]
pub trait GeocodingPort: Send + Sync {
    /// Resolve a free-text query into candidates, best match first
    async fn forward_geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>>;

    /// Resolve a coordinate into a human-readable label
    ///
    /// Returns `None` when the provider knows no place at that position.
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Option<String>>;

    /// Provider identifier recorded by the store
    fn id(&self) -> GeocoderId;
}
