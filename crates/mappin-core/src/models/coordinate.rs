use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MappinError, Result};

/// Geographic coordinate in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, within [-90, 90]
    #[serde(alias = "lat")]
    pub latitude: f64,

    /// Longitude in degrees, within [-180, 180]
    #[serde(alias = "lng")]
    pub longitude: f64,
}

impl Coordinate {
    /// Off-frame position used for markers whose slot has no location yet.
    ///
    /// Web Mercator cannot project the pole, so markers parked here never show.
    pub const SENTINEL: Coordinate = Coordinate { latitude: 90.0, longitude: 0.0 };

    /// Create a coordinate, rejecting values outside the valid ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self { latitude, longitude };
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(MappinError::InvalidCoordinate { latitude, longitude })
        }
    }

    /// Check the latitude/longitude range invariant
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Build from a `[longitude, latitude]` pair as used by GeoJSON and most geocoders
    pub fn from_lng_lat(position: [f64; 2]) -> Result<Self> {
        Self::new(position[1], position[0])
    }

    /// `[longitude, latitude]` pair
    pub fn to_lng_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Map viewport owned by the store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(center: Coordinate, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Zoom levels must be finite and non-negative
    pub fn is_valid_zoom(zoom: f64) -> bool {
        zoom.is_finite() && zoom >= 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: Coordinate { latitude: 0.0, longitude: 0.0 },
            zoom: 1.0,
        }
    }
}
