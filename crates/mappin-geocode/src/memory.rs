//! In-memory geocoder for development and testing.
//!
//! Like the in-memory stores elsewhere in this workspace, the lock is unwrapped
//! intentionally: poisoning only follows a panic in another thread.

use async_trait::async_trait;
use mappin_core::error::{MappinError, Result};
use mappin_core::models::{Coordinate, GeocoderId};
use mappin_core::ports::{GeocodeCandidate, GeocodingPort};
use std::sync::{Arc, RwLock};

/// Default search radius for reverse lookups, in degrees
const REVERSE_RADIUS_DEG: f64 = 0.05;

/// Geocoder answering from a fixed list of places
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: Vec<GeocodeCandidate>,
    failing: bool,
    queries: Arc<RwLock<Vec<String>>>,
}

impl StaticGeocoder {
    /// Create an empty geocoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a known place
    pub fn with_place(mut self, label: impl Into<String>, coordinate: Coordinate) -> Self {
        self.places.push(GeocodeCandidate { coordinate, label: label.into() });
        self
    }

    /// A geocoder whose every lookup fails, as when the network is down
    pub fn failing() -> Self {
        Self { failing: true, ..Self::default() }
    }

    /// Forward queries seen so far, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries.read().unwrap().clone()
    }

    fn check_available(&self) -> Result<()> {
        if self.failing {
            Err(MappinError::GeocoderUnavailable {
                reason: "static geocoder configured to fail".to_string(),
                remediation: "Use StaticGeocoder::new() for a working geocoder".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl GeocodingPort for StaticGeocoder {
    async fn forward_geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        self.queries.write().unwrap().push(query.to_string());
        self.check_available()?;

        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .places
            .iter()
            .filter(|place| place.label.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Option<String>> {
        self.check_available()?;

        let nearest = self
            .places
            .iter()
            .map(|place| (place, degree_distance(place.coordinate, coordinate)))
            .filter(|(_, distance)| *distance <= REVERSE_RADIUS_DEG)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        Ok(nearest.map(|(place, _)| place.label.clone()))
    }

    fn id(&self) -> GeocoderId {
        GeocoderId("static".to_string())
    }
}

fn degree_distance(a: Coordinate, b: Coordinate) -> f64 {
    (a.latitude - b.latitude).hypot(a.longitude - b.longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    fn geocoder() -> StaticGeocoder {
        StaticGeocoder::new()
            .with_place("Alexanderplatz, 10178 Berlin", coord(52.5219, 13.4132))
            .with_place("Brandenburger Tor, 10117 Berlin", coord(52.5163, 13.3777))
            .with_place("Marienplatz, 80331 München", coord(48.1374, 11.5755))
    }

    #[tokio::test]
    async fn test_forward_matches_case_insensitively() {
        let geocoder = geocoder();
        let candidates = geocoder.forward_geocode("berlin").await.unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].label, "Alexanderplatz, 10178 Berlin");
        assert_eq!(geocoder.queries(), vec!["berlin".to_string()]);
    }

    #[tokio::test]
    async fn test_forward_without_match() {
        let candidates = geocoder().forward_geocode("Paris").await.unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_reverse_picks_nearest_place() {
        let label = geocoder().reverse_geocode(coord(52.517, 13.38)).await.unwrap();
        assert_eq!(label.as_deref(), Some("Brandenburger Tor, 10117 Berlin"));
    }

    #[tokio::test]
    async fn test_reverse_outside_radius() {
        let label = geocoder().reverse_geocode(coord(0.0, 0.0)).await.unwrap();
        assert_eq!(label, None);
    }

    #[tokio::test]
    async fn test_failing_geocoder() {
        let geocoder = StaticGeocoder::failing();
        assert!(geocoder.forward_geocode("US").await.is_err());
        assert!(geocoder.reverse_geocode(coord(1.0, 1.0)).await.is_err());
        assert_eq!(geocoder.queries(), vec!["US".to_string()]);
    }
}
