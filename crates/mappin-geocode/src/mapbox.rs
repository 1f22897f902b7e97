use async_trait::async_trait;
use mappin_core::error::{MappinError, Result};
use mappin_core::models::{Coordinate, GeocoderId};
use mappin_core::ports::{GeocodeCandidate, GeocodingPort};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

/// Maximum number of forward candidates requested per lookup
const FORWARD_LIMIT: u8 = 5;

/// Geocoder speaking the Mapbox places v5 protocol
pub struct MapboxGeocoder {
    /// Endpoint base, e.g. "https://api.mapbox.com/geocoding/v5/mapbox.places"
    base_url: String,

    /// Provider access token
    access_token: String,

    /// HTTP client
    client: reqwest::Client,
}

impl MapboxGeocoder {
    /// Create a new geocoder with a request timeout
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            MappinError::GeocoderUnavailable {
                reason: format!("Failed to create HTTP client: {}", e),
                remediation: "Check the TLS configuration of this host".to_string(),
            }
        })?;

        Ok(Self { base_url: base_url.into(), access_token: access_token.into(), client })
    }

    /// Create against the public Mapbox endpoint
    pub fn hosted(access_token: impl Into<String>) -> Result<Self> {
        Self::new(
            mappin_core::config::DEFAULT_GEOCODER_URL,
            access_token,
            Duration::from_secs(mappin_core::config::DEFAULT_GEOCODER_TIMEOUT_SECS),
        )
    }

    /// Build the request URL for a search term (free text or "lng,lat")
    fn endpoint(&self, search: &str, limit: u8) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| MappinError::ConfigInvalid {
            key: "geocoder_url".to_string(),
            reason: format!("Invalid geocoder URL '{}': {}", self.base_url, e),
        })?;

        url.path_segments_mut()
            .map_err(|_| MappinError::ConfigInvalid {
                key: "geocoder_url".to_string(),
                reason: format!("Geocoder URL '{}' cannot have path segments", self.base_url),
            })?
            .pop_if_empty()
            .push(&format!("{}.json", search));

        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token)
            .append_pair("limit", &limit.to_string());

        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<PlacesResponse> {
        let response = self.client.get(url).send().await.map_err(|e| {
            MappinError::GeocoderUnavailable {
                reason: format!("Failed to reach geocoder: {}", e),
                remediation: format!(
                    "Ensure {} is reachable and the request timeout is long enough",
                    self.base_url
                ),
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MappinError::GeocoderUnavailable {
                reason: format!("Geocoder API error ({}): {}", status, error_text),
                remediation: "Check that the access token is valid and has geocoding scope"
                    .to_string(),
            });
        }

        response.json().await.map_err(|e| MappinError::GeocoderUnavailable {
            reason: format!("Failed to parse geocoder response: {}", e),
            remediation: "Check geocoder API compatibility".to_string(),
        })
    }
}

#[async_trait]
impl GeocodingPort for MapboxGeocoder {
    async fn forward_geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let places = self.fetch(self.endpoint(query, FORWARD_LIMIT)?).await?;
        tracing::debug!("Geocoder returned {} features for '{}'", places.features.len(), query);
        Ok(places.into_candidates())
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Option<String>> {
        let search = format!("{},{}", coordinate.longitude, coordinate.latitude);
        let places = self.fetch(self.endpoint(&search, 1)?).await?;
        Ok(places.features.into_iter().next().map(|feature| feature.place_name))
    }

    fn id(&self) -> GeocoderId {
        GeocoderId("mapbox.places".to_string())
    }
}

/// Response from the places API
#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    features: Vec<PlaceFeature>,
}

#[derive(Debug, Deserialize)]
struct PlaceFeature {
    /// `[longitude, latitude]`
    center: [f64; 2],

    #[serde(default)]
    place_name: String,
}

impl PlacesResponse {
    fn into_candidates(self) -> Vec<GeocodeCandidate> {
        self.features
            .into_iter()
            .filter_map(|feature| match Coordinate::from_lng_lat(feature.center) {
                Ok(coordinate) => Some(GeocodeCandidate { coordinate, label: feature.place_name }),
                Err(e) => {
                    tracing::warn!("Skipping geocoder feature '{}': {}", feature.place_name, e);
                    None
                }
            })
            .collect()
    }
}
