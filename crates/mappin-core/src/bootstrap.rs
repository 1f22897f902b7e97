//! One-shot resolution of the initial viewport
//!
//! A configured default view wins. Otherwise a coarse query is built from the
//! host's locale signals and forward-geocoded; any failure leaves the viewport
//! at its global default.

use serde::{Deserialize, Serialize};

use crate::models::DefaultView;
use crate::ports::GeocodingPort;
use crate::store::StoreEvent;

/// Country used when the host provides no locale signal
pub const FALLBACK_COUNTRY: &str = "US";

/// Ambient locale signals provided by the host page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleHint {
    pub country_code: Option<String>,
    pub postal_code: Option<String>,
}

impl LocaleHint {
    /// Coarse location query, e.g. `"DE 10115"` or `"DE"`
    pub fn query(&self) -> String {
        let region = self
            .country_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .unwrap_or(FALLBACK_COUNTRY);

        match self.postal_code.as_deref().map(str::trim).filter(|code| !code.is_empty()) {
            Some(postal) => format!("{} {}", region, postal),
            None => region.to_string(),
        }
    }
}

/// Event that centers the map at startup, if one can be determined
pub async fn initial_viewport(
    default_view: Option<DefaultView>,
    locale: &LocaleHint,
    geocoder: &dyn GeocodingPort,
) -> Option<StoreEvent> {
    if let Some(view) = default_view {
        tracing::debug!("Using configured default view at {}", view.location);
        return Some(StoreEvent::SetViewport { center: view.location, zoom: Some(view.zoom) });
    }

    let query = locale.query();
    match geocoder.forward_geocode(&query).await {
        Ok(candidates) => match candidates.into_iter().next() {
            Some(candidate) => {
                tracing::info!(
                    "Initial location '{}' resolved to {} ({})",
                    query,
                    candidate.coordinate,
                    candidate.label
                );
                Some(StoreEvent::SetViewport { center: candidate.coordinate, zoom: None })
            }
            None => {
                tracing::info!("No match for initial location '{}'; keeping default view", query);
                None
            }
        },
        Err(e) => {
            tracing::warn!("Initial location lookup for '{}' failed: {}", query, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MappinError, Result};
    use crate::models::{Coordinate, GeocoderId};
    use crate::ports::GeocodeCandidate;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeGeocoder {
        response: fn() -> Result<Vec<GeocodeCandidate>>,
        queries: Mutex<Vec<String>>,
    }

    impl FakeGeocoder {
        fn new(response: fn() -> Result<Vec<GeocodeCandidate>>) -> Self {
            Self { response, queries: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl GeocodingPort for FakeGeocoder {
        async fn forward_geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
            self.queries.lock().unwrap().push(query.to_string());
            (self.response)()
        }

        async fn reverse_geocode(&self, _coordinate: Coordinate) -> Result<Option<String>> {
            Ok(None)
        }

        fn id(&self) -> GeocoderId {
            GeocoderId("fake".to_string())
        }
    }

    fn berlin() -> Result<Vec<GeocodeCandidate>> {
        Ok(vec![
            GeocodeCandidate {
                coordinate: Coordinate { latitude: 52.53, longitude: 13.38 },
                label: "10115 Berlin".to_string(),
            },
            GeocodeCandidate {
                coordinate: Coordinate { latitude: 0.0, longitude: 0.0 },
                label: "elsewhere".to_string(),
            },
        ])
    }

    #[test]
    fn test_locale_query() {
        assert_eq!(LocaleHint::default().query(), "US");
        let hint = LocaleHint { country_code: Some("DE".to_string()), postal_code: None };
        assert_eq!(hint.query(), "DE");
        let hint = LocaleHint { country_code: None, postal_code: Some("94103".to_string()) };
        assert_eq!(hint.query(), "US 94103");
        let hint =
            LocaleHint { country_code: Some(" ".to_string()), postal_code: Some("".to_string()) };
        assert_eq!(hint.query(), "US");
    }

    #[tokio::test]
    async fn test_default_view_wins_without_lookup() {
        let geocoder = FakeGeocoder::new(berlin);
        let view = DefaultView { location: Coordinate { latitude: 1.0, longitude: 2.0 }, zoom: 9.0 };

        let event = initial_viewport(Some(view), &LocaleHint::default(), &geocoder).await;

        assert_eq!(
            event,
            Some(StoreEvent::SetViewport { center: view.location, zoom: Some(9.0) })
        );
        assert!(geocoder.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_candidate_centers_map() {
        let geocoder = FakeGeocoder::new(berlin);
        let hint =
            LocaleHint { country_code: Some("DE".to_string()), postal_code: Some("10115".to_string()) };

        let event = initial_viewport(None, &hint, &geocoder).await;

        assert_eq!(
            event,
            Some(StoreEvent::SetViewport {
                center: Coordinate { latitude: 52.53, longitude: 13.38 },
                zoom: None
            })
        );
        assert_eq!(*geocoder.queries.lock().unwrap(), vec!["DE 10115".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_result_is_noop() {
        let geocoder = FakeGeocoder::new(|| Ok(Vec::new()));
        assert_eq!(initial_viewport(None, &LocaleHint::default(), &geocoder).await, None);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_noop() {
        let geocoder = FakeGeocoder::new(|| {
            Err(MappinError::GeocoderUnavailable {
                reason: "timeout".to_string(),
                remediation: "retry".to_string(),
            })
        });
        assert_eq!(initial_viewport(None, &LocaleHint::default(), &geocoder).await, None);
    }
}
