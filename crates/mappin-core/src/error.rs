//! Error types for Mappin

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappinError {
    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Model errors
    #[error("Coordinate out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid zoom level {zoom}: expected a finite value >= 0")]
    InvalidZoom { zoom: f64 },

    // Host form errors
    #[error("Failed to read host form: {reason}")]
    FormParse { reason: String },

    // Port errors
    #[error("Geocoder unavailable: {reason}. Try: {remediation}")]
    GeocoderUnavailable {
        reason: String,
        remediation: String,
    },

    #[error("Map unavailable: {reason}")]
    MapUnavailable { reason: String },

    // Widget lifecycle errors
    #[error("Widget is no longer running")]
    WidgetStopped,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, MappinError>;
