use crate::bootstrap::LocaleHint;
use crate::error::{MappinError, Result};
use crate::models::{DefaultPin, DefaultView, FormLocation};
use crate::ports::MapOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

pub const DEFAULT_MAP_STYLE: &str = "mapbox://styles/mapbox/streets-v12";
pub const DEFAULT_GEOCODER_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
pub const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration of the widget's host surface
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub access_token: ConfigValue<Option<String>>,
    pub map_style: ConfigValue<String>,
    pub form_location: ConfigValue<FormLocation>,
    pub default_pins: ConfigValue<Vec<DefaultPin>>,
    pub default_view: ConfigValue<Option<DefaultView>>,
    pub geocoder_url: ConfigValue<String>,
    pub geocoder_timeout_secs: ConfigValue<u64>,
    pub country_code: ConfigValue<Option<String>>,
    pub postal_code: ConfigValue<Option<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            access_token: ConfigValue::new(None, ConfigSource::Default),
            map_style: ConfigValue::new(DEFAULT_MAP_STYLE.to_string(), ConfigSource::Default),
            form_location: ConfigValue::new(FormLocation::default(), ConfigSource::Default),
            default_pins: ConfigValue::new(Vec::new(), ConfigSource::Default),
            default_view: ConfigValue::new(None, ConfigSource::Default),
            geocoder_url: ConfigValue::new(DEFAULT_GEOCODER_URL.to_string(), ConfigSource::Default),
            geocoder_timeout_secs: ConfigValue::new(
                DEFAULT_GEOCODER_TIMEOUT_SECS,
                ConfigSource::Default,
            ),
            country_code: ConfigValue::new(None, ConfigSource::Default),
            postal_code: ConfigValue::new(None, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| MappinError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| MappinError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(view) = &file_config.default_view {
            validate_default_view(view)?;
        }
        for (index, pin) in file_config.default_pins.iter().flatten().enumerate() {
            if !pin.location.is_valid() {
                return Err(MappinError::ConfigInvalid {
                    key: format!("default_pins[{}]", index),
                    reason: format!("Location out of range: {}", pin.location),
                });
            }
        }

        if let Some(token) = file_config.access_token {
            self.access_token.update(Some(token), ConfigSource::File);
        }

        if let Some(style) = file_config.map_style {
            self.map_style.update(style, ConfigSource::File);
        }

        if let Some(form_location) = file_config.form_location {
            self.form_location.update(form_location, ConfigSource::File);
        }

        if let Some(pins) = file_config.default_pins {
            self.default_pins.update(pins, ConfigSource::File);
        }

        if let Some(view) = file_config.default_view {
            self.default_view.update(Some(view), ConfigSource::File);
        }

        if let Some(url) = file_config.geocoder_url {
            self.geocoder_url.update(url, ConfigSource::File);
        }

        if let Some(timeout) = file_config.geocoder_timeout_secs {
            self.geocoder_timeout_secs.update(timeout, ConfigSource::File);
        }

        if let Some(locale) = file_config.locale {
            if let Some(country) = locale.country_code {
                self.country_code.update(Some(country), ConfigSource::File);
            }
            if let Some(postal) = locale.postal_code {
                self.postal_code.update(Some(postal), ConfigSource::File);
            }
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // MAPPIN_ACCESS_TOKEN
        if let Ok(token) = env::var("MAPPIN_ACCESS_TOKEN") {
            self.access_token.update(Some(token), ConfigSource::Environment);
        }

        // MAPPIN_MAP_STYLE
        if let Ok(style) = env::var("MAPPIN_MAP_STYLE") {
            self.map_style.update(style, ConfigSource::Environment);
        }

        // MAPPIN_FORM_LOCATION
        if let Ok(location_str) = env::var("MAPPIN_FORM_LOCATION") {
            match parse_form_location(&location_str) {
                Ok(location) => self.form_location.update(location, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid MAPPIN_FORM_LOCATION value '{}': expected top or bottom",
                    location_str
                ),
            }
        }

        // MAPPIN_GEOCODER_URL
        if let Ok(url) = env::var("MAPPIN_GEOCODER_URL") {
            self.geocoder_url.update(url, ConfigSource::Environment);
        }

        // MAPPIN_GEOCODER_TIMEOUT
        if let Ok(timeout_str) = env::var("MAPPIN_GEOCODER_TIMEOUT") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => {
                    self.geocoder_timeout_secs.update(timeout, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid MAPPIN_GEOCODER_TIMEOUT value '{}': expected whole seconds",
                    timeout_str
                ),
            }
        }

        // MAPPIN_COUNTRY_CODE / MAPPIN_POSTAL_CODE
        if let Ok(country) = env::var("MAPPIN_COUNTRY_CODE") {
            self.country_code.update(Some(country), ConfigSource::Environment);
        }
        if let Ok(postal) = env::var("MAPPIN_POSTAL_CODE") {
            self.postal_code.update(Some(postal), ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(token) = overrides.access_token {
            self.access_token.update(Some(token), ConfigSource::Cli);
        }

        if let Some(form_location) = overrides.form_location {
            self.form_location.update(form_location, ConfigSource::Cli);
        }

        if let Some(url) = overrides.geocoder_url {
            self.geocoder_url.update(url, ConfigSource::Cli);
        }

        if let Some(country) = overrides.country_code {
            self.country_code.update(Some(country), ConfigSource::Cli);
        }

        if let Some(postal) = overrides.postal_code {
            self.postal_code.update(Some(postal), ConfigSource::Cli);
        }
    }

    /// Access token, required by hosted map and geocoder providers
    pub fn require_access_token(&self) -> Result<&str> {
        self.access_token
            .value
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| MappinError::ConfigMissing { key: "access_token".to_string() })
    }

    /// Locale signals used by the initial-location lookup
    pub fn locale(&self) -> LocaleHint {
        LocaleHint {
            country_code: self.country_code.value.clone(),
            postal_code: self.postal_code.value.clone(),
        }
    }

    /// Snapshot consumed once by the widget at mount time
    pub fn widget_config(&self, container: impl Into<String>) -> WidgetConfig {
        WidgetConfig {
            form_location: self.form_location.value,
            default_pins: self.default_pins.value.clone(),
            default_view: self.default_view.value,
            map: MapOptions {
                container: container.into(),
                style: self.map_style.value.clone(),
                access_token: self.access_token.value.clone().unwrap_or_default(),
            },
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        let token = match self.access_token.value.as_deref() {
            Some(token) if token.chars().count() > 8 => {
                format!("{}…", token.chars().take(8).collect::<String>())
            }
            Some(_) => "(set)".to_string(),
            None => "(unset)".to_string(),
        };
        map.insert("access_token".to_string(), (token, self.access_token.source));

        map.insert(
            "map_style".to_string(),
            (self.map_style.value.clone(), self.map_style.source),
        );

        map.insert(
            "form_location".to_string(),
            (format!("{:?}", self.form_location.value), self.form_location.source),
        );

        map.insert(
            "default_pins".to_string(),
            (self.default_pins.value.len().to_string(), self.default_pins.source),
        );

        let view = match &self.default_view.value {
            Some(view) => format!("{} @ z{}", view.location, view.zoom),
            None => "(geocoded)".to_string(),
        };
        map.insert("default_view".to_string(), (view, self.default_view.source));

        map.insert(
            "geocoder_url".to_string(),
            (self.geocoder_url.value.clone(), self.geocoder_url.source),
        );

        map.insert(
            "geocoder_timeout_secs".to_string(),
            (self.geocoder_timeout_secs.value.to_string(), self.geocoder_timeout_secs.source),
        );

        map.insert("locale_query".to_string(), (self.locale().query(), self.locale_source()));

        map
    }

    fn locale_source(&self) -> ConfigSource {
        if self.country_code.source.precedence() >= self.postal_code.source.precedence() {
            self.country_code.source
        } else {
            self.postal_code.source
        }
    }
}

/// Host configuration handed to the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub form_location: FormLocation,
    pub default_pins: Vec<DefaultPin>,
    pub default_view: Option<DefaultView>,
    pub map: MapOptions,
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    access_token: Option<String>,
    map_style: Option<String>,
    form_location: Option<FormLocation>,
    default_pins: Option<Vec<DefaultPin>>,
    default_view: Option<DefaultView>,
    geocoder_url: Option<String>,
    geocoder_timeout_secs: Option<u64>,
    locale: Option<FileLocale>,
}

#[derive(Debug, Deserialize, Serialize)]
struct FileLocale {
    country_code: Option<String>,
    postal_code: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub access_token: Option<String>,
    pub form_location: Option<FormLocation>,
    pub geocoder_url: Option<String>,
    pub country_code: Option<String>,
    pub postal_code: Option<String>,
}

/// Parse form location from string
pub fn parse_form_location(s: &str) -> Result<FormLocation> {
    match s.to_lowercase().as_str() {
        "top" => Ok(FormLocation::Top),
        "bottom" => Ok(FormLocation::Bottom),
        _ => Err(MappinError::ConfigInvalid {
            key: "form_location".to_string(),
            reason: format!("Invalid form location: {}. Use top or bottom", s),
        }),
    }
}

fn validate_default_view(view: &DefaultView) -> Result<()> {
    if !view.location.is_valid() {
        return Err(MappinError::ConfigInvalid {
            key: "default_view.location".to_string(),
            reason: format!("Location out of range: {}", view.location),
        });
    }
    if !view.zoom.is_finite() || view.zoom < 0.0 {
        return Err(MappinError::ConfigInvalid {
            key: "default_view.zoom".to_string(),
            reason: format!("Zoom must be >= 0, got {}", view.zoom),
        });
    }
    Ok(())
}
