use mappin_core::config::ConfigSource;
use mappin_core::models::{Coordinate, Viewport};
use serde::Serialize;

/// Output for simulate command
#[derive(Debug, Serialize)]
pub struct SimulateOutput {
    pub form_location: String,
    pub viewport: Viewport,
    pub click_cursor: Option<usize>,
    pub revision: u64,
    pub map_calls: usize,
    pub slots: Vec<SlotReport>,
}

#[derive(Debug, Serialize)]
pub struct SlotReport {
    pub index: usize,
    pub label: String,
    pub input: String,
    pub editable: bool,
    pub location: Option<Coordinate>,
    pub value: Option<String>,
}

/// Output for geocode command
#[derive(Debug, Serialize)]
pub struct GeocodeOutput {
    pub query: String,
    pub geocoder: String,
    pub results: Vec<GeocodeResultItem>,
}

#[derive(Debug, Serialize)]
pub struct GeocodeResultItem {
    pub label: String,
    pub location: Option<Coordinate>,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub entries: Vec<ConfigEntry>,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: ConfigSource,
}
