use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::input::InputSender;
use crate::models::{Coordinate, MapHandle, MarkerHandle};

/// Options used to create a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapOptions {
    /// Host container the map is mounted into
    pub container: String,

    /// Style URL of the basemap
    pub style: String,

    /// Provider access token
    pub access_token: String,
}

/// How a marker is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarkerStyle {
    /// Draggable or fixed pin
    Pin { color: String, draggable: bool },

    /// Text element drawn next to a pin
    Label { text: String },
}

/// Port for the live map surface
///
/// Only the view layer calls this; the store never touches live map objects.
pub trait MapPort {
    fn create_map(&mut self, options: &MapOptions) -> Result<MapHandle>;

    fn set_center(&mut self, map: MapHandle, center: Coordinate) -> Result<()>;

    fn set_zoom(&mut self, map: MapHandle, zoom: f64) -> Result<()>;

    fn add_marker(
        &mut self,
        map: MapHandle,
        at: Coordinate,
        style: MarkerStyle,
    ) -> Result<MarkerHandle>;

    fn move_marker(&mut self, marker: MarkerHandle, to: Coordinate) -> Result<()>;

    fn remove_marker(&mut self, marker: MarkerHandle) -> Result<()>;

    /// Route click, drag, viewport, and ready gestures of `map` into `sink`
    fn subscribe(&mut self, map: MapHandle, sink: InputSender) -> Result<()>;
}
