use serde::{Deserialize, Serialize};

use crate::models::{Coordinate, DefaultPin, GeocoderId, MapHandle, SlotSeed};

/// Discrete event applied by the synchronization store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreEvent {
    InitializeMap(MapHandle),
    InitializeGeocoder(GeocoderId),
    SeedSlots(Vec<SlotSeed>),
    SetViewport { center: Coordinate, zoom: Option<f64> },
    SetZoom(f64),
    MapClicked(Coordinate),
    MarkerDragStarted,
    MarkerDragEnded { index: usize, at: Coordinate },
    MaterializeMarkers,
    ApplyDefaultPins(Vec<DefaultPin>),
    AddressResolved { index: usize, at: Coordinate },
    SelectSlot(usize),
    ClearPins,
}

impl StoreEvent {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            StoreEvent::InitializeMap(_) => "initialize_map",
            StoreEvent::InitializeGeocoder(_) => "initialize_geocoder",
            StoreEvent::SeedSlots(_) => "seed_slots",
            StoreEvent::SetViewport { .. } => "set_viewport",
            StoreEvent::SetZoom(_) => "set_zoom",
            StoreEvent::MapClicked(_) => "map_clicked",
            StoreEvent::MarkerDragStarted => "marker_drag_started",
            StoreEvent::MarkerDragEnded { .. } => "marker_drag_ended",
            StoreEvent::MaterializeMarkers => "materialize_markers",
            StoreEvent::ApplyDefaultPins(_) => "apply_default_pins",
            StoreEvent::AddressResolved { .. } => "address_resolved",
            StoreEvent::SelectSlot(_) => "select_slot",
            StoreEvent::ClearPins => "clear_pins",
        }
    }

    /// Events after which the materialization precondition may have become true
    pub(crate) fn may_enable_markers(&self) -> bool {
        matches!(
            self,
            StoreEvent::InitializeMap(_) | StoreEvent::SeedSlots(_) | StoreEvent::SetViewport { .. }
        )
    }
}
