//! Pure transition function of the synchronization store

use thiserror::Error;

use super::event::StoreEvent;
use super::state::StoreState;
use crate::models::{Coordinate, DefaultPin, Slot, SlotSeed, Viewport};

/// Reason an event was dropped without touching state
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("slots were already seeded")]
    AlreadySeeded,

    #[error("coordinate out of range: {latitude}, {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("invalid zoom level {0}")]
    InvalidZoom(f64),

    #[error("no slot is waiting for a click")]
    NoPendingCursor,

    #[error("slot index {index} out of range for {len} slots")]
    SlotOutOfRange { index: usize, len: usize },

    #[error("slot {0} is not editable")]
    SlotNotEditable(usize),

    #[error("slot {0} already holds a pin")]
    SlotOccupied(usize),

    #[error("markers were already materialized")]
    AlreadyMaterialized,

    #[error("markers cannot be materialized yet (slots: {slots}, map ready: {map_ready})")]
    NotReadyToMaterialize { slots: usize, map_ready: bool },

    #[error("markers are not materialized yet")]
    MarkersNotMaterialized,

    #[error("default pins were already applied")]
    DefaultsAlreadyApplied,
}

/// Apply `event` to `state`, returning the next state
///
/// Total over all inputs: malformed events come back as a `Rejection` and the
/// caller keeps the previous state.
pub fn reduce(state: &StoreState, event: &StoreEvent) -> Result<StoreState, Rejection> {
    let mut next = state.clone();

    match event {
        StoreEvent::InitializeMap(handle) => {
            next.map_ready = true;
            next.map = Some(*handle);
        }

        StoreEvent::InitializeGeocoder(id) => {
            next.geocoder = Some(id.clone());
        }

        StoreEvent::SeedSlots(seeds) => {
            if state.seeded || !state.slots.is_empty() {
                return Err(Rejection::AlreadySeeded);
            }
            next.slots = seed_slots(seeds);
            next.seeded = true;
            next.click_cursor = next.first_click_target();
        }

        StoreEvent::SetViewport { center, zoom } => {
            check_coordinate(center)?;
            if let Some(zoom) = zoom {
                check_zoom(*zoom)?;
                next.viewport.zoom = *zoom;
            }
            next.viewport.center = *center;
        }

        StoreEvent::SetZoom(zoom) => {
            check_zoom(*zoom)?;
            next.viewport.zoom = *zoom;
        }

        StoreEvent::MapClicked(at) => {
            let target = state.click_cursor.ok_or(Rejection::NoPendingCursor)?;
            check_coordinate(at)?;
            place_at_cursor(&mut next, target, *at);
        }

        StoreEvent::MarkerDragStarted => {
            next.click_cursor = None;
        }

        StoreEvent::MarkerDragEnded { index, at } | StoreEvent::AddressResolved { index, at } => {
            check_editable_slot(state, *index)?;
            check_coordinate(at)?;
            next.slots[*index].location = Some(*at);
            if state.click_cursor == Some(*index) {
                next.click_cursor = next.next_click_target(*index);
            }
        }

        StoreEvent::MaterializeMarkers => {
            if state.markers_materialized {
                return Err(Rejection::AlreadyMaterialized);
            }
            if !state.can_materialize() {
                return Err(Rejection::NotReadyToMaterialize {
                    slots: state.slots.len(),
                    map_ready: state.map_ready,
                });
            }
            next.markers_materialized = true;
        }

        StoreEvent::ApplyDefaultPins(pins) => {
            if !state.markers_materialized {
                return Err(Rejection::MarkersNotMaterialized);
            }
            if state.defaults_applied {
                return Err(Rejection::DefaultsAlreadyApplied);
            }
            apply_default_pins(&mut next, pins);
            next.defaults_applied = true;
        }

        StoreEvent::SelectSlot(index) => {
            check_editable_slot(state, *index)?;
            if state.slots[*index].location.is_some() {
                return Err(Rejection::SlotOccupied(*index));
            }
            next.click_cursor = Some(*index);
        }

        StoreEvent::ClearPins => {
            for slot in next.slots.iter_mut().filter(|slot| slot.editable) {
                slot.location = None;
            }
            next.click_cursor = next.first_click_target();
        }
    }

    next.revision = state.revision + 1;
    Ok(next)
}

fn seed_slots(seeds: &[SlotSeed]) -> Vec<Slot> {
    seeds
        .iter()
        .enumerate()
        .map(|(index, seed)| Slot {
            index,
            label: seed.label.clone(),
            editable: seed.editable,
            location: None,
        })
        .collect()
}

fn place_at_cursor(state: &mut StoreState, target: usize, at: Coordinate) {
    state.slots[target].location = Some(at);
    state.click_cursor = state.next_click_target(target + 1);
}

/// Place pin `i` into slot `i`, then re-target the cursor
fn apply_default_pins(state: &mut StoreState, pins: &[DefaultPin]) {
    for (index, pin) in pins.iter().enumerate() {
        if !pin.location.is_valid() {
            tracing::warn!("Default pin {} has an out-of-range location; skipped", index);
            continue;
        }
        match state.slots.get_mut(index) {
            Some(slot) => slot.location = Some(pin.location),
            None => {
                tracing::debug!("Default pin {} has no matching slot; ignored", index);
            }
        }
    }
    state.click_cursor = state.first_click_target();
}

fn check_coordinate(coord: &Coordinate) -> Result<(), Rejection> {
    if coord.is_valid() {
        Ok(())
    } else {
        Err(Rejection::InvalidCoordinate {
            latitude: coord.latitude,
            longitude: coord.longitude,
        })
    }
}

fn check_zoom(zoom: f64) -> Result<(), Rejection> {
    if Viewport::is_valid_zoom(zoom) {
        Ok(())
    } else {
        Err(Rejection::InvalidZoom(zoom))
    }
}

fn check_editable_slot(state: &StoreState, index: usize) -> Result<(), Rejection> {
    let slot = state
        .slots
        .get(index)
        .ok_or(Rejection::SlotOutOfRange { index, len: state.slots.len() })?;
    if slot.editable {
        Ok(())
    } else {
        Err(Rejection::SlotNotEditable(index))
    }
}
