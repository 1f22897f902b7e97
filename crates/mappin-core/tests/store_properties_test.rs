//! Property tests for the synchronization store
//!
//! These tests exercise the store through its public `dispatch` entry point
//! with generated event sequences.

use mappin_core::models::{Coordinate, DefaultPin, MapHandle, SlotSeed};
use mappin_core::store::{Outcome, Rejection, Store, StoreEvent};
use proptest::prelude::*;

fn coordinate() -> impl Strategy<Value = Coordinate> {
    (-90.0f64..=90.0, -180.0f64..=180.0)
        .prop_map(|(latitude, longitude)| Coordinate { latitude, longitude })
}

/// Coordinates that are sometimes out of range
fn any_coordinate() -> impl Strategy<Value = Coordinate> {
    (-120.0f64..=120.0, -240.0f64..=240.0)
        .prop_map(|(latitude, longitude)| Coordinate { latitude, longitude })
}

fn seeds(editable: &[bool]) -> Vec<SlotSeed> {
    editable
        .iter()
        .enumerate()
        .map(|(i, &editable)| SlotSeed { label: format!("Slot {}", i), editable })
        .collect()
}

fn seeded_store(editable: &[bool]) -> Store {
    let mut store = Store::default();
    store.dispatch(StoreEvent::SeedSlots(seeds(editable)));
    store
}

fn event() -> impl Strategy<Value = StoreEvent> {
    prop_oneof![
        any_coordinate().prop_map(StoreEvent::MapClicked),
        Just(StoreEvent::MarkerDragStarted),
        (0usize..8, any_coordinate())
            .prop_map(|(index, at)| StoreEvent::MarkerDragEnded { index, at }),
        (0usize..8, coordinate()).prop_map(|(index, at)| StoreEvent::AddressResolved { index, at }),
        (0usize..8).prop_map(StoreEvent::SelectSlot),
        Just(StoreEvent::ClearPins),
        Just(StoreEvent::MaterializeMarkers),
        Just(StoreEvent::InitializeMap(MapHandle(1))),
        (any_coordinate(), proptest::option::of(-2.0f64..22.0))
            .prop_map(|(center, zoom)| StoreEvent::SetViewport { center, zoom }),
        (-2.0f64..22.0).prop_map(StoreEvent::SetZoom),
    ]
}

proptest! {
    #[test]
    fn clicks_fill_editable_slots_in_index_order(
        editable in prop::collection::vec(any::<bool>(), 0..8),
        clicks in prop::collection::vec(coordinate(), 0..12),
    ) {
        let mut store = seeded_store(&editable);
        for click in &clicks {
            store.dispatch(StoreEvent::MapClicked(*click));
        }

        let editable_indices: Vec<usize> =
            editable.iter().enumerate().filter(|&(_, &e)| e).map(|(i, _)| i).collect();
        let filled = clicks.len().min(editable_indices.len());
        let slots = &store.current_state().slots;

        for (n, &index) in editable_indices.iter().enumerate() {
            if n < filled {
                prop_assert_eq!(slots[index].location, Some(clicks[n]));
            } else {
                prop_assert_eq!(slots[index].location, None);
            }
        }
        for (index, slot) in slots.iter().enumerate() {
            if !editable[index] {
                prop_assert_eq!(slot.location, None);
            }
        }
    }

    #[test]
    fn materialize_markers_is_idempotent(
        editable in prop::collection::vec(any::<bool>(), 0..6),
        map_ready in any::<bool>(),
        repeats in 2usize..6,
    ) {
        let pins = vec![DefaultPin {
            location: Coordinate { latitude: 1.0, longitude: 1.0 },
            editable: true,
        }];
        let prepare = || {
            let mut store = Store::new(pins.clone());
            store.dispatch(StoreEvent::SeedSlots(seeds(&editable)));
            if map_ready {
                store.dispatch(StoreEvent::InitializeMap(MapHandle(3)));
            }
            store
        };

        let mut once = prepare();
        once.dispatch(StoreEvent::MaterializeMarkers);

        let mut many = prepare();
        for _ in 0..repeats {
            many.dispatch(StoreEvent::MaterializeMarkers);
        }

        prop_assert_eq!(once.current_state(), many.current_state());
    }

    #[test]
    fn drag_start_suppresses_pending_clicks(
        editable in prop::collection::vec(any::<bool>(), 0..8),
        prior in prop::collection::vec(coordinate(), 0..4),
        clicks in prop::collection::vec(coordinate(), 0..8),
    ) {
        let mut store = seeded_store(&editable);
        for click in &prior {
            store.dispatch(StoreEvent::MapClicked(*click));
        }
        store.dispatch(StoreEvent::MarkerDragStarted);
        let before = store.current_state().clone();

        for click in &clicks {
            let outcome = store.dispatch(StoreEvent::MapClicked(*click));
            prop_assert_eq!(outcome, Outcome::Ignored(Rejection::NoPendingCursor));
        }

        prop_assert_eq!(store.current_state(), &before);
    }

    #[test]
    fn set_viewport_round_trips(center in coordinate(), zoom in 0.0f64..24.0) {
        let mut store = Store::default();
        let outcome = store.dispatch(StoreEvent::SetViewport { center, zoom: Some(zoom) });
        prop_assert_eq!(outcome, Outcome::Applied);

        let viewport = store.current_state().viewport;
        prop_assert_eq!(viewport.center, center);
        prop_assert_eq!(viewport.zoom, zoom);
    }

    #[test]
    fn invariants_hold_for_any_event_sequence(
        editable in prop::collection::vec(any::<bool>(), 0..6),
        events in prop::collection::vec(event(), 0..40),
    ) {
        let mut store = seeded_store(&editable);
        for event in events {
            let before = store.current_state().clone();
            let outcome = store.dispatch(event);

            let state = store.current_state();
            prop_assert!(state.is_consistent());
            prop_assert_eq!(state.slots.len(), editable.len());
            if !outcome.is_applied() {
                prop_assert_eq!(state, &before);
            }
        }
    }
}

#[test]
fn three_slot_scenario_rejects_third_click() {
    let mut store = seeded_store(&[true, false, true]);
    let a = Coordinate::new(1.0, 1.0).unwrap();
    let b = Coordinate::new(2.0, 2.0).unwrap();
    let c = Coordinate::new(3.0, 3.0).unwrap();

    store.dispatch(StoreEvent::MapClicked(a));
    store.dispatch(StoreEvent::MapClicked(b));
    let after_b = store.current_state().clone();
    let outcome = store.dispatch(StoreEvent::MapClicked(c));

    let locations: Vec<_> = store.current_state().slots.iter().map(|s| s.location).collect();
    assert_eq!(locations, vec![Some(a), None, Some(b)]);
    assert_eq!(store.current_state().click_cursor, None);
    assert_eq!(outcome, Outcome::Ignored(Rejection::NoPendingCursor));
    assert_eq!(store.current_state(), &after_b);
}

#[test]
fn single_default_pin_behaves_like_a_click() {
    let x = Coordinate::new(45.0, 7.0).unwrap();

    let mut pinned = Store::default();
    pinned.dispatch(StoreEvent::SeedSlots(seeds(&[true])));
    pinned.dispatch(StoreEvent::InitializeMap(MapHandle(1)));
    let outcome =
        pinned.dispatch(StoreEvent::ApplyDefaultPins(vec![DefaultPin { location: x, editable: true }]));

    let mut clicked = Store::default();
    clicked.dispatch(StoreEvent::SeedSlots(seeds(&[true])));
    clicked.dispatch(StoreEvent::InitializeMap(MapHandle(1)));
    clicked.dispatch(StoreEvent::MapClicked(x));

    assert!(outcome.is_applied());
    assert_eq!(pinned.current_state().slots[0].location, Some(x));
    assert_eq!(pinned.current_state().click_cursor, None);
    assert_eq!(pinned.current_state().click_cursor, clicked.current_state().click_cursor);
    assert_eq!(pinned.current_state().slots, clicked.current_state().slots);
}

#[test]
fn out_of_range_drag_end_leaves_slots_untouched() {
    let mut store = seeded_store(&[true, true, true]);
    store.dispatch(StoreEvent::MapClicked(Coordinate::new(1.0, 1.0).unwrap()));
    let before = store.current_state().slots.clone();

    let outcome = store.dispatch(StoreEvent::MarkerDragEnded {
        index: 99,
        at: Coordinate::new(9.0, 9.0).unwrap(),
    });

    assert!(!outcome.is_applied());
    assert_eq!(store.current_state().slots, before);
}
