//! Projection of store state onto a map port
//!
//! The renderer keeps the live marker handles the store is not allowed to
//! hold, keyed by slot index. `sync` is idempotent: calling it twice with the
//! same state issues no map calls the second time.

use mappin_core::error::Result;
use mappin_core::models::{Coordinate, MapHandle, MarkerHandle, Slot, Viewport};
use mappin_core::ports::{MapPort, MarkerStyle};
use mappin_core::store::StoreState;

pub const EDITABLE_PIN_COLOR: &str = "#3FB1CE";
pub const FIXED_PIN_COLOR: &str = "#8C8C8C";

/// Live markers drawn for one slot
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPair {
    pub pin: MarkerHandle,
    pub label: MarkerHandle,

    /// Where both markers currently sit on the map
    pub at: Coordinate,
}

/// Slots whose logical location changed since the previous sync
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub placed: Vec<usize>,
    pub cleared: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct Renderer {
    pairs: Vec<MarkerPair>,
    materialized: bool,
    applied_viewport: Option<Viewport>,
    rendered_locations: Vec<Option<Coordinate>>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the map in line with `state`
    pub fn sync(&mut self, map: &mut dyn MapPort, state: &StoreState) -> Result<SyncReport> {
        let Some(handle) = state.map else {
            return Ok(SyncReport::default());
        };

        if self.applied_viewport != Some(state.viewport) {
            let previous = self.applied_viewport;
            if previous.map(|v| v.center) != Some(state.viewport.center) {
                map.set_center(handle, state.viewport.center)?;
            }
            if previous.map(|v| v.zoom) != Some(state.viewport.zoom) {
                map.set_zoom(handle, state.viewport.zoom)?;
            }
            self.applied_viewport = Some(state.viewport);
        }

        if state.markers_materialized && !self.materialized {
            self.pairs = create_pairs(map, handle, &state.slots)?;
            self.materialized = true;
            self.rendered_locations = vec![None; state.slots.len()];
            tracing::debug!("Created {} marker pairs", self.pairs.len());
        }

        for (pair, slot) in self.pairs.iter_mut().zip(&state.slots) {
            let target = slot.location.unwrap_or(Coordinate::SENTINEL);
            if pair.at != target {
                map.move_marker(pair.pin, target)?;
                map.move_marker(pair.label, target)?;
                pair.at = target;
            }
        }

        let mut report = SyncReport::default();
        for (rendered, slot) in self.rendered_locations.iter_mut().zip(&state.slots) {
            if *rendered != slot.location {
                match slot.location {
                    Some(_) => report.placed.push(slot.index),
                    None => report.cleared.push(slot.index),
                }
                *rendered = slot.location;
            }
        }

        Ok(report)
    }

    /// Record a viewport the map already shows, so it is not pushed back
    pub fn acknowledge_viewport(&mut self, viewport: Viewport) {
        self.applied_viewport = Some(viewport);
    }

    /// Record where the user dropped a marker
    ///
    /// If the store rejects the drop, the next sync moves the pair back.
    pub fn acknowledge_drag(&mut self, index: usize, at: Coordinate) {
        if let Some(pair) = self.pairs.get_mut(index) {
            pair.at = at;
        }
    }

    /// Slot whose pin is `marker`
    pub fn slot_for_marker(&self, marker: MarkerHandle) -> Option<usize> {
        self.pairs.iter().position(|pair| pair.pin == marker)
    }

    pub fn pairs(&self) -> &[MarkerPair] {
        &self.pairs
    }

    /// Remove every marker from the map
    ///
    /// Every removal is attempted; the first failure is returned.
    pub fn teardown(&mut self, map: &mut dyn MapPort) -> Result<()> {
        remove_pairs(map, self.pairs.drain(..))
    }
}

/// One pair per slot, or none: markers added before a failure are removed again
fn create_pairs(
    map: &mut dyn MapPort,
    handle: MapHandle,
    slots: &[Slot],
) -> Result<Vec<MarkerPair>> {
    let mut pairs = Vec::with_capacity(slots.len());
    for slot in slots {
        match create_pair(map, handle, slot) {
            Ok(pair) => pairs.push(pair),
            Err(e) => {
                if let Err(cleanup) = remove_pairs(map, pairs) {
                    tracing::warn!("Failed to roll back partial markers: {}", cleanup);
                }
                return Err(e);
            }
        }
    }
    Ok(pairs)
}

fn remove_pairs(
    map: &mut dyn MapPort,
    pairs: impl IntoIterator<Item = MarkerPair>,
) -> Result<()> {
    let mut first_error = None;
    for pair in pairs {
        for marker in [pair.pin, pair.label] {
            if let Err(e) = map.remove_marker(marker) {
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn create_pair(map: &mut dyn MapPort, handle: MapHandle, slot: &Slot) -> Result<MarkerPair> {
    let at = slot.location.unwrap_or(Coordinate::SENTINEL);
    let color = if slot.editable { EDITABLE_PIN_COLOR } else { FIXED_PIN_COLOR };

    let pin = map.add_marker(
        handle,
        at,
        MarkerStyle::Pin { color: color.to_string(), draggable: slot.editable },
    )?;
    let label = match map.add_marker(handle, at, MarkerStyle::Label { text: slot.label.clone() }) {
        Ok(label) => label,
        Err(e) => {
            if let Err(cleanup) = map.remove_marker(pin) {
                tracing::warn!("Failed to remove orphaned pin {:?}: {}", pin, cleanup);
            }
            return Err(e);
        }
    };

    Ok(MarkerPair { pin, label, at })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MapCall, RecordingMap};
    use mappin_core::error::MappinError;
    use mappin_core::input::InputSender;
    use mappin_core::models::SlotSeed;
    use mappin_core::ports::MapOptions;
    use mappin_core::store::{Store, StoreEvent};

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    fn setup(editable: &[bool]) -> (RecordingMap, MapHandle, Store) {
        let mut map = RecordingMap::new();
        let handle = map
            .create_map(&MapOptions {
                container: "map".to_string(),
                style: "style".to_string(),
                access_token: "pk".to_string(),
            })
            .unwrap();
        let mut store = Store::default();
        let seeds = editable
            .iter()
            .enumerate()
            .map(|(i, &editable)| SlotSeed { label: format!("Stop {}", i), editable })
            .collect();
        store.dispatch(StoreEvent::SeedSlots(seeds));
        (map, handle, store)
    }

    #[test]
    fn test_no_map_no_calls() {
        let (mut map, _, store) = setup(&[true]);
        let mut renderer = Renderer::new();
        let report = renderer.sync(&mut map, store.current_state()).unwrap();

        assert_eq!(report, SyncReport::default());
        assert_eq!(map.calls().len(), 1);
    }

    #[test]
    fn test_materialization_creates_one_pair_per_slot_at_sentinel() {
        let (mut map, handle, mut store) = setup(&[true, false]);
        store.dispatch(StoreEvent::InitializeMap(handle));
        let mut renderer = Renderer::new();

        renderer.sync(&mut map, store.current_state()).unwrap();

        assert_eq!(renderer.pairs().len(), 2);
        assert_eq!(map.markers().len(), 4);
        for pair in renderer.pairs() {
            assert_eq!(map.marker(pair.pin).unwrap().at, Coordinate::SENTINEL);
            assert_eq!(map.marker(pair.label).unwrap().at, Coordinate::SENTINEL);
        }
        assert_eq!(
            map.marker(renderer.pairs()[1].pin).unwrap().style,
            MarkerStyle::Pin { color: FIXED_PIN_COLOR.to_string(), draggable: false }
        );
        assert_eq!(
            map.marker(renderer.pairs()[0].label).unwrap().style,
            MarkerStyle::Label { text: "Stop 0".to_string() }
        );
    }

    #[test]
    fn test_sync_is_idempotent() {
        let (mut map, handle, mut store) = setup(&[true]);
        store.dispatch(StoreEvent::InitializeMap(handle));
        let mut renderer = Renderer::new();

        renderer.sync(&mut map, store.current_state()).unwrap();
        let calls = map.calls().len();
        renderer.sync(&mut map, store.current_state()).unwrap();

        assert_eq!(map.calls().len(), calls);
        assert_eq!(renderer.pairs().len(), 1);
    }

    #[test]
    fn test_placed_and_cleared_slots_are_reported() {
        let (mut map, handle, mut store) = setup(&[true, true]);
        store.dispatch(StoreEvent::InitializeMap(handle));
        let mut renderer = Renderer::new();
        renderer.sync(&mut map, store.current_state()).unwrap();

        store.dispatch(StoreEvent::MapClicked(coord(3.0, 4.0)));
        let report = renderer.sync(&mut map, store.current_state()).unwrap();
        assert_eq!(report.placed, vec![0]);
        assert_eq!(map.marker(renderer.pairs()[0].pin).unwrap().at, coord(3.0, 4.0));

        store.dispatch(StoreEvent::ClearPins);
        let report = renderer.sync(&mut map, store.current_state()).unwrap();
        assert_eq!(report.cleared, vec![0]);
        assert_eq!(map.marker(renderer.pairs()[0].pin).unwrap().at, Coordinate::SENTINEL);
    }

    #[test]
    fn test_viewport_pushed_only_when_changed() {
        let (mut map, handle, mut store) = setup(&[]);
        store.dispatch(StoreEvent::InitializeMap(handle));
        let mut renderer = Renderer::new();
        renderer.sync(&mut map, store.current_state()).unwrap();

        store.dispatch(StoreEvent::SetZoom(9.0));
        renderer.sync(&mut map, store.current_state()).unwrap();

        let viewport_calls: Vec<MapCall> = map
            .calls()
            .into_iter()
            .filter(|call| matches!(call, MapCall::SetCenter(_) | MapCall::SetZoom(_)))
            .collect();
        assert_eq!(
            viewport_calls,
            vec![
                MapCall::SetCenter(Viewport::default().center),
                MapCall::SetZoom(1.0),
                MapCall::SetZoom(9.0),
            ]
        );
        assert!(renderer.pairs().is_empty());
    }

    #[test]
    fn test_acknowledged_viewport_is_not_echoed() {
        let (mut map, handle, mut store) = setup(&[]);
        store.dispatch(StoreEvent::InitializeMap(handle));
        let mut renderer = Renderer::new();
        renderer.sync(&mut map, store.current_state()).unwrap();
        let calls = map.calls().len();

        let moved = Viewport::new(coord(10.0, 10.0), 5.0);
        renderer.acknowledge_viewport(moved);
        store.dispatch(StoreEvent::SetViewport { center: moved.center, zoom: Some(moved.zoom) });
        renderer.sync(&mut map, store.current_state()).unwrap();

        assert_eq!(map.calls().len(), calls);
    }

    #[test]
    fn test_rejected_drag_snaps_back() {
        let (mut map, handle, mut store) = setup(&[false]);
        store.dispatch(StoreEvent::InitializeMap(handle));
        let mut renderer = Renderer::new();
        renderer.sync(&mut map, store.current_state()).unwrap();

        let pin = renderer.pairs()[0].pin;
        renderer.acknowledge_drag(0, coord(1.0, 1.0));
        store.dispatch(StoreEvent::MarkerDragEnded { index: 0, at: coord(1.0, 1.0) });
        renderer.sync(&mut map, store.current_state()).unwrap();

        assert_eq!(renderer.slot_for_marker(pin), Some(0));
        assert_eq!(map.marker(pin).unwrap().at, Coordinate::SENTINEL);
        let label = renderer.pairs()[0].label;
        assert_eq!(map.calls().last(), Some(&MapCall::MoveMarker(label, Coordinate::SENTINEL)));
    }

    #[test]
    fn test_teardown_removes_markers() {
        let (mut map, handle, mut store) = setup(&[true, true]);
        store.dispatch(StoreEvent::InitializeMap(handle));
        let mut renderer = Renderer::new();
        renderer.sync(&mut map, store.current_state()).unwrap();

        renderer.teardown(&mut map).unwrap();

        assert!(map.markers().is_empty());
        assert!(renderer.pairs().is_empty());
    }

    /// Recording map that fails chosen `add_marker` calls and removals
    struct FaultyMap {
        inner: RecordingMap,
        adds: usize,
        fail_add: Option<usize>,
        fail_remove: Option<MarkerHandle>,
    }

    impl FaultyMap {
        fn new(inner: RecordingMap) -> Self {
            Self { inner, adds: 0, fail_add: None, fail_remove: None }
        }

        fn fault() -> MappinError {
            MappinError::MapUnavailable { reason: "injected fault".to_string() }
        }
    }

    impl MapPort for FaultyMap {
        fn create_map(&mut self, options: &MapOptions) -> Result<MapHandle> {
            self.inner.create_map(options)
        }

        fn set_center(&mut self, map: MapHandle, center: Coordinate) -> Result<()> {
            self.inner.set_center(map, center)
        }

        fn set_zoom(&mut self, map: MapHandle, zoom: f64) -> Result<()> {
            self.inner.set_zoom(map, zoom)
        }

        fn add_marker(
            &mut self,
            map: MapHandle,
            at: Coordinate,
            style: MarkerStyle,
        ) -> Result<MarkerHandle> {
            self.adds += 1;
            if self.fail_add == Some(self.adds) {
                return Err(Self::fault());
            }
            self.inner.add_marker(map, at, style)
        }

        fn move_marker(&mut self, marker: MarkerHandle, to: Coordinate) -> Result<()> {
            self.inner.move_marker(marker, to)
        }

        fn remove_marker(&mut self, marker: MarkerHandle) -> Result<()> {
            if self.fail_remove == Some(marker) {
                return Err(Self::fault());
            }
            self.inner.remove_marker(marker)
        }

        fn subscribe(&mut self, map: MapHandle, sink: InputSender) -> Result<()> {
            self.inner.subscribe(map, sink)
        }
    }

    #[test]
    fn test_failed_materialization_leaves_no_markers_and_retries() {
        let (recording, handle, mut store) = setup(&[true, true]);
        store.dispatch(StoreEvent::InitializeMap(handle));
        let mut map = FaultyMap::new(recording.clone());
        map.fail_add = Some(3);
        let mut renderer = Renderer::new();

        assert!(renderer.sync(&mut map, store.current_state()).is_err());
        assert!(renderer.pairs().is_empty());
        assert!(recording.markers().is_empty());

        renderer.sync(&mut map, store.current_state()).unwrap();
        assert_eq!(renderer.pairs().len(), 2);
        assert_eq!(recording.markers().len(), 4);
        let last_pin = renderer.pairs()[1].pin;
        assert_eq!(renderer.slot_for_marker(last_pin), Some(1));
    }

    #[test]
    fn test_failed_label_marker_removes_its_pin() {
        let (recording, handle, mut store) = setup(&[true]);
        store.dispatch(StoreEvent::InitializeMap(handle));
        let mut map = FaultyMap::new(recording.clone());
        map.fail_add = Some(2);
        let mut renderer = Renderer::new();

        assert!(renderer.sync(&mut map, store.current_state()).is_err());
        assert!(recording.markers().is_empty());
    }

    #[test]
    fn test_teardown_attempts_every_removal() {
        let (recording, handle, mut store) = setup(&[true, true]);
        store.dispatch(StoreEvent::InitializeMap(handle));
        let mut map = FaultyMap::new(recording.clone());
        let mut renderer = Renderer::new();
        renderer.sync(&mut map, store.current_state()).unwrap();

        let stuck = renderer.pairs()[0].pin;
        map.fail_remove = Some(stuck);

        assert!(renderer.teardown(&mut map).is_err());
        assert!(renderer.pairs().is_empty());
        let remaining: Vec<MarkerHandle> = recording.markers().into_keys().collect();
        assert_eq!(remaining, vec![stuck]);
    }
}
