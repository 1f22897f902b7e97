//! In-memory map for development and testing.
//!
//! Clones share state, so a test can keep one handle while the widget owns
//! another. The lock is unwrapped intentionally: poisoning only follows a
//! panic in another thread.

use mappin_core::error::{MappinError, Result};
use mappin_core::input::{InputSender, MapGesture};
use mappin_core::models::{Coordinate, MapHandle, MarkerHandle};
use mappin_core::ports::{MapOptions, MapPort, MarkerStyle};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// A call received by the recording map
#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    CreateMap(MapOptions),
    SetCenter(Coordinate),
    SetZoom(f64),
    AddMarker(MarkerHandle, Coordinate, MarkerStyle),
    MoveMarker(MarkerHandle, Coordinate),
    RemoveMarker(MarkerHandle),
}

/// A marker currently on the recording map
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMarker {
    pub at: Coordinate,
    pub style: MarkerStyle,
}

#[derive(Debug, Default)]
struct MapState {
    calls: Vec<MapCall>,
    markers: BTreeMap<MarkerHandle, RecordedMarker>,
    center: Option<Coordinate>,
    zoom: Option<f64>,
    sink: Option<InputSender>,
    next_id: u64,
    map: Option<MapHandle>,
}

/// Map port that records every call instead of drawing
#[derive(Debug, Clone, Default)]
pub struct RecordingMap {
    state: Arc<RwLock<MapState>>,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<MapCall> {
        self.state.read().unwrap().calls.clone()
    }

    /// Markers currently placed, keyed by handle
    pub fn markers(&self) -> BTreeMap<MarkerHandle, RecordedMarker> {
        self.state.read().unwrap().markers.clone()
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<RecordedMarker> {
        self.state.read().unwrap().markers.get(&handle).cloned()
    }

    pub fn center(&self) -> Option<Coordinate> {
        self.state.read().unwrap().center
    }

    pub fn zoom(&self) -> Option<f64> {
        self.state.read().unwrap().zoom
    }

    /// Deliver a gesture as if the user performed it
    ///
    /// Dragging also moves the marker, as a live map would.
    pub fn emit(&self, gesture: MapGesture) -> Result<()> {
        let mut state = self.state.write().unwrap();
        match &gesture {
            MapGesture::MarkerDragEnd { marker, at } => {
                if let Some(recorded) = state.markers.get_mut(marker) {
                    recorded.at = *at;
                }
            }
            MapGesture::ViewportChanged { center, zoom } => {
                state.center = Some(*center);
                state.zoom = Some(*zoom);
            }
            _ => {}
        }
        let sink = state.sink.clone().ok_or_else(|| MappinError::MapUnavailable {
            reason: "no gesture subscriber".to_string(),
        })?;
        drop(state);
        sink.gesture(gesture)
    }

    fn next_handle(state: &mut MapState) -> u64 {
        state.next_id += 1;
        state.next_id
    }

    fn check_map(state: &MapState, map: MapHandle) -> Result<()> {
        if state.map == Some(map) {
            Ok(())
        } else {
            Err(MappinError::MapUnavailable { reason: format!("unknown map {:?}", map) })
        }
    }
}

impl MapPort for RecordingMap {
    fn create_map(&mut self, options: &MapOptions) -> Result<MapHandle> {
        let mut state = self.state.write().unwrap();
        let handle = MapHandle(Self::next_handle(&mut state));
        state.map = Some(handle);
        state.calls.push(MapCall::CreateMap(options.clone()));
        Ok(handle)
    }

    fn set_center(&mut self, map: MapHandle, center: Coordinate) -> Result<()> {
        let mut state = self.state.write().unwrap();
        Self::check_map(&state, map)?;
        state.center = Some(center);
        state.calls.push(MapCall::SetCenter(center));
        Ok(())
    }

    fn set_zoom(&mut self, map: MapHandle, zoom: f64) -> Result<()> {
        let mut state = self.state.write().unwrap();
        Self::check_map(&state, map)?;
        state.zoom = Some(zoom);
        state.calls.push(MapCall::SetZoom(zoom));
        Ok(())
    }

    fn add_marker(
        &mut self,
        map: MapHandle,
        at: Coordinate,
        style: MarkerStyle,
    ) -> Result<MarkerHandle> {
        let mut state = self.state.write().unwrap();
        Self::check_map(&state, map)?;
        let handle = MarkerHandle(Self::next_handle(&mut state));
        state.markers.insert(handle, RecordedMarker { at, style: style.clone() });
        state.calls.push(MapCall::AddMarker(handle, at, style));
        Ok(handle)
    }

    fn move_marker(&mut self, marker: MarkerHandle, to: Coordinate) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let recorded = state.markers.get_mut(&marker).ok_or_else(|| {
            MappinError::MapUnavailable { reason: format!("unknown marker {:?}", marker) }
        })?;
        recorded.at = to;
        state.calls.push(MapCall::MoveMarker(marker, to));
        Ok(())
    }

    fn remove_marker(&mut self, marker: MarkerHandle) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.markers.remove(&marker);
        state.calls.push(MapCall::RemoveMarker(marker));
        Ok(())
    }

    fn subscribe(&mut self, map: MapHandle, sink: InputSender) -> Result<()> {
        let mut state = self.state.write().unwrap();
        Self::check_map(&state, map)?;
        state.sink = Some(sink);
        Ok(())
    }
}
