//! The single ordered input channel of the widget
//!
//! Map gestures and host form interactions all funnel through one
//! `InputSender`, so the store sees them in exactly the order they arrived.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::{MappinError, Result};
use crate::models::{Coordinate, MarkerHandle};

/// Gesture reported by a map adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapGesture {
    /// The map finished loading and can accept markers
    Ready,

    /// The user clicked the map surface
    Click { at: Coordinate },

    /// The user started dragging a marker
    MarkerDragStart { marker: MarkerHandle },

    /// The user dropped a marker
    MarkerDragEnd { marker: MarkerHandle, at: Coordinate },

    /// The user panned or zoomed the map
    ViewportChanged { center: Coordinate, zoom: f64 },
}

/// Everything the widget loop consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetInput {
    Gesture { gesture: MapGesture },

    /// Text typed into the input bound to slot `index`
    AddressEntered { index: usize, text: String },

    /// The input bound to slot `index` gained focus
    InputFocused { index: usize },

    ClearPins,

    Unmount,
}

impl From<MapGesture> for WidgetInput {
    fn from(gesture: MapGesture) -> Self {
        WidgetInput::Gesture { gesture }
    }
}

/// Sending half of the widget input channel
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: mpsc::UnboundedSender<WidgetInput>,
}

impl InputSender {
    pub fn send(&self, input: impl Into<WidgetInput>) -> Result<()> {
        self.tx.send(input.into()).map_err(|_| MappinError::WidgetStopped)
    }

    pub fn gesture(&self, gesture: MapGesture) -> Result<()> {
        self.send(gesture)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half of the widget input channel
pub type InputReceiver = mpsc::UnboundedReceiver<WidgetInput>;

/// Create the input channel
pub fn channel() -> (InputSender, InputReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (InputSender { tx }, rx)
}
