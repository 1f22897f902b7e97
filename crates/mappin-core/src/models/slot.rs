use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A pin position bound to one form input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Position in the ordered slot list, stable for the widget's lifetime
    pub index: usize,

    /// Text of the paired label element; empty if absent
    pub label: String,

    /// Whether the user may place or drag this slot's pin
    pub editable: bool,

    /// Pin location, `None` until placed
    pub location: Option<Coordinate>,
}

impl Slot {
    /// Eligible to receive a click-placed coordinate
    pub fn accepts_click(&self) -> bool {
        self.editable && self.location.is_none()
    }
}

/// Registry output consumed by the store when seeding slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSeed {
    pub label: String,
    pub editable: bool,
}

/// A pin configured by the host, index-aligned to slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultPin {
    pub location: Coordinate,

    #[serde(default = "default_editable")]
    pub editable: bool,
}

fn default_editable() -> bool {
    true
}

/// Initial viewport configured by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultView {
    pub location: Coordinate,
    pub zoom: f64,
}

/// Where the input form sits relative to the map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormLocation {
    #[default]
    Top,
    Bottom,
}
