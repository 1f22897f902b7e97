use serde::{Deserialize, Serialize};

use crate::models::{GeocoderId, MapHandle, Slot, Viewport};

/// Aggregate state of the synchronization store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub viewport: Viewport,

    /// Ordered slots; `slots[i].index == i`
    pub slots: Vec<Slot>,

    /// Next slot eligible for a click-placed coordinate
    pub click_cursor: Option<usize>,

    pub map_ready: bool,

    pub map: Option<MapHandle>,

    pub geocoder: Option<GeocoderId>,

    /// One-shot latch set when marker pairs may be created
    pub markers_materialized: bool,

    /// One-shot latch set once default pins were placed
    pub defaults_applied: bool,

    /// Set once `SeedSlots` succeeded, even with zero slots
    pub seeded: bool,

    /// Incremented on every applied event
    pub revision: u64,
}

impl StoreState {
    /// First editable unset slot at or after `from`, wrapping to the start
    pub fn next_click_target(&self, from: usize) -> Option<usize> {
        let len = self.slots.len();
        (0..len)
            .map(|offset| (from + offset) % len)
            .find(|&i| self.slots[i].accepts_click())
    }

    /// First editable unset slot
    pub fn first_click_target(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.accepts_click())
    }

    pub fn can_materialize(&self) -> bool {
        !self.slots.is_empty() && self.map_ready && !self.markers_materialized
    }

    /// Check the structural invariants
    pub fn is_consistent(&self) -> bool {
        let indices_ok = self.slots.iter().enumerate().all(|(i, slot)| slot.index == i);
        let cursor_ok = match self.click_cursor {
            None => true,
            Some(i) => self.slots.get(i).is_some_and(|slot| slot.accepts_click()),
        };
        let locations_ok =
            self.slots.iter().all(|slot| slot.location.map_or(true, |c| c.is_valid()));
        indices_ok && cursor_ok && locations_ok
    }

    /// Number of slots with a placed pin
    pub fn placed_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.location.is_some()).count()
    }
}
