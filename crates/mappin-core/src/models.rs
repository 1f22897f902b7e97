pub mod coordinate;
pub mod handles;
pub mod slot;

pub use coordinate::{Coordinate, Viewport};
pub use handles::{GeocoderId, InputRef, MapHandle, MarkerHandle};
pub use slot::{DefaultPin, DefaultView, FormLocation, Slot, SlotSeed};
