//! Mappin Widget - View layer and composition root
//!
//! The renderer projects store state onto a map port; the widget wires the
//! store, the renderer, and the ports together behind a single ordered input
//! channel.

pub mod memory;
pub mod render;
pub mod widget;

pub use memory::{MapCall, RecordingMap};
pub use render::{MarkerPair, Renderer, SyncReport};
pub use widget::Widget;
