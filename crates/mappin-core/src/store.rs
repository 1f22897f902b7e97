//! Synchronization store
//!
//! Single source of truth for the viewport, the slots, and the click cursor.
//! Events are applied one at a time through [`reduce`]; follow-up events the
//! store derives itself (marker materialization, default pins) are queued and
//! run to completion before `dispatch` returns.

mod event;
mod reduce;
mod state;

pub use event::StoreEvent;
pub use reduce::{reduce, Rejection};
pub use state::StoreState;

use std::collections::VecDeque;
use tokio::sync::watch;

use crate::models::DefaultPin;

/// Result of dispatching one event
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    Ignored(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

#[derive(Debug)]
pub struct Store {
    state: StoreState,
    default_pins: Vec<DefaultPin>,
    pending: VecDeque<StoreEvent>,
    publisher: watch::Sender<StoreState>,
}

impl Store {
    /// Create a store; `default_pins` are placed right after markers materialize
    pub fn new(default_pins: Vec<DefaultPin>) -> Self {
        let state = StoreState::default();
        let (publisher, _) = watch::channel(state.clone());
        Self { state, default_pins, pending: VecDeque::new(), publisher }
    }

    /// Apply an event and every follow-up it triggers
    ///
    /// Returns the outcome of `event` itself. Rejected events leave state
    /// unchanged; nothing here is fatal.
    pub fn dispatch(&mut self, event: StoreEvent) -> Outcome {
        let outcome = self.apply(event);

        while let Some(follow_up) = self.pending.pop_front() {
            self.apply(follow_up);
        }

        outcome
    }

    pub fn current_state(&self) -> &StoreState {
        &self.state
    }

    /// Receive every published state
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.publisher.subscribe()
    }

    fn apply(&mut self, event: StoreEvent) -> Outcome {
        match reduce(&self.state, &event) {
            Ok(next) => {
                tracing::debug!(
                    "Applied {} (revision {} -> {})",
                    event.kind(),
                    self.state.revision,
                    next.revision
                );
                self.state = next;
                self.queue_follow_ups(&event);
                self.publisher.send_replace(self.state.clone());
                Outcome::Applied
            }
            Err(rejection) => {
                tracing::debug!("Ignored {}: {}", event.kind(), rejection);
                Outcome::Ignored(rejection)
            }
        }
    }

    fn queue_follow_ups(&mut self, event: &StoreEvent) {
        if event.may_enable_markers() && self.state.can_materialize() {
            self.pending.push_back(StoreEvent::MaterializeMarkers);
        }

        if matches!(event, StoreEvent::MaterializeMarkers) && !self.default_pins.is_empty() {
            self.pending.push_back(StoreEvent::ApplyDefaultPins(self.default_pins.clone()));
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
