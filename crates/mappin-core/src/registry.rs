//! Slot registry
//!
//! Derives the ordered (label, input, editable) triples from the host form at
//! mount time. The result never changes afterwards.

pub mod xhtml;

use serde::{Deserialize, Serialize};

use crate::models::{DefaultPin, InputRef, SlotSeed};
use crate::ports::{FormElement, HostForm};

pub use xhtml::XhtmlForm;

/// One discovered slot together with the input it is bound to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub label: String,
    pub input: InputRef,
    pub editable: bool,
}

/// Read-only list of slots discovered in the host form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotRegistry {
    entries: Vec<SlotEntry>,
}

impl SlotRegistry {
    /// Scan the host form and pair the i-th label with the i-th input
    ///
    /// A default pin marks slot `i` non-editable only when pin `i` exists and
    /// says so; pins past the slot count are ignored.
    pub fn scan(form: &dyn HostForm, default_pins: &[DefaultPin]) -> Self {
        let elements = form.elements();
        Self::from_elements(&elements, default_pins)
    }

    pub fn from_elements(elements: &[FormElement], default_pins: &[DefaultPin]) -> Self {
        let labels: Vec<&str> = elements
            .iter()
            .filter_map(|e| match e {
                FormElement::Label { text } => Some(text.as_str()),
                FormElement::Input { .. } => None,
            })
            .collect();
        let inputs: Vec<&InputRef> = elements
            .iter()
            .filter_map(|e| match e {
                FormElement::Input { input } => Some(input),
                FormElement::Label { .. } => None,
            })
            .collect();

        if labels.len() != inputs.len() {
            tracing::warn!(
                "Host form has {} labels and {} inputs; unpaired elements are ignored",
                labels.len(),
                inputs.len()
            );
        }

        if default_pins.len() > labels.len().min(inputs.len()) {
            tracing::warn!(
                "{} default pins configured but only {} slots found; extra pins are ignored",
                default_pins.len(),
                labels.len().min(inputs.len())
            );
        }

        let entries: Vec<SlotEntry> = labels
            .iter()
            .zip(inputs)
            .enumerate()
            .map(|(index, (label, input))| SlotEntry {
                label: label.trim().to_string(),
                input: input.clone(),
                editable: default_pins.get(index).map_or(true, |pin| pin.editable),
            })
            .collect();

        tracing::debug!("Slot registry found {} slots", entries.len());

        Self { entries }
    }

    pub fn entries(&self) -> &[SlotEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seeds for the store's `SeedSlots` event
    pub fn seeds(&self) -> Vec<SlotSeed> {
        self.entries
            .iter()
            .map(|entry| SlotSeed { label: entry.label.clone(), editable: entry.editable })
            .collect()
    }

    /// Input bound to slot `index`
    pub fn input(&self, index: usize) -> Option<&InputRef> {
        self.entries.get(index).map(|entry| &entry.input)
    }
}
