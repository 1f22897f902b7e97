use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::InputRef;

/// Label or input element found in the host form, in document order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormElement {
    Label { text: String },
    Input { input: InputRef },
}

/// Port for the host page's address-entry form
pub trait HostForm {
    /// Label and input elements of the form container, in document order
    fn elements(&self) -> Vec<FormElement>;

    /// Current text of an input element
    fn value(&self, input: &InputRef) -> Option<String>;

    /// Write text into an input element
    fn set_value(&mut self, input: &InputRef, value: &str) -> Result<()>;
}
