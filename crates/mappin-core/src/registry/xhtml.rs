//! Host form backed by an XHTML fragment
//!
//! Used by the CLI and tests in place of a live DOM. Void `<input>` elements
//! may be written with or without a closing slash.

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{MappinError, Result};
use crate::models::InputRef;
use crate::ports::{FormElement, HostForm};

#[derive(Debug, Clone, Default)]
pub struct XhtmlForm {
    elements: Vec<FormElement>,
    values: HashMap<InputRef, String>,
}

impl XhtmlForm {
    /// Parse label and input elements out of an XHTML fragment
    pub fn parse(fragment: &str) -> Result<Self> {
        let mut reader = Reader::from_str(fragment);
        reader.config_mut().trim_text(true);
        reader.config_mut().check_end_names = false;

        let mut form = Self::default();
        let mut label_depth = 0usize;
        let mut label_text = String::new();
        let mut input_count = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"label" => {
                        if label_depth == 0 {
                            label_text.clear();
                        }
                        label_depth += 1;
                    }
                    b"input" => form.push_input(&e, &mut input_count)?,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"label" => form.elements.push(FormElement::Label { text: String::new() }),
                    b"input" => form.push_input(&e, &mut input_count)?,
                    _ => {}
                },
                Ok(Event::Text(e)) if label_depth > 0 => {
                    let text = label_fragment(&e);
                    if !label_text.is_empty() {
                        label_text.push(' ');
                    }
                    label_text.push_str(text.trim());
                }
                Ok(Event::End(e)) if e.name().as_ref() == b"label" && label_depth > 0 => {
                    label_depth -= 1;
                    if label_depth == 0 {
                        form.elements.push(FormElement::Label { text: label_text.clone() });
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(MappinError::FormParse {
                        reason: format!(
                            "Invalid markup at position {}: {}",
                            reader.buffer_position(),
                            e
                        ),
                    })
                }
            }
        }

        Ok(form)
    }

    /// Parse a fragment stored on disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    fn push_input(&mut self, e: &BytesStart<'_>, count: &mut usize) -> Result<()> {
        let mut id = None;
        let mut name = None;
        let mut value = String::new();

        for attr in e.attributes() {
            let attr = attr.map_err(|err| MappinError::FormParse {
                reason: format!("Invalid input attribute: {}", err),
            })?;
            match attr.key.as_ref() {
                b"id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                b"name" => name = Some(String::from_utf8_lossy(&attr.value).to_string()),
                b"value" => value = String::from_utf8_lossy(&attr.value).to_string(),
                _ => {}
            }
        }

        let input = id
            .or(name)
            .map(InputRef)
            .filter(|input| !self.values.contains_key(input))
            .unwrap_or_else(|| self.ordinal_ref(*count));
        *count += 1;

        self.values.insert(input.clone(), value);
        self.elements.push(FormElement::Input { input });
        Ok(())
    }

    /// `input-{n}`, skipping ordinals an earlier id or name already took
    fn ordinal_ref(&self, from: usize) -> InputRef {
        (from..)
            .map(|n| InputRef(format!("input-{}", n)))
            .find(|input| !self.values.contains_key(input))
            .unwrap_or_else(|| InputRef(format!("input-{}", from)))
    }
}

/// Label text with entities resolved; unknown entities are kept verbatim
fn label_fragment(text: &BytesText<'_>) -> String {
    let resolved =
        text.unescape_with(|entity| resolve_predefined_entity(entity).or_else(|| html_entity(entity)));
    match resolved {
        Ok(unescaped) => unescaped.into_owned(),
        Err(e) => {
            tracing::debug!("Keeping label text unescaped: {}", e);
            String::from_utf8_lossy(text).into_owned()
        }
    }
}

fn html_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{a0}"),
        "ndash" => Some("\u{2013}"),
        "hellip" => Some("\u{2026}"),
        "rsquo" => Some("\u{2019}"),
        _ => None,
    }
}

impl HostForm for XhtmlForm {
    fn elements(&self) -> Vec<FormElement> {
        self.elements.clone()
    }

    fn value(&self, input: &InputRef) -> Option<String> {
        self.values.get(input).cloned()
    }

    fn set_value(&mut self, input: &InputRef, value: &str) -> Result<()> {
        match self.values.get_mut(input) {
            Some(slot) => {
                *slot = value.to_string();
                Ok(())
            }
            None => Err(MappinError::FormParse {
                reason: format!("No input named '{}' in host form", input),
            }),
        }
    }
}
