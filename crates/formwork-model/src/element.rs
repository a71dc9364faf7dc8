//! Headless stand-in for a control's bound input element.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::value::ControlValue;

/// Class raised on a control's element while it shows an error.
pub const ERROR_CLASS: &str = "control-error";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementState {
    /// Current input value as typed or selected.
    pub value: ControlValue,
    pub checked: bool,
    pub classes: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
    /// Whether a select's placeholder cue option is still present.
    pub has_cue: bool,
}

impl ElementState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<ControlValue>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.classes.insert(class.to_string());
        } else {
            self.classes.remove(class);
        }
    }

    /// Remove every class starting with `prefix`.
    pub fn remove_prefixed_class(&mut self, prefix: &str) {
        self.classes.retain(|class| !class.starts_with(prefix));
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }
}

/// Work scheduled by a normalizer to run after the current pass completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeferredUpdate {
    /// Replace the element's visible text.
    SetElementValue(String),
}
