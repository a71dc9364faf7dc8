//! Configuration and per-call options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Free-form per-type configuration attached to a control.
///
/// Populated from the schema's `controloptions` and from any `control-`
/// prefixed instance option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlOptions {
    entries: BTreeMap<String, serde_json::Value>,
}

impl ControlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(serde_json::Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.entries.get(key)? {
            serde_json::Value::Number(value) => value.as_i64(),
            serde_json::Value::String(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean lookup with truthy coercion for strings and numbers.
    pub fn get_bool(&self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(serde_json::Value::Bool(value)) => *value,
            Some(serde_json::Value::Number(value)) => value.as_f64().is_some_and(|n| n != 0.0),
            Some(serde_json::Value::String(value)) => !value.is_empty() && value != "false",
            _ => false,
        }
    }

    pub fn get_strings(&self, key: &str) -> Vec<String> {
        match self.entries.get(key) {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(value) => value.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Set a key only when it is not already present.
    pub fn insert_default(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| value.into());
    }

    /// Overlay another set of options; keys in `other` win.
    pub fn merge(&mut self, other: &ControlOptions) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.entries.iter()
    }
}

impl FromIterator<(String, serde_json::Value)> for ControlOptions {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Application-wide defaults supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientDefaults {
    /// Card types accepted by payment-card controls.
    #[serde(rename = "cardtypes")]
    pub card_types: Vec<String>,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            card_types: vec!["visa".to_string(), "mastercard".to_string()],
        }
    }
}

/// Where an error code is inserted in the display stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackMethod {
    #[default]
    Push,
    Unshift,
}

/// Options for a single `add_error` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorOptions {
    /// `Some(false)` keeps the code out of the display stack.
    pub display: Option<bool>,
    pub force_display: bool,
    /// Raise the visual indicator without stacking the code.
    pub flag: bool,
    pub method: StackMethod,
}

impl ErrorOptions {
    pub fn hidden() -> Self {
        Self {
            display: Some(false),
            ..Default::default()
        }
    }

    pub fn with_display(display: bool) -> Self {
        Self {
            display: Some(display),
            ..Default::default()
        }
    }
}

/// Options threaded through update, validate and the form cascade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidateOptions {
    /// Manually supplied error code (e.g. from a server response).
    pub error: Option<String>,
    pub display: Option<bool>,
    pub force_display: bool,
    /// Post-render pass: errors are recorded but not flagged.
    pub rendered: bool,
    /// Suppress the parent re-validation cascade.
    pub norevalidation: bool,
    /// Keystroke-level validation pass.
    pub instant_validate: bool,
    /// Validation requested by a sibling rather than by user input.
    pub prompted: bool,
    /// Form-level: run `update_control` on every child.
    pub update: bool,
    /// Form-level: run `validate_control` on every child.
    pub validate: bool,
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manual_error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            norevalidation: true,
            ..Default::default()
        }
    }

    /// Error options inheriting this call's display controls.
    pub fn error_options(&self) -> ErrorOptions {
        ErrorOptions {
            display: self.display,
            force_display: self.force_display,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_existing_keys() {
        let mut base: ControlOptions =
            serde_json::from_str(r#"{"format": "D MMM YYYY", "years": 5}"#).expect("options");
        let overlay: ControlOptions = serde_json::from_str(r#"{"years": "7"}"#).expect("options");
        base.merge(&overlay);
        assert_eq!(base.get_i64("years"), Some(7));
        assert_eq!(base.get_str("format"), Some("D MMM YYYY"));
    }

    #[test]
    fn client_defaults_accept_visa_and_mastercard() {
        let defaults = ClientDefaults::default();
        assert_eq!(defaults.card_types, vec!["visa", "mastercard"]);
        let custom: ClientDefaults =
            serde_json::from_str(r#"{"cardtypes": ["amex"]}"#).expect("defaults");
        assert_eq!(custom.card_types, vec!["amex"]);
    }
}
