//! Attribute stores backing controls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::{FormSchema, PropertySchema};
use crate::value::ControlValue;

/// Key/value store with change notification.
pub trait AttributeStore {
    fn get(&self, key: &str) -> Option<&ControlValue>;

    /// Set a value. Non-silent sets are observable as change events.
    fn set(&mut self, key: &str, value: ControlValue, silent: bool);

    fn unset(&mut self, key: &str, silent: bool);

    /// Owned value, `Absent` when missing.
    fn value(&self, key: &str) -> ControlValue {
        self.get(key).cloned().unwrap_or_default()
    }
}

/// A recorded non-silent change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub key: String,
    pub value: ControlValue,
}

/// In-memory model: attributes plus the schema and phrase key that
/// controls bound to it derive their configuration from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryModel {
    name: Option<String>,
    phrasekey: Option<String>,
    schema: FormSchema,
    attributes: BTreeMap<String, ControlValue>,
    changes: Vec<ChangeEvent>,
}

impl MemoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: FormSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_phrasekey(mut self, phrasekey: impl Into<String>) -> Self {
        self.phrasekey = Some(phrasekey.into());
        self
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, ControlValue>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn phrasekey(&self) -> Option<&str> {
        self.phrasekey.as_deref()
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.schema.property(name)
    }

    pub fn attributes(&self) -> &BTreeMap<String, ControlValue> {
        &self.attributes
    }

    pub fn changes(&self) -> &[ChangeEvent] {
        &self.changes
    }

    pub fn take_changes(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.changes)
    }

    /// Copy of the attributes, used as a clean state to restore on cancel.
    pub fn snapshot(&self) -> BTreeMap<String, ControlValue> {
        self.attributes.clone()
    }

    /// Replace every attribute with the snapshot.
    pub fn restore(&mut self, snapshot: BTreeMap<String, ControlValue>) {
        self.attributes = snapshot;
    }

    /// A copy sharing schema and identity but with no change history.
    pub fn shadow(&self) -> Self {
        Self {
            name: self.name.clone(),
            phrasekey: self.phrasekey.clone(),
            schema: self.schema.clone(),
            attributes: self.attributes.clone(),
            changes: Vec::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.attributes
                .iter()
                .filter(|(_, value)| !value.is_absent())
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl AttributeStore for MemoryModel {
    fn get(&self, key: &str) -> Option<&ControlValue> {
        self.attributes.get(key)
    }

    fn set(&mut self, key: &str, value: ControlValue, silent: bool) {
        if !silent {
            self.changes.push(ChangeEvent {
                key: key.to_string(),
                value: value.clone(),
            });
        }
        self.attributes.insert(key.to_string(), value);
    }

    fn unset(&mut self, key: &str, silent: bool) {
        if self.attributes.remove(key).is_some() && !silent {
            self.changes.push(ChangeEvent {
                key: key.to_string(),
                value: ControlValue::Absent,
            });
        }
    }
}

/// Serialized form of a model: identity, schema and initial attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phrasekey: Option<String>,
    pub schema: FormSchema,
    pub attributes: BTreeMap<String, ControlValue>,
}

impl From<ModelDefinition> for MemoryModel {
    fn from(definition: ModelDefinition) -> Self {
        Self {
            name: definition.name,
            phrasekey: definition.phrasekey,
            schema: definition.schema,
            attributes: definition.attributes,
            changes: Vec::new(),
        }
    }
}
