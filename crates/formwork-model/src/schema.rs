//! Property schemas.
//!
//! Each model attribute may carry a JSON-schema-like property object which
//! decides the control's primitive, format, controltype and constraints.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::ControlOptions;

/// Native value type of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl Primitive {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema for a single model property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertySchema {
    /// Primitive type name (`string`, `number`, ...).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub primitive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "controltype", skip_serializing_if = "Option::is_none")]
    pub controltype: Option<String>,
    #[serde(rename = "controloptions", skip_serializing_if = "ControlOptions::is_empty")]
    pub controloptions: ControlOptions,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    pub exclusive_maximum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    pub exclusive_minimum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_length: Option<usize>,

    pub required: bool,
    /// Fixed properties cannot be edited once they hold a value.
    pub fixed: bool,
    /// Commit on every keystroke instead of only on change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyup: Option<bool>,
    #[serde(rename = "instant-validate", skip_serializing_if = "Option::is_none")]
    pub instant_validate: Option<bool>,
    pub multiline: bool,
}

impl PropertySchema {
    /// Resolved primitive, `None` when the type name is not recognised.
    pub fn primitive(&self) -> Option<Primitive> {
        self.primitive.as_deref().and_then(Primitive::parse)
    }

    /// Upper length bound, falling back to the exact length.
    pub fn effective_max_length(&self) -> Option<usize> {
        self.max_length.or(self.exact_length)
    }

    /// Lower length bound, falling back to the exact length.
    pub fn effective_min_length(&self) -> Option<usize> {
        self.min_length.or(self.exact_length)
    }
}

/// Schema for a whole model: property name to property schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySchema>,
}

impl FormSchema {
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_json_schema_keys() {
        let schema: PropertySchema = serde_json::from_str(
            r#"{
                "type": "integer",
                "maximum": 10,
                "exclusiveMaximum": true,
                "exactLength": 2,
                "required": true,
                "controloptions": {"before": "2d"}
            }"#,
        )
        .expect("parse schema");
        assert_eq!(schema.primitive(), Some(Primitive::Integer));
        assert_eq!(schema.maximum, Some(10.0));
        assert!(schema.exclusive_maximum);
        assert_eq!(schema.effective_max_length(), Some(2));
        assert_eq!(schema.effective_min_length(), Some(2));
        assert!(schema.required);
        assert_eq!(schema.controloptions.get_str("before"), Some("2d"));
    }

    #[test]
    fn unknown_primitive_is_none() {
        let schema = PropertySchema {
            primitive: Some("array".to_string()),
            ..Default::default()
        };
        assert_eq!(schema.primitive(), None);
    }
}
