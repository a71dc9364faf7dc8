//! Control values.
//!
//! A control value moves through three stages (raw, normalized, committed) but
//! is always one of a small closed set of shapes. `Absent` stands for a value
//! that was never supplied, which is distinct from an explicit `Null`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value held by a control or a model attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ControlValue {
    /// No value supplied.
    #[default]
    Absent,
    /// Explicit null.
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ControlValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Truthiness as used by the absence and display rules.
    ///
    /// Empty text, zero, NaN, `false`, null and absent are all falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Absent | Self::Null => false,
            Self::Bool(value) => *value,
            Self::Number(value) => *value != 0.0 && !value.is_nan(),
            Self::Text(value) => !value.is_empty(),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Trim surrounding whitespace of text values; other shapes pass through.
    pub fn trimmed(self) -> Self {
        match self {
            Self::Text(value) => {
                let trimmed = value.trim();
                if trimmed.len() == value.len() {
                    Self::Text(value)
                } else {
                    Self::Text(trimmed.to_string())
                }
            }
            other => other,
        }
    }

    /// Loose equality used to decide whether a value diverged from the model.
    ///
    /// Absent, null and empty text are treated as the same "nothing".
    pub fn same_as(&self, other: &Self) -> bool {
        let nothing = |value: &Self| match value {
            Self::Absent | Self::Null => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        };
        if nothing(self) && nothing(other) {
            return true;
        }
        self == other
    }

    /// Textual rendering used for length constraints and display.
    ///
    /// Integral numbers render without a fractional part.
    pub fn render(&self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::Null => "null".to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => format_number(*value),
            Self::Text(value) => value.clone(),
        }
    }

    /// Convert from a JSON value. Arrays and objects render to their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(*value),
            serde_json::Value::Number(value) => value
                .as_f64()
                .map(Self::Number)
                .unwrap_or_else(|| Self::Text(value.to_string())),
            serde_json::Value::String(value) => Self::Text(value.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Absent | Self::Null => serde_json::Value::Null,
            Self::Bool(value) => serde_json::Value::Bool(*value),
            Self::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 9.0e15 {
                    serde_json::Value::from(*value as i64)
                } else {
                    serde_json::Number::from_f64(*value)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Self::Text(value) => serde_json::Value::String(value.clone()),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1.0e21 {
        return format!("{value:.0}");
    }
    value.to_string()
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for ControlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ControlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ControlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ControlValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for ControlValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl Serialize for ControlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ControlValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_form_rules() {
        assert!(!ControlValue::Absent.is_truthy());
        assert!(!ControlValue::text("").is_truthy());
        assert!(!ControlValue::Number(0.0).is_truthy());
        assert!(!ControlValue::Bool(false).is_truthy());
        assert!(ControlValue::text("0").is_truthy());
        assert!(ControlValue::Number(-1.0).is_truthy());
    }

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(ControlValue::Number(3.0).render(), "3");
        assert_eq!(ControlValue::Number(3.5).render(), "3.5");
        assert_eq!(ControlValue::Number(-120.0).render(), "-120");
    }

    #[test]
    fn empty_text_matches_absent() {
        assert!(ControlValue::text("").same_as(&ControlValue::Absent));
        assert!(!ControlValue::text("a").same_as(&ControlValue::Absent));
        assert!(ControlValue::Number(2.0).same_as(&ControlValue::Number(2.0)));
    }

    #[test]
    fn trims_text_only() {
        assert_eq!(
            ControlValue::text("  abc ").trimmed(),
            ControlValue::text("abc")
        );
        assert_eq!(ControlValue::Number(1.0).trimmed(), ControlValue::Number(1.0));
    }
}
