//! A control's own attribute bag: what gets rendered, and where the
//! committed value lives.

use serde::Serialize;

use crate::composite::MonthYearState;
use crate::options::ControlOptions;
use crate::value::ControlValue;

/// Which attribute carries the control's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueAttribute {
    #[default]
    Value,
    Checked,
}

impl ValueAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Checked => "checked",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControlAttributes {
    pub name: String,
    pub controlid: String,
    pub label: String,
    pub value: ControlValue,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxlength: Option<usize>,
    /// Select option labels, parallel to `values`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_year: Option<MonthYearState>,
    /// Instance options passed straight through to the template.
    #[serde(skip_serializing_if = "ControlOptions::is_empty")]
    pub extra: ControlOptions,
}

impl ControlAttributes {
    pub fn get(&self, attribute: ValueAttribute) -> ControlValue {
        match attribute {
            ValueAttribute::Value => self.value.clone(),
            ValueAttribute::Checked => ControlValue::Bool(self.checked),
        }
    }

    pub fn set(&mut self, attribute: ValueAttribute, value: ControlValue) {
        match attribute {
            ValueAttribute::Value => self.value = value,
            ValueAttribute::Checked => self.checked = value.is_truthy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_attribute_reads_as_bool() {
        let mut attrs = ControlAttributes::default();
        attrs.set(ValueAttribute::Checked, ControlValue::text("yes"));
        assert_eq!(attrs.get(ValueAttribute::Checked), ControlValue::Bool(true));
        assert_eq!(attrs.get(ValueAttribute::Value), ControlValue::Absent);
    }
}
