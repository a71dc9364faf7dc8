use serde::{Deserialize, Serialize};

use crate::attributes::ValueAttribute;

/// Typed defaults a primitive, format or controltype contributes to the
/// controls that use it. Later contributions override earlier ones field by
/// field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instant_validation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controltype: Option<String>,
    #[serde(skip)]
    pub value_attribute: Option<ValueAttribute>,
    /// Keystroke filter family (`integer`, `number`, `payment-card`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict_input: Option<String>,
}

impl TypeDefaults {
    pub fn instant_validation(mut self, on: bool) -> Self {
        self.instant_validation = Some(on);
        self
    }

    pub fn controltype(mut self, controltype: impl Into<String>) -> Self {
        self.controltype = Some(controltype.into());
        self
    }

    pub fn value_attribute(mut self, attribute: ValueAttribute) -> Self {
        self.value_attribute = Some(attribute);
        self
    }

    pub fn restrict_input(mut self, family: impl Into<String>) -> Self {
        self.restrict_input = Some(family.into());
        self
    }

    pub fn merge(&mut self, other: &TypeDefaults) {
        if other.instant_validation.is_some() {
            self.instant_validation = other.instant_validation;
        }
        if other.controltype.is_some() {
            self.controltype.clone_from(&other.controltype);
        }
        if other.value_attribute.is_some() {
            self.value_attribute = other.value_attribute;
        }
        if other.restrict_input.is_some() {
            self.restrict_input.clone_from(&other.restrict_input);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_defaults_win_field_by_field() {
        let mut defaults = TypeDefaults::default().instant_validation(true);
        defaults.merge(&TypeDefaults::default().controltype("checkbox"));
        defaults.merge(&TypeDefaults::default().instant_validation(false));
        assert_eq!(defaults.instant_validation, Some(false));
        assert_eq!(defaults.controltype.as_deref(), Some("checkbox"));
    }
}
