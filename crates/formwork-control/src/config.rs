//! Instance configuration and the settings a control resolves from it.

use serde::{Deserialize, Serialize};

use formwork_model::{ControlOptions, ControlValue, TypeDefaults, ValueAttribute};

/// Prefix marking instance options that belong in the control's options
/// rather than its rendered attributes.
pub const CONTROL_OPTION_PREFIX: &str = "control-";

/// Per-instance options given when a control is created.
///
/// Anything set here overrides the model schema and the type defaults.
/// Unknown keys are kept in `extra`: `control-` prefixed ones feed the
/// control's options, the rest are passed through to the template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<bool>,
    pub display: bool,
    #[serde(skip_serializing_if = "ControlValue::is_absent")]
    pub value: ControlValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phrasekey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(alias = "control-id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        rename = "type",
        alias = "control-primitive",
        skip_serializing_if = "Option::is_none"
    )]
    pub primitive: Option<String>,
    #[serde(alias = "control-format", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(alias = "control-type", skip_serializing_if = "Option::is_none")]
    pub controltype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<bool>,
    #[serde(alias = "control-keyup", skip_serializing_if = "Option::is_none")]
    pub keyup: Option<bool>,
    #[serde(rename = "instant-validate", skip_serializing_if = "Option::is_none")]
    pub instant_validate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiline: Option<bool>,
    #[serde(flatten)]
    pub extra: ControlOptions,
}

impl ControlConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn controltype(mut self, controltype: impl Into<String>) -> Self {
        self.controltype = Some(controltype.into());
        self
    }

    pub fn value(mut self, value: impl Into<ControlValue>) -> Self {
        self.value = value.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn display_only(mut self) -> Self {
        self.display = true;
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key, value);
        self
    }

    /// Split `extra` into control options (prefix stripped) and pass-through
    /// template attributes.
    pub(crate) fn split_extra(&self) -> (ControlOptions, ControlOptions) {
        let mut control = ControlOptions::new();
        let mut passthrough = ControlOptions::new();
        for (key, value) in self.extra.iter() {
            match key.strip_prefix(CONTROL_OPTION_PREFIX) {
                Some(stripped) if !stripped.is_empty() => control.insert(stripped, value.clone()),
                _ => passthrough.insert(key.clone(), value.clone()),
            }
        }
        (control, passthrough)
    }
}

/// Behaviour flags resolved once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlSettings {
    pub edit: bool,
    pub required: bool,
    pub keyup: bool,
    pub instant_validation: bool,
    pub multiline: bool,
    pub value_attribute: ValueAttribute,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict_input: Option<String>,
}

impl ControlSettings {
    /// Fold in a type's defaults. An explicit instance `instant-validate`
    /// keeps precedence over the type.
    pub(crate) fn apply(&mut self, defaults: &TypeDefaults, instance_instant: Option<bool>) {
        if let Some(instant) = defaults.instant_validation
            && instance_instant.is_none()
        {
            self.instant_validation = instant;
        }
        if let Some(attribute) = defaults.value_attribute {
            self.value_attribute = attribute;
        }
        if defaults.restrict_input.is_some() {
            self.restrict_input.clone_from(&defaults.restrict_input);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_options_move_into_control_options() {
        let config: ControlConfig = serde_json::from_str(
            r#"{"name": "expiry", "control-years": 3, "data-test": "x", "required": true}"#,
        )
        .expect("config");
        assert_eq!(config.required, Some(true));
        let (control, passthrough) = config.split_extra();
        assert_eq!(control.get_i64("years"), Some(3));
        assert_eq!(passthrough.get_str("data-test"), Some("x"));
        assert!(control.get("data-test").is_none());
    }

    #[test]
    fn instance_instant_validation_beats_type_default() {
        let mut settings = ControlSettings {
            edit: true,
            required: false,
            keyup: false,
            instant_validation: false,
            multiline: false,
            value_attribute: ValueAttribute::Value,
            restrict_input: None,
        };
        let defaults = TypeDefaults::default()
            .instant_validation(true)
            .restrict_input("number");
        settings.apply(&defaults, Some(false));
        assert!(!settings.instant_validation);
        assert_eq!(settings.restrict_input.as_deref(), Some("number"));
        settings.apply(&defaults, None);
        assert!(settings.instant_validation);
    }
}
