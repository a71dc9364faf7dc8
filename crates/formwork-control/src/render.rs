//! Template rendering seam.

use std::collections::BTreeMap;

use formwork_model::phrase::substitute;

/// Host templating engine.
pub trait ControlRenderer {
    fn has_template(&self, name: &str) -> bool;

    fn render(&self, template: &str, context: &serde_json::Value) -> String;
}

/// Named `{{key}}` templates rendered against the flattened context.
///
/// Nested objects are addressed with dotted keys (`attributes.id`) and
/// string arrays are joined with `"; "`.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: BTreeMap<String, String>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain-text templates for the generic edit and display modes.
    pub fn plain() -> Self {
        Self::new()
            .with("text.edit", "{{label}}: [{{value}}] {{error}}")
            .with("text.display", "{{label}}: {{value}}")
    }

    pub fn insert(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(name.into(), template.into());
    }

    pub fn with(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(name, template);
        self
    }
}

impl ControlRenderer for TemplateSet {
    fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn render(&self, template: &str, context: &serde_json::Value) -> String {
        let Some(text) = self.templates.get(template) else {
            tracing::warn!(template, "missing template");
            return String::new();
        };
        let mut params = BTreeMap::new();
        flatten("", context, &mut params);
        substitute(text, &params).trim_end().to_string()
    }
}

fn flatten(prefix: &str, value: &serde_json::Value, out: &mut BTreeMap<String, String>) {
    use serde_json::Value;

    match value {
        Value::Object(entries) => {
            for (key, value) in entries {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&key, value, out);
            }
        }
        Value::Array(items) => {
            let joined = items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; ");
            out.insert(prefix.to_string(), joined);
        }
        Value::String(text) => {
            out.insert(prefix.to_string(), text.clone());
        }
        Value::Null => {
            out.insert(prefix.to_string(), String::new());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_dotted_and_joined_values() {
        let templates = TemplateSet::new().with("t", "{{attributes.id}} {{error}} {{missing}}");
        let context = serde_json::json!({
            "attributes": {"id": "control-age"},
            "error": ["a", "b"],
        });
        assert_eq!(templates.render("t", &context), "control-age a; b {{missing}}");
    }

    #[test]
    fn unknown_template_renders_empty() {
        assert_eq!(TemplateSet::new().render("nope", &serde_json::Value::Null), "");
    }
}
