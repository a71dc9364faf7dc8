use std::sync::LazyLock;

use formwork_model::{ControlValue, PhraseLookup};
use regex::Regex;

use crate::context::{PrepareContext, RuleContext};
use crate::registry::{Kind, RuleRegistry, TypeRules};

static VALUE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*").expect("Invalid separator regex"));

pub fn register(registry: &mut RuleRegistry) {
    registry.register_type(
        Kind::ControlType,
        "select",
        TypeRules::new()
            .prepare(prepare_select)
            .normalize(normalize_select),
    );
}

/// Explicit `options`/`values` form the base; phrase-derived entries are
/// appended after them.
fn prepare_select(ctx: &mut PrepareContext<'_>) {
    let mut options = ctx.instance.get_strings("options");
    let mut values = ctx.instance.get_strings("values");

    if let Some(listed) = ctx.own_phrase("values") {
        for value in VALUE_SEPARATOR.split(&listed) {
            let label = ctx
                .phrase(
                    &PhraseLookup::new(ctx.phrasekey)
                        .append("option")
                        .appendix(value),
                )
                .unwrap_or_else(|| value.to_string());
            values.push(value.to_string());
            options.push(label);
        }
    }

    ctx.attributes.options = options;
    ctx.attributes.values = values;
    ctx.attributes.cue = ctx.own_phrase("cue");
}

/// Drop the placeholder cue once a real choice has been made.
fn normalize_select(value: ControlValue, ctx: &mut RuleContext<'_>) -> ControlValue {
    let chosen = match &value {
        ControlValue::Absent | ControlValue::Null => false,
        ControlValue::Text(text) => !text.is_empty(),
        _ => true,
    };
    if chosen && let Some(element) = ctx.element_mut() {
        element.has_cue = false;
    }
    value
}
