//! `boolean` primitive and `checkbox` controltype.

use formwork_model::{ControlValue, PhraseLookup, Primitive, TypeDefaults, ValueAttribute};

use crate::context::{PrepareContext, RuleContext};
use crate::registry::{Kind, RuleRegistry, TypeRules};

pub fn register(registry: &mut RuleRegistry) {
    registry.register_type(
        Kind::Primitive,
        "boolean",
        TypeRules::new().initialize(TypeDefaults::default().controltype("checkbox")),
    );
    registry.register_type(
        Kind::ControlType,
        "checkbox",
        TypeRules::new()
            .initialize(TypeDefaults::default().value_attribute(ValueAttribute::Checked))
            .prepare(prepare_checkbox)
            .normalize(normalize_checkbox),
    );
}

fn prepare_checkbox(ctx: &mut PrepareContext<'_>) {
    let on_value = if ctx.primitive == Primitive::Boolean {
        ControlValue::Bool(true)
    } else {
        ctx.own_phrase("value")
            .map(ControlValue::Text)
            .unwrap_or(ControlValue::Bool(true))
    };
    let checked = ctx.attributes.value == on_value;
    ctx.attributes.checked = checked;
    ctx.attributes.value = on_value;

    if !ctx.edit {
        let state = checked.to_string();
        let text = ctx
            .phrase(&PhraseLookup::new(ctx.phrasekey).append("value").appendix(&state))
            .or_else(|| {
                ctx.phrase(
                    &PhraseLookup::new("control.checkbox")
                        .append("value")
                        .appendix(&state),
                )
            })
            .unwrap_or(state);
        ctx.attributes.value = ControlValue::Text(text);
    }
}

/// Non-boolean checkboxes carry their "on" value when checked and an empty
/// string otherwise.
fn normalize_checkbox(value: ControlValue, ctx: &mut RuleContext<'_>) -> ControlValue {
    if ctx.primitive == Primitive::Boolean {
        return value;
    }
    if value.is_truthy() {
        ctx.attributes.value.clone()
    } else {
        ControlValue::text("")
    }
}
