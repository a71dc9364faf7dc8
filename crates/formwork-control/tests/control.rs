//! Single-control behaviour outside a form.

use std::sync::Arc;

use chrono::NaiveDate;
use formwork_control::{
    Control, ControlConfig, ControlEnv, ControlInput, ControlRenderer, ControlScope, TemplateSet,
};
use formwork_model::{
    AttributeStore, ChangeEvent, ControlValue, DeferredUpdate, FixedClock, MemoryModel,
    MemoryPhrasebook, ModelDefinition, Primitive, ValidateOptions, ValueAttribute,
};
use proptest::prelude::*;
use serde_json::json;

fn env(phrases: MemoryPhrasebook) -> ControlEnv {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date");
    ControlEnv::default()
        .with_phrases(Arc::new(phrases))
        .with_clock(Arc::new(FixedClock::on(today)))
}

fn model(definition: serde_json::Value) -> MemoryModel {
    let definition: ModelDefinition = serde_json::from_value(definition).expect("model definition");
    MemoryModel::from(definition)
}

fn update(control: &mut Control, model: &mut MemoryModel, value: impl Into<ControlValue>) {
    control.update_control(
        ControlInput::Value(value.into()),
        &ValidateOptions::new(),
        &mut ControlScope::standalone(model),
    );
}

#[test]
fn required_absence_is_hidden_on_a_pristine_field() {
    let mut model = model(json!({
        "name": "user",
        "schema": {"properties": {"name": {"required": true}}}
    }));
    let control = Control::new(env(MemoryPhrasebook::new()), &ControlConfig::new("name"), &mut model);

    assert!(control.has_error());
    assert!(control.messages().is_none());
    assert!(!control.is_flagged());
}

#[test]
fn required_absence_shows_once_the_model_held_a_value() {
    let mut model = model(json!({
        "name": "user",
        "schema": {"properties": {"name": {"required": true}}},
        "attributes": {"name": "Ann"}
    }));
    let mut control =
        Control::new(env(MemoryPhrasebook::new()), &ControlConfig::new("name"), &mut model);
    assert!(!control.has_error());

    update(&mut control, &mut model, "   ");

    assert_eq!(control.messages(), Some(&["required".to_string()][..]));
    assert!(control.is_flagged());
    assert_eq!(control.dirty_value(), &ControlValue::text(""));
    assert_eq!(model.value("name"), ControlValue::text("Ann"));
}

#[test]
fn messages_resolve_through_phrases() {
    let phrases = MemoryPhrasebook::new()
        .with("model.user.age.label", "Age")
        .with(
            "model.user.age.error.integer.not-an-integer",
            "{{label}} must be a whole number, not {{value}}",
        )
        .with("control.error.required", "{{label}} is required");
    let mut model = model(json!({
        "name": "user",
        "schema": {"properties": {"age": {"type": "integer", "required": true}}},
        "attributes": {"age": 30}
    }));
    let mut control = Control::new(env(phrases), &ControlConfig::new("age"), &mut model);
    assert_eq!(control.attributes().label, "Age");

    update(&mut control, &mut model, "3.5");
    assert_eq!(
        control.messages(),
        Some(&["Age must be a whole number, not 3.5".to_string()][..])
    );

    update(&mut control, &mut model, "");
    assert_eq!(control.messages(), Some(&["Age is required".to_string()][..]));

    update(&mut control, &mut model, "42");
    assert!(control.messages().is_none());
    assert_eq!(model.value("age"), ControlValue::Number(42.0));
}

#[test]
fn display_mode_skips_the_pipeline() {
    let mut model = model(json!({
        "schema": {"properties": {"age": {"type": "integer"}}},
        "attributes": {"age": 30}
    }));
    let mut control = Control::new(
        env(MemoryPhrasebook::new()),
        &ControlConfig::new("age").display_only(),
        &mut model,
    );
    assert!(!control.settings().edit);

    let value = control.validate_control(
        ControlValue::text("abc"),
        &ValidateOptions::new(),
        &mut ControlScope::standalone(&mut model),
    );
    assert_eq!(value, ControlValue::text("abc"));
    assert!(!control.has_error());
    assert!(model.changes().is_empty());
}

#[test]
fn fixed_property_with_a_value_is_display_only() {
    let mut model = model(json!({
        "schema": {"properties": {"ref": {"fixed": true}}},
        "attributes": {"ref": "AB-12"}
    }));
    let control = Control::new(env(MemoryPhrasebook::new()), &ControlConfig::new("ref"), &mut model);
    assert!(!control.settings().edit);
}

#[test]
fn boolean_property_becomes_a_checkbox() {
    let mut model = model(json!({
        "schema": {"properties": {"agree": {"type": "boolean"}}}
    }));
    let mut control =
        Control::new(env(MemoryPhrasebook::new()), &ControlConfig::new("agree"), &mut model);
    assert_eq!(control.controltype(), "checkbox");
    assert_eq!(control.settings().value_attribute, ValueAttribute::Checked);
    model.take_changes();

    control.set_element_value(true);
    control.update_control(
        ControlInput::FromElement,
        &ValidateOptions::new(),
        &mut ControlScope::standalone(&mut model),
    );

    assert!(control.attributes().checked);
    assert_eq!(
        model.changes(),
        [ChangeEvent {
            key: "agree".to_string(),
            value: ControlValue::Bool(true),
        }]
    );
}

#[test]
fn silent_option_commits_without_change_events() {
    let mut model = model(json!({
        "schema": {"properties": {"city": {"controloptions": {"silent": true}}}}
    }));
    let mut control =
        Control::new(env(MemoryPhrasebook::new()), &ControlConfig::new("city"), &mut model);

    update(&mut control, &mut model, "Leeds");
    assert_eq!(model.value("city"), ControlValue::text("Leeds"));
    assert!(model.changes().is_empty());
}

#[test]
fn keystrokes_are_filtered_by_family() {
    let mut model = model(json!({
        "schema": {"properties": {
            "amount": {"type": "number"},
            "count": {"type": "integer"},
            "card": {"format": "payment-card"},
            "note": {}
        }}
    }));
    let env = env(MemoryPhrasebook::new());
    let mut amount = Control::new(env.clone(), &ControlConfig::new("amount"), &mut model);
    let count = Control::new(env.clone(), &ControlConfig::new("count"), &mut model);
    let card = Control::new(env.clone(), &ControlConfig::new("card"), &mut model);
    let note = Control::new(env, &ControlConfig::new("note"), &mut model);

    assert!(amount.accepts_keypress('.'));
    amount.set_element_value("1.5");
    assert!(!amount.accepts_keypress('.'));
    assert!(amount.accepts_keypress('7'));
    assert!(!amount.accepts_keydown(true));

    assert!(!count.accepts_keypress('.'));
    assert!(count.accepts_keypress('\r'));

    assert!(card.accepts_keypress(' '));
    assert!(card.accepts_keypress('-'));
    assert!(!card.accepts_keypress('a'));

    assert!(note.accepts_keypress('x'));
    assert!(note.accepts_keydown(true));
}

#[test]
fn instance_options_reach_rules_and_template() {
    let mut model = model(json!({
        "schema": {"properties": {"expiry": {"controltype": "payment-date-expiry"}}}
    }));
    let config = ControlConfig::new("expiry")
        .option("control-years", 2)
        .option("data-test", "expiry-field");
    let mut control = Control::new(env(MemoryPhrasebook::new()), &config, &mut model);

    let state = control.attributes().month_year.clone().expect("month/year state");
    let years: Vec<_> = state.year.options.iter().map(|o| o.value.as_str()).collect();
    assert_eq!(years, ["2024", "2025"]);
    assert!(control.set_sub_value("year", "2025"));
    assert!(!control.set_sub_value("day", "1"));

    let context = control.context(&TemplateSet::plain());
    assert_eq!(context["data-test"], "expiry-field");
    assert_eq!(context["attributes"]["id"], "control-expiry");
    assert!(context["attributes"].get("label").is_none());
    assert_eq!(context["controltemplate"], "text.edit");
}

#[test]
fn renders_value_and_errors() {
    let phrases = MemoryPhrasebook::new().with("model.age.label", "Age");
    let mut model = model(json!({
        "schema": {"properties": {"age": {"type": "integer"}}},
        "attributes": {"age": 30}
    }));
    let mut control = Control::new(env(phrases), &ControlConfig::new("age"), &mut model);
    let templates = TemplateSet::plain();
    assert!(!templates.has_template("integer.edit"));

    insta::assert_snapshot!(control.render(&templates), @"Age: [30]");

    update(&mut control, &mut model, "abc");
    insta::assert_snapshot!(control.render(&templates), @"Age: [30] integer.not-a-number");
}

#[test]
fn date_display_text_waits_for_deferred_run() {
    let mut model = model(json!({
        "schema": {"properties": {"born": {"controltype": "date"}}}
    }));
    let mut control =
        Control::new(env(MemoryPhrasebook::new()), &ControlConfig::new("born"), &mut model);
    assert!(!control.settings().instant_validation);
    control.set_element_value("25 12 2020");

    control.update_control(
        ControlInput::FromElement,
        &ValidateOptions::new(),
        &mut ControlScope::standalone(&mut model),
    );
    assert_eq!(model.value("born"), ControlValue::text("2020-12-25T00:00:00.000Z"));
    assert_eq!(
        control.element().map(|element| element.value.clone()),
        Some(ControlValue::text("25 12 2020"))
    );

    control.run_deferred();
    assert_eq!(
        control.element().map(|element| element.value.clone()),
        Some(ControlValue::text("25 Dec 2020"))
    );
    assert_eq!(control.take_deferred(), Vec::<DeferredUpdate>::new());
}

fn read_element(control: &mut Control, model: &mut MemoryModel) {
    control.update_control(
        ControlInput::FromElement,
        &ValidateOptions::new(),
        &mut ControlScope::standalone(model),
    );
}

#[test]
fn month_year_display_text_reads_back_to_the_same_date() {
    let mut model = model(json!({
        "schema": {"properties": {"expires": {
            "controltype": "date",
            "controloptions": {"datetype": "month-year"}
        }}}
    }));
    let mut control =
        Control::new(env(MemoryPhrasebook::new()), &ControlConfig::new("expires"), &mut model);
    control.set_element_value("12/2020");

    read_element(&mut control, &mut model);
    control.run_deferred();
    assert_eq!(
        control.element().map(|element| element.value.clone()),
        Some(ControlValue::text("Dec 2020"))
    );

    read_element(&mut control, &mut model);
    assert_eq!(model.value("expires"), ControlValue::text("2020-12-01T00:00:00.000Z"));
    assert!(!control.has_error());
}

#[test]
fn date_display_text_reads_back_to_the_same_date() {
    let mut model = model(json!({
        "schema": {"properties": {"born": {"controltype": "date"}}}
    }));
    let mut control =
        Control::new(env(MemoryPhrasebook::new()), &ControlConfig::new("born"), &mut model);
    control.set_element_value("25.12.2020");

    for _ in 0..3 {
        read_element(&mut control, &mut model);
        control.run_deferred();
        assert_eq!(model.value("born"), ControlValue::text("2020-12-25T00:00:00.000Z"));
        assert_eq!(
            control.element().map(|element| element.value.clone()),
            Some(ControlValue::text("25 Dec 2020"))
        );
    }
}

#[test]
fn only_the_latest_display_update_stays_queued() {
    let mut model = model(json!({
        "schema": {"properties": {"born": {"controltype": "date"}}}
    }));
    let mut control =
        Control::new(env(MemoryPhrasebook::new()), &ControlConfig::new("born"), &mut model);
    for text in ["1 1 2020", "2 1 2020", "3 1 2020"] {
        control.set_element_value(text);
        read_element(&mut control, &mut model);
    }

    assert_eq!(
        control.take_deferred(),
        vec![DeferredUpdate::SetElementValue("3 Jan 2020".to_string())]
    );
}

proptest! {
    #[test]
    fn integer_controls_commit_only_whole_numbers(whole in -10_000i32..10_000, tenths in 1u8..10) {
        let mut model = model(json!({
            "schema": {"properties": {"count": {"type": "integer"}}}
        }));
        let mut control =
            Control::new(env(MemoryPhrasebook::new()), &ControlConfig::new("count"), &mut model);
        prop_assert_eq!(control.primitive(), Primitive::Integer);

        update(&mut control, &mut model, format!("{whole}.{tenths}"));
        prop_assert!(control.has_error());

        update(&mut control, &mut model, whole.to_string());
        prop_assert!(!control.has_error());
        prop_assert_eq!(model.value("count"), ControlValue::Number(f64::from(whole)));
    }
}
