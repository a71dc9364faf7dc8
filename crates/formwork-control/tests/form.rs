//! Form coordination scenarios.

use std::sync::Arc;

use chrono::NaiveDate;
use formwork_control::{
    ControlConfig, ControlEnv, ControlEvent, EventOutcome, Form, FormDefinition, SubmitOutcome,
};
use formwork_model::{
    AttributeStore, ClientDefaults, ControlValue, FixedClock, FormworkError, MemoryModel,
    MemoryPhrasebook, ModelDefinition, Primitive, ValidateOptions, codes,
};
use serde_json::json;

fn env_with(phrases: MemoryPhrasebook, defaults: &ClientDefaults) -> ControlEnv {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date");
    ControlEnv::with_defaults(defaults)
        .with_phrases(Arc::new(phrases))
        .with_clock(Arc::new(FixedClock::on(today)))
}

fn env() -> ControlEnv {
    env_with(MemoryPhrasebook::new(), &ClientDefaults::default())
}

fn form(env: ControlEnv, model: serde_json::Value, controls: &[&str]) -> Form {
    let definition: ModelDefinition = serde_json::from_value(model).expect("model definition");
    let mut form = Form::new(env, MemoryModel::from(definition));
    for name in controls {
        form.add_control(&ControlConfig::new(*name)).expect("add control");
    }
    form.bind_elements();
    form.rendered();
    form
}

fn required_name(attributes: serde_json::Value) -> serde_json::Value {
    json!({
        "name": "user",
        "schema": {"properties": {"name": {"required": true}}},
        "attributes": attributes
    })
}

#[test]
fn pristine_form_stays_disabled_until_a_value_diverges() {
    let mut form = form(env(), required_name(json!({})), &["name"]);
    assert!(form.is_disabled());
    assert!(!form.has_no_errors());

    form.input("name", "Jo").expect("input");

    assert!(form.has_no_errors());
    assert!(!form.is_disabled());
    assert!(!form.state().initial_values);
}

#[test]
fn retyping_the_initial_value_keeps_the_form_disabled() {
    let mut form = form(env(), required_name(json!({"name": "Ann"})), &["name"]);
    assert!(form.has_no_errors());
    assert!(form.is_disabled());

    form.input("name", "Ann").expect("input");
    assert!(form.is_disabled());

    form.input("name", "Bob").expect("input");
    assert!(!form.is_disabled());
    assert_eq!(form.state().dirty.value("name"), ControlValue::text("Bob"));
}

#[test]
fn choosing_an_option_removes_the_select_cue() {
    let phrases = MemoryPhrasebook::new()
        .with("model.prefs.colour.values", "red, green")
        .with("model.prefs.colour.option.red", "Red")
        .with("model.prefs.colour.cue", "Pick a colour");
    let model = json!({
        "name": "prefs",
        "schema": {"properties": {"colour": {"controltype": "select"}}}
    });
    let mut form = form(
        env_with(phrases, &ClientDefaults::default()),
        model,
        &["colour"],
    );
    let colour = form.get_control("colour").expect("colour");
    assert_eq!(colour.attributes().values, ["red", "green"]);
    assert_eq!(colour.attributes().options, ["Red", "green"]);
    assert_eq!(colour.attributes().cue.as_deref(), Some("Pick a colour"));
    assert!(colour.element().is_some_and(|element| element.has_cue));

    form.change("colour", "red").expect("change");

    let colour = form.get_control("colour").expect("colour");
    assert!(colour.element().is_some_and(|element| !element.has_cue));
    assert_eq!(form.model().value("colour"), ControlValue::text("red"));
}

#[test]
fn password_group_gates_submission() {
    let model = json!({
        "name": "account",
        "schema": {"properties": {
            "password-new": {"controltype": "password-new", "required": true},
            "password-confirm": {"controltype": "password-new", "required": true}
        }}
    });
    let mut form = form(env(), model, &["password-new", "password-confirm"]);
    assert!(form.is_disabled());

    form.input("password-new", "abc").expect("input");
    let confirm = form.get_control("password-confirm").expect("confirm");
    assert!(confirm.has_error());
    assert!(confirm.messages().is_none());
    assert!(form.is_disabled());

    form.input("password-confirm", "abd").expect("input");
    let confirm = form.get_control("password-confirm").expect("confirm");
    assert_eq!(confirm.report().display_codes(), [codes::PASSWORD_MISMATCH]);
    assert!(confirm.is_flagged());
    assert!(form.is_disabled());

    form.input("password-confirm", "abc").expect("input");
    assert!(!form.get_control("password-confirm").expect("confirm").has_error());
    assert!(!form.is_disabled());

    match form.submit() {
        SubmitOutcome::Submitted(saved) => assert_eq!(
            saved,
            json!({"password-new": "abc", "password-confirm": "abc"})
        ),
        other => panic!("expected submission, got {other:?}"),
    }
}

#[test]
fn injected_errors_display_without_committing() {
    let phrases =
        MemoryPhrasebook::new().with("control.error.server.taken", "{{value}} is already registered");
    let model = json!({
        "name": "user",
        "schema": {"properties": {"email": {"format": "email"}}},
        "attributes": {"email": "a@b.co"}
    });
    let mut form = form(
        env_with(phrases, &ClientDefaults::default()),
        model,
        &["email"],
    );
    form.change("email", "new@b.co").expect("change");

    form.add_control_error("email", "server.taken", &ValidateOptions::new())
        .expect("inject error");

    let email = form.get_control("email").expect("email");
    assert!(email.has_error());
    assert_eq!(
        email.messages(),
        Some(&["new@b.co is already registered".to_string()][..])
    );
    assert!(email.is_flagged());
    assert_eq!(form.model().value("email"), ControlValue::text("new@b.co"));

    assert!(matches!(
        form.add_control_error("missing", "server.taken", &ValidateOptions::new()),
        Err(FormworkError::UnknownControl(name)) if name == "missing"
    ));
}

#[test]
fn card_type_resizes_the_security_code() {
    let defaults = ClientDefaults {
        card_types: vec!["visa".into(), "mastercard".into(), "amex".into()],
    };
    let model = json!({
        "name": "payment",
        "schema": {"properties": {
            "cardnumber": {"format": "payment-card", "required": true},
            "ccv": {"required": true}
        }}
    });
    let mut form = form(
        env_with(MemoryPhrasebook::new(), &defaults),
        model,
        &["cardnumber", "ccv"],
    );

    form.input("cardnumber", "3782 8224 6310 005").expect("input");

    let card = form.get_control("cardnumber").expect("card");
    assert!(!card.has_error());
    assert!(card.element().is_some_and(|element| element.has_class("card-type-amex")));
    let ccv = form.get_control("ccv").expect("ccv");
    assert_eq!(ccv.schema().exact_length, Some(4));
    assert_eq!(ccv.attributes().maxlength, Some(4));
    assert_eq!(ccv.attributes().placeholder.as_deref(), Some("••••"));
    assert_eq!(
        ccv.element().and_then(|element| element.attribute("maxlength")),
        Some("4")
    );
    assert_eq!(form.model().value("cardtype"), ControlValue::text("amex"));
    assert!(!form.state().show_additional);
}

#[test]
fn card_keystrokes_are_filtered() {
    let model = json!({"schema": {"properties": {"cardnumber": {"format": "payment-card"}}}});
    let mut form = form(env(), model, &["cardnumber"]);

    let typed = form
        .handle_event("cardnumber", ControlEvent::Keypress('x'))
        .expect("keypress");
    assert_eq!(typed, EventOutcome::Rejected);
    let typed = form
        .handle_event("cardnumber", ControlEvent::Keydown { alt: true })
        .expect("keydown");
    assert_eq!(typed, EventOutcome::Rejected);
    let typed = form
        .handle_event("cardnumber", ControlEvent::Keypress('4'))
        .expect("keypress");
    assert_eq!(typed, EventOutcome::Handled);
}

#[test]
fn expiry_rejects_months_already_past() {
    let model = json!({
        "name": "payment",
        "schema": {"properties": {"expiry": {"controltype": "payment-date-expiry"}}}
    });
    let mut form = form(env(), model, &["expiry"]);

    form.select_sub_value("expiry", "month", "5").expect("month");
    assert!(!form.get_control("expiry").expect("expiry").has_error());

    form.select_sub_value("expiry", "year", "2024").expect("year");
    let expiry = form.get_control("expiry").expect("expiry");
    assert_eq!(
        expiry.messages(),
        Some(&["month-year.invalid-past".to_string()][..])
    );

    form.select_sub_value("expiry", "month", "7").expect("month");
    assert!(!form.get_control("expiry").expect("expiry").has_error());
    assert_eq!(
        form.model().value("expiry"),
        ControlValue::text("2024-07-01T00:00:00.000Z")
    );

    assert!(form.select_sub_value("expiry", "day", "1").is_err());
}

#[test]
fn submission_is_guarded_until_it_fails() {
    let mut form = form(env(), required_name(json!({})), &["name"]);
    form.input("name", "Jo").expect("input");

    assert_eq!(
        form.submit(),
        SubmitOutcome::Submitted(json!({"name": "Jo"}))
    );
    assert!(form.is_submitted());
    assert_eq!(form.submit(), SubmitOutcome::AlreadySubmitted);

    form.submission_failed(Some("server unavailable".to_string()));
    assert!(!form.is_submitted());
    assert!(form.is_disabled());
    assert_eq!(form.state().error.as_deref(), Some("server unavailable"));

    assert!(matches!(form.submit(), SubmitOutcome::Submitted(_)));
    assert_eq!(form.state().error, None);
}

#[test]
fn invalid_forms_do_not_submit() {
    let mut form = form(env(), required_name(json!({})), &["name"]);

    assert_eq!(form.submit(), SubmitOutcome::Blocked);
    let name = form.get_control("name").expect("name");
    assert_eq!(name.messages(), Some(&["required".to_string()][..]));
    assert!(name.is_flagged());
}

#[test]
fn enter_submits_the_form() {
    let mut form = form(env(), required_name(json!({})), &["name"]);
    form.input("name", "Jo").expect("input");

    let outcome = form
        .handle_event("name", ControlEvent::Keypress('\r'))
        .expect("keypress");
    assert_eq!(
        outcome,
        EventOutcome::Submit(SubmitOutcome::Submitted(json!({"name": "Jo"})))
    );
}

#[test]
fn cancel_restores_the_clean_model() {
    let mut form = form(env(), required_name(json!({"name": "Ann"})), &["name"]);
    form.change("name", "Bob").expect("change");
    assert_eq!(form.model().value("name"), ControlValue::text("Bob"));

    form.cancel();

    assert_eq!(form.model().value("name"), ControlValue::text("Ann"));
    assert_eq!(form.state().dirty.value("name"), ControlValue::text("Ann"));
    assert!(form.state().initial_values);
}

#[test]
fn control_names_are_unique() {
    let mut form = form(env(), required_name(json!({})), &["name"]);
    let duplicate = form.add_control(&ControlConfig::new("name"));
    assert!(matches!(duplicate, Err(FormworkError::DuplicateControl(name)) if name == "name"));
    assert!(form.handle_event("nope", ControlEvent::Change).is_err());
}

#[test]
fn builds_from_a_definition() {
    let definition: FormDefinition = serde_json::from_value(json!({
        "model": {
            "name": "user",
            "schema": {"properties": {"age": {"type": "integer"}}},
            "attributes": {"age": 30}
        },
        "controls": [
            {"name": "age", "label": "Age in years"},
            {"name": "nickname", "control-type": "textarea"}
        ]
    }))
    .expect("form definition");
    let form = Form::from_definition(env(), definition).expect("form");

    let age = form.get_control("age").expect("age");
    assert_eq!(age.primitive(), Primitive::Integer);
    assert_eq!(age.attributes().label, "Age in years");
    assert_eq!(form.get_control("nickname").expect("nickname").controltype(), "textarea");
    assert_eq!(form.controls().len(), 2);
}
