//! Replaying input scripts against a form.

use std::sync::Arc;

use formwork_cli::logging::{REDACTED_VALUE, redact_value};
use formwork_cli::phrases::read_phrases;
use formwork_cli::script::{Step, run_script};
use formwork_control::{ControlEnv, Form, FormDefinition};
use formwork_model::ControlValue;
use serde_json::json;

fn form(env: ControlEnv) -> Form {
    let definition: FormDefinition = serde_json::from_value(json!({
        "model": {
            "name": "user",
            "schema": {"properties": {
                "name": {"required": true},
                "age": {"type": "integer"}
            }}
        },
        "controls": [{"name": "name"}, {"name": "age"}]
    }))
    .expect("form definition");
    let mut form = Form::from_definition(env, definition).expect("form");
    form.bind_elements();
    form.rendered();
    form
}

fn steps(script: serde_json::Value) -> Vec<Step> {
    serde_json::from_value(script).expect("script")
}

#[test]
fn parses_every_action() {
    let parsed = steps(json!([
        {"action": "input", "control": "name", "value": "Jo"},
        {"action": "change", "control": "age", "value": 41},
        {"action": "select", "control": "expiry", "part": "month", "value": "7"},
        {"action": "keypress", "control": "name", "key": "\r"},
        {"action": "error", "control": "name", "code": "server.taken"},
        {"action": "submit"},
        {"action": "fail"},
        {"action": "fail", "message": "offline"},
        {"action": "succeed"},
        {"action": "cancel"}
    ]));

    assert_eq!(parsed.len(), 10);
    assert_eq!(
        parsed[1],
        Step::Change {
            control: "age".to_string(),
            value: ControlValue::Number(41.0),
        }
    );
    assert_eq!(parsed[3].control(), Some("name"));
    assert_eq!(parsed[6], Step::Fail { message: None });
    let actions: Vec<_> = parsed.iter().map(Step::action).collect();
    assert_eq!(
        actions,
        [
            "input", "change", "select", "keypress", "error", "submit", "fail", "fail", "succeed",
            "cancel"
        ]
    );
}

#[test]
fn replays_a_session_until_submission() {
    let mut form = form(ControlEnv::default());
    let script = steps(json!([
        {"action": "keypress", "control": "age", "key": "x"},
        {"action": "change", "control": "age", "value": "41"},
        {"action": "input", "control": "name", "value": "Jo"},
        {"action": "submit"},
        {"action": "submit"}
    ]));

    let report = run_script(&mut form, &script).expect("run");

    insta::assert_json_snapshot!(report.steps, @r#"
    [
      {
        "action": "keypress",
        "control": "age",
        "outcome": "rejected"
      },
      {
        "action": "change",
        "control": "age",
        "outcome": "ok"
      },
      {
        "action": "input",
        "control": "name",
        "outcome": "ok"
      },
      {
        "action": "submit",
        "outcome": "submitted"
      },
      {
        "action": "submit",
        "outcome": "already submitted"
      }
    ]
    "#);
    assert_eq!(report.submitted, Some(json!({"age": 41, "name": "Jo"})));
    assert_eq!(report.error_count(), 0);
    assert_eq!(report.model.as_deref(), Some("user"));
    assert_eq!(report.controls[1].primitive, "integer");
}

#[test]
fn blocked_submission_reports_messages() {
    let phrases = read_phrases(
        "key,text\n\
         model.user.name.label,Name\n\
         control.error.required,{{label}} is required\n"
            .as_bytes(),
    )
    .expect("phrases");
    let mut form = form(ControlEnv::default().with_phrases(Arc::new(phrases)));

    let report = run_script(&mut form, &steps(json!([{"action": "submit"}]))).expect("run");

    assert_eq!(report.steps[0].outcome, "blocked");
    assert_eq!(report.submitted, None);
    assert_eq!(report.error_count(), 1);
    let name = &report.controls[0];
    assert!(name.flagged);
    assert_eq!(name.messages, ["Name is required"]);
}

#[test]
fn enter_key_submits_through_the_script() {
    let mut form = form(ControlEnv::default());
    let script = steps(json!([
        {"action": "input", "control": "name", "value": "Jo"},
        {"action": "keypress", "control": "name", "key": "\r"}
    ]));

    let report = run_script(&mut form, &script).expect("run");

    assert_eq!(report.steps[1].outcome, "submitted");
    assert_eq!(report.submitted, Some(json!({"name": "Jo"})));
}

#[test]
fn unknown_controls_name_the_failing_step() {
    let mut form = form(ControlEnv::default());
    let script = steps(json!([
        {"action": "submit"},
        {"action": "input", "control": "nope", "value": "x"}
    ]));

    let error = run_script(&mut form, &script).expect_err("unknown control");
    let message = format!("{error:#}");
    assert!(message.contains("step 2 (input)"), "{message}");
    assert!(message.contains("unknown control: nope"), "{message}");
}

#[test]
fn values_are_redacted_without_opt_in() {
    assert_eq!(redact_value("hunter2"), REDACTED_VALUE);
}
