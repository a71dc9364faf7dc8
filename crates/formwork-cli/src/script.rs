//! Headless input scripts: a JSON list of user actions replayed against a form.
//!
//! ```json
//! [
//!   {"action": "input", "control": "name", "value": "Jo"},
//!   {"action": "select", "control": "expiry", "part": "month", "value": "7"},
//!   {"action": "submit"}
//! ]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use formwork_control::{ControlEvent, EventOutcome, Form, SubmitOutcome};
use formwork_model::{ControlValue, ValidateOptions};

use crate::logging::redact_value;

/// One user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    /// Type a value and release the key.
    Input { control: String, value: ControlValue },
    /// Set a value and leave the field.
    Change { control: String, value: ControlValue },
    /// Pick one part of a month/year control.
    Select {
        control: String,
        part: String,
        value: String,
    },
    Keypress { control: String, key: char },
    /// Inject an error code, as a server response would.
    Error { control: String, code: String },
    Submit,
    /// The host's save failed.
    Fail {
        #[serde(default)]
        message: Option<String>,
    },
    /// The host's save succeeded.
    Succeed,
    Cancel,
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Change { .. } => "change",
            Self::Select { .. } => "select",
            Self::Keypress { .. } => "keypress",
            Self::Error { .. } => "error",
            Self::Submit => "submit",
            Self::Fail { .. } => "fail",
            Self::Succeed => "succeed",
            Self::Cancel => "cancel",
        }
    }

    pub fn control(&self) -> Option<&str> {
        match self {
            Self::Input { control, .. }
            | Self::Change { control, .. }
            | Self::Select { control, .. }
            | Self::Keypress { control, .. }
            | Self::Error { control, .. } => Some(control),
            Self::Submit | Self::Fail { .. } | Self::Succeed | Self::Cancel => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,
    pub outcome: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSummary {
    pub name: String,
    pub controltype: String,
    pub primitive: String,
    pub edit: bool,
    pub value: ControlValue,
    pub has_error: bool,
    /// The error indicator is raised.
    pub flagged: bool,
    pub messages: Vec<String>,
}

/// Final state of a form after a script ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub model: Option<String>,
    pub disabled: bool,
    pub has_no_errors: bool,
    /// Model handed over by the last successful submission.
    pub submitted: Option<serde_json::Value>,
    pub values: serde_json::Value,
    pub controls: Vec<ControlSummary>,
    pub steps: Vec<StepReport>,
}

impl CheckReport {
    pub fn error_count(&self) -> usize {
        self.controls.iter().filter(|control| control.has_error).count()
    }
}

pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read script {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse script {}", path.display()))
}

/// Replay `steps` and summarize the form.
pub fn run_script(form: &mut Form, steps: &[Step]) -> Result<CheckReport> {
    let mut reports = Vec::with_capacity(steps.len());
    let mut submitted = None;
    for (index, step) in steps.iter().enumerate() {
        let outcome = apply_step(form, step)
            .with_context(|| format!("step {} ({})", index + 1, step.action()))?;
        form.run_deferred();
        if let StepOutcome::Submit(SubmitOutcome::Submitted(model)) = &outcome {
            submitted = Some(model.clone());
        }
        debug!(step = index + 1, action = step.action(), outcome = %outcome, "step applied");
        reports.push(StepReport {
            action: step.action(),
            control: step.control().map(str::to_string),
            outcome: outcome.to_string(),
        });
    }
    info!(steps = steps.len(), submitted = submitted.is_some(), "script finished");
    Ok(summarize(form, submitted, reports))
}

pub fn summarize(
    form: &Form,
    submitted: Option<serde_json::Value>,
    steps: Vec<StepReport>,
) -> CheckReport {
    let controls = form
        .controls()
        .iter()
        .map(|control| ControlSummary {
            name: control.name().to_string(),
            controltype: control.controltype().to_string(),
            primitive: control.primitive().to_string(),
            edit: control.settings().edit,
            value: control.dirty_value().clone(),
            has_error: control.has_error(),
            flagged: control.is_flagged(),
            messages: control.messages().map(<[String]>::to_vec).unwrap_or_default(),
        })
        .collect();
    CheckReport {
        model: form.model().name().map(str::to_string),
        disabled: form.is_disabled(),
        has_no_errors: form.has_no_errors(),
        submitted,
        values: form.model().to_json(),
        controls,
        steps,
    }
}

enum StepOutcome {
    Event(EventOutcome),
    Submit(SubmitOutcome),
    Done,
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Event(EventOutcome::Handled) | Self::Done => "ok",
            Self::Event(EventOutcome::Rejected) => "rejected",
            Self::Event(EventOutcome::Submit(outcome)) | Self::Submit(outcome) => match outcome {
                SubmitOutcome::Submitted(_) => "submitted",
                SubmitOutcome::Blocked => "blocked",
                SubmitOutcome::AlreadySubmitted => "already submitted",
            },
        };
        f.write_str(text)
    }
}

fn apply_step(form: &mut Form, step: &Step) -> Result<StepOutcome> {
    let outcome = match step {
        Step::Input { control, value } => {
            trace!(control = %control, value = redact_value(&value.render()), "input");
            StepOutcome::Event(form.input(control, value.clone())?)
        }
        Step::Change { control, value } => {
            trace!(control = %control, value = redact_value(&value.render()), "change");
            StepOutcome::Event(form.change(control, value.clone())?)
        }
        Step::Select {
            control,
            part,
            value,
        } => StepOutcome::Event(form.select_sub_value(control, part, value.as_str())?),
        Step::Keypress { control, key } => {
            let outcome = form.handle_event(control, ControlEvent::Keypress(*key))?;
            match outcome {
                EventOutcome::Submit(submit) => StepOutcome::Submit(submit),
                other => StepOutcome::Event(other),
            }
        }
        Step::Error { control, code } => {
            form.add_control_error(control, code.as_str(), &ValidateOptions::new())?;
            StepOutcome::Done
        }
        Step::Submit => StepOutcome::Submit(form.submit()),
        Step::Fail { message } => {
            form.submission_failed(message.clone());
            StepOutcome::Done
        }
        Step::Succeed => {
            form.submission_succeeded();
            StepOutcome::Done
        }
        Step::Cancel => {
            form.cancel();
            StepOutcome::Done
        }
    };
    Ok(outcome)
}
