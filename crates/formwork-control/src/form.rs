//! Parent form: owns the controls, the shared model and the form state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use formwork_model::{
    AttributeStore, ControlValue, FormworkError, MemoryModel, ModelDefinition, ParentNotice,
    ParentState, Result, ValidateOptions,
};

use crate::config::ControlConfig;
use crate::control::{Control, ControlInput};
use crate::env::{ControlEnv, ControlScope};
use crate::input::{ControlEvent, is_enter};
use crate::render::ControlRenderer;

/// Notice rounds drained after one operation before the rest are dropped.
pub const MAX_CASCADE_DEPTH: usize = 64;

/// Serialized form: the model plus the controls bound to it, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefinition {
    pub model: ModelDefinition,
    pub controls: Vec<ControlConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The committed model, ready to be saved.
    Submitted(serde_json::Value),
    /// Errors remain or the form is disabled.
    Blocked,
    AlreadySubmitted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Handled,
    /// The keystroke was filtered out.
    Rejected,
    /// Enter triggered a submission attempt.
    Submit(SubmitOutcome),
}

#[derive(Debug)]
pub struct Form {
    env: ControlEnv,
    model: MemoryModel,
    state: ParentState,
    controls: Vec<Control>,
    /// Model attributes to restore on cancel.
    clean: BTreeMap<String, ControlValue>,
    submitted: bool,
}

impl Form {
    pub fn new(env: ControlEnv, model: MemoryModel) -> Self {
        Self {
            env,
            state: ParentState::new(model.shadow()),
            clean: model.snapshot(),
            model,
            controls: Vec::new(),
            submitted: false,
        }
    }

    pub fn from_definition(env: ControlEnv, definition: FormDefinition) -> Result<Self> {
        let mut form = Self::new(env, MemoryModel::from(definition.model));
        for config in &definition.controls {
            form.add_control(config)?;
        }
        tracing::debug!(controls = form.controls.len(), "built form");
        Ok(form)
    }

    /// Create a control bound to this form's model.
    pub fn add_control(&mut self, config: &ControlConfig) -> Result<&mut Control> {
        if self.position(&config.name).is_some() {
            return Err(FormworkError::DuplicateControl(config.name.clone()));
        }
        let control = Control::new(self.env.clone(), config, &mut self.model);
        let name = control.name().to_string();
        self.state.dirty.set(&name, self.model.value(&name), true);
        let index = self.controls.len();
        self.controls.push(control);
        Ok(&mut self.controls[index])
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, name: &str) -> Option<&Control> {
        self.controls.iter().find(|control| control.name() == name)
    }

    pub fn get_control(&self, name: &str) -> Result<&Control> {
        self.control(name)
            .ok_or_else(|| FormworkError::UnknownControl(name.to_string()))
    }

    pub fn get_control_mut(&mut self, name: &str) -> Result<&mut Control> {
        let index = self.index_of(name)?;
        Ok(&mut self.controls[index])
    }

    pub fn model(&self) -> &MemoryModel {
        &self.model
    }

    pub fn state(&self) -> &ParentState {
        &self.state
    }

    pub fn is_disabled(&self) -> bool {
        self.state.disabled
    }

    pub fn has_no_errors(&self) -> bool {
        self.state.has_no_errors
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Bind an element to every control that has none yet.
    pub fn bind_elements(&mut self) {
        for control in &mut self.controls {
            if control.element().is_none() {
                control.bind_element();
            }
        }
    }

    /// Validate every control without cascading.
    ///
    /// `update` runs the full update (with errors forced visible),
    /// `validate` runs the pipeline only, neither just re-reads each
    /// control's last outcome.
    pub fn validate_all_controls(&mut self, options: &ValidateOptions) {
        self.validate_all(options);
        self.drain_notices();
    }

    pub fn enable_form(&mut self, enable: bool, force: bool) {
        self.state.enable_form(enable, force);
    }

    pub fn disable_form(&mut self) {
        self.state.disable_form();
    }

    /// Post-render pass: record outcomes without raising indicators.
    pub fn rendered(&mut self) {
        self.validate_all_controls(&ValidateOptions {
            rendered: true,
            ..Default::default()
        });
    }

    /// Inject an error (e.g. from the server) into a control.
    pub fn add_control_error(
        &mut self,
        name: &str,
        error: impl Into<String>,
        options: &ValidateOptions,
    ) -> Result<()> {
        let index = self.index_of(name)?;
        let options = ValidateOptions {
            error: Some(error.into()),
            norevalidation: true,
            ..options.clone()
        };
        let (control, mut scope) = self.control_scope(index);
        control.update_control(ControlInput::FromElement, &options, &mut scope);
        self.drain_notices();
        Ok(())
    }

    pub fn handle_event(&mut self, name: &str, event: ControlEvent) -> Result<EventOutcome> {
        let index = self.index_of(name)?;
        tracing::debug!(control = name, ?event, "control event");
        let outcome = match event {
            ControlEvent::Change => {
                let (control, mut scope) = self.control_scope(index);
                control.update_control(
                    ControlInput::FromElement,
                    &ValidateOptions::new(),
                    &mut scope,
                );
                EventOutcome::Handled
            }
            ControlEvent::Keyup => {
                let (control, mut scope) = self.control_scope(index);
                if control.settings().keyup {
                    control.update_control(
                        ControlInput::FromElement,
                        &ValidateOptions::new(),
                        &mut scope,
                    );
                } else if control.settings().instant_validation {
                    let value = control.get_value();
                    control.instant_validate_control(value, &ValidateOptions::new(), &mut scope);
                }
                EventOutcome::Handled
            }
            ControlEvent::Keydown { alt } => {
                if self.controls[index].accepts_keydown(alt) {
                    EventOutcome::Handled
                } else {
                    EventOutcome::Rejected
                }
            }
            ControlEvent::Keypress(key) => {
                if !self.controls[index].accepts_keypress(key) {
                    return Ok(EventOutcome::Rejected);
                }
                if is_enter(key) {
                    return Ok(EventOutcome::Submit(self.submit()));
                }
                EventOutcome::Handled
            }
        };
        self.drain_notices();
        Ok(outcome)
    }

    /// Type a value into a control's element and fire keyup.
    pub fn input(&mut self, name: &str, value: impl Into<ControlValue>) -> Result<EventOutcome> {
        self.get_control_mut(name)?.set_element_value(value);
        self.handle_event(name, ControlEvent::Keyup)
    }

    /// Set a control's element value and fire change.
    pub fn change(&mut self, name: &str, value: impl Into<ControlValue>) -> Result<EventOutcome> {
        self.get_control_mut(name)?.set_element_value(value);
        self.handle_event(name, ControlEvent::Change)
    }

    /// Pick a month/year sub-field and fire change on the composite.
    pub fn select_sub_value(
        &mut self,
        name: &str,
        part: &str,
        value: impl Into<String>,
    ) -> Result<EventOutcome> {
        if !self.get_control_mut(name)?.set_sub_value(part, value) {
            return Err(FormworkError::Message(format!(
                "control {name} has no sub-field {part}"
            )));
        }
        self.handle_event(name, ControlEvent::Change)
    }

    /// Update every control and hand back the model when the form is
    /// error-free and enabled. Guards against double submission until
    /// `submission_failed` or `submission_succeeded`.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.submitted {
            tracing::debug!("submission already in progress");
            return SubmitOutcome::AlreadySubmitted;
        }
        self.validate_all_controls(&ValidateOptions {
            update: true,
            ..Default::default()
        });
        if !self.state.has_no_errors || self.state.disabled {
            tracing::debug!(
                has_no_errors = self.state.has_no_errors,
                disabled = self.state.disabled,
                "submission blocked"
            );
            return SubmitOutcome::Blocked;
        }
        self.submitted = true;
        self.state.error = None;
        tracing::info!(model = self.model.name().unwrap_or(""), "form submitted");
        SubmitOutcome::Submitted(self.model.to_json())
    }

    pub fn submission_failed(&mut self, message: Option<String>) {
        tracing::warn!(message = message.as_deref().unwrap_or(""), "submission failed");
        self.submitted = false;
        self.state.error = message;
        self.state.disable_form();
    }

    /// The saved model becomes the new clean state.
    pub fn submission_succeeded(&mut self) {
        self.submitted = false;
        self.clean = self.model.snapshot();
        self.state.initial_values = true;
    }

    /// Throw away every edit since the last clean state.
    pub fn cancel(&mut self) {
        self.model.restore(self.clean.clone());
        self.state.dirty = self.model.shadow();
        self.state.initial_values = true;
        self.state.error = None;
        self.submitted = false;
    }

    pub fn run_deferred(&mut self) {
        for control in &mut self.controls {
            control.run_deferred();
        }
    }

    /// Render every control, one per line.
    pub fn render(&self, renderer: &dyn ControlRenderer) -> String {
        self.controls
            .iter()
            .map(|control| control.render(renderer))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.controls.iter().position(|control| control.name() == name)
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| FormworkError::UnknownControl(name.to_string()))
    }

    fn control_scope(&mut self, index: usize) -> (&mut Control, ControlScope<'_>) {
        (
            &mut self.controls[index],
            ControlScope::in_form(&mut self.model, &mut self.state),
        )
    }

    fn validate_all(&mut self, options: &ValidateOptions) {
        let mut options = ValidateOptions {
            norevalidation: true,
            ..options.clone()
        };
        if options.update {
            options.force_display = true;
        }
        let mut has_no_errors = true;
        for control in &mut self.controls {
            let mut scope = ControlScope::in_form(&mut self.model, &mut self.state);
            if options.update {
                control.update_control(ControlInput::FromElement, &options, &mut scope);
            } else if options.validate {
                let value = control.get_value();
                control.validate_control(value, &options, &mut scope);
            }
            if control.has_error() {
                has_no_errors = false;
            }
        }
        self.state.has_no_errors = has_no_errors;
        self.state.enable_form(has_no_errors, false);
        tracing::debug!(
            has_no_errors,
            disabled = self.state.disabled,
            "validated all controls"
        );
    }

    /// Act on queued notices until none remain. Notices posted while
    /// handling a round form the next round.
    fn drain_notices(&mut self) {
        for _ in 0..MAX_CASCADE_DEPTH {
            let notices = self.state.take_notices();
            if notices.is_empty() {
                return;
            }
            let mut revalidate = false;
            for notice in notices {
                match notice {
                    ParentNotice::Revalidate => revalidate = true,
                    ParentNotice::InstantValidate { target, prompted } => {
                        self.prompt_instant_validation(&target, prompted);
                    }
                    ParentNotice::SecurityCode { target, length } => match self.position(&target) {
                        Some(index) => self.controls[index].set_security_code_length(length),
                        None => tracing::debug!(control = %target, "no security code control"),
                    },
                }
            }
            if revalidate {
                self.validate_all(&ValidateOptions::new());
            }
        }
        let dropped = self.state.take_notices();
        if !dropped.is_empty() {
            tracing::warn!(
                depth = MAX_CASCADE_DEPTH,
                dropped = dropped.len(),
                "notice cascade limit reached"
            );
        }
    }

    fn prompt_instant_validation(&mut self, target: &str, prompted: bool) {
        let Some(index) = self.position(target) else {
            tracing::debug!(control = target, "no control to validate");
            return;
        };
        let options = ValidateOptions {
            prompted,
            ..Default::default()
        };
        let (control, mut scope) = self.control_scope(index);
        let value = control.get_value();
        control.instant_validate_control(value, &options, &mut scope);
    }
}
