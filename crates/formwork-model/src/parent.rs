//! State a form coordinator shares with its controls.

use serde::Serialize;

use crate::store::MemoryModel;

/// Requests a control posts for its parent form to act on once the
/// control's current operation has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "notice", rename_all = "kebab-case")]
pub enum ParentNotice {
    /// Recompute `has_no_errors` over every control.
    Revalidate,
    /// Run instant validation on a sibling using its current value.
    InstantValidate { target: String, prompted: bool },
    /// Resize the sibling security-code control.
    SecurityCode { target: String, length: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParentState {
    pub has_no_errors: bool,
    /// True until some control's value diverges from the model.
    pub initial_values: bool,
    /// Whether submission is blocked.
    pub disabled: bool,
    /// Shadow of the model holding every attempted value, valid or not.
    pub dirty: MemoryModel,
    pub show_additional: bool,
    /// Form-level message, e.g. from a failed submission.
    pub error: Option<String>,
    notices: Vec<ParentNotice>,
}

impl ParentState {
    pub fn new(dirty: MemoryModel) -> Self {
        Self {
            has_no_errors: true,
            initial_values: true,
            disabled: false,
            dirty,
            show_additional: false,
            error: None,
            notices: Vec::new(),
        }
    }

    /// Disabled unless `enable`; a pristine form stays disabled unless forced.
    pub fn enable_form(&mut self, enable: bool, force: bool) {
        self.disabled = !enable || (self.initial_values && !force);
    }

    pub fn disable_form(&mut self) {
        self.enable_form(false, false);
    }

    pub fn post(&mut self, notice: ParentNotice) {
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<ParentNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn has_pending_notices(&self) -> bool {
        !self.notices.is_empty()
    }
}
