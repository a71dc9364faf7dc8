//! What a rule can see and touch while it runs.

use formwork_model::{
    Clock, ControlAttributes, ControlOptions, ControlValue, DeferredUpdate, ElementState,
    ErrorOptions, ErrorReport, MemoryModel, ParentNotice, ParentState, PhraseLookup, Phrasebook,
    Primitive, PropertySchema, ValidateOptions, ValueAttribute,
};

/// Borrowed control state handed to prepare rules.
pub struct PrepareContext<'a> {
    pub name: &'a str,
    pub primitive: Primitive,
    /// False in display mode.
    pub edit: bool,
    pub phrasekey: &'a str,
    pub phrases: &'a dyn Phrasebook,
    pub controloptions: &'a mut ControlOptions,
    /// Instance options not claimed by the control itself.
    pub instance: &'a ControlOptions,
    pub attributes: &'a mut ControlAttributes,
    pub clock: &'a dyn Clock,
}

impl PrepareContext<'_> {
    pub fn phrase(&self, lookup: &PhraseLookup) -> Option<String> {
        self.phrases.get(lookup)
    }

    /// Lookup under the control's phrase key with one appended segment.
    pub fn own_phrase(&self, append: &str) -> Option<String> {
        self.phrase(&PhraseLookup::new(self.phrasekey).append(append))
    }
}

/// Borrowed control state handed to normalize and validate rules.
pub struct RuleContext<'a> {
    pub name: &'a str,
    pub primitive: Primitive,
    pub schema: &'a PropertySchema,
    pub controloptions: &'a ControlOptions,
    pub attributes: &'a ControlAttributes,
    pub value_attribute: ValueAttribute,
    pub options: &'a ValidateOptions,
    pub report: &'a mut ErrorReport,
    pub element: Option<&'a mut ElementState>,
    /// The shared model the control commits to.
    pub model: &'a mut MemoryModel,
    pub parent: Option<&'a mut ParentState>,
    pub deferred: &'a mut Vec<DeferredUpdate>,
    pub clock: &'a dyn Clock,
}

impl RuleContext<'_> {
    pub fn add_error(&mut self, code: impl Into<String>, options: ErrorOptions) {
        let code = code.into();
        tracing::trace!(control = self.name, %code, "validation error");
        self.report.add(code, options);
    }

    /// The control's last committed value.
    pub fn committed(&self) -> ControlValue {
        self.attributes.get(self.value_attribute)
    }

    /// Error options that hide the error during an instant pass on a
    /// control that has never held a value.
    pub fn instant_error_options(&self) -> ErrorOptions {
        if self.options.instant_validate && !self.attributes.value.is_truthy() {
            ErrorOptions::hidden()
        } else {
            ErrorOptions::default()
        }
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn parent_mut(&mut self) -> Option<&mut ParentState> {
        self.parent.as_deref_mut()
    }

    /// Post a notice to the parent form. Returns false without a parent.
    pub fn post(&mut self, notice: ParentNotice) -> bool {
        match self.parent.as_deref_mut() {
            Some(parent) => {
                parent.post(notice);
                true
            }
            None => false,
        }
    }

    pub fn element_mut(&mut self) -> Option<&mut ElementState> {
        self.element.as_deref_mut()
    }

    /// Queue an element update for the next deferred run. A pending update
    /// of the same kind is replaced, so only the latest one is applied.
    pub fn defer(&mut self, update: DeferredUpdate) {
        let kind = std::mem::discriminant(&update);
        self.deferred.retain(|pending| std::mem::discriminant(pending) != kind);
        self.deferred.push(update);
    }
}
