//! Shared collaborators and the per-call scope a control operates in.

use std::fmt;
use std::sync::Arc;

use formwork_model::{
    ClientDefaults, Clock, MemoryModel, MemoryPhrasebook, ParentState, Phrasebook, SystemClock,
};
use formwork_rules::RuleRegistry;

/// Registry, phrases and clock shared by every control of a form.
#[derive(Clone)]
pub struct ControlEnv {
    registry: Arc<RuleRegistry>,
    phrases: Arc<dyn Phrasebook>,
    clock: Arc<dyn Clock>,
}

impl ControlEnv {
    pub fn new(
        registry: Arc<RuleRegistry>,
        phrases: Arc<dyn Phrasebook>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            phrases,
            clock,
        }
    }

    /// Built-in rules, no phrases, wall-clock time.
    pub fn with_defaults(defaults: &ClientDefaults) -> Self {
        Self::new(
            Arc::new(RuleRegistry::with_defaults(defaults)),
            Arc::new(MemoryPhrasebook::new()),
            Arc::new(SystemClock),
        )
    }

    pub fn with_phrases(mut self, phrases: Arc<dyn Phrasebook>) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn phrases(&self) -> &dyn Phrasebook {
        self.phrases.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

impl Default for ControlEnv {
    fn default() -> Self {
        Self::with_defaults(&ClientDefaults::default())
    }
}

impl fmt::Debug for ControlEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlEnv")
            .field("rules", &self.registry.len())
            .finish_non_exhaustive()
    }
}

/// The shared model a control commits to and, when it sits in a form, the
/// form's state.
pub struct ControlScope<'a> {
    pub model: &'a mut MemoryModel,
    pub parent: Option<&'a mut ParentState>,
}

impl<'a> ControlScope<'a> {
    pub fn standalone(model: &'a mut MemoryModel) -> Self {
        Self {
            model,
            parent: None,
        }
    }

    pub fn in_form(model: &'a mut MemoryModel, parent: &'a mut ParentState) -> Self {
        Self {
            model,
            parent: Some(parent),
        }
    }
}
