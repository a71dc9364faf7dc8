//! Control state machine and the parent form that coordinates controls.
//!
//! A [`Control`] owns one field's configuration, resolved rule chains and
//! error report. A [`Form`] owns the shared model, the controls and the
//! submit state, and drains the notices controls post to it.

pub mod config;
pub mod control;
pub mod env;
pub mod form;
pub mod input;
pub mod render;

pub use config::{CONTROL_OPTION_PREFIX, ControlConfig, ControlSettings};
pub use control::{Control, ControlInput};
pub use env::{ControlEnv, ControlScope};
pub use form::{EventOutcome, Form, FormDefinition, MAX_CASCADE_DEPTH, SubmitOutcome};
pub use input::{ControlEvent, InputFilter};
pub use render::{ControlRenderer, TemplateSet};
