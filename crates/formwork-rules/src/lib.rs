//! Rule registry and built-in normalization/validation rules.
//!
//! Rules attach to one of three kinds (primitive, format, controltype) and
//! fill one of four lifecycle slots. A control resolves its chains once at
//! construction and runs them in primitive, format, controltype order.

pub mod context;
pub mod registry;
pub mod rules;

pub use context::{PrepareContext, RuleContext};
pub use registry::{
    Kind, Method, NormalizeFn, PrepareFn, ResolvedRules, Rule, RuleRegistry, TypeRules,
    ValidateFn,
};
pub use rules::payment_card::{CardType, card_type, luhn_valid};
