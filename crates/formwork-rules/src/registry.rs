//! Rule registry keyed by kind, method and type name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use formwork_model::{ClientDefaults, ControlValue, Primitive, TypeDefaults};

use crate::context::{PrepareContext, RuleContext};

/// Which part of a control's type a rule is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Primitive,
    Format,
    ControlType,
}

impl Kind {
    /// Dispatch order for prepare, normalize and validate.
    pub const ALL: [Kind; 3] = [Kind::Primitive, Kind::Format, Kind::ControlType];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Format => "format",
            Self::ControlType => "controltype",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle slot a rule fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    /// Typed defaults merged into the control's settings.
    Initialize,
    /// One-off transformation of the render description.
    Prepare,
    /// Raw value to canonical value, on every commit attempt.
    Normalize,
    /// Appends to the error report after normalization.
    Validate,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Prepare => "prepare",
            Self::Normalize => "normalize",
            Self::Validate => "validate",
        }
    }
}

pub type PrepareFn = Arc<dyn Fn(&mut PrepareContext<'_>) + Send + Sync>;
pub type NormalizeFn = Arc<dyn Fn(ControlValue, &mut RuleContext<'_>) -> ControlValue + Send + Sync>;
pub type ValidateFn = Arc<dyn Fn(&ControlValue, &mut RuleContext<'_>) + Send + Sync>;

/// A registered rule. The variant decides the method slot.
#[derive(Clone)]
pub enum Rule {
    Initialize(TypeDefaults),
    Prepare(PrepareFn),
    Normalize(NormalizeFn),
    Validate(ValidateFn),
}

impl Rule {
    pub fn method(&self) -> Method {
        match self {
            Self::Initialize(_) => Method::Initialize,
            Self::Prepare(_) => Method::Prepare,
            Self::Normalize(_) => Method::Normalize,
            Self::Validate(_) => Method::Validate,
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialize(defaults) => f.debug_tuple("Initialize").field(defaults).finish(),
            other => write!(f, "{}(..)", other.method().as_str()),
        }
    }
}

/// Every slot a single type may fill, registered in one go.
#[derive(Clone, Default)]
pub struct TypeRules {
    initialize: Option<TypeDefaults>,
    prepare: Option<PrepareFn>,
    normalize: Option<NormalizeFn>,
    validate: Option<ValidateFn>,
}

impl TypeRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(mut self, defaults: TypeDefaults) -> Self {
        self.initialize = Some(defaults);
        self
    }

    pub fn prepare(mut self, f: impl Fn(&mut PrepareContext<'_>) + Send + Sync + 'static) -> Self {
        self.prepare = Some(Arc::new(f));
        self
    }

    pub fn normalize(
        mut self,
        f: impl Fn(ControlValue, &mut RuleContext<'_>) -> ControlValue + Send + Sync + 'static,
    ) -> Self {
        self.normalize = Some(Arc::new(f));
        self
    }

    pub fn validate(
        mut self,
        f: impl Fn(&ControlValue, &mut RuleContext<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Arc::new(f));
        self
    }

    fn into_rules(self) -> impl Iterator<Item = Rule> {
        [
            self.initialize.map(Rule::Initialize),
            self.prepare.map(Rule::Prepare),
            self.normalize.map(Rule::Normalize),
            self.validate.map(Rule::Validate),
        ]
        .into_iter()
        .flatten()
    }
}

/// The prepare, normalize and validate chains of one control, in
/// primitive, format, controltype order.
#[derive(Clone, Default)]
pub struct ResolvedRules {
    prepare: Vec<PrepareFn>,
    normalize: Vec<NormalizeFn>,
    validate: Vec<ValidateFn>,
}

impl ResolvedRules {
    pub fn prepare(&self) -> &[PrepareFn] {
        &self.prepare
    }

    pub fn normalize(&self) -> &[NormalizeFn] {
        &self.normalize
    }

    pub fn validate(&self) -> &[ValidateFn] {
        &self.validate
    }
}

impl fmt::Debug for ResolvedRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRules")
            .field("prepare", &self.prepare.len())
            .field("normalize", &self.normalize.len())
            .field("validate", &self.validate.len())
            .finish()
    }
}

/// Registry of rules indexed by (kind, method, type name).
///
/// Built once at startup and then shared immutably behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<(Kind, Method, String), Rule>,
}

impl RuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in rule set.
    pub fn with_defaults(defaults: &ClientDefaults) -> Self {
        let mut registry = Self::new();
        crate::rules::register_builtins(&mut registry, defaults);
        registry
    }

    /// Register a rule. A later registration for the same slot replaces
    /// the earlier one.
    pub fn register(&mut self, kind: Kind, name: impl Into<String>, rule: Rule) {
        let name = name.into();
        let method = rule.method();
        if self
            .rules
            .insert((kind, method, name.clone()), rule)
            .is_some()
        {
            tracing::trace!(%kind, method = method.as_str(), %name, "replaced rule");
        }
    }

    /// Register every populated slot of a type.
    pub fn register_type(&mut self, kind: Kind, name: &str, rules: TypeRules) {
        for rule in rules.into_rules() {
            self.register(kind, name, rule);
        }
    }

    pub fn lookup(&self, kind: Kind, method: Method, name: &str) -> Option<&Rule> {
        self.rules.get(&(kind, method, name.to_string()))
    }

    pub fn initialize(&self, kind: Kind, name: &str) -> Option<&TypeDefaults> {
        match self.lookup(kind, Method::Initialize, name)? {
            Rule::Initialize(defaults) => Some(defaults),
            _ => None,
        }
    }

    /// Names with at least one rule of the given kind, sorted.
    pub fn type_names(&self, kind: Kind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .rules
            .keys()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, _, name)| name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Methods registered for one type, in lifecycle order.
    pub fn methods(&self, kind: Kind, name: &str) -> Vec<Method> {
        [
            Method::Initialize,
            Method::Prepare,
            Method::Normalize,
            Method::Validate,
        ]
        .into_iter()
        .filter(|method| self.lookup(kind, *method, name).is_some())
        .collect()
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve the chains for a control's primitive, format and controltype.
    pub fn resolve(
        &self,
        primitive: Primitive,
        format: Option<&str>,
        controltype: &str,
    ) -> ResolvedRules {
        let mut resolved = ResolvedRules::default();
        for kind in Kind::ALL {
            let name = match kind {
                Kind::Primitive => Some(primitive.as_str()),
                Kind::Format => format,
                Kind::ControlType => Some(controltype),
            };
            let Some(name) = name else {
                continue;
            };
            if let Some(Rule::Prepare(f)) = self.lookup(kind, Method::Prepare, name) {
                resolved.prepare.push(Arc::clone(f));
            }
            if let Some(Rule::Normalize(f)) = self.lookup(kind, Method::Normalize, name) {
                resolved.normalize.push(Arc::clone(f));
            }
            if let Some(Rule::Validate(f)) = self.lookup(kind, Method::Validate, name) {
                resolved.validate.push(Arc::clone(f));
            }
        }
        tracing::debug!(
            primitive = primitive.as_str(),
            format = format.unwrap_or(""),
            controltype,
            ?resolved,
            "resolved control rules"
        );
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_registration_wins() {
        let mut registry = RuleRegistry::new();
        registry.register(
            Kind::Format,
            "code",
            Rule::Initialize(TypeDefaults::default().instant_validation(true)),
        );
        registry.register(
            Kind::Format,
            "code",
            Rule::Initialize(TypeDefaults::default().instant_validation(false)),
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry
                .initialize(Kind::Format, "code")
                .and_then(|d| d.instant_validation),
            Some(false)
        );
    }

    #[test]
    fn register_type_fills_each_slot() {
        let mut registry = RuleRegistry::new();
        registry.register_type(
            Kind::ControlType,
            "upper",
            TypeRules::new()
                .normalize(|value, _| match value {
                    ControlValue::Text(text) => ControlValue::Text(text.to_uppercase()),
                    other => other,
                })
                .validate(|_, _| {}),
        );
        assert_eq!(
            registry.methods(Kind::ControlType, "upper"),
            vec![Method::Normalize, Method::Validate]
        );
        assert!(
            registry
                .lookup(Kind::ControlType, Method::Prepare, "upper")
                .is_none()
        );
        assert_eq!(registry.type_names(Kind::ControlType), vec!["upper"]);
        assert!(registry.type_names(Kind::Format).is_empty());
    }

    #[test]
    fn resolve_orders_chains_by_kind() {
        let registry = RuleRegistry::with_defaults(&ClientDefaults::default());
        let resolved = registry.resolve(Primitive::Integer, Some("payment-card"), "text");
        assert_eq!(resolved.normalize().len(), 2);
        assert_eq!(resolved.validate().len(), 2);
        assert!(resolved.prepare().is_empty());
    }
}
