use std::sync::LazyLock;

use formwork_model::{ControlValue, TypeDefaults, codes};
use regex::Regex;

use crate::context::RuleContext;
use crate::registry::{Kind, RuleRegistry, TypeRules};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(([A-Z0-9_.\-])+\+)?([A-Z0-9_.\-])+@(([A-Z0-9\-])+\.)+[A-Z0-9]{2,6}$")
        .expect("Invalid email regex")
});

pub fn register(registry: &mut RuleRegistry) {
    registry.register_type(
        Kind::Format,
        "email",
        TypeRules::new()
            .initialize(TypeDefaults::default().instant_validation(true))
            .validate(validate_email),
    );
}

pub fn is_valid_email(address: &str) -> bool {
    EMAIL.is_match(address)
}

fn validate_email(value: &ControlValue, ctx: &mut RuleContext<'_>) {
    let options = ctx.instant_error_options();
    let address = value.render();
    if !address.contains('@') {
        ctx.add_error(codes::EMAIL_NO_AT_SYMBOL, options);
    } else if !is_valid_email(&address) {
        ctx.add_error(codes::EMAIL_INVALID, options);
    }
}
