//! `number` and `integer` primitives.

use formwork_model::codes::{self, Constraint};
use formwork_model::{ControlValue, ErrorOptions, TypeDefaults};

use crate::context::RuleContext;
use crate::registry::{Kind, RuleRegistry, TypeRules};

pub fn register(registry: &mut RuleRegistry) {
    let defaults = TypeDefaults::default().instant_validation(true);
    registry.register_type(
        Kind::Primitive,
        "number",
        TypeRules::new()
            .initialize(defaults.clone().restrict_input("number"))
            .normalize(|value, _| normalize_number(value))
            .validate(validate_number),
    );
    registry.register_type(
        Kind::Primitive,
        "integer",
        TypeRules::new()
            .initialize(defaults.restrict_input("integer"))
            .normalize(|value, _| normalize_number(value))
            .validate(validate_integer),
    );
}

/// Coerce numeric-like input to a number.
///
/// Falsy values (other than the number zero) become absent, `true` becomes
/// one, anything that does not parse passes through untouched.
pub fn normalize_number(value: ControlValue) -> ControlValue {
    match value {
        ControlValue::Number(_) => value,
        _ if !value.is_truthy() => ControlValue::Absent,
        ControlValue::Bool(true) => ControlValue::Number(1.0),
        ControlValue::Text(ref text) => match parse_numeric(text) {
            Some(number) => ControlValue::Number(number),
            None => value,
        },
        other => other,
    }
}

fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return i64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }
    // Reject forms Rust accepts but form input should not, like "inf" or "nan".
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn validate_number(value: &ControlValue, ctx: &mut RuleContext<'_>) {
    if value.is_truthy() && value.as_number().is_none() {
        ctx.add_error(codes::NUMBER_NOT_A_NUMBER, ErrorOptions::default());
    }
    validate_constraints(value, ctx);
}

fn validate_integer(value: &ControlValue, ctx: &mut RuleContext<'_>) {
    match value.as_number() {
        None => ctx.add_error(codes::INTEGER_NOT_A_NUMBER, ErrorOptions::default()),
        Some(number) if number.trunc() != number => {
            ctx.add_error(codes::INTEGER_NOT_AN_INTEGER, ErrorOptions::default())
        }
        Some(_) => {}
    }
    validate_constraints(value, ctx);
}

/// Shared numeric constraints: multipleOf, one bound family, then length.
fn validate_constraints(value: &ControlValue, ctx: &mut RuleContext<'_>) {
    let primitive = ctx.primitive;
    let schema = ctx.schema;
    let number = value.as_number();

    if let Some(step) = schema.multiple_of.filter(|step| *step != 0.0) {
        let quotient = number.unwrap_or(f64::NAN) / step;
        if quotient.is_nan() || quotient.trunc() != quotient {
            ctx.add_error(Constraint::NotMultipleOf.code(primitive), ErrorOptions::default());
        }
    }

    // Only one bound family applies: maximum wins when both are set.
    if let Some(number) = number {
        if let Some(maximum) = schema.maximum {
            if schema.exclusive_maximum {
                if number >= maximum {
                    ctx.add_error(
                        Constraint::MoreThanExclusiveMaximum.code(primitive),
                        ErrorOptions::default(),
                    );
                }
            } else if number > maximum {
                ctx.add_error(
                    Constraint::MoreThanMaximum.code(primitive),
                    ErrorOptions::default(),
                );
            }
        } else if let Some(minimum) = schema.minimum {
            if schema.exclusive_minimum {
                if number <= minimum {
                    ctx.add_error(
                        Constraint::LessThanExclusiveMinimum.code(primitive),
                        ErrorOptions::default(),
                    );
                }
            } else if number < minimum {
                ctx.add_error(
                    Constraint::LessThanMinimum.code(primitive),
                    ErrorOptions::default(),
                );
            }
        }
    }

    let mut length_options = ctx.options.error_options();
    if ctx.options.display.is_none() && !ctx.committed().is_truthy() {
        length_options.display = Some(false);
    }
    let length = value.render().chars().count();
    if let Some(max_length) = schema.effective_max_length()
        && length > max_length
    {
        ctx.add_error(Constraint::MaxLength.code(primitive), length_options);
    }
    if let Some(min_length) = schema.effective_min_length()
        && length < min_length
    {
        ctx.add_error(Constraint::MinLength.code(primitive), length_options);
    }
}
