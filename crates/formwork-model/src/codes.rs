//! Validation outcome codes.
//!
//! Codes double as phrase keys: the display layer looks them up under
//! `{phrasekey}.error.{code}` and `control.error.{code}`.

use crate::schema::Primitive;

pub const REQUIRED: &str = "required";

pub const NUMBER_NOT_A_NUMBER: &str = "number.not-a-number";
pub const INTEGER_NOT_A_NUMBER: &str = "integer.not-a-number";
pub const INTEGER_NOT_AN_INTEGER: &str = "integer.not-an-integer";

pub const EMAIL_NO_AT_SYMBOL: &str = "email.no-at-symbol";
pub const EMAIL_INVALID: &str = "email.invalid";

pub const DATE_INVALID: &str = "date.invalid";

pub const PASSWORD_OLD_REQUIRED: &str = "password.old-password-required";
pub const PASSWORD_NO_CONFIRMATION: &str = "password.no-confirmation";
pub const PASSWORD_MISMATCH: &str = "password.passwords-do-not-match";

pub const CARD_UNDEFINED_TYPE: &str = "payment-card.undefined-card-type";
pub const CARD_INVALID_TYPE: &str = "payment-card.invalid-card-type";
pub const CARD_INVALID_LENGTH: &str = "payment-card.invalid-length";
pub const CARD_INVALID_LUHN: &str = "payment-card.invalid-luhn";

/// Numeric constraint violations, prefixed by the control's primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    NotMultipleOf,
    MoreThanMaximum,
    MoreThanExclusiveMaximum,
    LessThanMinimum,
    LessThanExclusiveMinimum,
    MaxLength,
    MinLength,
}

impl Constraint {
    fn suffix(&self) -> &'static str {
        match self {
            Self::NotMultipleOf => "not-multiple-of",
            Self::MoreThanMaximum => "more-than-maximum",
            Self::MoreThanExclusiveMaximum => "more-than-exclusive-maximum",
            Self::LessThanMinimum => "less-than-minimum",
            Self::LessThanExclusiveMinimum => "less-than-exclusive-minimum",
            Self::MaxLength => "maxlength",
            Self::MinLength => "minlength",
        }
    }

    pub fn code(&self, primitive: Primitive) -> String {
        format!("{}.{}", primitive.as_str(), self.suffix())
    }
}

/// `date.before` / `date.after`.
pub fn date_bound(direction: &str) -> String {
    format!("date.{direction}")
}

/// `month-year.invalid-past` / `month-year.invalid-future`.
pub fn month_year_invalid(exclusion: &str) -> String {
    format!("month-year.invalid-{exclusion}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_codes_carry_primitive() {
        assert_eq!(
            Constraint::NotMultipleOf.code(Primitive::Integer),
            "integer.not-multiple-of"
        );
        assert_eq!(Constraint::MaxLength.code(Primitive::Number), "number.maxlength");
        assert_eq!(month_year_invalid("past"), "month-year.invalid-past");
    }
}
