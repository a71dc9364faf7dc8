//! Month/year composite controltypes for card start and expiry dates.

use chrono::{Datelike, NaiveDate};
use formwork_model::{
    ControlOptions, ControlValue, Exclusion, MonthYearState, SelectOption, SubField, codes,
};

use crate::context::{PrepareContext, RuleContext};
use crate::registry::{Kind, RuleRegistry, TypeRules};
use crate::rules::date;

/// Year window configuration. Any key present in the control's options
/// overrides the type's own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowOptions {
    pub years: i64,
    pub years_before: i64,
    pub years_after: i64,
    pub year_offset: i64,
    pub reverse: bool,
}

impl WindowOptions {
    pub const EXPIRY: Self = Self {
        years: 20,
        years_before: 0,
        years_after: 0,
        year_offset: 0,
        reverse: false,
    };

    pub const START: Self = Self {
        years: -10,
        years_before: 0,
        years_after: 0,
        year_offset: 0,
        reverse: true,
    };

    pub fn overlay(mut self, options: &ControlOptions) -> Self {
        if let Some(years) = options.get_i64("years") {
            self.years = years;
        }
        if let Some(before) = options.get_i64("yearsbefore") {
            self.years_before = before;
        }
        if let Some(after) = options.get_i64("yearsafter") {
            self.years_after = after;
        }
        if let Some(offset) = options.get_i64("yearoffset") {
            self.year_offset = offset;
        }
        if options.get("reverse").is_some() {
            self.reverse = options.get_bool("reverse");
        }
        self
    }

    /// Years on offer and the month direction excluded in the current year.
    ///
    /// A forward window starts at the current year and excludes past
    /// months. A backward window (negative `years` or any `yearsbefore`)
    /// ends at the current year and excludes future months unless it also
    /// reaches forward.
    pub fn years(&self, current_year: i32) -> (Vec<i32>, Option<Exclusion>) {
        let mut before = self.years_before;
        let mut after = if self.years == 0 { 5 } else { self.years };
        if after < 0 {
            before = -after;
        }
        let exclude;
        if before != 0 {
            before = -before;
            after = self.years_after;
            exclude = (after == 0).then_some(Exclusion::Future);
            before += 1;
            after += 1;
        } else {
            exclude = Some(Exclusion::Past);
        }

        let current = i64::from(current_year);
        let mut years: Vec<i32> = (before..after)
            .filter_map(|offset| i32::try_from(current + offset).ok())
            .collect();
        if self.reverse {
            years.reverse();
        }
        (years, exclude)
    }
}

pub fn register(registry: &mut RuleRegistry) {
    for (name, window) in [
        ("payment-date-expiry", WindowOptions::EXPIRY),
        ("payment-date-start", WindowOptions::START),
    ] {
        registry.register_type(
            Kind::ControlType,
            name,
            TypeRules::new()
                .prepare(move |ctx| prepare_month_year(ctx, window))
                .normalize(normalize_month_year)
                .validate(validate_month_year),
        );
    }
}

fn prepare_month_year(ctx: &mut PrepareContext<'_>, window: WindowOptions) {
    let today = ctx.clock.today();
    let selected = ctx
        .attributes
        .value
        .as_str()
        .filter(|text| !text.is_empty())
        .and_then(|text| date::parse_date(text, today));

    if !ctx.edit {
        ctx.attributes.value = ControlValue::Text(
            selected
                .map(|value| value.format("%b %Y").to_string())
                .unwrap_or_default(),
        );
        return;
    }

    let reference = reference_date(ctx.controloptions).unwrap_or(today);
    let window = window.overlay(ctx.controloptions);
    let current_month = reference.month();
    let current_year = reference.year() - i32::try_from(window.year_offset).unwrap_or(0);
    let (years, exclude) = window.years(current_year);

    let month = SubField {
        name: format!("{}-month", ctx.name),
        options: (1..=12)
            .map(|month: u32| SelectOption {
                value: month.to_string(),
                content: format!("{month:02}"),
            })
            .collect(),
        selected: selected.map(|value| value.month().to_string()),
    };
    let year = SubField {
        name: format!("{}-year", ctx.name),
        options: years
            .iter()
            .map(|year| {
                let full = year.to_string();
                SelectOption {
                    content: full.get(2..).unwrap_or(&full).to_string(),
                    value: full,
                }
            })
            .collect(),
        selected: selected.map(|value| value.year().to_string()),
    };

    ctx.attributes.month_year = Some(MonthYearState {
        month,
        year,
        current_month,
        current_year,
        exclude,
    });
}

/// The window's "today", from the `date` option when it parses.
fn reference_date(options: &ControlOptions) -> Option<NaiveDate> {
    let text = options.get_str("date")?;
    match options.get_str("dateformat") {
        Some(format) => NaiveDate::parse_from_str(text, &date::moment_to_chrono(format)).ok(),
        None => date::parse_iso(text)
            .map(|value| value.date_naive())
            .or_else(|| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()),
    }
}

/// Compose the selected month and year into the first day of that month.
fn normalize_month_year(value: ControlValue, ctx: &mut RuleContext<'_>) -> ControlValue {
    let Some(state) = &ctx.attributes.month_year else {
        return value;
    };
    let (Some(month), Some(year)) = (state.selected_month(), state.selected_year()) else {
        return value;
    };
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(first) => ControlValue::Text(date::to_iso(first.and_time(chrono::NaiveTime::MIN).and_utc())),
        None => value,
    }
}

fn validate_month_year(_value: &ControlValue, ctx: &mut RuleContext<'_>) {
    let mut options = ctx.options.error_options();
    if ctx.options.rendered {
        options.display = Some(false);
    }
    let Some(state) = &ctx.attributes.month_year else {
        return;
    };
    let Some(exclude) = state.exclude else {
        return;
    };
    if state.selected_year() != Some(state.current_year) {
        return;
    }
    if let Some(month) = state.selected_month()
        && exclude.excludes(state.current_month, month)
    {
        ctx.add_error(codes::month_year_invalid(exclude.as_str()), options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_window_looks_forward() {
        let (years, exclude) = WindowOptions::EXPIRY.years(2024);
        assert_eq!(years.len(), 20);
        assert_eq!(years.first(), Some(&2024));
        assert_eq!(years.last(), Some(&2043));
        assert_eq!(exclude, Some(Exclusion::Past));
    }

    #[test]
    fn start_window_looks_back_in_reverse() {
        let (years, exclude) = WindowOptions::START.years(2024);
        assert_eq!(years, (2015..=2024).rev().collect::<Vec<_>>());
        assert_eq!(exclude, Some(Exclusion::Future));
    }

    #[test]
    fn two_sided_window_excludes_nothing() {
        let window = WindowOptions {
            years_before: 2,
            years_after: 2,
            ..Default::default()
        };
        let (years, exclude) = window.years(2024);
        assert_eq!(years, vec![2023, 2024, 2025, 2026]);
        assert_eq!(exclude, None);
    }

    #[test]
    fn options_override_type_defaults() {
        let options: ControlOptions =
            serde_json::from_str(r#"{"years": "3", "reverse": true}"#).expect("options");
        let (years, _) = WindowOptions::EXPIRY.overlay(&options).years(2024);
        assert_eq!(years, vec![2026, 2025, 2024]);
    }
}
