//! Month/year composite controls.

use std::fmt;

use serde::Serialize;

/// Direction of months that may not be picked in the current year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Exclusion {
    /// Months before the current one (forward windows such as expiry).
    Past,
    /// Months after the current one (backward windows such as start date).
    Future,
}

impl Exclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Future => "future",
        }
    }

    /// Whether `month` falls on the excluded side of `current_month`.
    pub fn excludes(&self, current_month: u32, month: u32) -> bool {
        match self {
            Self::Future => current_month < month,
            Self::Past => current_month > month,
        }
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable entry of a sub-field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub content: String,
}

/// A named sub-select of a composite control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubField {
    pub name: String,
    pub options: Vec<SelectOption>,
    /// Currently selected value, if any.
    pub selected: Option<String>,
}

impl SubField {
    pub fn select(&mut self, value: impl Into<String>) {
        self.selected = Some(value.into());
    }

    pub fn selected_number<T: std::str::FromStr>(&self) -> Option<T> {
        self.selected
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .and_then(|value| value.parse().ok())
    }
}

/// Render description and selection state of a month/year control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthYearState {
    pub month: SubField,
    pub year: SubField,
    pub current_month: u32,
    pub current_year: i32,
    pub exclude: Option<Exclusion>,
}

impl MonthYearState {
    pub fn selected_month(&self) -> Option<u32> {
        self.month.selected_number()
    }

    pub fn selected_year(&self) -> Option<i32> {
        self.year.selected_number()
    }

    /// Select a sub-field by its suffix (`month` or `year`). Returns false
    /// for an unknown suffix.
    pub fn select(&mut self, part: &str, value: impl Into<String>) -> bool {
        match part {
            "month" => self.month.select(value),
            "year" => self.year.select(value),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusion_directions() {
        assert!(Exclusion::Past.excludes(6, 5));
        assert!(!Exclusion::Past.excludes(6, 6));
        assert!(Exclusion::Future.excludes(6, 7));
        assert!(!Exclusion::Future.excludes(6, 1));
    }

    #[test]
    fn selected_numbers_parse_padded_values() {
        let mut field = SubField::default();
        assert_eq!(field.selected_number::<u32>(), None);
        field.select("07");
        assert_eq!(field.selected_number::<u32>(), Some(7));
    }
}
