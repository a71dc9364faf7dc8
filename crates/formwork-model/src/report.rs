//! Per-control error report.

use serde::Serialize;

use crate::options::{ErrorOptions, StackMethod};

/// Accumulated outcome of one validation pass.
///
/// `has_error` is the only thing the parent form looks at. The display stack
/// holds the codes that should actually be shown, which can be empty while
/// `has_error` is set (suppressed errors still block submission).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    error: bool,
    flag: bool,
    had_error: bool,
    display_stack: Vec<String>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new pass, remembering whether the previous one had an error.
    pub fn start(&mut self) {
        self.had_error = self.error;
        self.error = false;
        self.flag = false;
        self.display_stack.clear();
    }

    pub fn add(&mut self, code: impl Into<String>, options: ErrorOptions) {
        self.error = true;
        let display = options.force_display || options.display != Some(false);
        if options.flag {
            self.flag = true;
        } else if display {
            self.flag = true;
            let code = code.into();
            match options.method {
                StackMethod::Push => self.display_stack.push(code),
                StackMethod::Unshift => self.display_stack.insert(0, code),
            }
        }
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Whether the visual error indicator should be raised.
    pub fn flagged(&self) -> bool {
        self.flag
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn display_codes(&self) -> &[String] {
        &self.display_stack
    }

    pub fn has_display_errors(&self) -> bool {
        !self.display_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_errors_still_count() {
        let mut report = ErrorReport::new();
        report.add("required", ErrorOptions::hidden());
        assert!(report.has_error());
        assert!(!report.flagged());
        assert!(report.display_codes().is_empty());
    }

    #[test]
    fn force_display_overrides_hidden() {
        let mut report = ErrorReport::new();
        report.add(
            "required",
            ErrorOptions {
                display: Some(false),
                force_display: true,
                ..Default::default()
            },
        );
        assert_eq!(report.display_codes(), ["required"]);
    }

    #[test]
    fn flag_raises_indicator_without_stacking() {
        let mut report = ErrorReport::new();
        report.add(
            "server",
            ErrorOptions {
                flag: true,
                ..Default::default()
            },
        );
        assert!(report.flagged());
        assert!(report.display_codes().is_empty());
    }

    #[test]
    fn start_remembers_previous_error() {
        let mut report = ErrorReport::new();
        report.add("a", ErrorOptions::default());
        report.add(
            "b",
            ErrorOptions {
                method: StackMethod::Unshift,
                ..Default::default()
            },
        );
        assert_eq!(report.display_codes(), ["b", "a"]);
        report.start();
        assert!(report.had_error());
        assert!(!report.has_error());
        assert!(report.display_codes().is_empty());
    }
}
