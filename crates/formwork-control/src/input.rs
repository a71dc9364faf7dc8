//! Host events and keystroke filtering.

/// Events a host forwards to a control inside a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Change,
    Keyup,
    Keydown { alt: bool },
    Keypress(char),
}

pub fn is_enter(key: char) -> bool {
    key == '\r' || key == '\n'
}

/// Keystroke filter families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFilter {
    Integer,
    Number,
    PaymentCard,
}

impl InputFilter {
    pub fn parse(family: &str) -> Option<Self> {
        match family {
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "payment-card" => Some(Self::PaymentCard),
            _ => None,
        }
    }

    /// Alt-modified keys are blocked for every filtered family.
    pub fn accepts_keydown(self, alt: bool) -> bool {
        !alt
    }

    /// Digits and Enter always pass. `current` is the text already entered.
    pub fn accepts_char(self, key: char, current: &str) -> bool {
        if key.is_ascii_digit() || is_enter(key) {
            return true;
        }
        match self {
            Self::Integer => false,
            Self::Number => key == '.' && !current.contains('.'),
            Self::PaymentCard => key == ' ' || key == '-',
        }
    }
}
