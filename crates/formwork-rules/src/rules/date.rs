//! Free-text `date` controltype.
//!
//! Input is reinterpreted into an unambiguous shape, parsed, and stored as an
//! ISO-8601 UTC timestamp with millisecond precision. The input element is
//! then rewritten to the configured display format on the next deferred run.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, SecondsFormat, Utc};
use formwork_model::{ControlValue, DeferredUpdate, ErrorOptions, TypeDefaults, codes};
use regex::{Captures, Regex};

use crate::context::{PrepareContext, RuleContext};
use crate::registry::{Kind, RuleRegistry, TypeRules};

pub const DEFAULT_FORMAT: &str = "D MMM YYYY";
pub const MONTH_YEAR_FORMAT: &str = "MMM YYYY";

static DIGIT_PAIRS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{2})$").expect("Invalid date regex"));
static DIGIT_TRIPLETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{2})(\d{2}|\d{4})$").expect("Invalid date regex"));
static TWO_GROUPS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(?:\s|\.|/)\s*(\d+)$").expect("Invalid date regex")
});
static THREE_GROUPS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(?:\s|\.|/)\s*(\d+)\s*(?:\s|\.|/)\s*(\d+)$").expect("Invalid date regex")
});
static COMPACT_MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{2}|\d{4})$").expect("Invalid date regex"));
static YEAR_THEN_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}|\d{1,2})\s*(?:\s|\.|/)\s*([A-Za-z]+)$").expect("Invalid date regex")
});
static WORD_THEN_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)\s*(?:\s|\.|/)\s*(\d{4}|\d{1,2})$").expect("Invalid date regex")
});
static MONTH_NAME_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)\.?\s*(?:\s|/|-)\s*(\d{4})$").expect("Invalid date regex")
});
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("Invalid date regex"));
static ISO_WITH_FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*T(\d{2}:)*\d{2}\.\d+Z?$").expect("Invalid date regex"));
static SHORT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{2}$").expect("Invalid date regex"));
static MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}/\d{1,2}$").expect("Invalid date regex"));
static RELATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(\w+)").expect("Invalid relative date regex"));

/// Formats tried, in order, once the input has been reinterpreted.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
    "%a %b %d %Y",
    "%A, %B %d, %Y",
];

pub fn register(registry: &mut RuleRegistry) {
    registry.register_type(
        Kind::ControlType,
        "date",
        TypeRules::new()
            .initialize(TypeDefaults::default().instant_validation(false))
            .prepare(prepare_date)
            .normalize(normalize_date)
            .validate(validate_date),
    );
}

fn is_month_year(options: &formwork_model::ControlOptions) -> bool {
    options.get_str("datetype") == Some("month-year")
}

fn prepare_date(ctx: &mut PrepareContext<'_>) {
    if is_month_year(ctx.controloptions) {
        ctx.controloptions.insert("format", MONTH_YEAR_FORMAT);
    }
    ctx.controloptions.insert_default("format", DEFAULT_FORMAT);
}

fn normalize_date(value: ControlValue, ctx: &mut RuleContext<'_>) -> ControlValue {
    let text = match value {
        ControlValue::Text(text) => text,
        other => return other,
    };
    let text = text.trim();
    if text.is_empty() {
        return ControlValue::text(text);
    }

    let reinterpreted = if is_month_year(ctx.controloptions) {
        reinterpret_month_year(text)
    } else {
        reinterpret(text)
    };

    let Some(parsed) = parse_date(&reinterpreted, ctx.clock.today()) else {
        tracing::trace!(control = ctx.name, input = text, "unparseable date");
        return ControlValue::text(reinterpreted);
    };

    let format = ctx
        .controloptions
        .get_str("format")
        .unwrap_or(DEFAULT_FORMAT);
    let display = parsed.format(&moment_to_chrono(format)).to_string();
    ctx.defer(DeferredUpdate::SetElementValue(display));
    ControlValue::Text(to_iso(parsed))
}

/// Priority-ordered reinterpretation of day-first numeric input into the
/// month-first slash shape the parser expects.
pub fn reinterpret(text: &str) -> String {
    let value = DIGIT_PAIRS.replace(text, "$1/$2").into_owned();
    let value = DIGIT_TRIPLETS.replace(&value, "$1/$2/$3").into_owned();
    let value = TWO_GROUPS
        .replace(&value, |caps: &Captures<'_>| {
            if day_and_month(&caps[1], &caps[2]) {
                format!("{}/{}", &caps[2], &caps[1])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned();
    THREE_GROUPS
        .replace(&value, |caps: &Captures<'_>| {
            if day_and_month(&caps[1], &caps[2]) {
                format!("{}/{}/{}", &caps[2], &caps[1], &caps[3])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn day_and_month(day: &str, month: &str) -> bool {
    numeric(day) <= 31 && numeric(month) <= 12
}

fn numeric(text: &str) -> u64 {
    text.parse().unwrap_or(u64::MAX)
}

/// Reinterpretation for month/year-only input. Every result names the first
/// day of the month.
pub fn reinterpret_month_year(text: &str) -> String {
    let value = COMPACT_MONTH_YEAR
        .replace(text, |caps: &Captures<'_>| {
            let (first, second) = (&caps[1], &caps[2]);
            if numeric(first) > 12 {
                // Year first: only unambiguous with a two-digit month after it.
                if second.len() == 2 {
                    format!("{}/01/{}", adjust_month(second), adjust_year(first))
                } else {
                    caps[0].to_string()
                }
            } else {
                format!("{}/01/{}", adjust_month(first), adjust_year(second))
            }
        })
        .into_owned();
    let value = TWO_GROUPS
        .replace(&value, |caps: &Captures<'_>| {
            if numeric(&caps[1]) > 12 {
                format!("{}/01/{}", adjust_month(&caps[2]), adjust_year(&caps[1]))
            } else {
                format!("{}/01/{}", adjust_month(&caps[1]), adjust_year(&caps[2]))
            }
        })
        .into_owned();
    let value = YEAR_THEN_WORD
        .replace(&value, |caps: &Captures<'_>| {
            format!("01 {} {}", &caps[2], adjust_year(&caps[1]))
        })
        .into_owned();
    WORD_THEN_YEAR
        .replace(&value, |caps: &Captures<'_>| {
            format!("01 {} {}", &caps[1], adjust_year(&caps[2]))
        })
        .into_owned()
}

fn adjust_month(month: &str) -> String {
    format!("{:02}", numeric(month))
}

fn adjust_year(year: &str) -> u64 {
    let year = numeric(year);
    if year < 100 { 2000 + year } else { year }
}

/// Parse reinterpreted input: ISO timestamps with a fractional second
/// first, then the permissive formats. Plain dates resolve to midnight UTC
/// and a month name with a year alone names the first of that month.
pub fn parse_date(text: &str, today: NaiveDate) -> Option<DateTime<Utc>> {
    if ISO_WITH_FRACTION.is_match(text)
        && let Some(parsed) = parse_iso(text)
    {
        return Some(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if SHORT_YEAR.is_match(text) {
        return NaiveDate::parse_from_str(text, "%m/%d/%y")
            .ok()
            .map(midnight);
    }
    if MONTH_DAY.is_match(text) {
        let with_year = format!("{text}/{}", today.year());
        return NaiveDate::parse_from_str(&with_year, "%m/%d/%Y")
            .ok()
            .map(midnight);
    }
    if let Some(caps) = MONTH_NAME_YEAR.captures(text) {
        let first_of_month = format!("1 {} {}", &caps[1], &caps[2]);
        return ["%d %b %Y", "%d %B %Y"]
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&first_of_month, format).ok())
            .map(midnight);
    }
    // Every remaining format has the day and the year as separate numbers.
    // With fewer, `%d` would take its digits out of the year.
    if DIGIT_RUN.find_iter(text).count() < 2 {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .map(midnight)
}

/// Strict ISO-8601 timestamp parse, as stored by the normalizer.
pub fn parse_iso(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn to_iso(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Translate a moment-style display format into a chrono format string.
pub fn moment_to_chrono(format: &str) -> String {
    const TOKENS: &[(&str, &str)] = &[
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("M", "%-m"),
        ("DD", "%d"),
        ("D", "%-d"),
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;
    'scan: while !rest.is_empty() {
        for (token, replacement) in TOKENS {
            if let Some(after) = rest.strip_prefix(token) {
                out.push_str(replacement);
                rest = after;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            if c == '%' {
                out.push_str("%%");
            } else {
                out.push(c);
            }
        }
        rest = chars.as_str();
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Before,
    After,
}

impl Bound {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

fn validate_date(value: &ControlValue, ctx: &mut RuleContext<'_>) {
    let Some(parsed) = value.as_str().and_then(parse_iso) else {
        ctx.add_error(codes::DATE_INVALID, ErrorOptions::default());
        return;
    };
    check_bound(ctx, Bound::Before, parsed);
    check_bound(ctx, Bound::After, parsed);
}

fn check_bound(ctx: &mut RuleContext<'_>, bound: Bound, value: DateTime<Utc>) {
    let direction = bound.as_str();
    let Some(when) = ctx.controloptions.get(direction) else {
        return;
    };
    let Some(when) = resolve_bound(when, bound, ctx.clock.now()) else {
        tracing::warn!(control = ctx.name, bound = direction, value = %when, "ignoring unresolvable date bound");
        return;
    };
    let violated = match bound {
        Bound::Before => value > when,
        Bound::After => value < when,
    };
    if violated {
        let code = ctx
            .controloptions
            .get_str(&format!("{direction}.error"))
            .map(str::to_string)
            .unwrap_or_else(|| codes::date_bound(direction));
        ctx.add_error(code, ErrorOptions::default());
    }
}

/// Absolute dates are taken as-is; relative ones (`3d`, `2w`, `6M`, `1y`)
/// count back from now for `before` and forward for `after`. Units are
/// case-sensitive: `M` is months and `m` is minutes.
fn resolve_bound(
    when: &serde_json::Value,
    bound: Bound,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let when = when.as_str()?.trim();
    if let Some(absolute) = parse_iso(when) {
        return Some(absolute);
    }
    if let Ok(date) = NaiveDate::parse_from_str(when, "%Y-%m-%d") {
        return Some(midnight(date));
    }
    let caps = RELATIVE.captures(when)?;
    let amount: u32 = caps[1].parse().ok()?;
    let offset = RelativeOffset::parse(&caps[2], amount)?;
    match bound {
        Bound::Before => offset.subtract_from(now),
        Bound::After => offset.add_to(now),
    }
}

#[derive(Debug, Clone, Copy)]
enum RelativeOffset {
    Duration(Duration),
    Months(u32),
}

impl RelativeOffset {
    fn parse(unit: &str, amount: u32) -> Option<Self> {
        let amount_i64 = i64::from(amount);
        let offset = match unit {
            "y" | "year" | "years" => Self::Months(amount.checked_mul(12)?),
            "M" | "month" | "months" => Self::Months(amount),
            "w" | "week" | "weeks" => Self::Duration(Duration::try_weeks(amount_i64)?),
            "d" | "day" | "days" => Self::Duration(Duration::try_days(amount_i64)?),
            "h" | "hour" | "hours" => Self::Duration(Duration::try_hours(amount_i64)?),
            "m" | "minute" | "minutes" => Self::Duration(Duration::try_minutes(amount_i64)?),
            "s" | "second" | "seconds" => Self::Duration(Duration::try_seconds(amount_i64)?),
            _ => return None,
        };
        Some(offset)
    }

    fn add_to(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Duration(duration) => now.checked_add_signed(duration),
            Self::Months(months) => now.checked_add_months(Months::new(months)),
        }
    }

    fn subtract_from(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Duration(duration) => now.checked_sub_signed(duration),
            Self::Months(months) => now.checked_sub_months(Months::new(months)),
        }
    }
}
