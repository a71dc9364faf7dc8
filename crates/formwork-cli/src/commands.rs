use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use tracing::{debug, info_span};

use formwork_control::{ControlEnv, Form, FormDefinition, TemplateSet};
use formwork_model::{ClientDefaults, FixedClock};
use formwork_rules::rules::payment_card::AcceptedCards;
use formwork_rules::{Kind, Method, RuleRegistry, card_type, luhn_valid};

use formwork_cli::phrases::load_phrases;
use formwork_cli::script::{CheckReport, load_script, run_script};

use crate::cli::{CardArgs, CheckArgs, TypesArgs};
use crate::summary::apply_table_style;

pub struct CheckRun {
    pub report: CheckReport,
    pub rendered: Option<String>,
}

pub fn run_check(args: &CheckArgs) -> Result<CheckRun> {
    let span = info_span!("check", form = %args.form.display());
    let _guard = span.enter();

    let defaults = load_defaults(args.config.as_deref())?;
    let mut env = ControlEnv::with_defaults(&defaults);
    if let Some(path) = &args.phrases {
        env = env.with_phrases(Arc::new(load_phrases(path)?));
    }
    if let Some(today) = args.today {
        env = env.with_clock(Arc::new(FixedClock::on(today)));
    }

    let text = std::fs::read_to_string(&args.form)
        .with_context(|| format!("read form {}", args.form.display()))?;
    let definition: FormDefinition = serde_json::from_str(&text)
        .with_context(|| format!("parse form {}", args.form.display()))?;
    let mut form = Form::from_definition(env, definition).context("build form")?;
    form.bind_elements();
    form.rendered();

    let steps = match &args.inputs {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };
    let report = run_script(&mut form, &steps)?;
    let rendered = args.render.then(|| form.render(&TemplateSet::plain()));
    Ok(CheckRun { report, rendered })
}

pub fn run_types(args: &TypesArgs) -> Result<()> {
    let defaults = load_defaults(args.config.as_deref())?;
    let registry = RuleRegistry::with_defaults(&defaults);
    let mut table = Table::new();
    table.set_header(vec!["Kind", "Type", "Rules"]);
    apply_table_style(&mut table);
    for kind in Kind::ALL {
        for name in registry.type_names(kind) {
            let methods = registry
                .methods(kind, name)
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(vec![kind.as_str(), name, methods.as_str()]);
        }
    }
    println!("{table}");
    Ok(())
}

/// Returns whether the number is a complete, checksum-valid card.
pub fn run_card(args: &CardArgs) -> Result<bool> {
    let digits: String = args
        .number
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        bail!("card number must contain only digits, spaces and dashes");
    }
    let card = card_type(&digits);
    let length_ok = card.is_some_and(|card| card.accepts_length(digits.len()));
    let luhn_ok = luhn_valid(&digits);
    let accepted = AcceptedCards::from_defaults(&ClientDefaults::default());
    debug!(length = digits.len(), card = card.map(|card| card.name), "card lookup");

    let mut table = Table::new();
    table.set_header(vec!["Check", "Result"]);
    apply_table_style(&mut table);
    table.add_row(vec!["Type", card.map_or("unknown", |card| card.name)]);
    table.add_row(vec!["Digits".to_string(), digits.len().to_string()]);
    table.add_row(vec!["Length", yes_no(length_ok)]);
    table.add_row(vec!["Luhn", yes_no(luhn_ok)]);
    if let Some(card) = card {
        table.add_row(vec!["Security code".to_string(), card.security_code.to_string()]);
        table.add_row(vec!["Issue number", yes_no(card.additional_fields)]);
        table.add_row(vec!["Debit", yes_no(card.debit)]);
        table.add_row(vec!["Accepted by default", yes_no(accepted.accepts(card))]);
    }
    println!("{table}");
    Ok(card.is_some() && length_ok && luhn_ok)
}

fn load_defaults(path: Option<&Path>) -> Result<ClientDefaults> {
    let Some(path) = path else {
        return Ok(ClientDefaults::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
