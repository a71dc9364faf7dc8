//! CLI argument definitions for the headless form driver.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "formwork",
    version,
    about = "Drive form controls headlessly and report validation state",
    long_about = "Build a form from a JSON definition, replay user input against it and\n\
                  report each control's value and errors.\n\n\
                  Also lists the registered rule types and inspects payment card numbers."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include typed values in trace output. Values are redacted otherwise.
    #[arg(long = "log-values", global = true)]
    pub log_values: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a form, replay an input script and report the result.
    Check(CheckArgs),

    /// List the registered primitive, format and control types.
    Types(TypesArgs),

    /// Identify a payment card number and check its length and checksum.
    Card(CardArgs),
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Form definition (model, schema and controls) as JSON.
    #[arg(value_name = "FORM")]
    pub form: PathBuf,

    /// JSON list of actions to replay against the form.
    #[arg(long = "inputs", value_name = "PATH")]
    pub inputs: Option<PathBuf>,

    /// Phrase bundle as `key,text` CSV.
    #[arg(long = "phrases", value_name = "PATH")]
    pub phrases: Option<PathBuf>,

    /// Client defaults (accepted card types) as JSON.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Pin the current date (YYYY-MM-DD) for date and expiry rules.
    #[arg(long = "today", value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Print the rendered controls after the summary.
    #[arg(long = "render")]
    pub render: bool,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: ReportFormatArg,
}

#[derive(Parser)]
pub struct TypesArgs {
    /// Client defaults (accepted card types) as JSON.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CardArgs {
    /// Card number; spaces and dashes are ignored.
    #[arg(value_name = "NUMBER")]
    pub number: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
