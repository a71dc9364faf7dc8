use std::path::PathBuf;

use thiserror::Error;

/// Structural failures: misuse of the API or unreadable configuration.
///
/// Validation outcomes never surface here; they are codes on a control's
/// error report.
#[derive(Debug, Error)]
pub enum FormworkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown control: {0}")]
    UnknownControl(String),
    #[error("duplicate control: {0}")]
    DuplicateControl(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, FormworkError>;
