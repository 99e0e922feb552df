//! Error types for the treasure-hunt crate

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the treasure-hunt crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("value table not found at {}", path.display())]
    StorageNotFound { path: PathBuf },

    #[error("training did not converge within {limit} episodes")]
    IterationLimitExceeded { limit: usize },

    #[error("deployment walk did not reach a terminal state within {limit} steps")]
    StepLimitExceeded { limit: usize },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error(
        "value table shape mismatch: expected {expected_rows}x{expected_cols}, found {rows}x{cols}"
    )]
    TableShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("invalid value '{value}' at row {row}, column {column}")]
    InvalidTableValue {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("label '{label}' appears more than once")]
    DuplicateLabel { label: String },

    #[error("unknown state '{state}'")]
    UnknownState { state: String },

    #[error("unknown action '{action}'")]
    UnknownAction { action: String },

    #[error("non-terminal state '{state}' has no available actions")]
    NoActionsAvailable { state: String },

    #[error("invalid map: {message}")]
    InvalidMap { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
