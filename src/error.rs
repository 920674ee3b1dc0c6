use std::path::PathBuf;

use thiserror::Error;

use crate::reminders::grid::RowIssue;

/// Failures surfaced by the reminder editor. Transport problems are kept
/// apart from an empty reminder list so the UI can tell them apart.
#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned status {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },
    #[error("could not parse reminder list: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{} row(s) rejected before submission", .0.len())]
    Validation(Vec<RowIssue>),
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("could not read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid dataset pattern {0}")]
    Pattern(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse settings file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
