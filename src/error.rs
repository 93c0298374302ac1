//! Crate-level error type.

use thiserror::Error;

use crate::validation::ConfigurationError;

/// Errors returned by roster entry points.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The configuration failed validation; all findings are listed.
    #[error("invalid configuration ({} issue(s)): {}", .0.len(), summarize(.0))]
    InvalidConfiguration(Vec<ConfigurationError>),
    /// The configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RosterError {
    /// Validation findings, if this is a configuration error.
    pub fn configuration_errors(&self) -> &[ConfigurationError] {
        match self {
            Self::InvalidConfiguration(errors) => errors,
            Self::Parse(_) => &[],
        }
    }
}

impl From<Vec<ConfigurationError>> for RosterError {
    fn from(errors: Vec<ConfigurationError>) -> Self {
        Self::InvalidConfiguration(errors)
    }
}

fn summarize(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
