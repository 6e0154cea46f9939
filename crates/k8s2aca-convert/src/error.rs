//! Converter error types

use k8s2aca_core::CoreError;
use thiserror::Error;

/// Converter error
///
/// Every variant is fatal to the run. Field-level problems never surface
/// here; they are recorded in the [`MigrationReport`](crate::MigrationReport).
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Manifest(#[from] CoreError),

    #[error("No answer for '{prompt}': {message}")]
    Resolve { prompt: String, message: String },

    #[error("'{answer}' is not one of the options offered for '{prompt}'")]
    InvalidChoice { prompt: String, answer: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConvertError {
    /// Create a resolver failure
    pub fn resolve(prompt: &str, message: impl Into<String>) -> Self {
        Self::Resolve {
            prompt: prompt.to_string(),
            message: message.into(),
        }
    }

    /// Malformed input stream
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Manifest(e) if e.is_parse_error())
    }

    /// No Deployment, ReplicaSet or Pod in the input
    pub fn is_no_workload(&self) -> bool {
        matches!(self, Self::Manifest(CoreError::NoWorkload))
    }
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
