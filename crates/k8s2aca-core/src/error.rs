//! Core error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to parse document {index}: {source}")]
    Parse {
        index: usize,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid {kind} '{name}': {source}")]
    InvalidResource {
        kind: String,
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("No pod-spec resources (Deployment, ReplicaSet, Pod) found in manifest")]
    NoWorkload,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    /// Whether the input stream itself is malformed
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::InvalidResource { .. })
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
