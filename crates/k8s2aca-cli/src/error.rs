//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use k8s2aca_convert::ConvertError;
use k8s2aca_core::CoreError;
use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// The manifest stream could not be parsed
    #[error("{message}")]
    #[diagnostic(
        code(k8s2aca::cli::parse),
        help("Check that the input is a YAML stream of Kubernetes objects")
    )]
    Parse { message: String },

    /// Nothing to convert
    #[error("{message}")]
    #[diagnostic(
        code(k8s2aca::cli::no_workload),
        help("Only Deployment, ReplicaSet and Pod resources become container apps")
    )]
    NoWorkload { message: String },

    /// A GPU or volume choice could not be answered
    #[error("Choice failed: {message}")]
    #[diagnostic(
        code(k8s2aca::cli::resolve),
        help("Use --non-interactive with --gpu-sku and --volume-strategy to answer choices up front")
    )]
    Resolve { message: String },

    /// Manifest failed validation
    #[error("Validation failed: {message}")]
    #[diagnostic(code(k8s2aca::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(k8s2aca::cli::io))]
    Io { message: String },

    /// Wrapped error for passthrough (stores the formatted message)
    #[error("{message}")]
    #[diagnostic(code(k8s2aca::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Parse { .. } => exit_codes::PARSE_ERROR,
            CliError::NoWorkload { .. } => exit_codes::NO_WORKLOAD,
            CliError::Resolve { .. } => exit_codes::RESOLVE_ERROR,
            CliError::Validation { .. } => exit_codes::ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a validation error with help text
    pub fn validation_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an IO error for a file operation
    pub fn io_at(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{}: {}", path.display(), err),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::NoWorkload => CliError::NoWorkload { message },
            CoreError::Io { .. } => CliError::Io { message },
            _ if err.is_parse_error() => CliError::Parse { message },
            _ => CliError::Other { message },
        }
    }
}

impl From<ConvertError> for CliError {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::Manifest(core) => core.into(),
            ConvertError::Resolve { .. } | ConvertError::InvalidChoice { .. } => {
                CliError::Resolve {
                    message: err.to_string(),
                }
            }
            ConvertError::Yaml(_) => CliError::Other {
                message: err.to_string(),
            },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
