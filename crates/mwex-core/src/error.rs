//! Error handling for the extraction pipeline
//!
//! This module provides the unified error type shared by every pipeline
//! stage, with helper constructors for the common cases.

use thiserror::Error;

/// Common result type for all pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Unified error type for the extraction pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Parse error in {context}: {reason}")]
    Parse { context: String, reason: String },

    #[error("IO error: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid regular expression '{pattern}': {reason}")]
    Regex { pattern: String, reason: String },
}

impl PipelineError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse<S: Into<String>, R: Into<String>>(context: S, reason: R) -> Self {
        Self::Parse {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Create an IO error with its source
    pub fn io<S: Into<String>>(operation: S, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a regex compilation error
    pub fn regex<S: Into<String>, R: Into<String>>(pattern: S, reason: R) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}
