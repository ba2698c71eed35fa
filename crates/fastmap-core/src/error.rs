//! Error types for the FastMap core library
//!
//! Specification problems (shape, constraint, ambiguity, expression, provider
//! and dispatch failures) all travel as a [`ValidationError`] so callers get
//! the same kind/path/keys triple whichever stage rejected the input.
//! Loading, configuration and emission failures have their own variants.
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use fastmap_schemas::{ErrorKind, LoaderError, ValidationError};
use thiserror::Error;

/// Main error type for FastMap operations
#[derive(Error, Debug)]
pub enum Error {
    /// The specification was rejected by the validator or the dispatcher
    #[error("Specification error: {source}")]
    Specification {
        #[from]
        source: ValidationError,
    },

    /// The specification document could not be read
    #[error("Loading failed: {source}")]
    Loader {
        #[from]
        source: LoaderError,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The code-generation backend failed
    #[error("Emission failed: {message}")]
    Emit {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn configuration<M: Into<String>>(message: M) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Kind of the specification failure, if this is one
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Specification { source } => Some(source.kind),
            _ => None,
        }
    }

    /// Path of the failing node, for specification failures
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::Specification { source } => Some(source.path.as_str()),
            _ => None,
        }
    }

    pub fn is_dispatch(&self) -> bool {
        self.kind() == Some(ErrorKind::Dispatch)
    }

    /// The underlying specification error, if any
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Specification { source } => Some(source),
            _ => None,
        }
    }
}
