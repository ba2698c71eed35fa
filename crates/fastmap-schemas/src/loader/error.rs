//! Error types for specification loading
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use crate::loader::parser::Format;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Why a specification document could not be turned into a tree
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("cannot read specification '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document is not well-formed in the format it was read as
    #[error("specification '{path}' is not valid {}: {reason}", .format.name())]
    Malformed {
        path: PathBuf,
        format: Format,
        reason: String,
    },

    /// No format could be chosen for the document
    #[error("specification '{path}' has no known format, expected one of .yaml, .yml, .json")]
    UnknownFormat { path: PathBuf },
}

impl LoaderError {
    pub(crate) fn malformed(path: &Path, format: Format, reason: impl ToString) -> Self {
        Self::Malformed {
            path: path.to_path_buf(),
            format,
            reason: reason.to_string(),
        }
    }

    /// Path of the document that failed to load
    pub fn path(&self) -> &Path {
        match self {
            Self::Unreadable { path, .. }
            | Self::Malformed { path, .. }
            | Self::UnknownFormat { path } => path,
        }
    }
}
