//! Validation error types for mapping specifications
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of a specification failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A node does not have the expected shape (not a mapping, wrong scalar type, unknown key)
    Shape,
    /// A mutual exclusion, mutual dependency or required-key rule was violated
    Constraint,
    /// The node could be read several ways, or names no recognizable shape at all
    AmbiguousShape,
    /// Expression text was rejected by the expression parser
    ExpressionParse,
    /// The normalized root matches no transformer factory
    Dispatch,
    /// An expression function provider could not be resolved
    Provider,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Shape => "shape error",
            ErrorKind::Constraint => "constraint error",
            ErrorKind::AmbiguousShape => "ambiguous shape",
            ErrorKind::ExpressionParse => "expression parse error",
            ErrorKind::Dispatch => "dispatch error",
            ErrorKind::Provider => "provider error",
        };
        f.write_str(name)
    }
}

/// Specification error with the path where it occurred and the offending keys
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub struct ValidationError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Path of the failing node, e.g. `$.map[0].object[2]`
    pub path: String,
    /// Human-readable error message
    pub message: String,
    /// Configuration keys involved in the failure, in the order they were checked
    pub keys: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at '{}': {}", self.kind, self.path, self.message)
    }
}

impl ValidationError {
    /// Create a new validation error without offending keys
    pub fn new<P, M>(kind: ErrorKind, path: P, message: M) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
            keys: Vec::new(),
        }
    }

    /// Attach the offending keys
    pub fn with_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn shape<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::new(ErrorKind::Shape, path, message)
    }

    pub fn constraint<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::new(ErrorKind::Constraint, path, message)
    }

    pub fn ambiguous<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::new(ErrorKind::AmbiguousShape, path, message)
    }

    /// Expression text failed to parse or compile
    pub fn expression_parse<P: Into<String>>(path: P, expression: &str, reason: &str) -> Self {
        Self::new(
            ErrorKind::ExpressionParse,
            path,
            format!("Invalid expression `{}`: {}", expression, reason.trim_end()),
        )
        .with_keys(["expression"])
    }

    pub fn dispatch<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::new(ErrorKind::Dispatch, path, message)
    }

    /// Provider identifier could not be resolved
    pub fn provider<P: Into<String>>(path: P, provider: &str, reason: &str) -> Self {
        Self::new(
            ErrorKind::Provider,
            path,
            format!("Expression provider \"{}\" is not available: {}", provider, reason),
        )
        .with_keys(["expression_language"])
    }

    /// Move the error under a different path, keeping everything else
    pub fn at<P: Into<String>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    /// Whether the error names the given key
    pub fn involves(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
