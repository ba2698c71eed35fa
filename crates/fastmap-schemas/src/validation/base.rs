//! Path tracking for nested specification nodes
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// Position of the node being validated inside the specification tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    /// Current path, `$` for the root
    pub path: String,
}

const ROOT: &str = "$";

impl ValidationContext {
    /// Create a context positioned at the root
    pub fn new() -> Self {
        Self {
            path: ROOT.to_string(),
        }
    }

    /// Create a child context for a named key
    pub fn child<P: AsRef<str>>(&self, path_segment: P) -> Self {
        Self {
            path: format!("{}.{}", self.path, path_segment.as_ref()),
        }
    }

    /// Create a child context for a sequence index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
        }
    }

    /// Whether this context is the root of the specification
    pub fn is_root(&self) -> bool {
        self.path == ROOT
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
