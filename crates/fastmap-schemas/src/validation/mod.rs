//! Constraint validation for mapping specifications
//!
//! - `base`: path tracking while walking the tree
//! - `error`: structured errors with kind, path and offending keys
//! - `rules`: the cleanup, exclusivity, dependency and ambiguity rules
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod error;
pub mod rules;

pub use base::ValidationContext;
pub use error::{ErrorKind, ValidationError, ValidationResult};
pub use rules::{Phase, Rule, RuleSet};
