//! Cross-field constraint rules
//!
//! Rules are plain data: each [`Rule`] names the keys it looks at and is
//! evaluated by a pure function over the node's key/value mapping. A
//! [`RuleSet`] runs its rules phase by phase (cleanup, exclusivity,
//! dependency, ambiguity, presence) and, within a phase, in declaration order,
//! stopping at the first violation.
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use crate::validation::base::ValidationContext;
use crate::validation::error::{ErrorKind, ValidationError, ValidationResult};
use serde_json::{Map, Value};

/// Evaluation phase of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Cleanup,
    Exclusivity,
    Dependency,
    Ambiguity,
    Presence,
}

impl Phase {
    pub const ORDER: [Phase; 5] = [
        Phase::Cleanup,
        Phase::Exclusivity,
        Phase::Dependency,
        Phase::Ambiguity,
        Phase::Presence,
    ];
}

/// A single constraint over a specification node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Drop the listed keys when their value is null, a scalar or an empty container
    Cleanup(&'static [&'static str]),
    /// The first key may not appear together with any of the others
    MutuallyExclusive(&'static str, &'static [&'static str]),
    /// When the first key is present, all the others must be present too
    MutuallyDependent(&'static str, &'static [&'static str]),
    /// `expression` + `class` without `object` or `collection`
    ExpressionClassWithoutContainer,
    /// At least one of the keys must be present
    RequireOneOf {
        fields: &'static [&'static str],
        kind: ErrorKind,
    },
}

impl Rule {
    pub fn phase(&self) -> Phase {
        match self {
            Rule::Cleanup(_) => Phase::Cleanup,
            Rule::MutuallyExclusive(..) => Phase::Exclusivity,
            Rule::MutuallyDependent(..) => Phase::Dependency,
            Rule::ExpressionClassWithoutContainer => Phase::Ambiguity,
            Rule::RequireOneOf { .. } => Phase::Presence,
        }
    }

    /// Evaluate the rule, returning the (possibly cleaned) node
    pub fn apply(&self, node: Map<String, Value>, ctx: &ValidationContext) -> ValidationResult<Map<String, Value>> {
        match *self {
            Rule::Cleanup(fields) => Ok(cleanup_fields(node, fields)),
            Rule::MutuallyExclusive(field, exclusions) => {
                mutually_exclusive(&node, field, exclusions, ctx)?;
                Ok(node)
            }
            Rule::MutuallyDependent(field, requirements) => {
                mutually_dependent(&node, field, requirements, ctx)?;
                Ok(node)
            }
            Rule::ExpressionClassWithoutContainer => {
                expression_class_without_container(&node, ctx)?;
                Ok(node)
            }
            Rule::RequireOneOf { fields, kind } => {
                require_one_of(&node, fields, kind, ctx)?;
                Ok(node)
            }
        }
    }
}

/// Ordered collection of rules applied to one kind of node
#[derive(Debug, Clone, Copy)]
pub struct RuleSet(pub &'static [Rule]);

impl RuleSet {
    pub fn rules(&self) -> &'static [Rule] {
        self.0
    }

    /// Run every rule, phase by phase, against the node
    pub fn apply(&self, mut node: Map<String, Value>, ctx: &ValidationContext) -> ValidationResult<Map<String, Value>> {
        for phase in Phase::ORDER {
            for rule in self.0.iter().filter(|rule| rule.phase() == phase) {
                log::trace!("{}: applying {:?}", ctx.path, rule);
                node = rule.apply(node, ctx)?;
            }
        }
        Ok(node)
    }

    /// Run the rules and report success as a boolean
    pub fn check(&self, node: &Map<String, Value>, ctx: &ValidationContext) -> bool {
        self.apply(node.clone(), ctx).is_ok()
    }
}

/// Whether a value counts as a non-empty container
pub fn is_populated(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
        _ => false,
    }
}

/// Remove the listed keys when their value is empty or not a container, so
/// that "present but empty" reads as "absent" to the other rules.
pub fn cleanup_fields(mut node: Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    for field in fields {
        let empty = node.get(*field).map(|value| !is_populated(value)).unwrap_or(false);
        if empty {
            node.shift_remove(*field);
        }
    }
    node
}

pub fn mutually_exclusive(
    node: &Map<String, Value>,
    field: &str,
    exclusions: &[&str],
    ctx: &ValidationContext,
) -> ValidationResult<()> {
    if !node.contains_key(field) {
        return Ok(());
    }

    match exclusions.iter().find(|exclusion| node.contains_key(**exclusion)) {
        Some(exclusion) => Err(ValidationError::constraint(
            &ctx.path,
            format!(
                "Your configuration should either contain the \"{}\" or the \"{}\" field, not both.",
                field, exclusion
            ),
        )
        .with_keys([field, *exclusion])),
        None => Ok(()),
    }
}

pub fn mutually_dependent(
    node: &Map<String, Value>,
    field: &str,
    requirements: &[&str],
    ctx: &ValidationContext,
) -> ValidationResult<()> {
    if !node.contains_key(field) {
        return Ok(());
    }

    match requirements.iter().find(|requirement| !node.contains_key(**requirement)) {
        Some(requirement) => Err(ValidationError::constraint(
            &ctx.path,
            format!(
                "Your configuration should contain the \"{}\" field if the \"{}\" field is present.",
                requirement, field
            ),
        )
        .with_keys([field, *requirement])),
        None => Ok(()),
    }
}

pub fn expression_class_without_container(node: &Map<String, Value>, ctx: &ValidationContext) -> ValidationResult<()> {
    let ambiguous = node.contains_key("expression")
        && node.contains_key("class")
        && !node.contains_key("object")
        && !node.contains_key("collection");

    if ambiguous {
        return Err(ValidationError::ambiguous(
            &ctx.path,
            "Your configuration should not contain both the \"expression\" and the \"class\" alone, \
             maybe you forgot a \"collection\" or an \"object\" field.",
        )
        .with_keys(["expression", "class"]));
    }
    Ok(())
}

pub fn require_one_of(
    node: &Map<String, Value>,
    fields: &[&str],
    kind: ErrorKind,
    ctx: &ValidationContext,
) -> ValidationResult<()> {
    if fields.iter().any(|field| node.contains_key(*field)) {
        return Ok(());
    }

    let quoted = fields.iter().map(|f| format!("\"{}\"", f)).collect::<Vec<_>>().join(", ");
    Err(ValidationError::new(
        kind,
        &ctx.path,
        format!("Your configuration should contain one of the {} fields.", quoted),
    )
    .with_keys(fields.iter().copied()))
}
