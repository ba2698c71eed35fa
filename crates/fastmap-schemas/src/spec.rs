//! Normalized specification tree
//!
//! These types are produced by the [`Processor`](crate::Processor) only and are
//! never mutated afterwards. Serializing any of them yields the canonical raw
//! form, which normalizes back to an identical tree.
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use crate::expression::ExpressionHandle;
use crate::schema::NodeKind;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Kind of a field container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Map,
    List,
    Object,
    Collection,
}

impl ContainerKind {
    pub fn key(&self) -> &'static str {
        match self {
            ContainerKind::Map => "map",
            ContainerKind::List => "list",
            ContainerKind::Object => "object",
            ContainerKind::Collection => "collection",
        }
    }

    pub fn from_node_kind(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Map => Some(ContainerKind::Map),
            NodeKind::List => Some(ContainerKind::List),
            NodeKind::Object => Some(ContainerKind::Object),
            NodeKind::Collection => Some(ContainerKind::Collection),
            NodeKind::Root | NodeKind::Conditional => None,
        }
    }

    pub fn node_kind(&self) -> NodeKind {
        match self {
            ContainerKind::Map => NodeKind::Map,
            ContainerKind::List => NodeKind::List,
            ContainerKind::Object => NodeKind::Object,
            ContainerKind::Collection => NodeKind::Collection,
        }
    }

    /// Object and collection containers instantiate a class
    pub fn builds_instances(&self) -> bool {
        matches!(self, ContainerKind::Object | ContainerKind::Collection)
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ordered field instructions populating one map, list, object or collection
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSpec {
    pub kind: ContainerKind,
    /// Target type for object and collection containers
    pub class: Option<String>,
    /// How the container is selected from (or, for lists, iterated over) the source
    pub expression: Option<ExpressionHandle>,
    pub fields: Vec<FieldSpec>,
}

impl ContainerSpec {
    /// Total number of field instructions, nested ones included
    pub fn field_count(&self) -> usize {
        self.fields
            .iter()
            .map(|field| match &field.action {
                FieldAction::Container(nested) => 1 + nested.field_count(),
                _ => 1,
            })
            .sum()
    }

    /// Deepest container nesting, 1 for a container without nested containers
    pub fn depth(&self) -> usize {
        1 + self
            .fields
            .iter()
            .filter_map(|field| match &field.action {
                FieldAction::Container(nested) => Some(nested.depth()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    fn serialize_entries<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        if let Some(class) = &self.class {
            map.serialize_entry("class", class)?;
        }
        if let Some(expression) = &self.expression {
            map.serialize_entry("expression", expression)?;
        }
        map.serialize_entry(self.kind.key(), &self.fields)
    }
}

/// The single instruction attached to an output field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldAction {
    /// Copy the value at a source path
    Copy(String),
    /// Evaluate an expression
    Expression(ExpressionHandle),
    /// Inject a literal scalar
    Constant(Value),
    /// Build a nested container
    Container(ContainerSpec),
}

impl FieldAction {
    /// Configuration key of the action
    pub fn key(&self) -> &'static str {
        match self {
            FieldAction::Copy(_) => "copy",
            FieldAction::Expression(_) => "expression",
            FieldAction::Constant(_) => "constant",
            FieldAction::Container(container) => container.kind.key(),
        }
    }
}

/// One transformation instruction: how to populate `field`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Target path
    pub field: String,
    pub action: FieldAction,
}

impl Serialize for FieldSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("field", &self.field)?;
        match &self.action {
            FieldAction::Copy(source) => map.serialize_entry("copy", source)?,
            FieldAction::Expression(expression) => map.serialize_entry("expression", expression)?,
            FieldAction::Constant(value) => map.serialize_entry("constant", value)?,
            FieldAction::Container(container) => container.serialize_entries(&mut map)?,
        }
        map.end()
    }
}

/// A condition and the container built when it holds
#[derive(Debug, Clone)]
pub struct Branch {
    pub condition: ExpressionHandle,
    pub container: ContainerSpec,
    /// Where the branch was declared, e.g. `$.conditional[1]` or `$.conditional.bulk`
    pub path: String,
}

// Two branches are equal regardless of where they were declared
impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.condition == other.condition && self.container == other.container
    }
}

impl Serialize for Branch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("condition", &self.condition)?;
        self.container.serialize_entries(&mut map)?;
        map.end()
    }
}

/// Branches evaluated in order; the first one whose condition holds wins
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalSpec {
    pub branches: Vec<Branch>,
}

impl Serialize for ConditionalSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.branches.len()))?;
        for branch in &self.branches {
            seq.serialize_element(branch)?;
        }
        seq.end()
    }
}

/// Top-level shape of a specification
#[derive(Debug, Clone, PartialEq)]
pub enum RootBody {
    Conditional(ConditionalSpec),
    Container(ContainerSpec),
}

/// Normalized top-level specification
#[derive(Debug, Clone, PartialEq)]
pub struct RootSpec {
    pub class: Option<String>,
    pub expression: Option<ExpressionHandle>,
    /// Expression function providers, in declaration order
    pub expression_language: Vec<String>,
    pub body: RootBody,
}

impl RootSpec {
    /// Configuration key of the top-level shape
    pub fn shape_key(&self) -> &'static str {
        match &self.body {
            RootBody::Conditional(_) => NodeKind::Conditional.key(),
            RootBody::Container(container) => container.kind.key(),
        }
    }

    /// Top-level conditional, if that is the shape
    pub fn conditional(&self) -> Option<&ConditionalSpec> {
        match &self.body {
            RootBody::Conditional(conditional) => Some(conditional),
            RootBody::Container(_) => None,
        }
    }

    /// Top-level container of the given kind, if that is the shape
    pub fn container(&self, kind: ContainerKind) -> Option<&ContainerSpec> {
        match &self.body {
            RootBody::Container(container) if container.kind == kind => Some(container),
            _ => None,
        }
    }
}

impl Serialize for RootSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.expression_language.is_empty() {
            map.serialize_entry("expression_language", &self.expression_language)?;
        }
        if let Some(class) = &self.class {
            map.serialize_entry("class", class)?;
        }
        if let Some(expression) = &self.expression {
            map.serialize_entry("expression", expression)?;
        }
        match &self.body {
            RootBody::Conditional(conditional) => map.serialize_entry("conditional", conditional)?,
            RootBody::Container(container) => map.serialize_entry(container.kind.key(), &container.fields)?,
        }
        map.end()
    }
}
