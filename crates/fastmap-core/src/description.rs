//! Transformer descriptions handed to code-generation backends
//!
//! A [`TransformerDescription`] is the compiled form of a specification: an
//! instruction tree, the packages the generated code requires, the expression
//! providers it relies on and any extra named artifact bodies.
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use fastmap_schemas::{ContainerKind, ExpressionHandle};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of transformer a description builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformerShape {
    /// Builds an associative array (root `map`)
    Array,
    /// Instantiates a class (root `object`)
    Object,
    /// Selects among branches at run time (root `conditional`)
    Conditional,
}

impl fmt::Display for TransformerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformerShape::Array => write!(f, "array"),
            TransformerShape::Object => write!(f, "object"),
            TransformerShape::Conditional => write!(f, "conditional"),
        }
    }
}

/// One node of the instruction tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Copy the value at `source` into `field`
    Copy { field: String, source: String },
    /// Evaluate `expression` into `field`
    Expression { field: String, expression: ExpressionHandle },
    /// Write a literal into `field`
    Constant { field: String, value: Value },
    /// Build a map, list, object or collection; `field` is absent at the root
    Container {
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        kind: ContainerKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        class: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        expression: Option<ExpressionHandle>,
        children: Vec<Instruction>,
    },
    /// Evaluate branches in order, running the first whose condition holds
    Conditional { branches: Vec<ConditionalBranch> },
}

impl Instruction {
    /// Target field, for instructions writing one
    pub fn field(&self) -> Option<&str> {
        match self {
            Instruction::Copy { field, .. }
            | Instruction::Expression { field, .. }
            | Instruction::Constant { field, .. } => Some(field),
            Instruction::Container { field, .. } => field.as_deref(),
            Instruction::Conditional { .. } => None,
        }
    }

    /// Direct children, branch bodies included
    pub fn children(&self) -> Vec<&Instruction> {
        match self {
            Instruction::Container { children, .. } => children.iter().collect(),
            Instruction::Conditional { branches } => branches.iter().map(|b| &b.body).collect(),
            _ => Vec::new(),
        }
    }

    /// Number of instructions in this subtree, itself included
    pub fn count(&self) -> usize {
        1 + self.children().into_iter().map(Instruction::count).sum::<usize>()
    }
}

/// A compiled conditional branch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalBranch {
    pub condition: ExpressionHandle,
    pub shape: TransformerShape,
    pub body: Instruction,
}

/// Named body produced alongside the instruction tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub body: String,
}

/// Backend-ready representation of a validated specification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformerDescription {
    pub shape: TransformerShape,
    pub program: Instruction,
    /// Required external packages, in the order they were added
    pub packages: IndexSet<String>,
    /// Expression providers the expressions rely on
    pub providers: Vec<String>,
    pub artifacts: Vec<Artifact>,
}

impl TransformerDescription {
    pub fn new(shape: TransformerShape, program: Instruction) -> Self {
        Self {
            shape,
            program,
            packages: IndexSet::new(),
            providers: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Add a package requirement; returns `false` if it was already required
    pub fn add_package<S: Into<String>>(&mut self, package: S) -> bool {
        self.packages.insert(package.into())
    }

    pub fn with_package<S: Into<String>>(mut self, package: S) -> Self {
        self.add_package(package);
        self
    }

    /// Record an expression provider, keeping the first occurrence
    pub fn add_provider<S: Into<String>>(&mut self, id: S) -> bool {
        let id = id.into();
        if self.providers.contains(&id) {
            return false;
        }
        self.providers.push(id);
        true
    }

    pub fn add_artifact<N: Into<String>, B: Into<String>>(&mut self, name: N, body: B) {
        self.artifacts.push(Artifact {
            name: name.into(),
            body: body.into(),
        });
    }

    pub fn with_artifact<N: Into<String>, B: Into<String>>(mut self, name: N, body: B) -> Self {
        self.add_artifact(name, body);
        self
    }

    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|artifact| artifact.name == name)
    }

    /// Total number of instructions
    pub fn instruction_count(&self) -> usize {
        self.program.count()
    }
}
