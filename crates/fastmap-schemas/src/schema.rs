//! Specification schema
//!
//! The grammar is a small static graph. Every [`NodeKind`] points at the
//! [`ElementSchema`] of the elements it holds, and container-valued slots point
//! back at a `NodeKind` instead of embedding a schema, so arbitrarily deep
//! nesting (conditional → map → list → object → ...) never materializes more
//! than the three element schemas below.
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::ErrorKind;
use crate::validation::rules::{Rule, RuleSet};
use std::fmt;

/// Kinds of node that can appear in a specification tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Map,
    List,
    Object,
    Collection,
    Conditional,
}

impl NodeKind {
    /// Configuration key introducing a node of this kind
    pub fn key(&self) -> &'static str {
        match self {
            NodeKind::Root => "fastmap",
            NodeKind::Map => "map",
            NodeKind::List => "list",
            NodeKind::Object => "object",
            NodeKind::Collection => "collection",
            NodeKind::Conditional => "conditional",
        }
    }

    /// Look up the kind introduced by a configuration key
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "map" => Some(NodeKind::Map),
            "list" => Some(NodeKind::List),
            "object" => Some(NodeKind::Object),
            "collection" => Some(NodeKind::Collection),
            "conditional" => Some(NodeKind::Conditional),
            _ => None,
        }
    }

    /// Whether the node is a sequence of field instructions
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Map | NodeKind::List | NodeKind::Object | NodeKind::Collection)
    }

    /// Schema of the elements held by a node of this kind
    pub fn element(&self) -> &'static ElementSchema {
        match self {
            NodeKind::Root => &ROOT_ELEMENT,
            NodeKind::Map | NodeKind::List | NodeKind::Object | NodeKind::Collection => &FIELD_ELEMENT,
            NodeKind::Conditional => &BRANCH_ELEMENT,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Type of value accepted under a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// A string
    Text,
    /// Expression text, parsed during normalization
    Expression,
    /// Any scalar (string, number, boolean, null)
    Scalar,
    /// A sequence of strings
    TextList,
    /// A nested node of the given kind
    Slot(NodeKind),
}

/// One legal key of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySchema {
    pub name: &'static str,
    pub ty: KeyType,
    pub required: bool,
}

impl KeySchema {
    const fn optional(name: &'static str, ty: KeyType) -> Self {
        Self { name, ty, required: false }
    }

    const fn required(name: &'static str, ty: KeyType) -> Self {
        Self { name, ty, required: true }
    }
}

/// Legal keys and constraint rules for one kind of element
#[derive(Debug)]
pub struct ElementSchema {
    pub name: &'static str,
    pub keys: &'static [KeySchema],
    pub rules: RuleSet,
}

impl ElementSchema {
    pub fn key(&self, name: &str) -> Option<&'static KeySchema> {
        self.keys.iter().find(|key| key.name == name)
    }

    pub fn key_names(&self) -> impl Iterator<Item = &'static str> {
        self.keys.iter().map(|key| key.name)
    }

    /// Nested-node slots in declaration order
    pub fn slots(&self) -> impl Iterator<Item = (&'static str, NodeKind)> {
        self.keys.iter().filter_map(|key| match key.ty {
            KeyType::Slot(kind) => Some((key.name, kind)),
            _ => None,
        })
    }
}

/// Keys selecting the top-level transformer shape
pub const SHAPE_KEYS: &[&str] = &["conditional", "map", "list", "object", "collection"];

/// Keys holding a nested container
pub const CONTAINER_KEYS: &[&str] = &["map", "list", "object", "collection"];

/// Keys describing what a field does
pub const ACTION_KEYS: &[&str] = &["copy", "expression", "constant", "map", "list", "object", "collection"];

pub static ROOT_ELEMENT: ElementSchema = ElementSchema {
    name: "root",
    keys: &[
        KeySchema::optional("class", KeyType::Text),
        KeySchema::optional("expression", KeyType::Expression),
        KeySchema::optional("expression_language", KeyType::TextList),
        KeySchema::optional("conditional", KeyType::Slot(NodeKind::Conditional)),
        KeySchema::optional("map", KeyType::Slot(NodeKind::Map)),
        KeySchema::optional("list", KeyType::Slot(NodeKind::List)),
        KeySchema::optional("object", KeyType::Slot(NodeKind::Object)),
        KeySchema::optional("collection", KeyType::Slot(NodeKind::Collection)),
    ],
    rules: RuleSet(&[
        Rule::Cleanup(&["conditional", "expression_language", "map", "list", "object", "collection"]),
        Rule::MutuallyExclusive("conditional", &["map", "list", "object", "collection"]),
        Rule::MutuallyExclusive("map", &["conditional", "expression", "class", "object", "list", "collection"]),
        Rule::MutuallyExclusive("object", &["conditional", "map", "list", "collection"]),
        Rule::MutuallyExclusive("list", &["conditional", "class", "map", "object", "collection"]),
        Rule::MutuallyExclusive("collection", &["conditional", "map", "object", "list"]),
        Rule::MutuallyDependent("object", &["class", "expression"]),
        Rule::MutuallyDependent("collection", &["class", "expression"]),
        Rule::MutuallyDependent("list", &["expression"]),
        Rule::RequireOneOf {
            fields: SHAPE_KEYS,
            kind: ErrorKind::AmbiguousShape,
        },
    ]),
};

pub static FIELD_ELEMENT: ElementSchema = ElementSchema {
    name: "field",
    keys: &[
        KeySchema::required("field", KeyType::Text),
        KeySchema::optional("copy", KeyType::Text),
        KeySchema::optional("expression", KeyType::Expression),
        KeySchema::optional("constant", KeyType::Scalar),
        KeySchema::optional("class", KeyType::Text),
        KeySchema::optional("map", KeyType::Slot(NodeKind::Map)),
        KeySchema::optional("list", KeyType::Slot(NodeKind::List)),
        KeySchema::optional("object", KeyType::Slot(NodeKind::Object)),
        KeySchema::optional("collection", KeyType::Slot(NodeKind::Collection)),
    ],
    rules: RuleSet(&[
        Rule::Cleanup(CONTAINER_KEYS),
        Rule::MutuallyExclusive("map", &["list", "object", "collection"]),
        Rule::MutuallyExclusive("copy", &["expression", "constant", "class", "map", "object", "list", "collection"]),
        Rule::MutuallyExclusive("expression", &["copy", "constant"]),
        Rule::MutuallyExclusive("constant", &["copy", "expression", "class", "map", "object", "list", "collection"]),
        Rule::MutuallyExclusive("map", &["copy", "constant", "class", "object", "list", "collection"]),
        Rule::MutuallyExclusive("object", &["copy", "constant", "map", "list", "collection"]),
        Rule::MutuallyExclusive("list", &["copy", "constant", "class", "map", "object", "collection"]),
        Rule::MutuallyExclusive("collection", &["copy", "constant", "map", "object", "list"]),
        Rule::MutuallyDependent("object", &["class", "expression"]),
        Rule::MutuallyDependent("collection", &["class", "expression"]),
        Rule::MutuallyDependent("map", &["expression"]),
        Rule::MutuallyDependent("list", &["expression"]),
        Rule::ExpressionClassWithoutContainer,
        Rule::RequireOneOf {
            fields: ACTION_KEYS,
            kind: ErrorKind::Constraint,
        },
    ]),
};

pub static BRANCH_ELEMENT: ElementSchema = ElementSchema {
    name: "branch",
    keys: &[
        KeySchema::required("condition", KeyType::Expression),
        KeySchema::optional("class", KeyType::Text),
        KeySchema::optional("expression", KeyType::Expression),
        KeySchema::optional("map", KeyType::Slot(NodeKind::Map)),
        KeySchema::optional("list", KeyType::Slot(NodeKind::List)),
        KeySchema::optional("object", KeyType::Slot(NodeKind::Object)),
        KeySchema::optional("collection", KeyType::Slot(NodeKind::Collection)),
    ],
    rules: RuleSet(&[
        Rule::Cleanup(CONTAINER_KEYS),
        Rule::MutuallyExclusive("map", &["list", "object", "collection"]),
        Rule::MutuallyExclusive("list", &["object", "collection"]),
        Rule::MutuallyExclusive("object", &["collection"]),
        Rule::MutuallyDependent("object", &["class", "expression"]),
        Rule::MutuallyDependent("collection", &["class", "expression"]),
        Rule::MutuallyDependent("list", &["expression"]),
        Rule::RequireOneOf {
            fields: CONTAINER_KEYS,
            kind: ErrorKind::Constraint,
        },
    ]),
};
