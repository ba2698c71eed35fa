//! FastMap Schemas - specification schema, constraint validation and normalization
//!
//! A FastMap specification is a nested configuration describing how to build an
//! output value (a map, a list, an object or a conditional selection among
//! those) from an input value. This crate turns the raw configuration tree
//! into a typed, validated [`RootSpec`]:
//!
//! - **Schema**: the recursive graph of node kinds and their keys ([`schema`])
//! - **Constraint Validation**: per-node cleanup, exclusivity, dependency and
//!   ambiguity rules, evaluated in a fixed order ([`validation`])
//! - **Expressions**: jq expressions checked at normalization time, with
//!   pluggable function providers ([`expression`])
//! - **Normalization**: the [`Processor`] producing the typed tree ([`spec`])
//! - **Loading**: YAML and JSON documents ([`loader`])
//!
//! ## Quick Start
//!
//! ```rust
//! use fastmap_schemas::{ContainerKind, Processor};
//! use serde_json::json;
//!
//! let spec = json!({
//!     "map": [
//!         {"field": "[id]", "copy": "[sku]"},
//!         {"field": "[price]", "expression": ".price * 100"}
//!     ]
//! });
//!
//! let root = Processor::new().normalize(&spec).unwrap();
//! assert_eq!(root.container(ContainerKind::Map).unwrap().fields.len(), 2);
//! ```
//!
//! Errors carry a kind, the path of the failing node and the offending keys:
//!
//! ```rust
//! use fastmap_schemas::{ErrorKind, Processor};
//! use serde_json::json;
//!
//! let error = Processor::new()
//!     .normalize(&json!({"list": [{"field": "a", "copy": "a"}]}))
//!     .unwrap_err();
//! assert_eq!(error.kind, ErrorKind::Constraint);
//! assert_eq!(error.path, "$");
//! ```
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

pub mod expression;
pub mod loader;
pub mod processor;
pub mod schema;
pub mod spec;
pub mod validation;

// Re-export commonly used types for convenience
pub use expression::{
    register_provider_factory, ExpressionFunctionProvider, ExpressionHandle, ExpressionLanguage,
    StringsProvider,
};
pub use loader::{Format, LoaderError, SpecParser};
pub use processor::Processor;
pub use schema::NodeKind;
pub use spec::{Branch, ConditionalSpec, ContainerKind, ContainerSpec, FieldAction, FieldSpec, RootBody, RootSpec};
pub use validation::{ErrorKind, ValidationContext, ValidationError, ValidationResult};
