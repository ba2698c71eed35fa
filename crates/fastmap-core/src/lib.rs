//! FastMap Core - compiles mapping specifications into transformer descriptions
//!
//! This crate sits on top of [`fastmap_schemas`]: once a specification has
//! been validated and normalized, the [`Compiler`] dispatches it to the array,
//! object or conditional factory and produces a [`TransformerDescription`]
//! for a code-generation backend ([`Emitter`]).
//!
//! # Main Components
//!
//! - **Error Handling**: a single [`Error`] type built with `thiserror`
//! - **Configuration**: packages, expression variables and default providers ([`ServiceConfig`])
//! - **Compiler**: top-level dispatch and instruction building
//! - **Service**: load, normalize, compile and emit in one call
//!
//! # Example
//!
//! ```rust
//! use fastmap_core::{Service, TransformerShape};
//! use serde_json::json;
//!
//! let description = Service::new().compile(&json!({
//!     "conditional": [
//!         {"condition": ".x > 0", "map": [{"field": "[sign]", "constant": "positive"}]},
//!         {"condition": ".x <= 0", "map": [{"field": "[sign]", "constant": "negative"}]}
//!     ]
//! }))?;
//! assert_eq!(description.shape, TransformerShape::Conditional);
//! # Ok::<(), fastmap_core::Error>(())
//! ```
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

pub mod compiler;
pub mod config;
pub mod description;
pub mod emit;
pub mod error;
pub mod service;

pub use fastmap_schemas as schemas;

// Re-export main types for convenience
pub use compiler::{ArrayMapperFactory, Compiler, ConditionalMapperFactory, MapperFactory, ObjectMapperFactory};
pub use config::{ServiceConfig, DEFAULT_PACKAGE};
pub use description::{Artifact, ConditionalBranch, Instruction, TransformerDescription, TransformerShape};
pub use emit::{Emitter, GeneratedArtifact, JsonEmitter};
pub use error::{Error, Result};
pub use service::Service;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
