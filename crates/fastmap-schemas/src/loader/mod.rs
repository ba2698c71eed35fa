//! Specification document loading
//!
//! Specifications are usually authored as YAML (or JSON) files. This module
//! turns such a document into the generic `serde_json::Value` tree the
//! [`Processor`](crate::Processor) works on.
//!
//! ```rust
//! use fastmap_schemas::loader::{Format, SpecParser};
//! use std::path::Path;
//!
//! let parser = SpecParser::new();
//! let spec = parser.parse_content("map:\n  - field: id\n    copy: '[id]'\n", Format::Yaml, Path::new("inline.yaml"))?;
//! assert_eq!(spec["map"][0]["field"], "id");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod parser;

pub use error::{LoaderError, LoaderResult};
pub use parser::{Format, SpecParser};
