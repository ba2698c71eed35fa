//! Code-generation backend contract
//!
//! Backends receive a [`TransformerDescription`] and return the artifacts they
//! generated. Backend failures are opaque to the compiler, so the contract
//! uses `anyhow`.
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use crate::description::TransformerDescription;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// A file produced by a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Relative path of the artifact
    pub path: String,
    pub content: String,
}

/// Code-generation backend
pub trait Emitter {
    fn emit(&self, description: &TransformerDescription) -> anyhow::Result<Vec<GeneratedArtifact>>;
}

/// Writes the description itself as pretty-printed JSON, followed by its
/// named artifacts
#[derive(Debug, Clone)]
pub struct JsonEmitter {
    file_name: String,
}

impl Default for JsonEmitter {
    fn default() -> Self {
        Self {
            file_name: "transformer.json".to_string(),
        }
    }
}

impl JsonEmitter {
    pub fn new<S: Into<String>>(file_name: S) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Emitter for JsonEmitter {
    fn emit(&self, description: &TransformerDescription) -> anyhow::Result<Vec<GeneratedArtifact>> {
        let content = serde_json::to_string_pretty(description)
            .with_context(|| format!("serializing {} transformer description", description.shape))?;

        let mut artifacts = vec![GeneratedArtifact {
            path: self.file_name.clone(),
            content,
        }];
        artifacts.extend(description.artifacts.iter().map(|artifact| GeneratedArtifact {
            path: artifact.name.clone(),
            content: artifact.body.clone(),
        }));
        Ok(artifacts)
    }
}
