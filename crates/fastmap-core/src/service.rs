//! High-level entry point chaining load, normalize, compile and emit
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use crate::compiler::Compiler;
use crate::config::ServiceConfig;
use crate::description::TransformerDescription;
use crate::emit::{Emitter, GeneratedArtifact};
use crate::error::{Error, Result};
use fastmap_schemas::{Processor, RootSpec, SpecParser};
use serde_json::Value;
use std::path::Path;

/// Compiles specifications with one configuration
///
/// A service holds no per-call state; it may be shared between threads.
#[derive(Debug, Clone)]
pub struct Service {
    config: ServiceConfig,
    processor: Processor,
    compiler: Compiler,
}

impl Default for Service {
    fn default() -> Self {
        let config = ServiceConfig::default();
        Self {
            compiler: Compiler::from_config(&config),
            processor: Processor::new(),
            config,
        }
    }
}

impl Service {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a service, resolving the configured default providers
    pub fn with_config(config: ServiceConfig) -> Result<Self> {
        let language = config.language()?;
        Ok(Self {
            compiler: Compiler::from_config(&config),
            processor: Processor::with_language(language),
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Validate and normalize a raw specification
    pub fn normalize(&self, raw: &Value) -> Result<RootSpec> {
        Ok(self.processor.normalize(raw)?)
    }

    /// Whether the specification would compile
    pub fn validate(&self, raw: &Value) -> bool {
        match self.compile(raw) {
            Ok(_) => true,
            Err(error) => {
                log::debug!("specification rejected: {}", error);
                false
            }
        }
    }

    /// Normalize and compile a raw specification
    pub fn compile(&self, raw: &Value) -> Result<TransformerDescription> {
        let spec = self.normalize(raw)?;
        self.compiler.compile(&spec)
    }

    /// Load a YAML or JSON specification file and compile it
    pub fn compile_file(&self, path: &Path) -> Result<TransformerDescription> {
        log::debug!("compiling specification file {}", path.display());
        let raw = SpecParser::new().parse_file(path)?;
        self.compile(&raw)
    }

    /// Compile a specification and hand it to a backend
    pub fn emit(&self, raw: &Value, emitter: &dyn Emitter) -> Result<Vec<GeneratedArtifact>> {
        let description = self.compile(raw)?;
        emitter.emit(&description).map_err(|source| Error::Emit {
            message: format!("backend failed for {} transformer", description.shape),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::TransformerShape;
    use serde_json::json;

    #[test]
    fn test_compile_map() {
        let description = Service::new()
            .compile(&json!({"map": [{"field": "[id]", "copy": "[id]"}]}))
            .unwrap();
        assert_eq!(description.shape, TransformerShape::Array);
        assert!(description.packages.contains(crate::config::DEFAULT_PACKAGE));
    }

    #[test]
    fn test_validate_covers_dispatch() {
        let service = Service::new();
        assert!(service.validate(&json!({"map": [{"field": "a", "copy": "a"}]})));
        // Normalizes, but no factory builds a bare collection
        assert!(!service.validate(&json!({
            "class": "Line",
            "expression": ".lines",
            "collection": [{"field": "a", "copy": "a"}]
        })));
    }

    #[test]
    fn test_configured_providers_apply_to_every_spec() {
        let service = Service::with_config(ServiceConfig::default().with_default_provider("fastmap.strings")).unwrap();
        let description = service
            .compile(&json!({"map": [{"field": "a", "expression": ".a | lower"}]}))
            .unwrap();
        assert_eq!(description.providers, vec!["fastmap.strings"]);

        assert!(!Service::new().validate(&json!({"map": [{"field": "a", "expression": ".a | default_to(\"x\")"}]})));
    }
}
