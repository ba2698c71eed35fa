//! Service configuration
//!
//! ```yaml
//! packages:
//!   - fastmap-runtime:^0.2.0
//! variables: [input, output]
//! default_providers:
//!   - fastmap.strings
//! ```
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use fastmap_schemas::expression::DEFAULT_VARIABLES;
use fastmap_schemas::ExpressionLanguage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Runtime package every generated transformer depends on
pub const DEFAULT_PACKAGE: &str = "fastmap-runtime:^0.2.0";

/// Configuration shared by every compilation of a [`Service`](crate::Service)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Package requirements attached to every transformer description
    pub packages: Vec<String>,
    /// Variables in scope of every expression, without the leading `$`
    pub variables: Vec<String>,
    /// Expression providers enabled even when a specification does not list them
    pub default_providers: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            packages: vec![DEFAULT_PACKAGE.to_string()],
            variables: DEFAULT_VARIABLES.iter().map(|v| v.to_string()).collect(),
            default_providers: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Parse a YAML configuration document; missing keys take their defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| Error::Configuration {
            message: "Invalid service configuration".to_string(),
            source: Some(e.into()),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Configuration {
            message: format!("Failed to read configuration file '{}'", path.display()),
            source: Some(e.into()),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Add a package requirement
    pub fn with_package<S: Into<String>>(mut self, package: S) -> Self {
        let package = package.into();
        if !self.packages.contains(&package) {
            self.packages.push(package);
        }
        self
    }

    /// Replace the expression variables
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    /// Enable an expression provider for every specification
    pub fn with_default_provider<S: Into<String>>(mut self, id: S) -> Self {
        let id = id.into();
        if !self.default_providers.contains(&id) {
            self.default_providers.push(id);
        }
        self
    }

    /// Check names and identifiers
    pub fn validate(&self) -> Result<()> {
        if let Some(package) = self.packages.iter().find(|p| p.trim().is_empty()) {
            return Err(Error::configuration(format!("Invalid package requirement \"{}\"", package)));
        }
        if let Some(variable) = self.variables.iter().find(|v| !is_identifier(v)) {
            return Err(Error::configuration(format!(
                "Invalid expression variable \"{}\": expected a name such as \"input\"",
                variable
            )));
        }
        if let Some(id) = self.default_providers.iter().find(|id| id.trim().is_empty()) {
            return Err(Error::configuration(format!("Invalid provider identifier \"{}\"", id)));
        }
        Ok(())
    }

    /// Expression language with the configured variables and default providers
    pub fn language(&self) -> Result<ExpressionLanguage> {
        self.validate()?;
        let language = ExpressionLanguage::new()
            .with_variables(self.variables.iter().cloned())
            .with_providers(&self.default_providers)?;
        Ok(language)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
