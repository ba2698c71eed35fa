//! Parsing of specification documents in YAML and JSON formats
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::path::Path;

/// Key a specification may be nested under when embedded in a larger pipeline file
pub const ROOT_KEY: &str = "fastmap";

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Yaml => "YAML",
            Format::Json => "JSON",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Yaml => &["yaml", "yml"],
            Format::Json => &["json"],
        }
    }
}

/// Reads specification documents into generic trees
#[derive(Debug, Default)]
pub struct SpecParser;

impl SpecParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a specification file, detecting format from extension
    pub fn parse_file(&self, path: &Path) -> LoaderResult<Value> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|source| LoaderError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

        log::debug!("parsing {:?} specification from {}", format, path.display());
        self.parse_content(&content, format, path)
    }

    /// Parse content with explicit format
    ///
    /// A document whose only key is `fastmap` is unwrapped.
    pub fn parse_content(&self, content: &str, format: Format, path: &Path) -> LoaderResult<Value> {
        let value = match format {
            Format::Yaml => self.parse_yaml(content, path)?,
            Format::Json => self.parse_json(content, path)?,
        };
        Ok(unwrap_root(value))
    }

    pub fn parse_yaml(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        // Non-string keys and tags fail the conversion, not the YAML parse
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| LoaderError::malformed(path, Format::Yaml, e))?;
        serde_json::to_value(yaml_value).map_err(|e| LoaderError::malformed(path, Format::Yaml, e))
    }

    pub fn parse_json(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        serde_json::from_str(content).map_err(|e| LoaderError::malformed(path, Format::Json, e))
    }

    /// Try the format implied by the extension, then JSON, then YAML
    pub fn parse_with_fallback(&self, content: &str, path: &Path) -> LoaderResult<(Value, Format)> {
        if let Ok(format) = Format::from_path(path) {
            if let Ok(value) = self.parse_content(content, format, path) {
                return Ok((value, format));
            }
        }

        // JSON first, it is the stricter format
        for format in [Format::Json, Format::Yaml] {
            if let Ok(value) = self.parse_content(content, format, path) {
                return Ok((value, format));
            }
        }

        Err(LoaderError::UnknownFormat {
            path: path.to_path_buf(),
        })
    }
}

/// Strip a single top-level `fastmap` key
pub fn unwrap_root(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key(ROOT_KEY) => {
            map.shift_remove(ROOT_KEY).unwrap_or(Value::Null)
        }
        other => other,
    }
}
