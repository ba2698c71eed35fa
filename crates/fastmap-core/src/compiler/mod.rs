//! Compiler / dispatcher
//!
//! The top-level shape of a normalized specification decides which factory
//! builds the transformer:
//!
//! 1. `conditional` -> [`ConditionalMapperFactory`]
//! 2. `map` -> [`ArrayMapperFactory`]
//! 3. `object` -> [`ObjectMapperFactory`]
//!
//! Anything else (a bare `list` or `collection` at the root, or inside a
//! branch) is a dispatch error. Nested containers of every kind are compiled
//! by the same field translation whichever factory started the walk.
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

pub mod array;
pub mod conditional;
pub mod object;

pub use array::ArrayMapperFactory;
pub use conditional::ConditionalMapperFactory;
pub use object::ObjectMapperFactory;

use crate::config::ServiceConfig;
use crate::description::{Instruction, TransformerDescription, TransformerShape};
use crate::error::Result;
use fastmap_schemas::{ContainerKind, ContainerSpec, FieldAction, FieldSpec, RootBody, RootSpec, ValidationError};
use indexmap::IndexSet;

pub const DISPATCH_MESSAGE: &str = "Could not determine if the factory should build an array or an object transformer.";

/// Builds the instruction tree for one kind of top-level container
pub trait MapperFactory {
    fn shape(&self) -> TransformerShape;

    /// Whether this factory builds containers of the given kind
    fn supports(&self, kind: ContainerKind) -> bool;

    fn build(&self, container: &ContainerSpec) -> Instruction;
}

/// Turns normalized specifications into transformer descriptions
#[derive(Debug, Clone)]
pub struct Compiler {
    packages: IndexSet<String>,
    providers: Vec<String>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            packages: config.packages.iter().cloned().collect(),
            providers: config.default_providers.clone(),
        }
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(String::as_str)
    }

    /// Compile a normalized specification
    pub fn compile(&self, spec: &RootSpec) -> Result<TransformerDescription> {
        let (shape, program) = match &spec.body {
            RootBody::Conditional(conditional) => (
                TransformerShape::Conditional,
                ConditionalMapperFactory.build(conditional)?,
            ),
            RootBody::Container(container) => dispatch(container, "$")?,
        };

        let mut description = TransformerDescription::new(shape, program);
        for package in &self.packages {
            description.add_package(package.as_str());
        }
        for id in self.providers.iter().chain(&spec.expression_language) {
            description.add_provider(id.as_str());
        }

        log::debug!(
            "compiled {} transformer with {} instructions",
            description.shape,
            description.instruction_count()
        );
        Ok(description)
    }
}

/// Pick the factory for a top-level container
pub(crate) fn dispatch(container: &ContainerSpec, path: &str) -> Result<(TransformerShape, Instruction)> {
    let factories: [&dyn MapperFactory; 2] = [&ArrayMapperFactory, &ObjectMapperFactory];
    let factory = factories
        .into_iter()
        .find(|factory| factory.supports(container.kind))
        .ok_or_else(|| ValidationError::dispatch(path, DISPATCH_MESSAGE).with_keys([container.kind.key()]))?;

    log::trace!("{}: {} container dispatched to the {} factory", path, container.kind, factory.shape());
    Ok((factory.shape(), factory.build(container)))
}

/// Instruction for a top-level container, which writes no field of its own
pub(crate) fn root_container(container: &ContainerSpec) -> Instruction {
    Instruction::Container {
        field: None,
        kind: container.kind,
        class: container.class.clone(),
        expression: container.expression.clone(),
        children: fields(&container.fields),
    }
}

/// Field instructions in declaration order
pub(crate) fn fields(fields: &[FieldSpec]) -> Vec<Instruction> {
    fields.iter().map(field).collect()
}

fn field(spec: &FieldSpec) -> Instruction {
    let name = spec.field.clone();
    match &spec.action {
        FieldAction::Copy(source) => Instruction::Copy {
            field: name,
            source: source.clone(),
        },
        FieldAction::Expression(expression) => Instruction::Expression {
            field: name,
            expression: expression.clone(),
        },
        FieldAction::Constant(value) => Instruction::Constant {
            field: name,
            value: value.clone(),
        },
        FieldAction::Container(container) => Instruction::Container {
            field: Some(name),
            kind: container.kind,
            class: container.class.clone(),
            expression: container.expression.clone(),
            children: fields(&container.fields),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastmap_schemas::{ErrorKind, Processor};
    use serde_json::json;

    fn normalize(raw: serde_json::Value) -> RootSpec {
        Processor::new().normalize(&raw).unwrap()
    }

    #[test]
    fn test_map_root_builds_array_transformer() {
        let spec = normalize(json!({
            "map": [
                {"field": "[id]", "copy": "[id]"},
                {
                    "field": "[lines]",
                    "expression": ".lines",
                    "list": [{"field": "[qty]", "expression": ".qty"}]
                }
            ]
        }));

        let description = Compiler::new().compile(&spec).unwrap();
        assert_eq!(description.shape, TransformerShape::Array);
        assert_eq!(description.instruction_count(), 4);

        let children = description.program.children();
        assert_eq!(children[1].field(), Some("[lines]"));
        assert!(matches!(children[1], Instruction::Container { kind: ContainerKind::List, .. }));
    }

    #[test]
    fn test_bare_list_root_is_dispatch_error() {
        let spec = normalize(json!({"list": [{"field": "a", "copy": "a"}], "expression": ".items"}));
        let error = Compiler::new().compile(&spec).unwrap_err();

        assert_eq!(error.kind(), Some(ErrorKind::Dispatch));
        assert_eq!(error.path(), Some("$"));
        assert!(error.to_string().contains(DISPATCH_MESSAGE));
    }

    #[test]
    fn test_packages_and_providers_are_recorded() {
        let config = ServiceConfig::default()
            .with_package("acme/money:^1.0")
            .with_default_provider("fastmap.strings");
        let spec = normalize(json!({
            "expression_language": ["fastmap.strings"],
            "map": [{"field": "a", "expression": ".a | upper"}]
        }));

        let description = Compiler::from_config(&config).compile(&spec).unwrap();
        assert_eq!(description.packages.len(), 2);
        assert_eq!(description.providers, vec!["fastmap.strings"]);
    }
}
