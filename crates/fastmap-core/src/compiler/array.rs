//! Array transformer factory
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use super::{root_container, MapperFactory};
use crate::description::{Instruction, TransformerShape};
use fastmap_schemas::{ContainerKind, ContainerSpec};

/// Builds transformers producing an associative array from a `map`
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayMapperFactory;

impl MapperFactory for ArrayMapperFactory {
    fn shape(&self) -> TransformerShape {
        TransformerShape::Array
    }

    fn supports(&self, kind: ContainerKind) -> bool {
        kind == ContainerKind::Map
    }

    fn build(&self, container: &ContainerSpec) -> Instruction {
        root_container(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_map_only() {
        assert!(ArrayMapperFactory.supports(ContainerKind::Map));
        for kind in [ContainerKind::List, ContainerKind::Object, ContainerKind::Collection] {
            assert!(!ArrayMapperFactory.supports(kind));
        }
    }
}
