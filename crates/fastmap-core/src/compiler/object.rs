//! Object transformer factory
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use super::{root_container, MapperFactory};
use crate::description::{Instruction, TransformerShape};
use fastmap_schemas::{ContainerKind, ContainerSpec};

/// Builds transformers instantiating `class` and populating it from `object` fields
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectMapperFactory;

impl MapperFactory for ObjectMapperFactory {
    fn shape(&self) -> TransformerShape {
        TransformerShape::Object
    }

    fn supports(&self, kind: ContainerKind) -> bool {
        kind == ContainerKind::Object
    }

    fn build(&self, container: &ContainerSpec) -> Instruction {
        root_container(container)
    }
}
