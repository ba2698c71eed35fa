//! Conditional transformer factory
//!
//! Branches keep their declaration order; the generated transformer runs the
//! first branch whose condition holds. Each branch body is dispatched with the
//! top-level rule, so a branch may build an array or an object.
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use super::dispatch;
use crate::description::{ConditionalBranch, Instruction};
use crate::error::Result;
use fastmap_schemas::ConditionalSpec;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalMapperFactory;

impl ConditionalMapperFactory {
    /// Compile every branch; errors carry the path the branch was declared at
    pub fn build(&self, conditional: &ConditionalSpec) -> Result<Instruction> {
        let branches = conditional
            .branches
            .iter()
            .map(|branch| {
                let (shape, body) = dispatch(&branch.container, &branch.path)?;
                Ok(ConditionalBranch {
                    condition: branch.condition.clone(),
                    shape,
                    body,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Instruction::Conditional { branches })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::TransformerShape;
    use fastmap_schemas::{ErrorKind, Processor};
    use serde_json::json;

    fn conditional(raw: serde_json::Value) -> ConditionalSpec {
        let spec = Processor::new().normalize(&raw).unwrap();
        spec.conditional().cloned().unwrap()
    }

    #[test]
    fn test_branches_may_mix_shapes() {
        let spec = conditional(json!({
            "conditional": [
                {"condition": ".type == \"b2b\"", "class": "Company", "expression": ".", "object": [{"field": "vat", "copy": "[vat]"}]},
                {"condition": "true", "map": [{"field": "[name]", "copy": "[name]"}]}
            ]
        }));

        match ConditionalMapperFactory.build(&spec).unwrap() {
            Instruction::Conditional { branches } => {
                let shapes: Vec<_> = branches.iter().map(|b| b.shape).collect();
                assert_eq!(shapes, vec![TransformerShape::Object, TransformerShape::Array]);
            }
            other => panic!("unexpected instruction {:?}", other),
        }
    }

    #[test]
    fn test_list_branch_is_dispatch_error_with_path() {
        let spec = conditional(json!({
            "conditional": [
                {"condition": ".a", "map": [{"field": "a", "copy": "a"}]},
                {"condition": ".b", "expression": ".items", "list": [{"field": "b", "copy": "b"}]}
            ]
        }));

        let error = ConditionalMapperFactory.build(&spec).unwrap_err();
        assert_eq!(error.kind(), Some(ErrorKind::Dispatch));
        assert_eq!(error.path(), Some("$.conditional[1]"));
    }

    #[test]
    fn test_named_branch_error_uses_declared_path() {
        let spec = conditional(json!({
            "conditional": {
                "retail": {"condition": ".retail", "map": [{"field": "a", "copy": "a"}]},
                "bulk": {"condition": ".bulk", "expression": ".items", "list": [{"field": "b", "copy": "b"}]}
            }
        }));

        let error = ConditionalMapperFactory.build(&spec).unwrap_err();
        assert_eq!(error.kind(), Some(ErrorKind::Dispatch));
        assert_eq!(error.path(), Some("$.conditional.bulk"));
    }
}
