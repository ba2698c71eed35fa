//! Specification normalizer
//!
//! [`Processor`] walks a raw configuration value against the schema graph.
//! Every element is handled the same way: reject unknown keys, run the
//! element's rule set (cleanup, exclusivity, dependency, ambiguity, presence),
//! read its scalar keys, then descend into its nested slots in declaration
//! order. The first violation aborts the walk and is returned with its path.
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use crate::expression::{ExpressionHandle, ExpressionLanguage};
use crate::schema::{ElementSchema, NodeKind, BRANCH_ELEMENT, CONTAINER_KEYS, FIELD_ELEMENT, ROOT_ELEMENT, SHAPE_KEYS};
use crate::spec::{Branch, ConditionalSpec, ContainerKind, ContainerSpec, FieldAction, FieldSpec, RootBody, RootSpec};
use crate::validation::base::ValidationContext;
use crate::validation::error::{ValidationError, ValidationResult};
use serde_json::{Map, Value};

/// Normalizes raw specifications into [`RootSpec`] trees
#[derive(Debug, Clone, Default)]
pub struct Processor {
    language: ExpressionLanguage,
}

impl Processor {
    /// Processor with the default expression language and no providers
    pub fn new() -> Self {
        Self::default()
    }

    /// Processor parsing expressions with the given language
    pub fn with_language(language: ExpressionLanguage) -> Self {
        Self { language }
    }

    pub fn language(&self) -> &ExpressionLanguage {
        &self.language
    }

    /// Validate and normalize a complete specification
    pub fn normalize(&self, raw: &Value) -> ValidationResult<RootSpec> {
        let ctx = ValidationContext::new();
        let node = raw.as_object().ok_or_else(|| {
            ValidationError::shape(&ctx.path, format!("Your configuration should be a mapping, found {}.", type_name(raw)))
        })?;

        let node = prepare(node, &ROOT_ELEMENT, &ctx)?;

        let providers = read_provider_list(&node, &ctx)?;
        let language = self.language.with_providers(&providers)?;

        let class = read_text(&node, "class", &ctx)?;
        let expression = read_expression(&language, &node, "expression", &ctx)?;

        let body = match shape_key(&node) {
            Some("conditional") => {
                let slot = ctx.child("conditional");
                RootBody::Conditional(normalize_conditional(&language, &node["conditional"], &slot)?)
            }
            Some(key) => {
                let kind = NodeKind::from_key(key).and_then(ContainerKind::from_node_kind).ok_or_else(|| {
                    ValidationError::ambiguous(&ctx.path, format!("\"{}\" does not introduce a container.", key))
                })?;
                let slot = ctx.child(key);
                RootBody::Container(ContainerSpec {
                    kind,
                    class: class.clone(),
                    expression: expression.clone(),
                    fields: normalize_fields(&language, &node[key], &slot)?,
                })
            }
            None => {
                return Err(ValidationError::ambiguous(
                    &ctx.path,
                    "Could not determine the shape of the specification.",
                )
                .with_keys(SHAPE_KEYS.iter().copied()))
            }
        };

        let root = RootSpec {
            class,
            expression,
            expression_language: providers,
            body,
        };
        log::debug!(
            "normalized {} specification ({} providers)",
            root.shape_key(),
            root.expression_language.len()
        );
        Ok(root)
    }

    /// Validate a specification, discarding the error detail
    pub fn check(&self, raw: &Value) -> bool {
        match self.normalize(raw) {
            Ok(_) => true,
            Err(error) => {
                log::debug!("specification rejected: {}", error);
                false
            }
        }
    }

    /// Validate and normalize a single field element, as found inside a map,
    /// list, object or collection
    pub fn normalize_field(&self, raw: &Value) -> ValidationResult<FieldSpec> {
        let ctx = ValidationContext::new();
        let node = as_element(raw, &ctx)?;
        normalize_field(&self.language, node, &ctx)
    }
}

/// First shape key present, in dispatch order
fn shape_key(node: &Map<String, Value>) -> Option<&'static str> {
    SHAPE_KEYS.iter().copied().find(|key| node.contains_key(*key))
}

/// Reject unknown keys, then run the element's rule set
fn prepare(
    node: &Map<String, Value>,
    schema: &ElementSchema,
    ctx: &ValidationContext,
) -> ValidationResult<Map<String, Value>> {
    if let Some(unknown) = node.keys().find(|key| schema.key(key).is_none()) {
        let available = schema.key_names().map(|k| format!("\"{}\"", k)).collect::<Vec<_>>().join(", ");
        return Err(ValidationError::shape(
            &ctx.path,
            format!("Unrecognized option \"{}\" under \"{}\". Available options are {}.", unknown, ctx.path, available),
        )
        .with_keys([unknown.as_str()]));
    }

    log::trace!("{}: validating {} element", ctx.path, schema.name);
    schema.rules.apply(node.clone(), ctx)
}

fn normalize_conditional(language: &ExpressionLanguage, raw: &Value, ctx: &ValidationContext) -> ValidationResult<ConditionalSpec> {
    let branches = elements(raw, "condition", ctx)?
        .into_iter()
        .map(|(element_ctx, element)| normalize_branch(language, element, &element_ctx))
        .collect::<ValidationResult<Vec<_>>>()?;
    Ok(ConditionalSpec { branches })
}

fn normalize_branch(language: &ExpressionLanguage, raw: &Map<String, Value>, ctx: &ValidationContext) -> ValidationResult<Branch> {
    let node = prepare(raw, &BRANCH_ELEMENT, ctx)?;

    let condition = read_expression(language, &node, "condition", ctx)?.ok_or_else(|| missing_key("condition", ctx))?;
    let kind = container_kind(&node, ctx)?;
    let container = build_container(language, &node, kind, ctx)?;

    Ok(Branch {
        condition,
        container,
        path: ctx.path.clone(),
    })
}

fn normalize_fields(language: &ExpressionLanguage, raw: &Value, ctx: &ValidationContext) -> ValidationResult<Vec<FieldSpec>> {
    elements(raw, "field", ctx)?
        .into_iter()
        .map(|(element_ctx, element)| normalize_field(language, element, &element_ctx))
        .collect()
}

fn normalize_field(language: &ExpressionLanguage, raw: &Map<String, Value>, ctx: &ValidationContext) -> ValidationResult<FieldSpec> {
    let node = prepare(raw, &FIELD_ELEMENT, ctx)?;

    let field = read_text(&node, "field", ctx)?.ok_or_else(|| missing_key("field", ctx))?;

    let action = if CONTAINER_KEYS.iter().any(|key| node.contains_key(*key)) {
        let kind = container_kind(&node, ctx)?;
        FieldAction::Container(build_container(language, &node, kind, ctx)?)
    } else if let Some(source) = read_text(&node, "copy", ctx)? {
        FieldAction::Copy(source)
    } else if let Some(expression) = read_expression(language, &node, "expression", ctx)? {
        FieldAction::Expression(expression)
    } else if let Some(value) = node.get("constant") {
        FieldAction::Constant(read_scalar(value, &ctx.child("constant"))?)
    } else {
        return Err(ValidationError::constraint(&ctx.path, format!("The field \"{}\" has no action.", field))
            .with_keys(["field"]));
    };

    Ok(FieldSpec { field, action })
}

/// Container kind named by the element; the rule set already guarantees there is exactly one
fn container_kind(node: &Map<String, Value>, ctx: &ValidationContext) -> ValidationResult<ContainerKind> {
    CONTAINER_KEYS
        .iter()
        .find(|key| node.contains_key(**key))
        .and_then(|key| NodeKind::from_key(key))
        .and_then(ContainerKind::from_node_kind)
        .ok_or_else(|| {
            ValidationError::constraint(&ctx.path, "Your configuration should contain a \"map\", \"list\", \"object\" or \"collection\" field.")
                .with_keys(CONTAINER_KEYS.iter().copied())
        })
}

fn build_container(
    language: &ExpressionLanguage,
    node: &Map<String, Value>,
    kind: ContainerKind,
    ctx: &ValidationContext,
) -> ValidationResult<ContainerSpec> {
    let class = read_text(node, "class", ctx)?;
    let expression = read_expression(language, node, "expression", ctx)?;
    let slot = ctx.child(kind.key());
    let fields = normalize_fields(language, &node[kind.key()], &slot)?;

    Ok(ContainerSpec {
        kind,
        class,
        expression,
        fields,
    })
}

/// Split a container value into its elements
///
/// Accepts a sequence of mappings, a single mapping whose `marker` key holds a
/// scalar, or a mapping of named mappings (taken in insertion order). A
/// `marker` entry holding a mapping is just an element named like the marker.
fn elements<'a>(
    raw: &'a Value,
    marker: &str,
    ctx: &ValidationContext,
) -> ValidationResult<Vec<(ValidationContext, &'a Map<String, Value>)>> {
    match raw {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let element_ctx = ctx.child_index(index);
                as_element(item, &element_ctx).map(|element| (element_ctx, element))
            })
            .collect(),
        Value::Object(entries) if entries.get(marker).map_or(false, |value| !value.is_object()) => {
            Ok(vec![(ctx.child_index(0), entries)])
        }
        Value::Object(entries) => entries
            .iter()
            .map(|(name, item)| {
                let element_ctx = ctx.child(name);
                as_element(item, &element_ctx).map(|element| (element_ctx, element))
            })
            .collect(),
        other => Err(ValidationError::shape(
            &ctx.path,
            format!("The children element must be a sequence, found {}.", type_name(other)),
        )),
    }
}

fn as_element<'a>(raw: &'a Value, ctx: &ValidationContext) -> ValidationResult<&'a Map<String, Value>> {
    raw.as_object()
        .ok_or_else(|| ValidationError::shape(&ctx.path, format!("Expected a mapping, found {}.", type_name(raw))))
}

fn missing_key(key: &str, ctx: &ValidationContext) -> ValidationError {
    ValidationError::constraint(
        &ctx.path,
        format!("The child config \"{}\" under \"{}\" must be configured.", key, ctx.path),
    )
    .with_keys([key])
}

fn read_text(node: &Map<String, Value>, key: &str, ctx: &ValidationContext) -> ValidationResult<Option<String>> {
    match node.get(key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(ValidationError::shape(
            ctx.child(key).path,
            format!("Invalid type for \"{}\": expected a string, found {}.", key, type_name(other)),
        )
        .with_keys([key])),
    }
}

fn read_expression(
    language: &ExpressionLanguage,
    node: &Map<String, Value>,
    key: &str,
    ctx: &ValidationContext,
) -> ValidationResult<Option<ExpressionHandle>> {
    let path = ctx.child(key).path;
    match read_text(node, key, ctx)? {
        None => Ok(None),
        Some(text) => language
            .wrap(&text)
            .map(Some)
            .map_err(|error| error.at(path).with_keys([key])),
    }
}

fn read_scalar(value: &Value, ctx: &ValidationContext) -> ValidationResult<Value> {
    match value {
        Value::Array(_) | Value::Object(_) => Err(ValidationError::shape(
            &ctx.path,
            format!("Invalid type: expected a scalar, found {}.", type_name(value)),
        )
        .with_keys(["constant"])),
        scalar => Ok(scalar.clone()),
    }
}

/// Provider identifiers from `expression_language`, duplicates dropped
fn read_provider_list(node: &Map<String, Value>, ctx: &ValidationContext) -> ValidationResult<Vec<String>> {
    let list_ctx = ctx.child("expression_language");
    let items = match node.get("expression_language") {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ValidationError::shape(
                &list_ctx.path,
                format!("Invalid type: expected a sequence of provider identifiers, found {}.", type_name(other)),
            )
            .with_keys(["expression_language"]))
        }
    };

    let mut providers: Vec<String> = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let id = item.as_str().ok_or_else(|| {
            ValidationError::shape(
                list_ctx.child_index(index).path,
                format!("Invalid type: expected a provider identifier, found {}.", type_name(item)),
            )
            .with_keys(["expression_language"])
        })?;
        if providers.iter().any(|known| known == id) {
            log::warn!("expression provider \"{}\" is listed more than once", id);
            continue;
        }
        providers.push(id.to_string());
    }
    Ok(providers)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
