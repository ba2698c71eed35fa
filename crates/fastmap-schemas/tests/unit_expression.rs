//! Expression providers and their use during normalization

use fastmap_schemas::expression::{is_registered, registered_providers, resolve_provider};
use fastmap_schemas::{
    register_provider_factory, ErrorKind, ExpressionFunctionProvider, ExpressionLanguage, FieldAction, Processor,
    StringsProvider,
};
use serde_json::json;
use std::sync::Arc;

/// Currency helpers used by the tests below
#[derive(Debug)]
struct MoneyProvider;

impl ExpressionFunctionProvider for MoneyProvider {
    fn id(&self) -> &str {
        "tests.money"
    }

    fn definitions(&self) -> Vec<String> {
        vec![
            "def cents: . * 100;".to_string(),
            "def with_currency($code): {amount: ., currency: $code};".to_string(),
        ]
    }
}

fn money() -> Arc<dyn ExpressionFunctionProvider> {
    Arc::new(MoneyProvider)
}

#[test]
fn test_provider_functions_are_available_once_declared() {
    register_provider_factory("tests.money", money);

    let spec = json!({
        "expression_language": ["tests.money"],
        "map": [
            {"field": "[price]", "expression": ".price | cents"},
            {"field": "[total]", "expression": ".total | with_currency(\"EUR\")"}
        ]
    });
    let root = Processor::new().normalize(&spec).unwrap();
    assert_eq!(root.expression_language, vec!["tests.money"]);
    let map = root.container(fastmap_schemas::ContainerKind::Map).unwrap();
    assert!(matches!(&map.fields[0].action, FieldAction::Expression(e) if e.environment().is_empty()));

    // Without the declaration the function is unknown
    let undeclared = json!({"map": [{"field": "[total]", "expression": ".total | with_currency(\"EUR\")"}]});
    let error = Processor::new().normalize(&undeclared).unwrap_err();
    assert_eq!(error.kind, ErrorKind::ExpressionParse);
    assert_eq!(error.path, "$.map[0].expression");

    // A bare undeclared name is read from the environment instead
    let root = Processor::new()
        .normalize(&json!({"map": [{"field": "[price]", "expression": ".price | cents"}]}))
        .unwrap();
    let map = root.container(fastmap_schemas::ContainerKind::Map).unwrap();
    assert!(matches!(&map.fields[0].action, FieldAction::Expression(e) if e.environment() == ["cents"]));
}

#[test]
fn test_registration_keeps_first_factory() {
    assert!(register_provider_factory("tests.first", money));
    assert!(!register_provider_factory("tests.first", StringsProvider::shared));
    assert!(is_registered("tests.first"));

    let provider = resolve_provider("tests.first").unwrap();
    assert_eq!(provider.id(), "tests.money");
    assert!(Arc::ptr_eq(&provider, &resolve_provider("tests.first").unwrap()));
}

#[test]
fn test_builtin_provider_is_in_catalog() {
    assert!(registered_providers().iter().any(|id| id == StringsProvider::ID));

    let root = Processor::new()
        .normalize(&json!({
            "expression_language": ["fastmap.strings"],
            "map": [{"field": "[name]", "expression": ".name | upper"}]
        }))
        .unwrap();
    let map = root.container(fastmap_schemas::ContainerKind::Map).unwrap();
    assert!(matches!(&map.fields[0].action, FieldAction::Expression(e) if e.source() == ".name | upper"));
}

#[test]
fn test_unknown_provider_is_reported() {
    let error = Processor::new()
        .normalize(&json!({
            "expression_language": ["tests.not-registered"],
            "map": [{"field": "a", "copy": "a"}]
        }))
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::Provider);
    assert_eq!(error.path, "$.expression_language");
    assert!(error.message.contains("tests.not-registered"));
}

#[test]
fn test_duplicate_provider_identifiers_are_collapsed() {
    let root = Processor::new()
        .normalize(&json!({
            "expression_language": ["fastmap.strings", "fastmap.strings"],
            "map": [{"field": "a", "expression": ".a | lower"}]
        }))
        .unwrap();
    assert_eq!(root.expression_language, vec!["fastmap.strings"]);
}

#[test]
fn test_provider_list_must_be_a_sequence_of_identifiers() {
    let error = Processor::new()
        .normalize(&json!({
            "expression_language": [42],
            "map": [{"field": "a", "copy": "a"}]
        }))
        .unwrap_err();
    assert_eq!(error.kind, ErrorKind::Shape);
    assert_eq!(error.path, "$.expression_language[0]");
}

#[test]
fn test_processor_language_scopes_variables() {
    let processor = Processor::with_language(ExpressionLanguage::new().with_variables(["input", "context"]));
    assert!(processor.check(&json!({"map": [{"field": "a", "expression": "$context | .a"}]})));
    assert!(!processor.check(&json!({"map": [{"field": "a", "expression": "$output | .a"}]})));

    // The default language declares input and output only
    assert!(Processor::new().check(&json!({"map": [{"field": "a", "expression": "$output | .a"}]})));
}

#[test]
fn test_concurrent_normalization_shares_providers() {
    let spec = json!({
        "expression_language": ["fastmap.strings"],
        "map": [{"field": "[name]", "expression": ".name | default_to(\"unknown\")"}]
    });

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let spec = spec.clone();
            std::thread::spawn(move || Processor::new().normalize(&spec))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}
