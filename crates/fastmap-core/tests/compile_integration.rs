//! End-to-end compilation of specifications

use fastmap_core::schemas::{ContainerKind, ErrorKind};
use fastmap_core::{
    Emitter, Error, GeneratedArtifact, Instruction, JsonEmitter, Service, ServiceConfig, TransformerDescription,
    TransformerShape,
};
use serde_json::json;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_conditional_compiles_to_ordered_branches() {
    let description = Service::new()
        .compile(&json!({
            "conditional": [
                {"condition": ".x > 0", "map": [{"field": "[sign]", "constant": "positive"}]},
                {"condition": ".x <= 0", "map": [{"field": "[sign]", "constant": "negative"}]}
            ]
        }))
        .unwrap();

    assert_eq!(description.shape, TransformerShape::Conditional);
    let branches = match &description.program {
        Instruction::Conditional { branches } => branches,
        other => panic!("expected a conditional program, got {:?}", other),
    };
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].condition.source(), ".x > 0");
    assert_eq!(branches[1].condition.source(), ".x <= 0");
    assert!(branches.iter().all(|b| b.shape == TransformerShape::Array));

    match &branches[1].body {
        Instruction::Container { children, .. } => assert_eq!(
            children[0],
            Instruction::Constant {
                field: "[sign]".to_string(),
                value: json!("negative"),
            }
        ),
        other => panic!("unexpected branch body {:?}", other),
    }
}

#[test]
fn test_conditional_on_environment_names() {
    let description = Service::new()
        .compile(&json!({
            "conditional": [
                {"condition": "x>0", "map": {"field": "[sign]", "constant": "positive"}},
                {"condition": "x<=0", "map": {"field": "[sign]", "constant": "negative"}}
            ]
        }))
        .unwrap();

    assert_eq!(description.shape, TransformerShape::Conditional);
    match &description.program {
        Instruction::Conditional { branches } => {
            let conditions: Vec<_> = branches.iter().map(|b| b.condition.source()).collect();
            assert_eq!(conditions, vec!["x>0", "x<=0"]);
        }
        other => panic!("expected a conditional program, got {:?}", other),
    }
}

#[test]
fn test_root_list_and_collection_do_not_dispatch() {
    let service = Service::new();

    for raw in [
        json!({"expression": ".items", "list": [{"field": "a", "copy": "a"}]}),
        json!({"class": "Line", "expression": ".lines", "collection": [{"field": "a", "copy": "a"}]}),
    ] {
        // Valid specification...
        assert!(service.normalize(&raw).is_ok());
        // ...that no factory accepts
        let error = service.compile(&raw).unwrap_err();
        assert!(error.is_dispatch(), "{}", error);
        assert_eq!(
            error.as_validation().map(|e| e.message.as_str()),
            Some("Could not determine if the factory should build an array or an object transformer.")
        );
    }
}

#[test]
fn test_map_and_object_together_fail_before_compilation() {
    let error = Service::new()
        .compile(&json!({
            "map": {"field": "id", "copy": "src.id"},
            "object": {"field": "id", "copy": "src.id"},
            "class": "Product",
            "expression": "."
        }))
        .unwrap_err();

    assert_eq!(error.kind(), Some(ErrorKind::Constraint));
}

#[test]
fn test_nested_containers_keep_declaration_order() {
    let description = Service::new()
        .compile(&json!({
            "class": "App\\Order",
            "expression": ".order",
            "object": [
                {"field": "reference", "copy": "[ref]"},
                {
                    "field": "customer",
                    "class": "App\\Customer",
                    "expression": ".customer",
                    "object": [{"field": "email", "expression": ".email"}]
                },
                {
                    "field": "lines",
                    "class": "App\\Line",
                    "expression": ".lines",
                    "collection": [
                        {"field": "sku", "copy": "[sku]"},
                        {"field": "quantity", "expression": ".qty"}
                    ]
                },
                {"field": "currency", "constant": "EUR"}
            ]
        }))
        .unwrap();

    assert_eq!(description.shape, TransformerShape::Object);
    assert_eq!(description.instruction_count(), 8);

    let fields: Vec<_> = description.program.children().into_iter().filter_map(|c| c.field()).collect();
    assert_eq!(fields, vec!["reference", "customer", "lines", "currency"]);

    match description.program.children()[2] {
        Instruction::Container { kind, class, .. } => {
            assert_eq!(*kind, ContainerKind::Collection);
            assert_eq!(class.as_deref(), Some("App\\Line"));
        }
        other => panic!("unexpected instruction {:?}", other),
    }
}

#[test]
fn test_compile_file_with_configuration() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("fastmap.yaml");
    fs::write(
        &config_path,
        "packages:\n  - fastmap-runtime:^0.2.0\n  - acme/money:^1.0\ndefault_providers:\n  - fastmap.strings\n",
    )
    .unwrap();
    let spec_path = dir.path().join("customer.yaml");
    fs::write(
        &spec_path,
        "fastmap:\n  map:\n    - field: '[name]'\n      expression: .name | upper\n    - field: '[id]'\n      copy: '[id]'\n",
    )
    .unwrap();

    let service = Service::with_config(ServiceConfig::from_file(&config_path).unwrap()).unwrap();
    let description = service.compile_file(&spec_path).unwrap();

    let packages: Vec<_> = description.packages.iter().map(String::as_str).collect();
    assert_eq!(packages, vec!["fastmap-runtime:^0.2.0", "acme/money:^1.0"]);
    assert_eq!(description.providers, vec!["fastmap.strings"]);
    assert_eq!(description.instruction_count(), 3);
}

#[test]
fn test_compile_file_reports_loader_errors() {
    let dir = tempdir().unwrap();
    let error = Service::new().compile_file(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(error, Error::Loader { .. }));
    assert_eq!(error.kind(), None);
}

#[derive(Debug)]
struct FailingEmitter;

impl Emitter for FailingEmitter {
    fn emit(&self, _description: &TransformerDescription) -> anyhow::Result<Vec<GeneratedArtifact>> {
        anyhow::bail!("disk full")
    }
}

#[test]
fn test_emit_through_backends() {
    let service = Service::new();
    let spec = json!({"map": [{"field": "[id]", "copy": "[id]"}]});

    let artifacts = service.emit(&spec, &JsonEmitter::new("customer.json")).unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].path, "customer.json");
    assert!(artifacts[0].content.contains("\"op\": \"container\""));

    let error = service.emit(&spec, &FailingEmitter).unwrap_err();
    assert!(matches!(error, Error::Emit { .. }));
}

#[test]
fn test_service_is_shareable_between_threads() {
    let service = std::sync::Arc::new(Service::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let service = service.clone();
            std::thread::spawn(move || {
                service
                    .compile(&json!({"map": [{"field": format!("[f{}]", i), "copy": "[x]"}]}))
                    .map(|d| d.instruction_count())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 2);
    }
}
