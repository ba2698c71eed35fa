//! Process-wide registry of expression function providers
//!
//! The embedding application registers a factory per provider identifier
//! (usually once at startup). Specifications then name providers in their
//! `expression_language` list, and [`resolve_provider`] turns each identifier
//! into a shared instance. Each identifier is instantiated at most once per
//! process: later resolutions, from any thread, get the same instance back.
//! Nothing in this module is written during a normalize or compile call apart
//! from that first instantiation.
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use super::providers::StringsProvider;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Source of additional functions available to expressions
///
/// Functions are contributed as jq definitions (`def name: body;`) and are
/// placed in scope of every expression parsed by a language that has the
/// provider registered.
pub trait ExpressionFunctionProvider: Send + Sync + fmt::Debug {
    /// Identifier used in `expression_language`
    fn id(&self) -> &str;

    /// jq definitions contributed by this provider
    fn definitions(&self) -> Vec<String>;
}

/// Constructor registered for a provider identifier
pub type ProviderFactory = fn() -> Arc<dyn ExpressionFunctionProvider>;

static FACTORIES: Lazy<RwLock<IndexMap<String, ProviderFactory>>> = Lazy::new(|| {
    let mut factories: IndexMap<String, ProviderFactory> = IndexMap::new();
    factories.insert(StringsProvider::ID.to_string(), StringsProvider::shared);
    RwLock::new(factories)
});

static INSTANCES: Lazy<RwLock<HashMap<String, Arc<dyn ExpressionFunctionProvider>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Error raised when a provider identifier cannot be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no factory is registered for \"{id}\" (known providers: {known})")]
    UnknownProvider { id: String, known: String },
}

/// Register the factory for a provider identifier
///
/// Returns `false` and keeps the existing factory when the identifier is
/// already known, so repeated registration is harmless.
pub fn register_provider_factory(id: impl Into<String>, factory: ProviderFactory) -> bool {
    let id = id.into();
    let mut factories = FACTORIES.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    if factories.contains_key(&id) {
        log::debug!("expression provider factory \"{}\" already registered", id);
        return false;
    }
    log::debug!("registered expression provider factory \"{}\"", id);
    factories.insert(id, factory);
    true
}

/// Identifiers with a registered factory, in registration order
pub fn registered_providers() -> Vec<String> {
    let factories = FACTORIES.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    factories.keys().cloned().collect()
}

/// Whether a factory is registered for the identifier
pub fn is_registered(id: &str) -> bool {
    let factories = FACTORIES.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    factories.contains_key(id)
}

/// Get the shared instance for a provider identifier, instantiating it on first use
pub fn resolve_provider(id: &str) -> Result<Arc<dyn ExpressionFunctionProvider>, RegistryError> {
    {
        let instances = INSTANCES.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(provider) = instances.get(id) {
            return Ok(Arc::clone(provider));
        }
    }

    let factory = {
        let factories = FACTORIES.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        match factories.get(id) {
            Some(factory) => *factory,
            None => {
                return Err(RegistryError::UnknownProvider {
                    id: id.to_string(),
                    known: factories.keys().cloned().collect::<Vec<_>>().join(", "),
                })
            }
        }
    };

    // Another thread may have won the race between the two locks; the entry
    // API keeps whichever instance landed first.
    let mut instances = INSTANCES.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    let provider = instances.entry(id.to_string()).or_insert_with(|| {
        log::debug!("instantiating expression provider \"{}\"", id);
        factory()
    });
    Ok(Arc::clone(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct RegistryTestProvider;

    impl ExpressionFunctionProvider for RegistryTestProvider {
        fn id(&self) -> &str {
            "tests.registry"
        }

        fn definitions(&self) -> Vec<String> {
            vec!["def registry_probe: 1;".to_string()]
        }
    }

    fn registry_test_provider() -> Arc<dyn ExpressionFunctionProvider> {
        Arc::new(RegistryTestProvider)
    }

    #[test]
    fn test_builtin_provider_is_known() {
        assert!(is_registered(StringsProvider::ID));
        assert!(registered_providers().contains(&StringsProvider::ID.to_string()));
    }

    #[test]
    fn test_registration_is_idempotent_and_resolution_memoized() {
        register_provider_factory("tests.registry", registry_test_provider);
        assert!(!register_provider_factory("tests.registry", registry_test_provider));

        let first = resolve_provider("tests.registry").unwrap();
        let second = resolve_provider("tests.registry").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.id(), "tests.registry");
    }

    #[test]
    fn test_unknown_provider() {
        let error = resolve_provider("tests.missing").unwrap_err();
        assert!(error.to_string().contains("tests.missing"));
    }

    #[test]
    fn test_concurrent_first_use_yields_one_instance() {
        fn concurrent_provider() -> Arc<dyn ExpressionFunctionProvider> {
            Arc::new(RegistryTestProvider)
        }
        register_provider_factory("tests.registry.concurrent", concurrent_provider);

        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| resolve_provider("tests.registry.concurrent").unwrap()))
            .collect();
        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for instance in &instances[1..] {
            assert!(Arc::ptr_eq(&instances[0], instance));
        }
    }
}
