//! Expression wrapping
//!
//! Expressions are written in the jq dialect implemented by `jaq`. They are
//! parsed and compiled when the specification is normalized, so a broken
//! expression is reported before anything is compiled or emitted. The
//! compiled filter itself is discarded: evaluation belongs to the runtime that
//! consumes the generated transformer, and [`ExpressionHandle`] only records
//! that the text was accepted.
//!
//! A bare name that nothing defines, such as `items` or the `x` in `x > 0`,
//! is read as a variable of the evaluation environment: it resolves to
//! `$items` and is listed by [`ExpressionHandle::environment`]. Explicit
//! `$name` references must still be declared on the language.
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

pub mod providers;
pub mod registry;

pub use providers::StringsProvider;
pub use registry::{
    is_registered, register_provider_factory, registered_providers, resolve_provider,
    ExpressionFunctionProvider, ProviderFactory, RegistryError,
};

use crate::validation::error::{ValidationError, ValidationResult};
use indexmap::IndexMap;
use jaq_core::compile::Undefined;
use jaq_core::{load, Compiler};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Variables in scope of every expression unless configured otherwise
pub const DEFAULT_VARIABLES: &[&str] = &["input", "output"];

/// Expression text that parsed and compiled successfully
#[derive(Clone, PartialEq, Eq)]
pub struct ExpressionHandle {
    source: Arc<str>,
    environment: Arc<[String]>,
}

impl ExpressionHandle {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Bare names the expression reads from the environment, in order of first use
    pub fn environment(&self) -> &[String] {
        &self.environment
    }
}

impl fmt::Debug for ExpressionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExpressionHandle").field(&&*self.source).finish()
    }
}

impl fmt::Display for ExpressionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for ExpressionHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// Expression parser with its declared variables and registered providers
#[derive(Debug, Clone)]
pub struct ExpressionLanguage {
    variables: Vec<String>,
    providers: IndexMap<String, Arc<dyn ExpressionFunctionProvider>>,
}

impl Default for ExpressionLanguage {
    fn default() -> Self {
        Self {
            variables: DEFAULT_VARIABLES.iter().map(|v| v.to_string()).collect(),
            providers: IndexMap::new(),
        }
    }
}

impl ExpressionLanguage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the variables in scope (names without the leading `$`)
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Identifiers of the registered providers, in registration order
    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn has_provider(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Register a provider instance; returns `false` if its identifier was already registered
    pub fn register(&mut self, provider: Arc<dyn ExpressionFunctionProvider>) -> bool {
        let id = provider.id().to_string();
        if self.providers.contains_key(&id) {
            return false;
        }
        log::debug!("registering expression provider \"{}\"", id);
        self.providers.insert(id, provider);
        true
    }

    /// Resolve a provider through the process-wide registry and register it
    pub fn register_provider(&mut self, id: &str) -> ValidationResult<bool> {
        if self.providers.contains_key(id) {
            return Ok(false);
        }
        let provider = resolve_provider(id)
            .map_err(|e| ValidationError::provider("$.expression_language", id, &e.to_string()))?;
        self.providers.insert(id.to_string(), provider);
        log::debug!("registering expression provider \"{}\"", id);
        Ok(true)
    }

    /// Copy of this language with the given providers registered as well
    pub fn with_providers<I, S>(&self, ids: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut language = self.clone();
        for id in ids {
            language.register_provider(id.as_ref())?;
        }
        Ok(language)
    }

    /// Parse expression text into a handle
    ///
    /// Errors are reported at the root path; callers re-anchor them with
    /// [`ValidationError::at`].
    pub fn wrap(&self, text: &str) -> ValidationResult<ExpressionHandle> {
        if text.trim().is_empty() {
            return Err(ValidationError::expression_parse("$", text, "expression is empty"));
        }

        let program = self.program(text);
        let environment = compile_program(&program, &self.variables)
            .map_err(|reason| ValidationError::expression_parse("$", text, &reason))?;

        Ok(ExpressionHandle {
            source: Arc::from(text),
            environment: Arc::from(environment),
        })
    }

    /// Whether the text would be accepted by [`wrap`](Self::wrap)
    pub fn is_valid(&self, text: &str) -> bool {
        self.wrap(text).is_ok()
    }

    fn program(&self, text: &str) -> String {
        let mut program = String::new();
        for provider in self.providers.values() {
            for definition in provider.definitions() {
                program.push_str(&definition);
                program.push('\n');
            }
        }
        program.push_str(text);
        program
    }
}

enum CompileFailure {
    Syntax(String),
    Unresolved(Vec<(String, Undefined)>),
}

/// Compile `code`; bare names nothing defines become environment variables
///
/// Returns those names. Any other unresolved symbol is an error.
fn compile_program(code: &str, variables: &[String]) -> Result<Vec<String>, String> {
    let unresolved = match compile_once(code, variables, &[]) {
        Ok(()) => return Ok(Vec::new()),
        Err(CompileFailure::Syntax(reason)) => return Err(reason),
        Err(CompileFailure::Unresolved(unresolved)) => unresolved,
    };

    let mut environment: Vec<String> = Vec::new();
    let mut undefined = Vec::new();
    for (name, kind) in unresolved {
        match kind {
            Undefined::Filter(0) if is_identifier(&name) => {
                if !environment.contains(&name) {
                    environment.push(name);
                }
            }
            kind => undefined.push((name, kind)),
        }
    }
    if !undefined.is_empty() {
        return Err(describe_unresolved(undefined));
    }

    log::trace!("binding environment names {:?}", environment);
    match compile_once(code, variables, &environment) {
        Ok(()) => Ok(environment),
        Err(CompileFailure::Syntax(reason)) => Err(reason),
        Err(CompileFailure::Unresolved(unresolved)) => Err(describe_unresolved(unresolved)),
    }
}

fn compile_once(code: &str, variables: &[String], environment: &[String]) -> Result<(), CompileFailure> {
    let mut source: String = environment.iter().map(|name| format!("def {0}: ${0};\n", name)).collect();
    source.push_str(code);

    let globals: Vec<String> = variables
        .iter()
        .chain(environment.iter().filter(|name| !variables.contains(name)))
        .map(|name| format!("${}", name))
        .collect();
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: source.as_str(), path: () };

    let modules = loader.load(&arena, program).map_err(|errs| {
        CompileFailure::Syntax(
            errs.into_iter()
                .map(|(_, err)| format!("parse error: {:?}", err))
                .collect::<Vec<_>>()
                .join("; "),
        )
    })?;

    Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .with_global_vars(globals.iter().map(|name| name.as_str()))
        .compile(modules)
        .map(|_filter| ())
        .map_err(|errs| {
            CompileFailure::Unresolved(
                errs.into_iter()
                    .flat_map(|(_, undefined)| undefined)
                    .map(|(name, kind)| (name.to_string(), kind))
                    .collect(),
            )
        })
}

fn describe_unresolved(unresolved: Vec<(String, Undefined)>) -> String {
    unresolved
        .into_iter()
        .map(|(name, kind)| format!("undefined `{}`: {:?}", name, kind))
        .collect::<Vec<_>>()
        .join("; ")
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_accepts_valid_expressions() {
        let language = ExpressionLanguage::new();
        for text in [".x + 1", ".x > 0", ".items", ".items[] | .id", "$input | .id", "{id: .id}"] {
            let handle = language.wrap(text).unwrap();
            assert_eq!(handle.source(), text);
        }
    }

    #[test]
    fn test_wrap_rejects_invalid_expressions() {
        let language = ExpressionLanguage::new();
        for text in [".x +", "(", "", "   ", "no_such_function(1)", "$nowhere"] {
            let error = language.wrap(text).unwrap_err();
            assert_eq!(error.kind, crate::ErrorKind::ExpressionParse, "{}", text);
        }
    }

    #[test]
    fn test_bare_names_read_the_environment() {
        let language = ExpressionLanguage::new();

        let handle = language.wrap("items").unwrap();
        assert_eq!(handle.environment(), ["items"]);

        let handle = language.wrap("x>0 and (x < limit or x == 0)").unwrap();
        let mut names = handle.environment().to_vec();
        names.sort();
        assert_eq!(names, vec!["limit", "x"]);

        // Defined names stay functions, declared variables stay variables
        let handle = language.wrap("$input | .items | length").unwrap();
        assert!(handle.environment().is_empty());
        let handle = language.wrap("input").unwrap();
        assert!(handle.environment().is_empty());

        // A bare name called with arguments is still an unknown function
        assert!(!language.is_valid("items(1)"));
        assert!(!language.is_valid("x > 0 | nope(.)"));
    }

    #[test]
    fn test_undeclared_variable_is_rejected() {
        let language = ExpressionLanguage::new().with_variables(["input"]);
        assert!(language.is_valid("$input"));
        assert!(!language.is_valid("$output"));
    }

    #[test]
    fn test_builtin_provider_functions() {
        let plain = ExpressionLanguage::new();
        let language = plain.with_providers([StringsProvider::ID]).unwrap();
        assert!(language.is_valid(".name | upper"));
        assert!(language.is_valid(".name | default_to(\"n/a\")"));
        assert!(!plain.has_provider(StringsProvider::ID));
    }

    #[test]
    fn test_register_provider_is_idempotent() {
        let mut language = ExpressionLanguage::new();
        assert!(language.register_provider(StringsProvider::ID).unwrap());
        assert!(!language.register_provider(StringsProvider::ID).unwrap());
        assert!(!language.register(StringsProvider::shared()));
        assert_eq!(language.providers().collect::<Vec<_>>(), vec![StringsProvider::ID]);
    }

    #[test]
    fn test_unknown_provider_is_a_provider_error() {
        let error = ExpressionLanguage::new().with_providers(["tests.unknown"]).unwrap_err();
        assert_eq!(error.kind, crate::ErrorKind::Provider);
        assert_eq!(error.path, "$.expression_language");
    }

    #[test]
    fn test_handle_serializes_as_text() {
        let handle = ExpressionLanguage::new().wrap(".a").unwrap();
        assert_eq!(serde_json::to_value(&handle).unwrap(), serde_json::json!(".a"));
        assert_eq!(format!("{:?}", handle), "ExpressionHandle(\".a\")");
    }
}
