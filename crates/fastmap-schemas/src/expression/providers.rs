//! Built-in expression function providers
//!
//! Copyright (c) 2025 FastMap Team
//! Licensed under the Apache-2.0 license

use super::registry::ExpressionFunctionProvider;
use std::sync::Arc;

/// String helpers, available as `fastmap.strings`
#[derive(Debug, Default)]
pub struct StringsProvider;

impl StringsProvider {
    pub const ID: &'static str = "fastmap.strings";

    pub fn shared() -> Arc<dyn ExpressionFunctionProvider> {
        Arc::new(StringsProvider)
    }
}

impl ExpressionFunctionProvider for StringsProvider {
    fn id(&self) -> &str {
        Self::ID
    }

    fn definitions(&self) -> Vec<String> {
        vec![
            "def upper: ascii_upcase;".to_string(),
            "def lower: ascii_downcase;".to_string(),
            "def blank: . == null or . == \"\";".to_string(),
            "def default_to($fallback): if . == null then $fallback else . end;".to_string(),
        ]
    }
}
