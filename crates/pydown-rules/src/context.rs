//! Per-run rewrite state

use pydown_core::logging;
use pydown_core::Location;
use serde::Deserialize;

/// Options that shape what the rules rewrite
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    /// Modules that only exist as 3.5+ polyfills; imports of them are dropped
    pub polyfill_modules: Vec<String>,
    /// A class whose single base name contains this is a named tuple
    pub named_tuple_marker: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            polyfill_modules: vec!["typing".to_string()],
            named_tuple_marker: "NamedTuple".to_string(),
        }
    }
}

impl RewriteOptions {
    /// Whether `module` is a polyfill module or a submodule of one
    pub fn is_polyfill(&self, module: &str) -> bool {
        self.polyfill_modules.iter().any(|polyfill| {
            module == polyfill
                || module
                    .strip_prefix(polyfill.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

/// A rewrite applied by a rule
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub rule: &'static str,
    pub location: Location,
    pub message: String,
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: [{}] {}", self.location.line, self.rule, self.message)
    }
}

/// State threaded through one [`crate::Rewriter::rewrite`] call
#[derive(Debug, Default)]
pub struct RewriteContext {
    options: RewriteOptions,
    needs_namedtuple: bool,
    changes: Vec<Change>,
}

impl RewriteContext {
    pub fn new(options: RewriteOptions) -> Self {
        Self {
            options,
            needs_namedtuple: false,
            changes: Vec::new(),
        }
    }

    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    /// Mark that `from collections import namedtuple` must be added
    pub fn require_namedtuple(&mut self) {
        self.needs_namedtuple = true;
    }

    pub fn needs_namedtuple(&self) -> bool {
        self.needs_namedtuple
    }

    /// Record an applied rewrite
    pub fn record(&mut self, rule: &'static str, location: Location, message: impl Into<String>) {
        let message = message.into();
        logging::log_rewrite(rule, location.line, &message);
        self.changes.push(Change {
            rule,
            location,
            message,
        });
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}
