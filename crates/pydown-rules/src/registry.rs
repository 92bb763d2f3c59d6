//! Rule trait and registry for pydown rewrite rules

use pydown_core::ast::{Expr, Module, Stmt};
use pydown_core::RewriteError;
use std::collections::HashSet;

use crate::context::{RewriteContext, RewriteOptions};
use crate::rewriter::{RewriteOutcome, Rewriter};

/// Rule categories for grouping in `--list-rules`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Imports of modules the older runtime lacks
    Imports,
    /// Variable and function annotations
    Annotations,
    /// Syntax that has to be spelled differently
    Syntax,
    /// Changes that only affect how the output is written
    Output,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Imports => "imports",
            Category::Annotations => "annotations",
            Category::Syntax => "syntax",
            Category::Output => "output",
        }
    }
}

/// A rewrite rule applied while the tree is traversed
///
/// Every hook has a pass-through default, so a rule only overrides the node
/// kinds it rewrites. `exit_*` hooks run after the node's children have been
/// rewritten; `enter_stmt` runs before.
pub trait Rule: Send + Sync {
    /// The unique identifier for this rule (e.g., "fstrings")
    fn name(&self) -> &'static str;

    /// A short description of what this rule does
    fn description(&self) -> &'static str;

    fn category(&self) -> Category {
        Category::Syntax
    }

    /// Rewrite a statement before its children are visited
    fn enter_stmt(&self, stmt: Stmt, _ctx: &mut RewriteContext) -> Vec<Stmt> {
        vec![stmt]
    }

    /// Rewrite a statement after its children are visited
    fn exit_stmt(&self, stmt: Stmt, _ctx: &mut RewriteContext) -> Vec<Stmt> {
        vec![stmt]
    }

    /// Rewrite an expression after its children are visited
    fn exit_expr(&self, expr: Expr, _ctx: &mut RewriteContext) -> Expr {
        expr
    }

    /// Final pass over the fully rewritten module
    fn finish_module(&self, module: Module, _ctx: &mut RewriteContext) -> Module {
        module
    }
}

/// Registry of all available rewrite rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        let mut registry = Self { rules: Vec::new() };

        registry.register(Box::new(super::typing_imports::TypingImportsRule));
        registry.register(Box::new(super::variable_annotations::VariableAnnotationsRule));
        registry.register(Box::new(super::function_annotations::FunctionAnnotationsRule));
        registry.register(Box::new(super::named_tuple::NamedTupleRule));
        registry.register(Box::new(super::fstrings::FStringsRule));
        registry.register(Box::new(super::docstrings::DocstringsRule));

        registry
    }

    /// Register a new rule
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Get all rule names
    pub fn all_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.as_ref())
    }

    /// Get rules filtered by enabled names, in registration order
    pub fn get_enabled(&self, enabled: &HashSet<String>) -> Vec<&dyn Rule> {
        self.rules
            .iter()
            .filter(|r| enabled.contains(r.name()))
            .map(|r| r.as_ref())
            .collect()
    }

    /// Get all rules with their categories and descriptions (for --list-rules)
    pub fn list_rules(&self) -> Vec<(&'static str, Category, &'static str)> {
        self.rules
            .iter()
            .map(|r| (r.name(), r.category(), r.description()))
            .collect()
    }

    /// Rewrite a module with the enabled rules
    pub fn rewrite_all(
        &self,
        module: Module,
        enabled: &HashSet<String>,
        options: RewriteOptions,
    ) -> Result<RewriteOutcome, RewriteError> {
        Rewriter::new(self.get_enabled(enabled), options).rewrite(module)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_builtin_rules() {
        let registry = RuleRegistry::new();
        assert_eq!(
            registry.all_names(),
            vec![
                "typing_imports",
                "variable_annotations",
                "function_annotations",
                "named_tuple",
                "fstrings",
                "docstrings",
            ]
        );
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_get_enabled_keeps_registration_order() {
        let registry = RuleRegistry::new();
        let enabled: HashSet<String> = ["docstrings", "typing_imports"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let names: Vec<_> = registry
            .get_enabled(&enabled)
            .iter()
            .map(|r| r.name())
            .collect();
        assert_eq!(names, vec!["typing_imports", "docstrings"]);
    }

    #[test]
    fn test_list_rules_has_descriptions() {
        let registry = RuleRegistry::new();
        for (name, _, description) in registry.list_rules() {
            assert!(!description.is_empty(), "{} has no description", name);
        }
        assert!(registry.get("named_tuple").is_some());
        assert!(registry.get("walrus").is_none());
    }
}
