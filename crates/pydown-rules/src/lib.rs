//! pydown-rules: Rewrite rules from Python 3.6 down to Python 3.4
//!
//! Available rules:
//! - typing_imports: Drop imports of polyfill modules such as `typing`
//! - variable_annotations: Convert `x: T = v` to `x = v`
//! - function_annotations: Strip parameter and return annotations
//! - named_tuple: Convert `class C(NamedTuple)` to a `namedtuple(...)` base
//! - fstrings: Convert f-strings to `%` formatting
//! - docstrings: Keep function and class doc strings as triple-quoted blocks

pub mod context;
pub mod docstrings;
pub mod fstrings;
pub mod function_annotations;
pub mod named_tuple;
pub mod registry;
pub mod rewriter;
pub mod typing_imports;
pub mod variable_annotations;

pub use context::{Change, RewriteContext, RewriteOptions};
pub use registry::{Category, Rule, RuleRegistry};
pub use rewriter::{RewriteOutcome, Rewriter};

#[cfg(test)]
pub(crate) mod test_utils {
    use pydown_core::{parse_module, unparse};

    use crate::context::{Change, RewriteOptions};
    use crate::registry::Rule;
    use crate::rewriter::Rewriter;

    /// Rewrite `source` with a single rule and render the result
    pub fn apply(rule: &dyn Rule, source: &str) -> (String, Vec<Change>) {
        apply_with(rule, source, RewriteOptions::default())
    }

    pub fn apply_with(rule: &dyn Rule, source: &str, options: RewriteOptions) -> (String, Vec<Change>) {
        let module = parse_module(source, "test.py").unwrap();
        let outcome = Rewriter::new(vec![rule], options).rewrite(module).unwrap();
        (unparse(&outcome.module), outcome.changes)
    }
}
