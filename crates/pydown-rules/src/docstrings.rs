//! Rule: Mark function and class doc strings
//!
//! The first statement of a body that is a bare string is wrapped in
//! [`ExprKind::Doc`], which the unparser always writes as a triple-quoted
//! block instead of an escaped one-line literal.
//!
//! Example:
//! ```python
//! # Before (as rendered without the rule)
//! def f():
//!     'Return one.\n\n    Always.'
//!
//! # After
//! def f():
//!     """Return one.
//!
//!     Always."""
//! ```

use pydown_core::ast::{ExprKind, Stmt, StmtKind};

use crate::context::RewriteContext;
use crate::registry::{Category, Rule};

pub struct DocstringsRule;

impl Rule for DocstringsRule {
    fn name(&self) -> &'static str {
        "docstrings"
    }

    fn description(&self) -> &'static str {
        "Write function and class doc strings as triple-quoted blocks"
    }

    fn category(&self) -> Category {
        Category::Output
    }

    fn exit_stmt(&self, mut stmt: Stmt, ctx: &mut RewriteContext) -> Vec<Stmt> {
        let body = match &mut stmt.kind {
            StmtKind::FunctionDef(def) | StmtKind::AsyncFunctionDef(def) => Some(&mut def.body),
            StmtKind::ClassDef(class) => Some(&mut class.body),
            _ => None,
        };

        if let Some(Stmt {
            kind: StmtKind::Expr(expr),
            ..
        }) = body.and_then(|body| body.first_mut())
        {
            if let ExprKind::Str(text) = &mut expr.kind {
                let text = std::mem::take(text);
                expr.kind = ExprKind::Doc(text);
                ctx.record(self.name(), expr.location, "doc string kept as triple-quoted block");
            }
        }
        vec![stmt]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::apply;

    #[test]
    fn test_function_docstring() {
        let source = "def f():\n    \"\"\"Return one.\n\n    Always.\n    \"\"\"\n    return 1\n";
        let (out, changes) = apply(&DocstringsRule, source);
        assert_eq!(
            out,
            "def f():\n    \"\"\"Return one.\n\n    Always.\n    \"\"\"\n    return 1\n"
        );
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn test_single_line_docstring_is_triple_quoted() {
        let (out, _) = apply(&DocstringsRule, "class C:\n    'Doc.'\n");
        assert_eq!(out, "class C:\n    \"\"\"Doc.\"\"\"\n");
    }

    #[test]
    fn test_string_after_first_statement_untouched() {
        let source = "def f():\n    x = 1\n    'not a doc'\n";
        let (out, changes) = apply(&DocstringsRule, source);
        assert_eq!(out, source);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_module_string_untouched() {
        let (out, changes) = apply(&DocstringsRule, "'module'\n");
        assert_eq!(out, "'module'\n");
        assert!(changes.is_empty());
    }

    #[test]
    fn test_nested_definitions() {
        let source = "class C:\n    'Outer.'\n    def m(self):\n        'Inner.'\n";
        let (out, changes) = apply(&DocstringsRule, source);
        assert_eq!(
            out,
            "class C:\n    \"\"\"Outer.\"\"\"\n    def m(self):\n        \"\"\"Inner.\"\"\"\n"
        );
        assert_eq!(changes.len(), 2);
    }
}
