//! Tree rewrite driver
//!
//! [`Rewriter`] walks the module once, applying every enabled rule's hooks
//! at each node. Constructs that have no 3.4 spelling abort the walk with
//! [`RewriteError::Unsupported`] regardless of which rules are enabled.

use pydown_core::ast::*;
use pydown_core::transform::{walk_expr, walk_stmt, Transformer};
use pydown_core::RewriteError;

use crate::context::{Change, RewriteContext, RewriteOptions};
use crate::registry::Rule;

/// Result of a successful rewrite
#[derive(Debug)]
pub struct RewriteOutcome {
    pub module: Module,
    pub changes: Vec<Change>,
}

/// Applies a set of rules to one module
pub struct Rewriter<'r> {
    rules: Vec<&'r dyn Rule>,
    ctx: RewriteContext,
}

impl<'r> Rewriter<'r> {
    pub fn new(rules: Vec<&'r dyn Rule>, options: RewriteOptions) -> Self {
        Self {
            rules,
            ctx: RewriteContext::new(options),
        }
    }

    /// Rewrite a module, failing on the first unsupported construct
    pub fn rewrite(mut self, module: Module) -> Result<RewriteOutcome, RewriteError> {
        let mut module = self.visit_module(module)?;
        for rule in &self.rules {
            module = rule.finish_module(module, &mut self.ctx);
        }
        Ok(RewriteOutcome {
            module,
            changes: self.ctx.into_changes(),
        })
    }
}

fn unsupported(construct: &'static str, location: Location) -> RewriteError {
    RewriteError::Unsupported {
        construct,
        location,
    }
}

fn check_stmt(stmt: &Stmt) -> Result<(), RewriteError> {
    match &stmt.kind {
        StmtKind::AsyncFunctionDef(_) | StmtKind::AsyncFor(_) | StmtKind::AsyncWith(_) => {
            Err(unsupported(stmt.kind_name(), stmt.location))
        }
        StmtKind::AugAssign {
            op: BinOperator::MatMult,
            ..
        } => Err(unsupported("MatMult", stmt.location)),
        _ => Ok(()),
    }
}

fn check_expr(expr: &Expr) -> Result<(), RewriteError> {
    let generators = match &expr.kind {
        ExprKind::Await(_) | ExprKind::Constant(_) => {
            return Err(unsupported(expr.kind_name(), expr.location))
        }
        ExprKind::BinOp {
            op: BinOperator::MatMult,
            ..
        } => return Err(unsupported("MatMult", expr.location)),
        ExprKind::ListComp { generators, .. }
        | ExprKind::SetComp { generators, .. }
        | ExprKind::DictComp { generators, .. }
        | ExprKind::GeneratorExp { generators, .. } => generators,
        _ => return Ok(()),
    };

    if generators.iter().any(|g| g.is_async) {
        return Err(unsupported("AsyncComprehension", expr.location));
    }
    Ok(())
}

impl<'r> Transformer for Rewriter<'r> {
    type Error = RewriteError;

    fn visit_stmt(&mut self, stmt: Stmt) -> Result<Vec<Stmt>, RewriteError> {
        check_stmt(&stmt)?;

        let mut entered = vec![stmt];
        for rule in &self.rules {
            entered = entered
                .into_iter()
                .flat_map(|s| rule.enter_stmt(s, &mut self.ctx))
                .collect();
        }

        let mut out = Vec::with_capacity(entered.len());
        for stmt in entered {
            let mut exited = vec![walk_stmt(self, stmt)?];
            for rule in &self.rules {
                exited = exited
                    .into_iter()
                    .flat_map(|s| rule.exit_stmt(s, &mut self.ctx))
                    .collect();
            }
            out.extend(exited);
        }
        Ok(out)
    }

    fn visit_expr(&mut self, expr: Expr) -> Result<Expr, RewriteError> {
        check_expr(&expr)?;

        let mut expr = walk_expr(self, expr)?;
        for rule in &self.rules {
            expr = rule.exit_expr(expr, &mut self.ctx);
        }
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RuleRegistry;
    use pydown_core::{parse_module, unparse};

    fn rewrite_with_all(source: &str) -> Result<RewriteOutcome, RewriteError> {
        let registry = RuleRegistry::new();
        let module = parse_module(source, "test.py").unwrap();
        let enabled = registry
            .all_names()
            .into_iter()
            .map(String::from)
            .collect();
        registry.rewrite_all(module, &enabled, RewriteOptions::default())
    }

    fn construct(source: &str) -> &'static str {
        match rewrite_with_all(source) {
            Err(RewriteError::Unsupported { construct, .. }) => construct,
            Ok(_) => panic!("expected {:?} to be rejected", source),
        }
    }

    // ==================== Unsupported constructs ====================

    #[test]
    fn test_async_constructs_rejected() {
        assert_eq!(construct("async def f():\n    pass\n"), "AsyncFunctionDef");
        assert_eq!(
            construct("def f():\n    async for x in y:\n        pass\n"),
            "AsyncFor"
        );
        assert_eq!(
            construct("def f():\n    async with x:\n        pass\n"),
            "AsyncWith"
        );
        assert_eq!(construct("def f():\n    await g()\n"), "Await");
        assert_eq!(
            construct("def f():\n    return [x async for x in y]\n"),
            "AsyncComprehension"
        );
    }

    #[test]
    fn test_matmul_rejected() {
        assert_eq!(construct("c = a @ b\n"), "MatMult");
        assert_eq!(construct("a @= b\n"), "MatMult");
    }

    #[test]
    fn test_generic_constant_rejected() {
        let location = Location::new(1, 0);
        let module = Module {
            body: vec![Stmt::new(
                StmtKind::Expr(Expr::new(
                    ExprKind::Constant(Constant::Num("1".to_string())),
                    location,
                )),
                location,
            )],
        };
        let result = Rewriter::new(Vec::new(), RewriteOptions::default()).rewrite(module);
        assert!(matches!(
            result,
            Err(RewriteError::Unsupported {
                construct: "Constant",
                ..
            })
        ));
    }

    #[test]
    fn test_unsupported_checked_even_without_rules() {
        let module = parse_module("x = a @ b\n", "t.py").unwrap();
        let result = Rewriter::new(Vec::new(), RewriteOptions::default()).rewrite(module);
        assert!(result.is_err());
    }

    #[test]
    fn test_unsupported_error_location() {
        let err = rewrite_with_all("x = 1\ny = a @ b\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "MatMult is python3.6 specific and not supported (line 2, column 4)"
        );
    }

    // ==================== Full rewrites ====================

    #[test]
    fn test_already_valid_program_unchanged() {
        let source = "\
import os


def main(argv):
    for arg in argv:
        print('%s' % arg)
    return {'a': 1}
";
        let outcome = rewrite_with_all(source).unwrap();
        assert!(outcome.changes.is_empty());
        assert_eq!(
            unparse(&outcome.module),
            "import os\ndef main(argv):\n    for arg in argv:\n        print('%s' % arg)\n    return {'a': 1}\n"
        );
    }

    #[test]
    fn test_all_rules_together() {
        let source = "\
from typing import NamedTuple, List


class Point(NamedTuple):
    \"\"\"A point.\"\"\"
    x: int
    y: int = 0


def scale(p: Point, k: float = 1.0) -> List[int]:
    total: int = p.x * k
    return [f'{total}']
";
        let outcome = rewrite_with_all(source).unwrap();
        let expected = "\
from collections import namedtuple
class Point(namedtuple('Point', ('x', 'y'))):
    \"\"\"A point.\"\"\"
Point.__new__.__defaults__ = (0,)
def scale(p, k=1.0):
    total = p.x * k
    return ['%s' % (total,)]
";
        assert_eq!(unparse(&outcome.module), expected);

        let rules: Vec<_> = outcome.changes.iter().map(|c| c.rule).collect();
        assert!(rules.contains(&"typing_imports"));
        assert!(rules.contains(&"named_tuple"));
        assert!(rules.contains(&"function_annotations"));
        assert!(rules.contains(&"variable_annotations"));
        assert!(rules.contains(&"fstrings"));
    }
}
