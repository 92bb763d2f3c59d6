//! Rule: Convert annotated assignments to plain assignments
//!
//! Example:
//! ```python
//! # Before
//! count: int = 0
//! name: str
//!
//! # After
//! count = 0
//! name = None
//! ```

use pydown_core::ast::{Expr, Stmt, StmtKind};

use crate::context::RewriteContext;
use crate::registry::{Category, Rule};

pub struct VariableAnnotationsRule;

impl Rule for VariableAnnotationsRule {
    fn name(&self) -> &'static str {
        "variable_annotations"
    }

    fn description(&self) -> &'static str {
        "Convert annotated assignments to plain assignments"
    }

    fn category(&self) -> Category {
        Category::Annotations
    }

    fn exit_stmt(&self, stmt: Stmt, ctx: &mut RewriteContext) -> Vec<Stmt> {
        let location = stmt.location;
        let (target, value) = match stmt.kind {
            StmtKind::AnnAssign { target, value, .. } => (target, value),
            kind => return vec![Stmt::new(kind, location)],
        };

        let value = match value {
            Some(value) => {
                ctx.record(self.name(), location, "removed variable annotation");
                value
            }
            // a bare declaration still has to bind the name
            None => {
                ctx.record(self.name(), location, "declaration replaced by assignment of None");
                Expr::none(location)
            }
        };

        vec![Stmt::new(
            StmtKind::Assign {
                targets: vec![target],
                value,
            },
            location,
        )]
    }
}
