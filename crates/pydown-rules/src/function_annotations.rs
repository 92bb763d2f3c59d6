//! Rule: Strip function annotations
//!
//! Removes the annotation of every parameter (positional, `*args`,
//! keyword-only and `**kwargs`) and the return annotation.
//!
//! Example:
//! ```python
//! # Before
//! def greet(name: str, *, loud: bool = False) -> str:
//!     ...
//!
//! # After
//! def greet(name, *, loud=False):
//!     ...
//! ```

use pydown_core::ast::{FunctionDef, Stmt, StmtKind};

use crate::context::RewriteContext;
use crate::registry::{Category, Rule};

pub struct FunctionAnnotationsRule;

/// Remove all annotations, returning how many were removed
fn strip(def: &mut FunctionDef) -> usize {
    let mut removed = 0;
    for arg in def.args.iter_mut() {
        if arg.annotation.take().is_some() {
            removed += 1;
        }
    }
    if def.returns.take().is_some() {
        removed += 1;
    }
    removed
}

impl Rule for FunctionAnnotationsRule {
    fn name(&self) -> &'static str {
        "function_annotations"
    }

    fn description(&self) -> &'static str {
        "Strip parameter and return annotations"
    }

    fn category(&self) -> Category {
        Category::Annotations
    }

    fn exit_stmt(&self, mut stmt: Stmt, ctx: &mut RewriteContext) -> Vec<Stmt> {
        if let StmtKind::FunctionDef(def) | StmtKind::AsyncFunctionDef(def) = &mut stmt.kind {
            let removed = strip(def);
            if removed > 0 {
                let message = format!("removed {} annotation(s) from {}", removed, def.name);
                ctx.record(self.name(), stmt.location, message);
            }
        }
        vec![stmt]
    }
}
