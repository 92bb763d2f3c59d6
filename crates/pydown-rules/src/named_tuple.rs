//! Rule: Convert typed named tuple classes to `collections.namedtuple`
//!
//! Runs on entry to the class so the annotated fields are seen before the
//! annotation rules turn them into plain assignments. Field defaults move to
//! an assignment of `__new__.__defaults__` placed right after the class.
//!
//! Example:
//! ```python
//! # Before
//! class Point(NamedTuple):
//!     x: int
//!     y: int = 0
//!
//! # After
//! from collections import namedtuple
//!
//! class Point(namedtuple('Point', ('x', 'y'))):
//!     pass
//! Point.__new__.__defaults__ = (0,)
//! ```

use pydown_core::ast::*;

use crate::context::RewriteContext;
use crate::registry::Rule;

pub struct NamedTupleRule;

impl NamedTupleRule {
    /// Whether the class's only base names the marker
    fn is_named_tuple(class: &ClassDef, marker: &str) -> bool {
        let [base] = class.bases.as_slice() else {
            return false;
        };
        match &base.kind {
            ExprKind::Name(id) => id.contains(marker),
            ExprKind::Attribute { attr, .. } => attr.contains(marker),
            _ => false,
        }
    }

    fn defaults_assignment(class_name: &str, defaults: Vec<Expr>, location: Location) -> Stmt {
        let target = Expr::new(
            ExprKind::Attribute {
                value: Box::new(Expr::new(
                    ExprKind::Attribute {
                        value: Box::new(Expr::name(class_name, location)),
                        attr: "__new__".to_string(),
                    },
                    location,
                )),
                attr: "__defaults__".to_string(),
            },
            location,
        );
        Stmt::new(
            StmtKind::Assign {
                targets: vec![target],
                value: Expr::new(ExprKind::Tuple(defaults), location),
            },
            location,
        )
    }
}

/// Index right after a leading docstring and `from __future__` imports
fn import_position(body: &[Stmt]) -> usize {
    let mut position = 0;
    if let Some(Stmt {
        kind: StmtKind::Expr(Expr {
            kind: ExprKind::Str(_) | ExprKind::Doc(_),
            ..
        }),
        ..
    }) = body.first()
    {
        position = 1;
    }
    while let Some(Stmt {
        kind: StmtKind::ImportFrom {
            module: Some(module),
            level: 0,
            ..
        },
        ..
    }) = body.get(position)
    {
        if module != "__future__" {
            break;
        }
        position += 1;
    }
    position
}

impl Rule for NamedTupleRule {
    fn name(&self) -> &'static str {
        "named_tuple"
    }

    fn description(&self) -> &'static str {
        "Convert NamedTuple subclasses to collections.namedtuple bases"
    }

    fn enter_stmt(&self, stmt: Stmt, ctx: &mut RewriteContext) -> Vec<Stmt> {
        let location = stmt.location;
        let mut class = match stmt.kind {
            StmtKind::ClassDef(class)
                if Self::is_named_tuple(&class, &ctx.options().named_tuple_marker) =>
            {
                class
            }
            kind => return vec![Stmt::new(kind, location)],
        };

        let mut fields = Vec::new();
        let mut defaults = Vec::new();
        let mut body = Vec::with_capacity(class.body.len());
        for stmt in class.body {
            match stmt.kind {
                StmtKind::AnnAssign {
                    target:
                        Expr {
                            kind: ExprKind::Name(field),
                            location: field_location,
                        },
                    value,
                    ..
                } => {
                    match value {
                        Some(value) => defaults.push(value),
                        // only a trailing run of defaults is kept
                        None => defaults.clear(),
                    }
                    fields.push(Expr::str(field, field_location));
                }
                kind => body.push(Stmt::new(kind, stmt.location)),
            }
        }
        if body.is_empty() {
            body.push(Stmt::pass(location));
        }

        ctx.record(
            self.name(),
            location,
            format!("class {} converted to namedtuple with {} field(s)", class.name, fields.len()),
        );
        ctx.require_namedtuple();

        class.bases = vec![Expr::new(
            ExprKind::Call {
                func: Box::new(Expr::name("namedtuple", location)),
                args: vec![
                    Expr::str(class.name.clone(), location),
                    Expr::new(ExprKind::Tuple(fields), location),
                ],
                keywords: Vec::new(),
            },
            location,
        )];
        class.body = body;

        let mut out = Vec::with_capacity(2);
        let defaults_stmt = (!defaults.is_empty())
            .then(|| Self::defaults_assignment(&class.name, defaults, location));
        out.push(Stmt::new(StmtKind::ClassDef(class), location));
        out.extend(defaults_stmt);
        out
    }

    fn finish_module(&self, mut module: Module, ctx: &mut RewriteContext) -> Module {
        if !ctx.needs_namedtuple() {
            return module;
        }

        let location = Location::new(1, 0);
        let import = Stmt::new(
            StmtKind::ImportFrom {
                module: Some("collections".to_string()),
                names: vec![Alias::new("namedtuple")],
                level: 0,
            },
            location,
        );
        let position = import_position(&module.body);
        module.body.insert(position, import);
        ctx.record(self.name(), location, "added import of collections.namedtuple");
        module
    }
}
