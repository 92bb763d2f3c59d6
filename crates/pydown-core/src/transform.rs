//! Owning tree transformer for Python syntax trees
//!
//! Provides a trait-based transformer that rewriters implement. Default
//! implementations rebuild every child slot through the `walk_*` functions;
//! implementors override specific methods and call the matching `walk_*`
//! function to keep descending.

use crate::ast::*;

/// Trait for rewriting a syntax tree node by node
///
/// Statements map to a `Vec<Stmt>` so a transformer can drop a statement
/// (empty vec) or expand it into several.
pub trait Transformer {
    type Error;

    /// Transform a module (entry point)
    fn visit_module(&mut self, module: Module) -> Result<Module, Self::Error> {
        walk_module(self, module)
    }

    /// Transform a statement list such as a function or loop body
    fn visit_body(&mut self, body: Vec<Stmt>) -> Result<Vec<Stmt>, Self::Error> {
        walk_body(self, body)
    }

    /// Transform a statement and its children
    fn visit_stmt(&mut self, stmt: Stmt) -> Result<Vec<Stmt>, Self::Error> {
        Ok(vec![walk_stmt(self, stmt)?])
    }

    /// Transform an expression and its children
    fn visit_expr(&mut self, expr: Expr) -> Result<Expr, Self::Error> {
        walk_expr(self, expr)
    }

    /// Transform a parameter list
    fn visit_arguments(&mut self, args: Arguments) -> Result<Arguments, Self::Error> {
        walk_arguments(self, args)
    }
}

pub fn walk_module<T: Transformer + ?Sized>(t: &mut T, module: Module) -> Result<Module, T::Error> {
    Ok(Module {
        body: t.visit_body(module.body)?,
    })
}

pub fn walk_body<T: Transformer + ?Sized>(t: &mut T, body: Vec<Stmt>) -> Result<Vec<Stmt>, T::Error> {
    let mut out = Vec::with_capacity(body.len());
    for stmt in body {
        out.extend(t.visit_stmt(stmt)?);
    }
    Ok(out)
}

fn walk_opt<T: Transformer + ?Sized>(t: &mut T, expr: Option<Expr>) -> Result<Option<Expr>, T::Error> {
    expr.map(|e| t.visit_expr(e)).transpose()
}

fn walk_exprs<T: Transformer + ?Sized>(t: &mut T, exprs: Vec<Expr>) -> Result<Vec<Expr>, T::Error> {
    exprs.into_iter().map(|e| t.visit_expr(e)).collect()
}

fn walk_boxed<T: Transformer + ?Sized>(t: &mut T, expr: Box<Expr>) -> Result<Box<Expr>, T::Error> {
    Ok(Box::new(t.visit_expr(*expr)?))
}

fn walk_function<T: Transformer + ?Sized>(t: &mut T, def: FunctionDef) -> Result<FunctionDef, T::Error> {
    Ok(FunctionDef {
        name: def.name,
        decorators: walk_exprs(t, def.decorators)?,
        args: t.visit_arguments(def.args)?,
        returns: walk_opt(t, def.returns)?,
        body: t.visit_body(def.body)?,
    })
}

fn walk_for<T: Transformer + ?Sized>(t: &mut T, node: For) -> Result<For, T::Error> {
    Ok(For {
        target: t.visit_expr(node.target)?,
        iter: t.visit_expr(node.iter)?,
        body: t.visit_body(node.body)?,
        orelse: t.visit_body(node.orelse)?,
    })
}

fn walk_with<T: Transformer + ?Sized>(t: &mut T, node: With) -> Result<With, T::Error> {
    let mut items = Vec::with_capacity(node.items.len());
    for item in node.items {
        items.push(WithItem {
            context_expr: t.visit_expr(item.context_expr)?,
            optional_vars: walk_opt(t, item.optional_vars)?,
        });
    }
    Ok(With {
        items,
        body: t.visit_body(node.body)?,
    })
}

fn walk_keywords<T: Transformer + ?Sized>(t: &mut T, keywords: Vec<Keyword>) -> Result<Vec<Keyword>, T::Error> {
    keywords
        .into_iter()
        .map(|kw| {
            Ok(Keyword {
                arg: kw.arg,
                value: t.visit_expr(kw.value)?,
            })
        })
        .collect()
}

/// Rebuild a statement with every child transformed
pub fn walk_stmt<T: Transformer + ?Sized>(t: &mut T, stmt: Stmt) -> Result<Stmt, T::Error> {
    let location = stmt.location;
    let kind = match stmt.kind {
        StmtKind::FunctionDef(def) => StmtKind::FunctionDef(walk_function(t, def)?),
        StmtKind::AsyncFunctionDef(def) => StmtKind::AsyncFunctionDef(walk_function(t, def)?),
        StmtKind::ClassDef(class) => StmtKind::ClassDef(ClassDef {
            name: class.name,
            decorators: walk_exprs(t, class.decorators)?,
            bases: walk_exprs(t, class.bases)?,
            keywords: walk_keywords(t, class.keywords)?,
            body: t.visit_body(class.body)?,
        }),
        StmtKind::Return(value) => StmtKind::Return(walk_opt(t, value)?),
        StmtKind::Delete(targets) => StmtKind::Delete(walk_exprs(t, targets)?),
        StmtKind::Assign { targets, value } => StmtKind::Assign {
            targets: walk_exprs(t, targets)?,
            value: t.visit_expr(value)?,
        },
        StmtKind::AugAssign { target, op, value } => StmtKind::AugAssign {
            target: t.visit_expr(target)?,
            op,
            value: t.visit_expr(value)?,
        },
        StmtKind::AnnAssign {
            target,
            annotation,
            value,
            simple,
        } => StmtKind::AnnAssign {
            target: t.visit_expr(target)?,
            annotation: t.visit_expr(annotation)?,
            value: walk_opt(t, value)?,
            simple,
        },
        StmtKind::For(node) => StmtKind::For(walk_for(t, node)?),
        StmtKind::AsyncFor(node) => StmtKind::AsyncFor(walk_for(t, node)?),
        StmtKind::While { test, body, orelse } => StmtKind::While {
            test: t.visit_expr(test)?,
            body: t.visit_body(body)?,
            orelse: t.visit_body(orelse)?,
        },
        StmtKind::If { test, body, orelse } => StmtKind::If {
            test: t.visit_expr(test)?,
            body: t.visit_body(body)?,
            orelse: t.visit_body(orelse)?,
        },
        StmtKind::With(node) => StmtKind::With(walk_with(t, node)?),
        StmtKind::AsyncWith(node) => StmtKind::AsyncWith(walk_with(t, node)?),
        StmtKind::Raise { exc, cause } => StmtKind::Raise {
            exc: walk_opt(t, exc)?,
            cause: walk_opt(t, cause)?,
        },
        StmtKind::Try {
            body,
            handlers,
            orelse,
            finalbody,
        } => {
            let body = t.visit_body(body)?;
            let mut new_handlers = Vec::with_capacity(handlers.len());
            for handler in handlers {
                new_handlers.push(ExceptHandler {
                    type_: walk_opt(t, handler.type_)?,
                    name: handler.name,
                    body: t.visit_body(handler.body)?,
                    location: handler.location,
                });
            }
            StmtKind::Try {
                body,
                handlers: new_handlers,
                orelse: t.visit_body(orelse)?,
                finalbody: t.visit_body(finalbody)?,
            }
        }
        StmtKind::Assert { test, msg } => StmtKind::Assert {
            test: t.visit_expr(test)?,
            msg: walk_opt(t, msg)?,
        },
        StmtKind::Expr(value) => StmtKind::Expr(t.visit_expr(value)?),
        kind @ (StmtKind::Import(_)
        | StmtKind::ImportFrom { .. }
        | StmtKind::Global(_)
        | StmtKind::Nonlocal(_)
        | StmtKind::Pass
        | StmtKind::Break
        | StmtKind::Continue) => kind,
    };
    Ok(Stmt { kind, location })
}

pub fn walk_arguments<T: Transformer + ?Sized>(t: &mut T, args: Arguments) -> Result<Arguments, T::Error> {
    let mut walk_arg = |t: &mut T, arg: Arg| -> Result<Arg, T::Error> {
        Ok(Arg {
            name: arg.name,
            annotation: walk_opt(t, arg.annotation)?,
            location: arg.location,
        })
    };

    let mut positional = Vec::with_capacity(args.args.len());
    for arg in args.args {
        positional.push(walk_arg(t, arg)?);
    }
    let vararg = args.vararg.map(|a| walk_arg(t, a)).transpose()?;
    let mut kwonlyargs = Vec::with_capacity(args.kwonlyargs.len());
    for arg in args.kwonlyargs {
        kwonlyargs.push(walk_arg(t, arg)?);
    }
    let kwarg = args.kwarg.map(|a| walk_arg(t, a)).transpose()?;
    let mut kw_defaults = Vec::with_capacity(args.kw_defaults.len());
    for default in args.kw_defaults {
        kw_defaults.push(walk_opt(t, default)?);
    }

    Ok(Arguments {
        args: positional,
        vararg,
        kwonlyargs,
        kw_defaults,
        kwarg,
        defaults: walk_exprs(t, args.defaults)?,
    })
}

fn walk_generators<T: Transformer + ?Sized>(
    t: &mut T,
    generators: Vec<Comprehension>,
) -> Result<Vec<Comprehension>, T::Error> {
    generators
        .into_iter()
        .map(|gen| {
            Ok(Comprehension {
                target: t.visit_expr(gen.target)?,
                iter: t.visit_expr(gen.iter)?,
                ifs: walk_exprs(t, gen.ifs)?,
                is_async: gen.is_async,
            })
        })
        .collect()
}

fn walk_slice<T: Transformer + ?Sized>(t: &mut T, slice: Slice) -> Result<Slice, T::Error> {
    Ok(match slice {
        Slice::Index(value) => Slice::Index(t.visit_expr(value)?),
        Slice::Slice { lower, upper, step } => Slice::Slice {
            lower: walk_opt(t, lower)?,
            upper: walk_opt(t, upper)?,
            step: walk_opt(t, step)?,
        },
        Slice::ExtSlice(dims) => Slice::ExtSlice(
            dims.into_iter()
                .map(|d| walk_slice(t, d))
                .collect::<Result<_, _>>()?,
        ),
    })
}

/// Rebuild an expression with every child transformed
pub fn walk_expr<T: Transformer + ?Sized>(t: &mut T, expr: Expr) -> Result<Expr, T::Error> {
    let location = expr.location;
    let kind = match expr.kind {
        ExprKind::BoolOp { op, values } => ExprKind::BoolOp {
            op,
            values: walk_exprs(t, values)?,
        },
        ExprKind::BinOp { left, op, right } => ExprKind::BinOp {
            left: walk_boxed(t, left)?,
            op,
            right: walk_boxed(t, right)?,
        },
        ExprKind::UnaryOp { op, operand } => ExprKind::UnaryOp {
            op,
            operand: walk_boxed(t, operand)?,
        },
        ExprKind::Lambda { args, body } => ExprKind::Lambda {
            args: Box::new(t.visit_arguments(*args)?),
            body: walk_boxed(t, body)?,
        },
        ExprKind::IfExp { test, body, orelse } => ExprKind::IfExp {
            test: walk_boxed(t, test)?,
            body: walk_boxed(t, body)?,
            orelse: walk_boxed(t, orelse)?,
        },
        ExprKind::Dict { keys, values } => {
            let mut new_keys = Vec::with_capacity(keys.len());
            for key in keys {
                new_keys.push(walk_opt(t, key)?);
            }
            ExprKind::Dict {
                keys: new_keys,
                values: walk_exprs(t, values)?,
            }
        }
        ExprKind::Set(elts) => ExprKind::Set(walk_exprs(t, elts)?),
        ExprKind::ListComp { elt, generators } => {
            let generators = walk_generators(t, generators)?;
            ExprKind::ListComp {
                elt: walk_boxed(t, elt)?,
                generators,
            }
        }
        ExprKind::SetComp { elt, generators } => {
            let generators = walk_generators(t, generators)?;
            ExprKind::SetComp {
                elt: walk_boxed(t, elt)?,
                generators,
            }
        }
        ExprKind::DictComp {
            key,
            value,
            generators,
        } => {
            let generators = walk_generators(t, generators)?;
            ExprKind::DictComp {
                key: walk_boxed(t, key)?,
                value: walk_boxed(t, value)?,
                generators,
            }
        }
        ExprKind::GeneratorExp { elt, generators } => {
            let generators = walk_generators(t, generators)?;
            ExprKind::GeneratorExp {
                elt: walk_boxed(t, elt)?,
                generators,
            }
        }
        ExprKind::Await(value) => ExprKind::Await(walk_boxed(t, value)?),
        ExprKind::Yield(value) => ExprKind::Yield(value.map(|v| walk_boxed(t, v)).transpose()?),
        ExprKind::YieldFrom(value) => ExprKind::YieldFrom(walk_boxed(t, value)?),
        ExprKind::Compare {
            left,
            ops,
            comparators,
        } => ExprKind::Compare {
            left: walk_boxed(t, left)?,
            ops,
            comparators: walk_exprs(t, comparators)?,
        },
        ExprKind::Call {
            func,
            args,
            keywords,
        } => ExprKind::Call {
            func: walk_boxed(t, func)?,
            args: walk_exprs(t, args)?,
            keywords: walk_keywords(t, keywords)?,
        },
        ExprKind::FormattedValue {
            value,
            conversion,
            format_spec,
        } => ExprKind::FormattedValue {
            value: walk_boxed(t, value)?,
            conversion,
            format_spec: format_spec.map(|s| walk_boxed(t, s)).transpose()?,
        },
        ExprKind::JoinedStr(values) => ExprKind::JoinedStr(walk_exprs(t, values)?),
        ExprKind::Attribute { value, attr } => ExprKind::Attribute {
            value: walk_boxed(t, value)?,
            attr,
        },
        ExprKind::Subscript { value, slice } => ExprKind::Subscript {
            value: walk_boxed(t, value)?,
            slice: Box::new(walk_slice(t, *slice)?),
        },
        ExprKind::Starred(value) => ExprKind::Starred(walk_boxed(t, value)?),
        ExprKind::List(elts) => ExprKind::List(walk_exprs(t, elts)?),
        ExprKind::Tuple(elts) => ExprKind::Tuple(walk_exprs(t, elts)?),
        kind @ (ExprKind::Num(_)
        | ExprKind::Str(_)
        | ExprKind::Bytes(_)
        | ExprKind::NameConstant(_)
        | ExprKind::Ellipsis
        | ExprKind::Constant(_)
        | ExprKind::Name(_)
        | ExprKind::Doc(_)) => kind,
    };
    Ok(Expr { kind, location })
}
