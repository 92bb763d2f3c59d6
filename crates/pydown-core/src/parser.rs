//! Python 3.6 source to syntax tree
//!
//! Parses with tree-sitter-python and lowers the concrete tree into the owned
//! [`crate::ast`] node set. Syntax the 3.6 grammar does not have (walrus,
//! positional-only parameters, `match`, `except*`, ...) is reported as a
//! [`ParseError`] rather than lowered.

use tree_sitter::{Node, Parser};

use crate::ast::*;
use crate::error::ParseError;

type PResult<T> = Result<T, ParseError>;

/// Parse a module from source text
///
/// `path` is only used to label errors.
pub fn parse_module(source: &str, path: &str) -> PResult<Module> {
    let normalized;
    let source = if source.contains('\r') {
        normalized = source.replace("\r\n", "\n");
        normalized.as_str()
    } else {
        source
    };

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ParseError::new(path, Location::default(), e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::new(path, Location::default(), "parser produced no tree"))?;
    let root = tree.root_node();

    if root.has_error() {
        let lowering = Lowering { source, path };
        return Err(match first_error(root) {
            Some(node) if node.is_missing() => {
                lowering.error(node, format!("invalid syntax: expected '{}'", node.kind()))
            }
            Some(node) => lowering.error(node, "invalid syntax"),
            None => lowering.error(root, "invalid syntax"),
        });
    }

    let lowering = Lowering { source, path };
    Ok(Module {
        body: lowering.body(root)?,
    })
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Children that are not comments or line continuations
fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).filter(|c| !c.is_extra()).collect()
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !c.is_extra())
        .collect()
}

fn fields<'t>(node: Node<'t>, name: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(name, &mut cursor).collect()
}

/// Whether the node has an anonymous child token of the given kind
fn has_token(node: Node<'_>, kind: &str) -> bool {
    children(node)
        .iter()
        .any(|c| !c.is_named() && c.kind() == kind)
}

/// Quote prefix flags of a string literal
#[derive(Debug, Clone, Copy, Default)]
struct StringFlags {
    raw: bool,
    bytes: bool,
    formatted: bool,
}

enum Piece {
    Text(String),
    Bytes(Vec<u8>),
    Value(Expr),
}

struct Lowering<'a> {
    source: &'a str,
    path: &'a str,
}

impl<'a> Lowering<'a> {
    fn text(&self, node: Node<'_>) -> &'a str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    fn loc(&self, node: Node<'_>) -> Location {
        let point = node.start_position();
        Location::new(point.row + 1, point.column)
    }

    fn error(&self, node: Node<'_>, message: impl Into<String>) -> ParseError {
        ParseError::new(self.path, self.loc(node), message)
    }

    fn field<'t>(&self, node: Node<'t>, name: &str) -> PResult<Node<'t>> {
        node.child_by_field_name(name).ok_or_else(|| {
            self.error(node, format!("malformed {}: missing {}", node.kind(), name))
        })
    }

    fn first_named<'t>(&self, node: Node<'t>) -> PResult<Node<'t>> {
        named_children(node)
            .into_iter()
            .next()
            .ok_or_else(|| self.error(node, format!("malformed {}", node.kind())))
    }

    fn not_supported(&self, node: Node<'_>, what: &str) -> ParseError {
        self.error(node, format!("{} is not valid python 3.6 syntax", what))
    }

    // ==================== Statements ====================

    fn body(&self, node: Node<'_>) -> PResult<Vec<Stmt>> {
        named_children(node)
            .into_iter()
            .map(|child| self.stmt(child))
            .collect()
    }

    fn optional_else(&self, node: Node<'_>) -> PResult<Vec<Stmt>> {
        match node.child_by_field_name("alternative") {
            Some(clause) => self.body(self.field(clause, "body")?),
            None => Ok(Vec::new()),
        }
    }

    fn stmt(&self, node: Node<'_>) -> PResult<Stmt> {
        let location = self.loc(node);
        let kind = match node.kind() {
            "expression_statement" => self.expression_statement(node)?,
            "return_statement" => StmtKind::Return(
                named_children(node)
                    .first()
                    .map(|value| self.expr(*value))
                    .transpose()?,
            ),
            "delete_statement" => {
                let target = self.first_named(node)?;
                let targets = if target.kind() == "expression_list" {
                    self.exprs(named_children(target))?
                } else {
                    vec![self.expr(target)?]
                };
                StmtKind::Delete(targets)
            }
            "raise_statement" => {
                let cause = node.child_by_field_name("cause");
                let exc = named_children(node)
                    .into_iter()
                    .find(|c| Some(c.id()) != cause.map(|n| n.id()));
                StmtKind::Raise {
                    exc: exc.map(|e| self.expr(e)).transpose()?,
                    cause: cause.map(|c| self.expr(c)).transpose()?,
                }
            }
            "pass_statement" => StmtKind::Pass,
            "break_statement" => StmtKind::Break,
            "continue_statement" => StmtKind::Continue,
            "global_statement" => StmtKind::Global(self.identifiers(node)),
            "nonlocal_statement" => StmtKind::Nonlocal(self.identifiers(node)),
            "assert_statement" => {
                let parts = named_children(node);
                let test = parts
                    .first()
                    .ok_or_else(|| self.error(node, "malformed assert"))?;
                StmtKind::Assert {
                    test: self.expr(*test)?,
                    msg: parts.get(1).map(|m| self.expr(*m)).transpose()?,
                }
            }
            "import_statement" => StmtKind::Import(
                fields(node, "name")
                    .into_iter()
                    .map(|n| self.alias(n))
                    .collect::<PResult<_>>()?,
            ),
            "import_from_statement" => self.import_from(node)?,
            "future_import_statement" => StmtKind::ImportFrom {
                module: Some("__future__".to_string()),
                names: fields(node, "name")
                    .into_iter()
                    .map(|n| self.alias(n))
                    .collect::<PResult<_>>()?,
                level: 0,
            },
            "if_statement" => self.if_statement(node)?,
            "for_statement" => {
                let target = self.expr(self.field(node, "left")?)?;
                let iter = self.expr(self.field(node, "right")?)?;
                let body = self.body(self.field(node, "body")?)?;
                let orelse = self.optional_else(node)?;
                let stmt = For {
                    target,
                    iter,
                    body,
                    orelse,
                };
                if has_token(node, "async") {
                    StmtKind::AsyncFor(stmt)
                } else {
                    StmtKind::For(stmt)
                }
            }
            "while_statement" => StmtKind::While {
                test: self.expr(self.field(node, "condition")?)?,
                body: self.body(self.field(node, "body")?)?,
                orelse: self.optional_else(node)?,
            },
            "try_statement" => self.try_statement(node)?,
            "with_statement" => self.with_statement(node)?,
            "function_definition" => self.function(node, Vec::new())?,
            "class_definition" => self.class(node, Vec::new())?,
            "decorated_definition" => {
                let decorators = named_children(node)
                    .into_iter()
                    .filter(|c| c.kind() == "decorator")
                    .map(|d| self.expr(self.first_named(d)?))
                    .collect::<PResult<Vec<_>>>()?;
                let definition = self.field(node, "definition")?;
                match definition.kind() {
                    "function_definition" => self.function(definition, decorators)?,
                    "class_definition" => self.class(definition, decorators)?,
                    other => {
                        return Err(self.error(definition, format!("cannot decorate {}", other)))
                    }
                }
            }
            "print_statement" => return Err(self.not_supported(node, "print statement")),
            "exec_statement" => return Err(self.not_supported(node, "exec statement")),
            "match_statement" => return Err(self.not_supported(node, "match statement")),
            "type_alias_statement" => return Err(self.not_supported(node, "type alias")),
            other => return Err(self.error(node, format!("unexpected statement '{}'", other))),
        };
        Ok(Stmt::new(kind, location))
    }

    fn identifiers(&self, node: Node<'_>) -> Vec<String> {
        named_children(node)
            .into_iter()
            .map(|n| self.text(n).to_string())
            .collect()
    }

    fn expression_statement(&self, node: Node<'_>) -> PResult<StmtKind> {
        let parts = named_children(node);
        match parts.as_slice() {
            [single] if !has_token(node, ",") => match single.kind() {
                "assignment" => self.assignment(*single),
                "augmented_assignment" => {
                    let operator = self.field(*single, "operator")?;
                    let op = BinOperator::from_token(operator.kind().trim_end_matches('='))
                        .ok_or_else(|| {
                            self.error(operator, format!("unknown operator '{}'", operator.kind()))
                        })?;
                    Ok(StmtKind::AugAssign {
                        target: self.expr(self.field(*single, "left")?)?,
                        op,
                        value: self.expr(self.field(*single, "right")?)?,
                    })
                }
                _ => Ok(StmtKind::Expr(self.expr(*single)?)),
            },
            _ => Ok(StmtKind::Expr(Expr::new(
                ExprKind::Tuple(self.exprs(parts)?),
                self.loc(node),
            ))),
        }
    }

    fn assignment(&self, node: Node<'_>) -> PResult<StmtKind> {
        let left = self.field(node, "left")?;

        if let Some(annotation) = node.child_by_field_name("type") {
            let value = node
                .child_by_field_name("right")
                .map(|r| self.expr(r))
                .transpose()?;
            return Ok(StmtKind::AnnAssign {
                target: self.expr(left)?,
                annotation: self.expr(annotation)?,
                value,
                simple: left.kind() == "identifier",
            });
        }

        let mut targets = vec![self.expr(left)?];
        let mut right = self.field(node, "right")?;
        while right.kind() == "assignment" {
            if right.child_by_field_name("type").is_some() {
                return Err(self.error(right, "invalid syntax: annotated chained assignment"));
            }
            targets.push(self.expr(self.field(right, "left")?)?);
            right = self.field(right, "right")?;
        }
        if right.kind() == "augmented_assignment" {
            return Err(self.error(right, "invalid syntax: augmented assignment in chain"));
        }

        Ok(StmtKind::Assign {
            targets,
            value: self.expr(right)?,
        })
    }

    fn dotted(&self, node: Node<'_>) -> String {
        if node.kind() == "dotted_name" {
            named_children(node)
                .into_iter()
                .map(|n| self.text(n))
                .collect::<Vec<_>>()
                .join(".")
        } else {
            self.text(node).to_string()
        }
    }

    fn alias(&self, node: Node<'_>) -> PResult<Alias> {
        match node.kind() {
            "aliased_import" => Ok(Alias {
                name: self.dotted(self.field(node, "name")?),
                asname: Some(self.text(self.field(node, "alias")?).to_string()),
            }),
            "dotted_name" | "identifier" => Ok(Alias::new(self.dotted(node))),
            other => Err(self.error(node, format!("unexpected import name '{}'", other))),
        }
    }

    fn import_from(&self, node: Node<'_>) -> PResult<StmtKind> {
        let module_node = self.field(node, "module_name")?;
        let (module, level) = if module_node.kind() == "relative_import" {
            let mut module = None;
            let mut level = 0;
            for child in named_children(module_node) {
                match child.kind() {
                    "import_prefix" => level = self.text(child).matches('.').count(),
                    "dotted_name" => module = Some(self.dotted(child)),
                    _ => {}
                }
            }
            (module, level)
        } else {
            (Some(self.dotted(module_node)), 0)
        };

        let names = if named_children(node)
            .iter()
            .any(|c| c.kind() == "wildcard_import")
        {
            vec![Alias::new("*")]
        } else {
            fields(node, "name")
                .into_iter()
                .map(|n| self.alias(n))
                .collect::<PResult<_>>()?
        };

        Ok(StmtKind::ImportFrom {
            module,
            names,
            level,
        })
    }

    fn if_statement(&self, node: Node<'_>) -> PResult<StmtKind> {
        let test = self.expr(self.field(node, "condition")?)?;
        let body = self.body(self.field(node, "consequence")?)?;

        // elif chains become nested ifs in the else branch
        let mut orelse = Vec::new();
        for clause in fields(node, "alternative").into_iter().rev() {
            match clause.kind() {
                "else_clause" => orelse = self.body(self.field(clause, "body")?)?,
                "elif_clause" => {
                    let nested = StmtKind::If {
                        test: self.expr(self.field(clause, "condition")?)?,
                        body: self.body(self.field(clause, "consequence")?)?,
                        orelse: std::mem::take(&mut orelse),
                    };
                    orelse = vec![Stmt::new(nested, self.loc(clause))];
                }
                other => return Err(self.error(clause, format!("unexpected clause '{}'", other))),
            }
        }

        Ok(StmtKind::If { test, body, orelse })
    }

    fn try_statement(&self, node: Node<'_>) -> PResult<StmtKind> {
        let body = self.body(self.field(node, "body")?)?;
        let mut handlers = Vec::new();
        let mut orelse = Vec::new();
        let mut finalbody = Vec::new();

        for child in named_children(node) {
            match child.kind() {
                "except_clause" => handlers.push(self.handler(child)?),
                "except_group_clause" => return Err(self.not_supported(child, "except*")),
                "else_clause" => orelse = self.body(self.field(child, "body")?)?,
                "finally_clause" => {
                    let block = named_children(child)
                        .into_iter()
                        .find(|c| c.kind() == "block")
                        .ok_or_else(|| self.error(child, "malformed finally clause"))?;
                    finalbody = self.body(block)?;
                }
                _ => {}
            }
        }

        Ok(StmtKind::Try {
            body,
            handlers,
            orelse,
            finalbody,
        })
    }

    fn handler(&self, node: Node<'_>) -> PResult<ExceptHandler> {
        if has_token(node, ",") {
            return Err(self.not_supported(node, "'except Type, name'"));
        }

        let mut parts = named_children(node);
        let block = match parts.pop() {
            Some(block) if block.kind() == "block" => block,
            _ => return Err(self.error(node, "malformed except clause")),
        };

        let (type_, name) = match parts.as_slice() {
            [] => (None, None),
            [pattern] if pattern.kind() == "as_pattern" => {
                let value = self.first_named(*pattern)?;
                let alias = pattern
                    .child_by_field_name("alias")
                    .map(|a| self.target_name(a))
                    .transpose()?;
                (Some(self.expr(value)?), alias)
            }
            [value] => (Some(self.expr(*value)?), None),
            [value, alias] => (Some(self.expr(*value)?), Some(self.target_name(*alias)?)),
            _ => return Err(self.error(node, "malformed except clause")),
        };

        Ok(ExceptHandler {
            type_,
            name,
            body: self.body(block)?,
            location: self.loc(node),
        })
    }

    fn target_name(&self, node: Node<'_>) -> PResult<String> {
        match node.kind() {
            "identifier" => Ok(self.text(node).to_string()),
            "as_pattern_target" => match named_children(node).first() {
                Some(inner) => self.target_name(*inner),
                None => Ok(self.text(node).trim().to_string()),
            },
            _ => Err(self.error(node, "expected a name")),
        }
    }

    fn as_target(&self, node: Node<'_>) -> PResult<Expr> {
        if node.kind() != "as_pattern_target" {
            return self.expr(node);
        }
        match named_children(node).first() {
            Some(inner) => self.expr(*inner),
            None => Ok(Expr::name(self.text(node).trim(), self.loc(node))),
        }
    }

    fn with_statement(&self, node: Node<'_>) -> PResult<StmtKind> {
        let clause = named_children(node)
            .into_iter()
            .find(|c| c.kind() == "with_clause")
            .ok_or_else(|| self.error(node, "malformed with statement"))?;

        let mut items = Vec::new();
        for item in named_children(clause) {
            if item.kind() != "with_item" {
                continue;
            }
            let value = self.field(item, "value")?;
            items.push(if value.kind() == "as_pattern" {
                WithItem {
                    context_expr: self.expr(self.first_named(value)?)?,
                    optional_vars: Some(self.as_target(self.field(value, "alias")?)?),
                }
            } else {
                WithItem {
                    context_expr: self.expr(value)?,
                    optional_vars: None,
                }
            });
        }

        let stmt = With {
            items,
            body: self.body(self.field(node, "body")?)?,
        };
        Ok(if has_token(node, "async") {
            StmtKind::AsyncWith(stmt)
        } else {
            StmtKind::With(stmt)
        })
    }

    fn function(&self, node: Node<'_>, decorators: Vec<Expr>) -> PResult<StmtKind> {
        if node.child_by_field_name("type_parameters").is_some() {
            return Err(self.not_supported(node, "type parameter list"));
        }

        let def = FunctionDef {
            name: self.text(self.field(node, "name")?).to_string(),
            args: self.arguments(node.child_by_field_name("parameters"))?,
            body: self.body(self.field(node, "body")?)?,
            decorators,
            returns: node
                .child_by_field_name("return_type")
                .map(|r| self.expr(r))
                .transpose()?,
        };

        Ok(if has_token(node, "async") {
            StmtKind::AsyncFunctionDef(def)
        } else {
            StmtKind::FunctionDef(def)
        })
    }

    fn class(&self, node: Node<'_>, decorators: Vec<Expr>) -> PResult<StmtKind> {
        if node.child_by_field_name("type_parameters").is_some() {
            return Err(self.not_supported(node, "type parameter list"));
        }

        let (bases, keywords) = match node.child_by_field_name("superclasses") {
            Some(args) => self.call_arguments(args)?,
            None => (Vec::new(), Vec::new()),
        };

        Ok(StmtKind::ClassDef(ClassDef {
            name: self.text(self.field(node, "name")?).to_string(),
            bases,
            keywords,
            body: self.body(self.field(node, "body")?)?,
            decorators,
        }))
    }

    // ==================== Parameters ====================

    fn arguments(&self, node: Option<Node<'_>>) -> PResult<Arguments> {
        let mut args = Arguments::default();
        let Some(node) = node else {
            return Ok(args);
        };

        let mut keyword_only = false;
        for param in named_children(node) {
            let location = self.loc(param);
            match param.kind() {
                "identifier" => {
                    let arg = self.arg(param, None)?;
                    push_param(&mut args, keyword_only, arg, None);
                }
                "typed_parameter" => {
                    let annotation = Some(self.expr(self.field(param, "type")?)?);
                    let inner = self.first_named(param)?;
                    match inner.kind() {
                        "list_splat_pattern" => {
                            args.vararg = Some(self.arg(self.first_named(inner)?, annotation)?);
                            keyword_only = true;
                        }
                        "dictionary_splat_pattern" => {
                            args.kwarg = Some(self.arg(self.first_named(inner)?, annotation)?);
                        }
                        _ => {
                            let arg = self.arg(inner, annotation)?;
                            push_param(&mut args, keyword_only, arg, None);
                        }
                    }
                }
                "default_parameter" | "typed_default_parameter" => {
                    let arg = Arg {
                        name: self.text(self.field(param, "name")?).to_string(),
                        annotation: param
                            .child_by_field_name("type")
                            .map(|t| self.expr(t))
                            .transpose()?,
                        location,
                    };
                    let default = self.expr(self.field(param, "value")?)?;
                    push_param(&mut args, keyword_only, arg, Some(default));
                }
                "list_splat_pattern" => {
                    args.vararg = Some(self.arg(self.first_named(param)?, None)?);
                    keyword_only = true;
                }
                "keyword_separator" => keyword_only = true,
                "dictionary_splat_pattern" => {
                    args.kwarg = Some(self.arg(self.first_named(param)?, None)?);
                }
                "positional_separator" => {
                    return Err(self.not_supported(param, "positional-only parameter marker"))
                }
                other => {
                    return Err(self.error(param, format!("unexpected parameter '{}'", other)))
                }
            }
        }

        Ok(args)
    }

    fn arg(&self, node: Node<'_>, annotation: Option<Expr>) -> PResult<Arg> {
        if node.kind() != "identifier" {
            return Err(self.error(node, "expected a parameter name"));
        }
        Ok(Arg {
            name: self.text(node).to_string(),
            annotation,
            location: self.loc(node),
        })
    }

    fn call_arguments(&self, node: Node<'_>) -> PResult<(Vec<Expr>, Vec<Keyword>)> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "keyword_argument" => keywords.push(Keyword {
                    arg: Some(self.text(self.field(child, "name")?).to_string()),
                    value: self.expr(self.field(child, "value")?)?,
                }),
                "dictionary_splat" => keywords.push(Keyword {
                    arg: None,
                    value: self.expr(self.first_named(child)?)?,
                }),
                _ => args.push(self.expr(child)?),
            }
        }
        Ok((args, keywords))
    }

    // ==================== Expressions ====================

    fn exprs(&self, nodes: Vec<Node<'_>>) -> PResult<Vec<Expr>> {
        nodes.into_iter().map(|n| self.expr(n)).collect()
    }

    /// Lower one or more nodes, producing a tuple when there are several
    fn expr_or_tuple(&self, nodes: Vec<Node<'_>>, parent: Node<'_>) -> PResult<Expr> {
        if nodes.len() == 1 {
            return self.expr(nodes[0]);
        }
        Ok(Expr::new(
            ExprKind::Tuple(self.exprs(nodes)?),
            self.loc(parent),
        ))
    }

    fn boxed(&self, node: Node<'_>) -> PResult<Box<Expr>> {
        Ok(Box::new(self.expr(node)?))
    }

    fn expr(&self, node: Node<'_>) -> PResult<Expr> {
        let location = self.loc(node);
        let kind = match node.kind() {
            "identifier" | "keyword_identifier" => ExprKind::Name(self.text(node).to_string()),
            "integer" => ExprKind::Num(self.integer(node)?),
            "float" => ExprKind::Num(self.text(node).replace('_', "")),
            "true" => ExprKind::NameConstant(Singleton::True),
            "false" => ExprKind::NameConstant(Singleton::False),
            "none" => ExprKind::NameConstant(Singleton::None),
            "ellipsis" => ExprKind::Ellipsis,
            "string" | "concatenated_string" => return self.string_literal(node),
            "parenthesized_expression" | "type" | "parenthesized_list_splat" => {
                return self.expr(self.first_named(node)?)
            }
            "binary_operator" => {
                let operator = self.field(node, "operator")?;
                ExprKind::BinOp {
                    left: self.boxed(self.field(node, "left")?)?,
                    op: BinOperator::from_token(operator.kind()).ok_or_else(|| {
                        self.error(operator, format!("unknown operator '{}'", operator.kind()))
                    })?,
                    right: self.boxed(self.field(node, "right")?)?,
                }
            }
            "unary_operator" => {
                let operator = self.field(node, "operator")?;
                let op = match operator.kind() {
                    "-" => UnaryOperator::USub,
                    "+" => UnaryOperator::UAdd,
                    "~" => UnaryOperator::Invert,
                    other => {
                        return Err(self.error(operator, format!("unknown operator '{}'", other)))
                    }
                };
                ExprKind::UnaryOp {
                    op,
                    operand: self.boxed(self.field(node, "argument")?)?,
                }
            }
            "not_operator" => ExprKind::UnaryOp {
                op: UnaryOperator::Not,
                operand: self.boxed(self.field(node, "argument")?)?,
            },
            "boolean_operator" => self.boolean_operator(node)?,
            "comparison_operator" => self.comparison(node)?,
            "conditional_expression" => match named_children(node).as_slice() {
                [body, test, orelse] => ExprKind::IfExp {
                    test: self.boxed(*test)?,
                    body: self.boxed(*body)?,
                    orelse: self.boxed(*orelse)?,
                },
                _ => return Err(self.error(node, "malformed conditional expression")),
            },
            "lambda" => ExprKind::Lambda {
                args: Box::new(self.arguments(node.child_by_field_name("parameters"))?),
                body: self.boxed(self.field(node, "body")?)?,
            },
            "call" => {
                let func = self.boxed(self.field(node, "function")?)?;
                let arguments = self.field(node, "arguments")?;
                let (args, keywords) = if arguments.kind() == "generator_expression" {
                    (vec![self.expr(arguments)?], Vec::new())
                } else {
                    self.call_arguments(arguments)?
                };
                ExprKind::Call {
                    func,
                    args,
                    keywords,
                }
            }
            "attribute" => ExprKind::Attribute {
                value: self.boxed(self.field(node, "object")?)?,
                attr: self.text(self.field(node, "attribute")?).to_string(),
            },
            "subscript" => self.subscript(node)?,
            "generic_type" => self.generic_type(node)?,
            "union_type" => match named_children(node).as_slice() {
                [left, right] => ExprKind::BinOp {
                    left: self.boxed(*left)?,
                    op: BinOperator::BitOr,
                    right: self.boxed(*right)?,
                },
                _ => return Err(self.error(node, "malformed union type")),
            },
            "member_type" => match named_children(node).as_slice() {
                [value, attr] => ExprKind::Attribute {
                    value: self.boxed(*value)?,
                    attr: self.text(*attr).to_string(),
                },
                _ => return Err(self.error(node, "malformed member type")),
            },
            "splat_type" => ExprKind::Starred(self.boxed(self.first_named(node)?)?),
            "list" | "list_pattern" => ExprKind::List(self.exprs(named_children(node))?),
            // `(x) = 1` parses as a tuple pattern without a comma
            "tuple_pattern" if !has_token(node, ",") && named_children(node).len() == 1 => {
                return self.expr(self.first_named(node)?)
            }
            "tuple" | "tuple_pattern" | "expression_list" | "pattern_list" => {
                ExprKind::Tuple(self.exprs(named_children(node))?)
            }
            "set" => ExprKind::Set(self.exprs(named_children(node))?),
            "dictionary" => {
                let mut keys = Vec::new();
                let mut values = Vec::new();
                for entry in named_children(node) {
                    match entry.kind() {
                        "pair" => {
                            keys.push(Some(self.expr(self.field(entry, "key")?)?));
                            values.push(self.expr(self.field(entry, "value")?)?);
                        }
                        "dictionary_splat" => {
                            keys.push(None);
                            values.push(self.expr(self.first_named(entry)?)?);
                        }
                        other => {
                            return Err(self.error(entry, format!("unexpected entry '{}'", other)))
                        }
                    }
                }
                ExprKind::Dict { keys, values }
            }
            "list_comprehension" => ExprKind::ListComp {
                elt: self.boxed(self.field(node, "body")?)?,
                generators: self.generators(node)?,
            },
            "set_comprehension" => ExprKind::SetComp {
                elt: self.boxed(self.field(node, "body")?)?,
                generators: self.generators(node)?,
            },
            "generator_expression" => ExprKind::GeneratorExp {
                elt: self.boxed(self.field(node, "body")?)?,
                generators: self.generators(node)?,
            },
            "dictionary_comprehension" => {
                let pair = self.field(node, "body")?;
                ExprKind::DictComp {
                    key: self.boxed(self.field(pair, "key")?)?,
                    value: self.boxed(self.field(pair, "value")?)?,
                    generators: self.generators(node)?,
                }
            }
            "list_splat" | "list_splat_pattern" => {
                ExprKind::Starred(self.boxed(self.first_named(node)?)?)
            }
            "await" => ExprKind::Await(self.boxed(self.first_named(node)?)?),
            "yield" => {
                let value = named_children(node).into_iter().next();
                if has_token(node, "from") {
                    let value =
                        value.ok_or_else(|| self.error(node, "'yield from' needs a value"))?;
                    ExprKind::YieldFrom(self.boxed(value)?)
                } else {
                    ExprKind::Yield(value.map(|v| self.boxed(v)).transpose()?)
                }
            }
            "named_expression" => return Err(self.not_supported(node, "assignment expression")),
            other => return Err(self.error(node, format!("unsupported syntax '{}'", other))),
        };
        Ok(Expr::new(kind, location))
    }

    /// Integer literal text without digit separators
    fn integer(&self, node: Node<'_>) -> PResult<String> {
        let text = self.text(node).replace('_', "");
        if text.ends_with(|c: char| c == 'l' || c == 'L') {
            return Err(self.not_supported(node, "long integer suffix"));
        }
        let decimal = text.bytes().all(|b| b.is_ascii_digit());
        if decimal && text.starts_with('0') && text.bytes().any(|b| b != b'0') {
            return Err(self.not_supported(node, "leading-zero octal literal"));
        }
        Ok(text)
    }

    fn boolean_operator(&self, node: Node<'_>) -> PResult<ExprKind> {
        let operator = self.field(node, "operator")?;
        let op = match operator.kind() {
            "and" => BoolOperator::And,
            "or" => BoolOperator::Or,
            other => return Err(self.error(operator, format!("unknown operator '{}'", other))),
        };

        let left_node = self.field(node, "left")?;
        let left = self.expr(left_node)?;
        let mut values = match left.kind {
            // `a and b and c` is a single node with three values
            ExprKind::BoolOp {
                op: inner,
                values,
            } if inner == op && left_node.kind() == "boolean_operator" => values,
            kind => vec![Expr::new(kind, left.location)],
        };
        values.push(self.expr(self.field(node, "right")?)?);

        Ok(ExprKind::BoolOp { op, values })
    }

    fn comparison(&self, node: Node<'_>) -> PResult<ExprKind> {
        let mut operands = Vec::new();
        let mut ops = Vec::new();
        for child in children(node) {
            if child.is_named() {
                operands.push(self.expr(child)?);
                continue;
            }
            let token = child.kind();
            let op = CmpOperator::from_token(token)
                .or_else(|| {
                    let text = self.text(child).split_whitespace().collect::<Vec<_>>();
                    CmpOperator::from_token(&text.join(" "))
                })
                .ok_or_else(|| self.error(child, format!("unknown comparison '{}'", token)))?;
            ops.push(op);
        }

        if operands.len() != ops.len() + 1 {
            return Err(self.error(node, "malformed comparison"));
        }
        let left = operands.remove(0);
        Ok(ExprKind::Compare {
            left: Box::new(left),
            ops,
            comparators: operands,
        })
    }

    fn subscript(&self, node: Node<'_>) -> PResult<ExprKind> {
        let value = self.boxed(self.field(node, "value")?)?;
        let subs = fields(node, "subscript");
        if subs.is_empty() {
            return Err(self.error(node, "empty subscript"));
        }

        let slice = if subs.len() == 1 && !has_token(node, ",") {
            self.slice(subs[0])?
        } else if subs.iter().any(|s| s.kind() == "slice") {
            Slice::ExtSlice(
                subs.into_iter()
                    .map(|s| self.slice(s))
                    .collect::<PResult<_>>()?,
            )
        } else {
            Slice::Index(Expr::new(
                ExprKind::Tuple(self.exprs(subs)?),
                self.loc(node),
            ))
        };

        Ok(ExprKind::Subscript {
            value,
            slice: Box::new(slice),
        })
    }

    fn slice(&self, node: Node<'_>) -> PResult<Slice> {
        if node.kind() != "slice" {
            return Ok(Slice::Index(self.expr(node)?));
        }

        let mut slots: [Option<Expr>; 3] = [None, None, None];
        let mut index = 0;
        for child in children(node) {
            if !child.is_named() {
                if child.kind() == ":" {
                    index += 1;
                }
                continue;
            }
            let slot = slots
                .get_mut(index)
                .ok_or_else(|| self.error(child, "malformed slice"))?;
            *slot = Some(self.expr(child)?);
        }

        let [lower, upper, step] = slots;
        Ok(Slice::Slice { lower, upper, step })
    }

    /// `List[int]` inside an annotation, parsed as a type rather than a subscript
    fn generic_type(&self, node: Node<'_>) -> PResult<ExprKind> {
        let parts = named_children(node);
        let (base, params) = match parts.as_slice() {
            [base, params] => (*base, *params),
            _ => return Err(self.error(node, "malformed generic type")),
        };
        let types = named_children(params);
        let index = self.expr_or_tuple(types, params)?;
        Ok(ExprKind::Subscript {
            value: self.boxed(base)?,
            slice: Box::new(Slice::Index(index)),
        })
    }

    fn generators(&self, node: Node<'_>) -> PResult<Vec<Comprehension>> {
        let mut generators: Vec<Comprehension> = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "for_in_clause" => generators.push(Comprehension {
                    target: self.expr_or_tuple(fields(child, "left"), child)?,
                    iter: self.expr_or_tuple(fields(child, "right"), child)?,
                    ifs: Vec::new(),
                    is_async: has_token(child, "async"),
                }),
                "if_clause" => {
                    let condition = self.expr(self.first_named(child)?)?;
                    generators
                        .last_mut()
                        .ok_or_else(|| self.error(child, "condition before comprehension loop"))?
                        .ifs
                        .push(condition);
                }
                _ => {}
            }
        }
        Ok(generators)
    }

    // ==================== Strings ====================

    fn string_literal(&self, node: Node<'_>) -> PResult<Expr> {
        let location = self.loc(node);
        let strings = if node.kind() == "concatenated_string" {
            named_children(node)
        } else {
            vec![node]
        };

        let mut is_bytes: Option<bool> = None;
        let mut formatted = false;
        let mut pieces = Vec::new();
        for string in strings {
            let flags = self.string_pieces(string, &mut pieces)?;
            if is_bytes.is_some_and(|b| b != flags.bytes) {
                return Err(self.error(string, "cannot mix bytes and nonbytes literals"));
            }
            is_bytes = Some(flags.bytes);
            formatted |= flags.formatted;
        }

        if is_bytes == Some(true) {
            let mut value = Vec::new();
            for piece in pieces {
                if let Piece::Bytes(bytes) = piece {
                    value.extend(bytes);
                }
            }
            return Ok(Expr::new(ExprKind::Bytes(value), location));
        }

        if !formatted {
            let mut value = String::new();
            for piece in pieces {
                if let Piece::Text(text) = piece {
                    value.push_str(&text);
                }
            }
            return Ok(Expr::str(value, location));
        }

        Ok(Expr::new(
            ExprKind::JoinedStr(join_pieces(pieces, location)),
            location,
        ))
    }

    fn string_pieces(&self, node: Node<'_>, pieces: &mut Vec<Piece>) -> PResult<StringFlags> {
        let parts = children(node);
        let (start, end) = match (parts.first(), parts.last()) {
            (Some(start), Some(end))
                if start.kind() == "string_start" && end.kind() == "string_end" =>
            {
                (*start, *end)
            }
            _ => return Err(self.error(node, "malformed string literal")),
        };

        let delimiter = self.text(start);
        let quote_at = delimiter
            .find(|c: char| c == '\'' || c == '"' || c == '`')
            .unwrap_or(delimiter.len());
        if delimiter[quote_at..].starts_with('`') {
            return Err(self.not_supported(node, "backtick repr"));
        }
        let prefix = delimiter[..quote_at].to_ascii_lowercase();
        if prefix.contains('u') && prefix.len() > 1 {
            return Err(self.not_supported(start, &format!("'{}' string prefix", prefix)));
        }
        let flags = StringFlags {
            raw: prefix.contains('r'),
            bytes: prefix.contains('b'),
            formatted: prefix.contains('f'),
        };

        let mut cursor = start.end_byte();
        for part in &parts {
            if part.kind() == "interpolation" {
                pieces.push(self.literal(node, cursor, part.start_byte(), flags)?);
                pieces.push(Piece::Value(self.interpolation(*part, flags)?));
                cursor = part.end_byte();
            }
        }
        pieces.push(self.literal(node, cursor, end.start_byte(), flags)?);

        Ok(flags)
    }

    fn literal(&self, node: Node<'_>, start: usize, end: usize, flags: StringFlags) -> PResult<Piece> {
        let raw = self.source.get(start..end).unwrap_or("");
        decode_literal(raw, flags).map_err(|message| self.error(node, message))
    }

    fn interpolation(&self, node: Node<'_>, flags: StringFlags) -> PResult<Expr> {
        if has_token(node, "=") {
            return Err(self.not_supported(node, "self-documenting f-string expression"));
        }

        let expression = self.field(node, "expression")?;
        if expression.kind() == "named_expression" {
            return self.equals_spec_field(node, expression, flags);
        }

        let value = self.boxed(expression)?;
        let conversion = node
            .child_by_field_name("type_conversion")
            .and_then(|c| self.text(c).trim_start_matches('!').chars().next());
        let format_spec = node
            .child_by_field_name("format_specifier")
            .map(|spec| self.format_spec(spec, flags).map(Box::new))
            .transpose()?;

        Ok(Expr::new(
            ExprKind::FormattedValue {
                value,
                conversion,
                format_spec,
            },
            self.loc(node),
        ))
    }

    /// `{n:=5}` is the field `n` with format spec `=5`
    fn equals_spec_field(
        &self,
        node: Node<'_>,
        expression: Node<'_>,
        flags: StringFlags,
    ) -> PResult<Expr> {
        let walrus = children(expression)
            .into_iter()
            .find(|c| c.kind() == ":=")
            .ok_or_else(|| self.error(expression, "malformed replacement field"))?;
        let close = children(node)
            .into_iter()
            .rev()
            .find(|c| c.kind() == "}")
            .ok_or_else(|| self.error(node, "malformed replacement field"))?;

        let spec_start = walrus.start_byte() + 1;
        let spec_end = close.start_byte();
        if self.source.get(spec_start..spec_end).unwrap_or("").contains('{') {
            return Err(self.error(node, "nested field in a '=' format spec is not supported"));
        }

        let spec_location = self.loc(walrus);
        let spec = self.literal(node, spec_start, spec_end, flags)?;
        Ok(Expr::new(
            ExprKind::FormattedValue {
                value: self.boxed(self.field(expression, "name")?)?,
                conversion: None,
                format_spec: Some(Box::new(Expr::new(
                    ExprKind::JoinedStr(join_pieces(vec![spec], spec_location)),
                    spec_location,
                ))),
            },
            self.loc(node),
        ))
    }

    fn format_spec(&self, node: Node<'_>, flags: StringFlags) -> PResult<Expr> {
        let location = self.loc(node);
        let mut pieces = Vec::new();
        let mut cursor = node.start_byte();
        if self.text(node).starts_with(':') {
            cursor += 1;
        }

        for child in children(node) {
            if child.kind() == "format_expression" || child.kind() == "interpolation" {
                pieces.push(self.literal(node, cursor, child.start_byte(), flags)?);
                pieces.push(Piece::Value(self.interpolation(child, flags)?));
                cursor = child.end_byte();
            }
        }
        pieces.push(self.literal(node, cursor, node.end_byte(), flags)?);

        Ok(Expr::new(
            ExprKind::JoinedStr(join_pieces(pieces, location)),
            location,
        ))
    }
}

fn push_param(args: &mut Arguments, keyword_only: bool, arg: Arg, default: Option<Expr>) {
    if keyword_only {
        args.kwonlyargs.push(arg);
        args.kw_defaults.push(default);
    } else {
        args.args.push(arg);
        if let Some(default) = default {
            args.defaults.push(default);
        }
    }
}

/// Merge adjacent text pieces of an f-string, dropping empty ones
fn join_pieces(pieces: Vec<Piece>, location: Location) -> Vec<Expr> {
    let mut values = Vec::new();
    let mut text = String::new();
    for piece in pieces {
        match piece {
            Piece::Text(part) => text.push_str(&part),
            Piece::Value(value) => {
                if !text.is_empty() {
                    values.push(Expr::str(std::mem::take(&mut text), location));
                }
                values.push(value);
            }
            Piece::Bytes(_) => {}
        }
    }
    if !text.is_empty() {
        values.push(Expr::str(text, location));
    }
    values
}

/// Decode the body of a string literal according to its prefix
fn decode_literal(raw: &str, flags: StringFlags) -> Result<Piece, String> {
    let mut units: Vec<u32> = Vec::with_capacity(raw.len());
    let push_char = |units: &mut Vec<u32>, c: char| -> Result<(), String> {
        if flags.bytes {
            if !c.is_ascii() {
                return Err("bytes can only contain ASCII literal characters".to_string());
            }
            units.push(c as u32);
        } else {
            units.push(c as u32);
        }
        Ok(())
    };

    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' | '}' if flags.formatted => {
                if chars.peek() == Some(&c) {
                    chars.next();
                }
                push_char(&mut units, c)?;
            }
            '\\' if !flags.raw => {
                let Some(escape) = chars.next() else {
                    push_char(&mut units, '\\')?;
                    break;
                };
                match escape {
                    '\n' => {}
                    '\\' | '\'' | '"' => push_char(&mut units, escape)?,
                    'a' => units.push(0x07),
                    'b' => units.push(0x08),
                    'f' => units.push(0x0c),
                    'n' => units.push(0x0a),
                    'r' => units.push(0x0d),
                    't' => units.push(0x09),
                    'v' => units.push(0x0b),
                    '0'..='7' => {
                        let mut value = escape.to_digit(8).unwrap_or(0);
                        for _ in 0..2 {
                            match chars.peek().and_then(|d| d.to_digit(8)) {
                                Some(digit) => {
                                    value = value * 8 + digit;
                                    chars.next();
                                }
                                None => break,
                            }
                        }
                        units.push(if flags.bytes { value & 0xff } else { value });
                    }
                    'x' => units.push(hex_escape(&mut chars, 2, "\\xXX")?),
                    'u' if !flags.bytes => units.push(hex_escape(&mut chars, 4, "\\uXXXX")?),
                    'U' if !flags.bytes => units.push(hex_escape(&mut chars, 8, "\\UXXXXXXXX")?),
                    'N' if !flags.bytes => {
                        return Err("named unicode escapes (\\N{...}) are not supported".to_string())
                    }
                    other => {
                        push_char(&mut units, '\\')?;
                        push_char(&mut units, other)?;
                    }
                }
            }
            _ => push_char(&mut units, c)?,
        }
    }

    if flags.bytes {
        return Ok(Piece::Bytes(units.into_iter().map(|u| u as u8).collect()));
    }
    units
        .into_iter()
        .map(char::from_u32)
        .collect::<Option<String>>()
        .map(Piece::Text)
        .ok_or_else(|| "string contains an unrepresentable surrogate escape".to_string())
}

fn hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    form: &str,
) -> Result<u32, String> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|d| d.to_digit(16))
            .ok_or_else(|| format!("truncated {} escape", form))?;
        value = value * 16 + digit;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Module {
        parse_module(source, "test.py").unwrap()
    }

    fn first_expr(source: &str) -> Expr {
        match parse(source).body.remove(0).kind {
            StmtKind::Expr(expr) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    // ==================== Statements ====================

    #[test]
    fn test_parse_assignments() {
        let module = parse("a = b = 1\nx: int = 5\ny: str\nn += 2\n");
        assert_eq!(module.body.len(), 4);

        let StmtKind::Assign { targets, .. } = &module.body[0].kind else {
            panic!("expected assign");
        };
        assert_eq!(targets.len(), 2);

        let StmtKind::AnnAssign { target, value, simple, .. } = &module.body[1].kind else {
            panic!("expected annotated assign");
        };
        assert_eq!(target.as_name(), Some("x"));
        assert!(value.is_some());
        assert!(*simple);

        let StmtKind::AnnAssign { value, .. } = &module.body[2].kind else {
            panic!("expected annotated assign");
        };
        assert!(value.is_none());

        assert!(matches!(
            module.body[3].kind,
            StmtKind::AugAssign { op: BinOperator::Add, .. }
        ));
    }

    #[test]
    fn test_parse_function_parameters() {
        let module = parse("def f(a, b: int = 1, *args, key=None, **kw) -> str:\n    return a\n");
        let StmtKind::FunctionDef(def) = &module.body[0].kind else {
            panic!("expected function");
        };
        assert_eq!(def.name, "f");
        assert_eq!(def.args.args.len(), 2);
        assert!(def.args.args[1].annotation.is_some());
        assert_eq!(def.args.defaults.len(), 1);
        assert_eq!(def.args.vararg.as_ref().map(|a| a.name.as_str()), Some("args"));
        assert_eq!(def.args.kwonlyargs[0].name, "key");
        assert_eq!(def.args.kw_defaults.len(), 1);
        assert_eq!(def.args.kwarg.as_ref().map(|a| a.name.as_str()), Some("kw"));
        assert!(def.returns.is_some());
    }

    #[test]
    fn test_parse_class_with_keywords() {
        let module = parse("@decorate\nclass C(Base, metaclass=Meta):\n    pass\n");
        let StmtKind::ClassDef(class) = &module.body[0].kind else {
            panic!("expected class");
        };
        assert_eq!(class.name, "C");
        assert_eq!(class.bases.len(), 1);
        assert_eq!(class.keywords[0].arg.as_deref(), Some("metaclass"));
        assert_eq!(class.decorators.len(), 1);
    }

    #[test]
    fn test_parse_async_definition() {
        let module = parse("async def f():\n    await g()\n");
        assert!(matches!(module.body[0].kind, StmtKind::AsyncFunctionDef(_)));
    }

    #[test]
    fn test_parse_elif_chain() {
        let module = parse("if a:\n    pass\nelif b:\n    pass\nelse:\n    x = 1\n");
        let StmtKind::If { orelse, .. } = &module.body[0].kind else {
            panic!("expected if");
        };
        let StmtKind::If { orelse: inner, .. } = &orelse[0].kind else {
            panic!("expected nested if");
        };
        assert!(matches!(inner[0].kind, StmtKind::Assign { .. }));
    }

    #[test]
    fn test_parse_imports() {
        let module = parse("import os.path as p, sys\nfrom ..pkg import a as b\nfrom . import *\n");
        let StmtKind::Import(names) = &module.body[0].kind else {
            panic!("expected import");
        };
        assert_eq!(names[0].name, "os.path");
        assert_eq!(names[0].asname.as_deref(), Some("p"));
        assert_eq!(names[1].name, "sys");

        let StmtKind::ImportFrom { module: m, names, level } = &module.body[1].kind else {
            panic!("expected from import");
        };
        assert_eq!(m.as_deref(), Some("pkg"));
        assert_eq!(*level, 2);
        assert_eq!(names[0].asname.as_deref(), Some("b"));

        let StmtKind::ImportFrom { module: m, names, level } = &module.body[2].kind else {
            panic!("expected from import");
        };
        assert_eq!(*m, None);
        assert_eq!(*level, 1);
        assert_eq!(names[0].name, "*");
    }

    #[test]
    fn test_parse_try_handlers() {
        let module = parse(
            "try:\n    pass\nexcept ValueError as e:\n    pass\nexcept:\n    pass\nfinally:\n    pass\n",
        );
        let StmtKind::Try { handlers, finalbody, .. } = &module.body[0].kind else {
            panic!("expected try");
        };
        assert_eq!(handlers.len(), 2);
        assert_eq!(handlers[0].name.as_deref(), Some("e"));
        assert!(handlers[1].type_.is_none());
        assert_eq!(finalbody.len(), 1);
    }

    #[test]
    fn test_parse_with_items() {
        let module = parse("with open(p) as f, lock:\n    pass\n");
        let StmtKind::With(with) = &module.body[0].kind else {
            panic!("expected with");
        };
        assert_eq!(with.items.len(), 2);
        assert_eq!(
            with.items[0].optional_vars.as_ref().and_then(|v| v.as_name()),
            Some("f")
        );
        assert!(with.items[1].optional_vars.is_none());
    }

    #[test]
    fn test_parse_parenthesized_single_target() {
        let module = parse("(x) = 1\nfor (y) in z:\n    pass\n(w): int = 1\n");

        let StmtKind::Assign { targets, .. } = &module.body[0].kind else {
            panic!("expected assign");
        };
        assert_eq!(targets[0].as_name(), Some("x"));

        let StmtKind::For(node) = &module.body[1].kind else {
            panic!("expected for loop");
        };
        assert_eq!(node.target.as_name(), Some("y"));

        let StmtKind::AnnAssign { target, simple, .. } = &module.body[2].kind else {
            panic!("expected annotated assign");
        };
        assert_eq!(target.as_name(), Some("w"));
        assert!(!*simple);
    }

    #[test]
    fn test_parse_parenthesized_tuple_target_kept() {
        let module = parse("(a, b) = c\n");
        let StmtKind::Assign { targets, .. } = &module.body[0].kind else {
            panic!("expected assign");
        };
        assert!(matches!(&targets[0].kind, ExprKind::Tuple(items) if items.len() == 2));
    }

    // ==================== Expressions ====================

    #[test]
    fn test_parse_number_underscores_removed() {
        let expr = first_expr("1_000_000\n");
        assert_eq!(expr.kind, ExprKind::Num("1000000".to_string()));
    }

    #[test]
    fn test_parse_comparison_chain() {
        let expr = first_expr("a < b not in c\n");
        let ExprKind::Compare { ops, comparators, .. } = expr.kind else {
            panic!("expected compare");
        };
        assert_eq!(ops, vec![CmpOperator::Lt, CmpOperator::NotIn]);
        assert_eq!(comparators.len(), 2);
    }

    #[test]
    fn test_parse_boolean_chain_flattened() {
        let expr = first_expr("a and b and c\n");
        let ExprKind::BoolOp { op, values } = expr.kind else {
            panic!("expected bool op");
        };
        assert_eq!(op, BoolOperator::And);
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_parse_dict_unpacking() {
        let expr = first_expr("{'a': 1, **rest}\n");
        let ExprKind::Dict { keys, values } = expr.kind else {
            panic!("expected dict");
        };
        assert!(keys[0].is_some());
        assert!(keys[1].is_none());
        assert_eq!(values[1].as_name(), Some("rest"));
    }

    #[test]
    fn test_parse_slices() {
        let expr = first_expr("x[1:2, ::3]\n");
        let ExprKind::Subscript { slice, .. } = expr.kind else {
            panic!("expected subscript");
        };
        let Slice::ExtSlice(dims) = *slice else {
            panic!("expected extended slice");
        };
        assert_eq!(dims.len(), 2);
        let Slice::Slice { lower, upper, step } = &dims[1] else {
            panic!("expected slice");
        };
        assert!(lower.is_none() && upper.is_none());
        assert_eq!(step.as_ref().map(|s| s.kind.clone()), Some(ExprKind::Num("3".to_string())));
    }

    #[test]
    fn test_parse_comprehension() {
        let expr = first_expr("[x for x in xs if x if y]\n");
        let ExprKind::ListComp { generators, .. } = expr.kind else {
            panic!("expected list comprehension");
        };
        assert_eq!(generators.len(), 1);
        assert_eq!(generators[0].ifs.len(), 2);
    }

    // ==================== Strings ====================

    #[test]
    fn test_parse_string_escapes() {
        let expr = first_expr("'a\\tb\\x41\\u00e9\\n'\n");
        assert_eq!(expr.kind, ExprKind::Str("a\tbA\u{e9}\n".to_string()));
    }

    #[test]
    fn test_parse_raw_and_bytes() {
        assert_eq!(first_expr("r'\\d+'\n").kind, ExprKind::Str("\\d+".to_string()));
        assert_eq!(first_expr("b'\\x00ab'\n").kind, ExprKind::Bytes(vec![0, b'a', b'b']));
    }

    #[test]
    fn test_parse_concatenated_strings() {
        let expr = first_expr("'abc' \"def\"\n");
        assert_eq!(expr.kind, ExprKind::Str("abcdef".to_string()));
    }

    #[test]
    fn test_parse_fstring_parts() {
        let expr = first_expr("f'{{x}} = {x!r:>10} end'\n");
        let ExprKind::JoinedStr(parts) = expr.kind else {
            panic!("expected f-string");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].kind, ExprKind::Str("{x} = ".to_string()));
        let ExprKind::FormattedValue { value, conversion, format_spec } = &parts[1].kind else {
            panic!("expected formatted value");
        };
        assert_eq!(value.as_name(), Some("x"));
        assert_eq!(*conversion, Some('r'));
        let Some(spec) = format_spec else {
            panic!("expected format spec");
        };
        assert_eq!(
            spec.kind,
            ExprKind::JoinedStr(vec![Expr::str(">10", spec.location)])
        );
        assert_eq!(parts[2].kind, ExprKind::Str(" end".to_string()));
    }

    #[test]
    fn test_parse_fstring_concatenation() {
        let expr = first_expr("'a' f'{b}' 'c'\n");
        let ExprKind::JoinedStr(parts) = expr.kind else {
            panic!("expected f-string");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].kind, ExprKind::Str("a".to_string()));
        assert_eq!(parts[2].kind, ExprKind::Str("c".to_string()));
    }

    #[test]
    fn test_parse_fstring_equals_format_spec() {
        let expr = first_expr("f'{n:=5}'\n");
        let ExprKind::JoinedStr(parts) = expr.kind else {
            panic!("expected f-string");
        };
        assert_eq!(parts.len(), 1);
        let ExprKind::FormattedValue { value, conversion, format_spec } = &parts[0].kind else {
            panic!("expected formatted value");
        };
        assert_eq!(value.as_name(), Some("n"));
        assert_eq!(*conversion, None);
        let Some(spec) = format_spec else {
            panic!("expected format spec");
        };
        assert_eq!(
            spec.kind,
            ExprKind::JoinedStr(vec![Expr::str("=5", spec.location)])
        );
    }

    #[test]
    fn test_parse_octal_zero_literals() {
        assert_eq!(first_expr("00\n").kind, ExprKind::Num("00".to_string()));
        assert_eq!(first_expr("0o777\n").kind, ExprKind::Num("0o777".to_string()));
    }

    // ==================== Errors ====================

    #[test]
    fn test_syntax_error_reported() {
        let err = parse_module("def f(:\n", "bad.py").unwrap_err();
        assert_eq!(err.path, "bad.py");
        assert_eq!(err.line, 1);
        assert!(err.message.contains("invalid syntax"));
    }

    #[test]
    fn test_named_unicode_escape_rejected() {
        let err = parse_module("'\\N{BULLET}'\n", "x.py").unwrap_err();
        assert!(err.message.contains("\\N"));
    }

    #[test]
    fn test_mixed_bytes_rejected() {
        let err = parse_module("b'a' 'b'\n", "x.py").unwrap_err();
        assert!(err.message.contains("bytes"));
    }

    #[test]
    fn test_python2_literals_rejected() {
        for (source, what) in [
            ("x = `a`\n", "backtick repr"),
            ("x = 0777\n", "leading-zero octal literal"),
            ("x = 10l\n", "long integer suffix"),
            ("x = 10L\n", "long integer suffix"),
            ("x = ur'a'\n", "'ur' string prefix"),
        ] {
            let err = parse_module(source, "x.py").unwrap_err();
            assert_eq!(
                err.message,
                format!("{} is not valid python 3.6 syntax", what),
                "{:?}",
                source
            );
        }
    }

    #[test]
    fn test_decode_literal_line_continuation() {
        let Ok(Piece::Text(text)) = decode_literal("a\\\nb", StringFlags::default()) else {
            panic!("expected text");
        };
        assert_eq!(text, "ab");
    }
}
