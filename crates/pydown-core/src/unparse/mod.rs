//! Syntax tree to source text
//!
//! [`Unparser`] is a precedence-aware renderer for every node kind. Before
//! rendering an expression it consults an ordered table of [`Override`]
//! functions; the first one that claims the node renders it instead of the
//! base renderer. [`unparse`] uses the table in [`overrides`].

pub mod overrides;

pub use overrides::{render_dict, render_doc, render_multiline_str, triple_quoted, DOWNGRADE_OVERRIDES};

use crate::ast::*;

/// Binding strength of an expression position, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Tuple,
    Yield,
    Test,
    Or,
    And,
    Not,
    Cmp,
    BitOr,
    BitXor,
    BitAnd,
    Shift,
    Arith,
    Term,
    Factor,
    Power,
    Await,
    Atom,
}

impl Precedence {
    /// The next tighter level
    pub fn next(self) -> Self {
        use Precedence::*;
        match self {
            Tuple => Yield,
            Yield => Test,
            Test => Or,
            Or => And,
            And => Not,
            Not => Cmp,
            Cmp => BitOr,
            BitOr => BitXor,
            BitXor => BitAnd,
            BitAnd => Shift,
            Shift => Arith,
            Arith => Term,
            Term => Factor,
            Factor => Power,
            Power => Await,
            Await | Atom => Atom,
        }
    }

    pub fn of_binop(op: BinOperator) -> Self {
        match op {
            BinOperator::Add | BinOperator::Sub => Precedence::Arith,
            BinOperator::Mult
            | BinOperator::MatMult
            | BinOperator::Div
            | BinOperator::Mod
            | BinOperator::FloorDiv => Precedence::Term,
            BinOperator::Pow => Precedence::Power,
            BinOperator::LShift | BinOperator::RShift => Precedence::Shift,
            BinOperator::BitOr => Precedence::BitOr,
            BinOperator::BitXor => Precedence::BitXor,
            BinOperator::BitAnd => Precedence::BitAnd,
        }
    }
}

/// Renders one expression in place of the base renderer
///
/// Returns `false` to leave the node to the next override or the base
/// renderer.
pub type Override = fn(&mut Unparser, &Expr, Precedence) -> bool;

/// Render a module with the downgrade overrides and 4-space indentation
pub fn unparse(module: &Module) -> String {
    Unparser::new()
        .with_overrides(DOWNGRADE_OVERRIDES)
        .unparse_module(module)
}

pub struct Unparser {
    out: String,
    depth: usize,
    indent: String,
    overrides: Vec<Override>,
}

impl Default for Unparser {
    fn default() -> Self {
        Self::new()
    }
}

impl Unparser {
    /// A base renderer without overrides
    pub fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
            indent: "    ".to_string(),
            overrides: Vec::new(),
        }
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_overrides(mut self, overrides: &[Override]) -> Self {
        self.overrides.extend_from_slice(overrides);
        self
    }

    /// Render a whole module, one statement per line
    pub fn unparse_module(mut self, module: &Module) -> String {
        for stmt in &module.body {
            self.stmt(stmt);
        }
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out
    }

    /// Render a single expression
    pub fn unparse_expr(mut self, expr: &Expr) -> String {
        self.expr(expr, Precedence::Tuple);
        self.out
    }

    pub fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Start a new line at the current indentation
    fn fill(&mut self, text: &str) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        for _ in 0..self.depth {
            self.out.push_str(&self.indent);
        }
        self.out.push_str(text);
    }

    fn block(&mut self, body: &[Stmt]) {
        self.write(":");
        self.depth += 1;
        if body.is_empty() {
            self.fill("pass");
        }
        for stmt in body {
            self.stmt(stmt);
        }
        self.depth -= 1;
    }

    fn comma(&mut self, first: &mut bool) {
        if !*first {
            self.write(", ");
        }
        *first = false;
    }

    fn exprs(&mut self, exprs: &[Expr], prec: Precedence) {
        let mut first = true;
        for expr in exprs {
            self.comma(&mut first);
            self.expr(expr, prec);
        }
    }

    // ==================== Statements ====================

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::FunctionDef(def) => self.function(def, "def "),
            StmtKind::AsyncFunctionDef(def) => self.function(def, "async def "),
            StmtKind::ClassDef(class) => {
                self.decorators(&class.decorators);
                self.fill("class ");
                self.write(&class.name);
                if !class.bases.is_empty() || !class.keywords.is_empty() {
                    self.write("(");
                    let mut first = true;
                    for base in &class.bases {
                        self.comma(&mut first);
                        self.expr(base, Precedence::Test);
                    }
                    for keyword in &class.keywords {
                        self.comma(&mut first);
                        self.keyword(keyword);
                    }
                    self.write(")");
                }
                self.block(&class.body);
            }
            StmtKind::Return(value) => {
                self.fill("return");
                if let Some(value) = value {
                    self.write(" ");
                    // a bare yield is not a valid return value
                    let prec = match value.kind {
                        ExprKind::Yield(_) | ExprKind::YieldFrom(_) => Precedence::Test,
                        _ => Precedence::Tuple,
                    };
                    self.expr(value, prec);
                }
            }
            StmtKind::Delete(targets) => {
                self.fill("del ");
                self.exprs(targets, Precedence::Test);
            }
            StmtKind::Assign { targets, value } => {
                self.fill("");
                for target in targets {
                    self.expr(target, Precedence::Tuple);
                    self.write(" = ");
                }
                self.expr(value, Precedence::Tuple);
            }
            StmtKind::AugAssign { target, op, value } => {
                self.fill("");
                self.expr(target, Precedence::Tuple);
                self.write(&format!(" {}= ", op.as_str()));
                self.expr(value, Precedence::Tuple);
            }
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
                simple,
            } => {
                self.fill("");
                let parenthesize = !*simple && target.as_name().is_some();
                if parenthesize {
                    self.write("(");
                }
                self.expr(target, Precedence::Test);
                if parenthesize {
                    self.write(")");
                }
                self.write(": ");
                self.expr(annotation, Precedence::Test);
                if let Some(value) = value {
                    self.write(" = ");
                    self.expr(value, Precedence::Test);
                }
            }
            StmtKind::For(node) => self.for_loop(node, "for "),
            StmtKind::AsyncFor(node) => self.for_loop(node, "async for "),
            StmtKind::While { test, body, orelse } => {
                self.fill("while ");
                self.expr(test, Precedence::Test);
                self.block(body);
                if !orelse.is_empty() {
                    self.fill("else");
                    self.block(orelse);
                }
            }
            StmtKind::If { test, body, orelse } => {
                self.fill("if ");
                self.expr(test, Precedence::Test);
                self.block(body);
                self.orelse(orelse);
            }
            StmtKind::With(node) => self.with(node, "with "),
            StmtKind::AsyncWith(node) => self.with(node, "async with "),
            StmtKind::Raise { exc, cause } => {
                self.fill("raise");
                if let Some(exc) = exc {
                    self.write(" ");
                    self.expr(exc, Precedence::Test);
                }
                if let Some(cause) = cause {
                    self.write(" from ");
                    self.expr(cause, Precedence::Test);
                }
            }
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                self.fill("try");
                self.block(body);
                for handler in handlers {
                    self.fill("except");
                    if let Some(type_) = &handler.type_ {
                        self.write(" ");
                        self.expr(type_, Precedence::Test);
                    }
                    if let Some(name) = &handler.name {
                        self.write(" as ");
                        self.write(name);
                    }
                    self.block(&handler.body);
                }
                if !orelse.is_empty() {
                    self.fill("else");
                    self.block(orelse);
                }
                if !finalbody.is_empty() {
                    self.fill("finally");
                    self.block(finalbody);
                }
            }
            StmtKind::Assert { test, msg } => {
                self.fill("assert ");
                self.expr(test, Precedence::Test);
                if let Some(msg) = msg {
                    self.write(", ");
                    self.expr(msg, Precedence::Test);
                }
            }
            StmtKind::Import(names) => {
                self.fill("import ");
                self.aliases(names);
            }
            StmtKind::ImportFrom {
                module,
                names,
                level,
            } => {
                self.fill("from ");
                self.write(&".".repeat(*level));
                if let Some(module) = module {
                    self.write(module);
                }
                self.write(" import ");
                self.aliases(names);
            }
            StmtKind::Global(names) => {
                self.fill("global ");
                self.write(&names.join(", "));
            }
            StmtKind::Nonlocal(names) => {
                self.fill("nonlocal ");
                self.write(&names.join(", "));
            }
            StmtKind::Expr(value) => {
                self.fill("");
                self.expr(value, Precedence::Tuple);
            }
            StmtKind::Pass => self.fill("pass"),
            StmtKind::Break => self.fill("break"),
            StmtKind::Continue => self.fill("continue"),
        }
    }

    fn decorators(&mut self, decorators: &[Expr]) {
        for decorator in decorators {
            self.fill("@");
            self.expr(decorator, Precedence::Test);
        }
    }

    fn function(&mut self, def: &FunctionDef, keyword: &str) {
        self.decorators(&def.decorators);
        self.fill(keyword);
        self.write(&def.name);
        self.write("(");
        self.arguments(&def.args);
        self.write(")");
        if let Some(returns) = &def.returns {
            self.write(" -> ");
            self.expr(returns, Precedence::Test);
        }
        self.block(&def.body);
    }

    fn for_loop(&mut self, node: &For, keyword: &str) {
        self.fill(keyword);
        self.expr(&node.target, Precedence::Tuple);
        self.write(" in ");
        self.expr(&node.iter, Precedence::Tuple);
        self.block(&node.body);
        if !node.orelse.is_empty() {
            self.fill("else");
            self.block(&node.orelse);
        }
    }

    fn with(&mut self, node: &With, keyword: &str) {
        self.fill(keyword);
        let mut first = true;
        for item in &node.items {
            self.comma(&mut first);
            self.expr(&item.context_expr, Precedence::Test);
            if let Some(vars) = &item.optional_vars {
                self.write(" as ");
                self.expr(vars, Precedence::Tuple);
            }
        }
        self.block(&node.body);
    }

    /// Else branch of an `if`, folding a lone nested `if` into `elif`
    fn orelse(&mut self, orelse: &[Stmt]) {
        match orelse {
            [] => {}
            [Stmt {
                kind: StmtKind::If { test, body, orelse },
                ..
            }] => {
                self.fill("elif ");
                self.expr(test, Precedence::Test);
                self.block(body);
                self.orelse(orelse);
            }
            _ => {
                self.fill("else");
                self.block(orelse);
            }
        }
    }

    fn aliases(&mut self, names: &[Alias]) {
        let mut first = true;
        for alias in names {
            self.comma(&mut first);
            self.write(&alias.name);
            if let Some(asname) = &alias.asname {
                self.write(" as ");
                self.write(asname);
            }
        }
    }

    fn arg(&mut self, arg: &Arg) {
        self.write(&arg.name);
        if let Some(annotation) = &arg.annotation {
            self.write(": ");
            self.expr(annotation, Precedence::Test);
        }
    }

    fn default(&mut self, arg: &Arg, default: &Expr) {
        self.write(if arg.annotation.is_some() { " = " } else { "=" });
        self.expr(default, Precedence::Test);
    }

    fn arguments(&mut self, args: &Arguments) {
        let mut first = true;
        let defaults_start = args.args.len().saturating_sub(args.defaults.len());
        for (i, arg) in args.args.iter().enumerate() {
            self.comma(&mut first);
            self.arg(arg);
            if let Some(default) = i
                .checked_sub(defaults_start)
                .and_then(|j| args.defaults.get(j))
            {
                self.default(arg, default);
            }
        }

        if args.vararg.is_some() || !args.kwonlyargs.is_empty() {
            self.comma(&mut first);
            self.write("*");
            if let Some(vararg) = &args.vararg {
                self.arg(vararg);
            }
        }

        for (i, arg) in args.kwonlyargs.iter().enumerate() {
            self.comma(&mut first);
            self.arg(arg);
            if let Some(Some(default)) = args.kw_defaults.get(i) {
                self.default(arg, default);
            }
        }

        if let Some(kwarg) = &args.kwarg {
            self.comma(&mut first);
            self.write("**");
            self.arg(kwarg);
        }
    }

    fn keyword(&mut self, keyword: &Keyword) {
        match &keyword.arg {
            Some(name) => {
                self.write(name);
                self.write("=");
                self.expr(&keyword.value, Precedence::Test);
            }
            None => {
                self.write("**");
                self.expr(&keyword.value, Precedence::BitOr);
            }
        }
    }

    // ==================== Expressions ====================

    /// Render an expression, consulting the override table first
    pub fn expr(&mut self, expr: &Expr, prec: Precedence) {
        for index in 0..self.overrides.len() {
            let render = self.overrides[index];
            if render(self, expr, prec) {
                return;
            }
        }
        self.base_expr(expr, prec);
    }

    fn open(&mut self, own: Precedence, context: Precedence) -> bool {
        let needed = context > own;
        if needed {
            self.write("(");
        }
        needed
    }

    fn close(&mut self, opened: bool) {
        if opened {
            self.write(")");
        }
    }

    /// Render an expression without consulting overrides
    pub fn base_expr(&mut self, expr: &Expr, prec: Precedence) {
        match &expr.kind {
            ExprKind::BoolOp { op, values } => {
                let (own, word) = match op {
                    BoolOperator::And => (Precedence::And, " and "),
                    BoolOperator::Or => (Precedence::Or, " or "),
                };
                let opened = self.open(own, prec);
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.write(word);
                    }
                    self.expr(value, own.next());
                }
                self.close(opened);
            }
            ExprKind::BinOp { left, op, right } => {
                let own = Precedence::of_binop(*op);
                let (left_prec, right_prec) = if *op == BinOperator::Pow {
                    (own.next(), own)
                } else {
                    (own, own.next())
                };
                let opened = self.open(own, prec);
                self.expr(left, left_prec);
                self.write(&format!(" {} ", op.as_str()));
                self.expr(right, right_prec);
                self.close(opened);
            }
            ExprKind::UnaryOp { op, operand } => {
                let own = if *op == UnaryOperator::Not {
                    Precedence::Not
                } else {
                    Precedence::Factor
                };
                let opened = self.open(own, prec);
                self.write(op.as_str());
                self.expr(operand, own);
                self.close(opened);
            }
            ExprKind::Lambda { args, body } => {
                let opened = self.open(Precedence::Test, prec);
                self.write("lambda");
                if args.iter().next().is_some() {
                    self.write(" ");
                    self.arguments(args);
                }
                self.write(": ");
                self.expr(body, Precedence::Test);
                self.close(opened);
            }
            ExprKind::IfExp { test, body, orelse } => {
                let opened = self.open(Precedence::Test, prec);
                self.expr(body, Precedence::Test.next());
                self.write(" if ");
                self.expr(test, Precedence::Test.next());
                self.write(" else ");
                self.expr(orelse, Precedence::Test);
                self.close(opened);
            }
            ExprKind::Dict { keys, values } => {
                self.write("{");
                let mut first = true;
                for (key, value) in keys.iter().zip(values) {
                    self.comma(&mut first);
                    match key {
                        Some(key) => {
                            self.expr(key, Precedence::Test);
                            self.write(": ");
                            self.expr(value, Precedence::Test);
                        }
                        None => {
                            self.write("**(");
                            self.expr(value, Precedence::Test);
                            self.write(")");
                        }
                    }
                }
                self.write("}");
            }
            ExprKind::Set(elts) => {
                if elts.is_empty() {
                    self.write("set()");
                } else {
                    self.write("{");
                    self.exprs(elts, Precedence::Test);
                    self.write("}");
                }
            }
            ExprKind::ListComp { elt, generators } => {
                self.write("[");
                self.expr(elt, Precedence::Test);
                self.generators(generators);
                self.write("]");
            }
            ExprKind::SetComp { elt, generators } => {
                self.write("{");
                self.expr(elt, Precedence::Test);
                self.generators(generators);
                self.write("}");
            }
            ExprKind::DictComp {
                key,
                value,
                generators,
            } => {
                self.write("{");
                self.expr(key, Precedence::Test);
                self.write(": ");
                self.expr(value, Precedence::Test);
                self.generators(generators);
                self.write("}");
            }
            ExprKind::GeneratorExp { elt, generators } => {
                self.write("(");
                self.expr(elt, Precedence::Test);
                self.generators(generators);
                self.write(")");
            }
            ExprKind::Await(value) => {
                let opened = self.open(Precedence::Await, prec);
                self.write("await ");
                self.expr(value, Precedence::Atom);
                self.close(opened);
            }
            ExprKind::Yield(value) => {
                let opened = self.open(Precedence::Yield, prec);
                self.write("yield");
                if let Some(value) = value {
                    self.write(" ");
                    self.expr(value, Precedence::Tuple);
                }
                self.close(opened);
            }
            ExprKind::YieldFrom(value) => {
                let opened = self.open(Precedence::Yield, prec);
                self.write("yield from ");
                self.expr(value, Precedence::Test);
                self.close(opened);
            }
            ExprKind::Compare {
                left,
                ops,
                comparators,
            } => {
                let opened = self.open(Precedence::Cmp, prec);
                self.expr(left, Precedence::Cmp.next());
                for (op, comparator) in ops.iter().zip(comparators) {
                    self.write(&format!(" {} ", op.as_str()));
                    self.expr(comparator, Precedence::Cmp.next());
                }
                self.close(opened);
            }
            ExprKind::Call {
                func,
                args,
                keywords,
            } => {
                self.expr(func, Precedence::Atom);
                self.write("(");
                let mut first = true;
                for arg in args {
                    self.comma(&mut first);
                    self.expr(arg, Precedence::Test);
                }
                for keyword in keywords {
                    self.comma(&mut first);
                    self.keyword(keyword);
                }
                self.write(")");
            }
            ExprKind::Num(text) => self.write(text),
            ExprKind::Str(value) | ExprKind::Doc(value) => self.write(&repr_str(value)),
            ExprKind::Bytes(value) => self.write(&repr_bytes(value)),
            ExprKind::FormattedValue { .. } => self.joined_str(std::slice::from_ref(expr)),
            ExprKind::JoinedStr(values) => self.joined_str(values),
            ExprKind::NameConstant(singleton) => self.write(singleton.as_str()),
            ExprKind::Ellipsis => self.write("..."),
            ExprKind::Constant(constant) => match constant {
                Constant::Singleton(singleton) => self.write(singleton.as_str()),
                Constant::Num(text) => self.write(text),
                Constant::Str(value) => self.write(&repr_str(value)),
                Constant::Bytes(value) => self.write(&repr_bytes(value)),
                Constant::Ellipsis => self.write("..."),
            },
            ExprKind::Attribute { value, attr } => {
                self.expr(value, Precedence::Atom);
                // `1.real` would lex as a float
                if let ExprKind::Num(text) = &value.kind {
                    if text.chars().all(|c| c.is_ascii_digit()) {
                        self.write(" ");
                    }
                }
                self.write(".");
                self.write(attr);
            }
            ExprKind::Subscript { value, slice } => {
                self.expr(value, Precedence::Atom);
                self.write("[");
                self.slice(slice);
                self.write("]");
            }
            ExprKind::Starred(value) => {
                self.write("*");
                self.expr(value, Precedence::BitOr);
            }
            ExprKind::Name(id) => self.write(id),
            ExprKind::List(elts) => {
                self.write("[");
                self.exprs(elts, Precedence::Test);
                self.write("]");
            }
            ExprKind::Tuple(elts) => self.tuple(elts, prec),
        }
    }

    fn tuple(&mut self, elts: &[Expr], prec: Precedence) {
        if elts.is_empty() {
            self.write("()");
            return;
        }
        // single-element tuples are always parenthesized
        let opened = if elts.len() == 1 {
            self.write("(");
            true
        } else {
            self.open(Precedence::Tuple, prec)
        };
        self.exprs(elts, Precedence::Test);
        if elts.len() == 1 {
            self.write(",");
        }
        self.close(opened);
    }

    fn slice(&mut self, slice: &Slice) {
        match slice {
            Slice::Index(value) => self.expr(value, Precedence::Tuple),
            Slice::Slice { lower, upper, step } => {
                if let Some(lower) = lower {
                    self.expr(lower, Precedence::Test);
                }
                self.write(":");
                if let Some(upper) = upper {
                    self.expr(upper, Precedence::Test);
                }
                if let Some(step) = step {
                    self.write(":");
                    self.expr(step, Precedence::Test);
                }
            }
            Slice::ExtSlice(dims) => {
                for (i, dim) in dims.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.slice(dim);
                }
                if dims.len() == 1 {
                    self.write(",");
                }
            }
        }
    }

    fn generators(&mut self, generators: &[Comprehension]) {
        for generator in generators {
            self.write(if generator.is_async {
                " async for "
            } else {
                " for "
            });
            self.expr(&generator.target, Precedence::Tuple);
            self.write(" in ");
            self.expr(&generator.iter, Precedence::Test.next());
            for condition in &generator.ifs {
                self.write(" if ");
                self.expr(condition, Precedence::Test.next());
            }
        }
    }

    /// f-string rendering; the expression parts use the base renderer
    fn joined_str(&mut self, values: &[Expr]) {
        let mut segments = Vec::new();
        fstring_segments(values, &mut segments);

        let quote = if segments.iter().any(|s| matches!(s, Segment::Code(code) if code.contains('\'')))
        {
            '"'
        } else {
            '\''
        };

        let mut out = String::from("f");
        out.push(quote);
        for segment in segments {
            match segment {
                Segment::Literal(text) => {
                    for c in text.chars() {
                        match c {
                            '{' => out.push_str("{{"),
                            '}' => out.push_str("}}"),
                            c => push_str_char(&mut out, c, quote),
                        }
                    }
                }
                Segment::Code(code) => out.push_str(&code),
            }
        }
        out.push(quote);
        self.write(&out);
    }
}

enum Segment {
    Literal(String),
    Code(String),
}

fn fstring_segments(values: &[Expr], segments: &mut Vec<Segment>) {
    for value in values {
        match &value.kind {
            ExprKind::Str(text) => segments.push(Segment::Literal(text.clone())),
            ExprKind::FormattedValue {
                value,
                conversion,
                format_spec,
            } => {
                let mut inner = Unparser::new();
                inner.expr(value, Precedence::Test.next());
                let mut code = String::from("{");
                if inner.out.starts_with('{') {
                    code.push(' ');
                }
                code.push_str(&inner.out);
                if let Some(conversion) = conversion {
                    code.push('!');
                    code.push(*conversion);
                }
                if let Some(spec) = format_spec {
                    code.push(':');
                    let parts = match &spec.kind {
                        ExprKind::JoinedStr(parts) => parts.as_slice(),
                        _ => std::slice::from_ref(spec.as_ref()),
                    };
                    let mut nested = Vec::new();
                    fstring_segments(parts, &mut nested);
                    for segment in nested {
                        match segment {
                            Segment::Literal(text) => code.push_str(&text),
                            Segment::Code(text) => code.push_str(&text),
                        }
                    }
                }
                code.push('}');
                segments.push(Segment::Code(code));
            }
            _ => {
                let rendered = Unparser::new().unparse_expr(value);
                segments.push(Segment::Code(format!("{{{}}}", rendered)));
            }
        }
    }
}

/// Push `c` as an escape sequence (`\xhh`, `\uhhhh` or `\Uhhhhhhhh`)
pub(crate) fn push_escape(out: &mut String, c: char) {
    let code = c as u32;
    if code <= 0xff {
        out.push_str(&format!("\\x{:02x}", code));
    } else if code <= 0xffff {
        out.push_str(&format!("\\u{:04x}", code));
    } else {
        out.push_str(&format!("\\U{:08x}", code));
    }
}

fn needs_escape(c: char) -> bool {
    c.is_control() || c == '\u{2028}' || c == '\u{2029}'
}

fn push_str_char(out: &mut String, c: char, quote: char) {
    match c {
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if c == quote => {
            out.push('\\');
            out.push(c);
        }
        c if needs_escape(c) => push_escape(out, c),
        c => out.push(c),
    }
}

/// Single-line string literal, quoted the way Python's `repr` quotes it
pub fn repr_str(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        push_str_char(&mut out, c, quote);
    }
    out.push(quote);
    out
}

pub fn repr_bytes(value: &[u8]) -> String {
    let quote = if value.contains(&b'\'') && !value.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };
    let mut out = String::with_capacity(value.len() + 3);
    out.push('b');
    out.push(quote as char);
    for &byte in value {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\x{:02x}", byte)),
        }
    }
    out.push(quote as char);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_module;

    fn roundtrip(source: &str) -> String {
        let module = parse_module(source, "test.py").unwrap();
        Unparser::new().unparse_module(&module)
    }

    // ==================== Statements ====================

    #[test]
    fn test_unparse_function_and_class() {
        let source = "\
@decorator
class C(Base, metaclass=Meta):
    def method(self, a, b=1, *args, key=None, **kw):
        return a
";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_unparse_control_flow() {
        let source = "\
for i in range(3):
    if i:
        continue
    elif i > 1:
        break
    else:
        pass
else:
    x = 1
while x:
    x -= 1
try:
    f()
except ValueError as e:
    raise RuntimeError('bad') from e
finally:
    g()
with open(p) as f, lock:
    pass
";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_unparse_imports() {
        let source = "import os.path as p, sys\nfrom ..pkg import a as b\nfrom . import *\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_empty_body_gets_pass() {
        let module = Module {
            body: vec![Stmt::new(
                StmtKind::ClassDef(ClassDef {
                    name: "C".to_string(),
                    bases: vec![],
                    keywords: vec![],
                    body: vec![],
                    decorators: vec![],
                }),
                Location::new(1, 0),
            )],
        };
        assert_eq!(Unparser::new().unparse_module(&module), "class C:\n    pass\n");
    }

    #[test]
    fn test_custom_indent() {
        let module = parse_module("if a:\n    b\n", "t.py").unwrap();
        let out = Unparser::new().with_indent("\t").unparse_module(&module);
        assert_eq!(out, "if a:\n\tb\n");
    }

    // ==================== Precedence ====================

    #[test]
    fn test_minimal_parentheses() {
        assert_eq!(roundtrip("x = (a + b) * c\n"), "x = (a + b) * c\n");
        assert_eq!(roundtrip("x = a + b * c\n"), "x = a + b * c\n");
        assert_eq!(roundtrip("x = a - (b - c)\n"), "x = a - (b - c)\n");
        assert_eq!(roundtrip("x = (-a) ** 2\n"), "x = (-a) ** 2\n");
        assert_eq!(roundtrip("x = -a ** 2\n"), "x = -a ** 2\n");
        assert_eq!(roundtrip("x = not a and b\n"), "x = not a and b\n");
        assert_eq!(roundtrip("x = (a or b) and c\n"), "x = (a or b) and c\n");
        assert_eq!(roundtrip("x = (lambda: 1)()\n"), "x = (lambda: 1)()\n");
    }

    #[test]
    fn test_tuples() {
        assert_eq!(roundtrip("x = 1,\n"), "x = (1,)\n");
        assert_eq!(roundtrip("f((1, 2))\n"), "f((1, 2))\n");
        assert_eq!(roundtrip("x = ()\n"), "x = ()\n");
        assert_eq!(roundtrip("a, b = b, a\n"), "a, b = b, a\n");
    }

    #[test]
    fn test_parenthesized_single_targets() {
        assert_eq!(roundtrip("(x) = 1\n"), "x = 1\n");
        assert_eq!(roundtrip("for (x) in y:\n    pass\n"), "for x in y:\n    pass\n");
        assert_eq!(roundtrip("(x): int = 1\n"), "(x): int = 1\n");
        assert_eq!(roundtrip("(a, b) = c\n"), "a, b = c\n");
    }

    #[test]
    fn test_slices_and_comprehensions() {
        assert_eq!(roundtrip("x[1:2, ::3]\n"), "x[1:2, ::3]\n");
        assert_eq!(roundtrip("x[a, b]\n"), "x[a, b]\n");
        assert_eq!(
            roundtrip("[x for x in xs if x]\n"),
            "[x for x in xs if x]\n"
        );
        assert_eq!(roundtrip("{k: v for k, v in d}\n"), "{k: v for k, v in d}\n");
    }

    #[test]
    fn test_yield_parenthesized_in_call() {
        assert_eq!(roundtrip("def g():\n    x = yield\n    f((yield x))\n"),
            "def g():\n    x = yield\n    f((yield x))\n");
    }

    // ==================== Literals ====================

    #[test]
    fn test_repr_str_quotes() {
        assert_eq!(repr_str("plain"), "'plain'");
        assert_eq!(repr_str("it's"), "\"it's\"");
        assert_eq!(repr_str("'\""), "'\\'\"'");
        assert_eq!(repr_str("a\nb\t\u{0}"), "'a\\nb\\t\\x00'");
    }

    #[test]
    fn test_repr_bytes() {
        assert_eq!(repr_bytes(b"ab\x00\xff"), "b'ab\\x00\\xff'");
    }

    #[test]
    fn test_base_dict_parenthesizes_unpacking() {
        assert_eq!(roundtrip("{'a': 1, **m}\n"), "{'a': 1, **(m)}\n");
    }

    #[test]
    fn test_base_fstring_rendering() {
        assert_eq!(roundtrip("f'a{b!r:>4}{{c}}'\n"), "f'a{b!r:>4}{{c}}'\n");
    }

    #[test]
    fn test_attribute_on_integer() {
        assert_eq!(roundtrip("x = 1 .real\n"), "x = 1 .real\n");
    }
}
