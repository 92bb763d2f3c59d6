//! Python 3.6 syntax tree
//!
//! The node set follows the Python `ast` module of the 3.6 dialect, with one
//! addition: [`ExprKind::Doc`], a marker the rewriter places around doc strings
//! so the unparser can render them as triple-quoted blocks.

/// Source position of a node (1-based line, 0-based column in bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A parsed module: the root of the tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: Location,
}

impl Stmt {
    pub fn new(kind: StmtKind, location: Location) -> Self {
        Self { kind, location }
    }

    /// A `pass` statement at the given location
    pub fn pass(location: Location) -> Self {
        Self::new(StmtKind::Pass, location)
    }

    /// Name of the node kind as used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            StmtKind::FunctionDef(_) => "FunctionDef",
            StmtKind::AsyncFunctionDef(_) => "AsyncFunctionDef",
            StmtKind::ClassDef(_) => "ClassDef",
            StmtKind::Return(_) => "Return",
            StmtKind::Delete(_) => "Delete",
            StmtKind::Assign { .. } => "Assign",
            StmtKind::AugAssign { .. } => "AugAssign",
            StmtKind::AnnAssign { .. } => "AnnAssign",
            StmtKind::For(_) => "For",
            StmtKind::AsyncFor(_) => "AsyncFor",
            StmtKind::While { .. } => "While",
            StmtKind::If { .. } => "If",
            StmtKind::With(_) => "With",
            StmtKind::AsyncWith(_) => "AsyncWith",
            StmtKind::Raise { .. } => "Raise",
            StmtKind::Try { .. } => "Try",
            StmtKind::Assert { .. } => "Assert",
            StmtKind::Import(_) => "Import",
            StmtKind::ImportFrom { .. } => "ImportFrom",
            StmtKind::Global(_) => "Global",
            StmtKind::Nonlocal(_) => "Nonlocal",
            StmtKind::Expr(_) => "Expr",
            StmtKind::Pass => "Pass",
            StmtKind::Break => "Break",
            StmtKind::Continue => "Continue",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    FunctionDef(FunctionDef),
    AsyncFunctionDef(FunctionDef),
    ClassDef(ClassDef),
    Return(Option<Expr>),
    Delete(Vec<Expr>),
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: BinOperator,
        value: Expr,
    },
    AnnAssign {
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
        /// Target is a bare name that was not parenthesized
        simple: bool,
    },
    For(For),
    AsyncFor(For),
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    With(With),
    AsyncWith(With),
    Raise {
        exc: Option<Expr>,
        cause: Option<Expr>,
    },
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
    },
    Assert {
        test: Expr,
        msg: Option<Expr>,
    },
    Import(Vec<Alias>),
    ImportFrom {
        module: Option<String>,
        names: Vec<Alias>,
        /// Number of leading dots of a relative import
        level: usize,
    },
    Global(Vec<String>),
    Nonlocal(Vec<String>),
    Expr(Expr),
    Pass,
    Break,
    Continue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub args: Arguments,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
    pub returns: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<Expr>,
    pub keywords: Vec<Keyword>,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub target: Expr,
    pub iter: Expr,
    pub body: Vec<Stmt>,
    pub orelse: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct With {
    pub items: Vec<WithItem>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithItem {
    pub context_expr: Expr,
    pub optional_vars: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler {
    pub type_: Option<Expr>,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
    pub location: Location,
}

/// One name of an import statement (`name as asname`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}

impl Alias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asname: None,
        }
    }
}

/// Parameter list of a function or lambda
///
/// `defaults` apply to the trailing entries of `args`; `kw_defaults` is
/// aligned one-to-one with `kwonlyargs`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    pub args: Vec<Arg>,
    pub vararg: Option<Arg>,
    pub kwonlyargs: Vec<Arg>,
    pub kw_defaults: Vec<Option<Expr>>,
    pub kwarg: Option<Arg>,
    pub defaults: Vec<Expr>,
}

impl Arguments {
    /// Iterate over every parameter, including `*args` and `**kwargs`
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Arg> {
        self.args
            .iter_mut()
            .chain(self.vararg.iter_mut())
            .chain(self.kwonlyargs.iter_mut())
            .chain(self.kwarg.iter_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.args
            .iter()
            .chain(self.vararg.iter())
            .chain(self.kwonlyargs.iter())
            .chain(self.kwarg.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: String,
    pub annotation: Option<Expr>,
    pub location: Location,
}

/// Keyword argument of a call or class definition; `arg: None` is `**value`
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: Location,
}

impl Expr {
    pub fn new(kind: ExprKind, location: Location) -> Self {
        Self { kind, location }
    }

    pub fn name(id: impl Into<String>, location: Location) -> Self {
        Self::new(ExprKind::Name(id.into()), location)
    }

    pub fn str(value: impl Into<String>, location: Location) -> Self {
        Self::new(ExprKind::Str(value.into()), location)
    }

    pub fn none(location: Location) -> Self {
        Self::new(ExprKind::NameConstant(Singleton::None), location)
    }

    /// The identifier if this is a plain name
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name(id) => Some(id),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::BoolOp { .. } => "BoolOp",
            ExprKind::BinOp { .. } => "BinOp",
            ExprKind::UnaryOp { .. } => "UnaryOp",
            ExprKind::Lambda { .. } => "Lambda",
            ExprKind::IfExp { .. } => "IfExp",
            ExprKind::Dict { .. } => "Dict",
            ExprKind::Set(_) => "Set",
            ExprKind::ListComp { .. } => "ListComp",
            ExprKind::SetComp { .. } => "SetComp",
            ExprKind::DictComp { .. } => "DictComp",
            ExprKind::GeneratorExp { .. } => "GeneratorExp",
            ExprKind::Await(_) => "Await",
            ExprKind::Yield(_) => "Yield",
            ExprKind::YieldFrom(_) => "YieldFrom",
            ExprKind::Compare { .. } => "Compare",
            ExprKind::Call { .. } => "Call",
            ExprKind::Num(_) => "Num",
            ExprKind::Str(_) => "Str",
            ExprKind::Bytes(_) => "Bytes",
            ExprKind::FormattedValue { .. } => "FormattedValue",
            ExprKind::JoinedStr(_) => "JoinedStr",
            ExprKind::NameConstant(_) => "NameConstant",
            ExprKind::Ellipsis => "Ellipsis",
            ExprKind::Constant(_) => "Constant",
            ExprKind::Attribute { .. } => "Attribute",
            ExprKind::Subscript { .. } => "Subscript",
            ExprKind::Starred(_) => "Starred",
            ExprKind::Name(_) => "Name",
            ExprKind::List(_) => "List",
            ExprKind::Tuple(_) => "Tuple",
            ExprKind::Doc(_) => "Doc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    BoolOp {
        op: BoolOperator,
        values: Vec<Expr>,
    },
    BinOp {
        left: Box<Expr>,
        op: BinOperator,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    Lambda {
        args: Box<Arguments>,
        body: Box<Expr>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    /// A `None` key marks a `**mapping` entry
    Dict {
        keys: Vec<Option<Expr>>,
        values: Vec<Expr>,
    },
    Set(Vec<Expr>),
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    SetComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    GeneratorExp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    Await(Box<Expr>),
    Yield(Option<Box<Expr>>),
    YieldFrom(Box<Expr>),
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOperator>,
        comparators: Vec<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    /// Numeric literal as written (digit-grouping underscores removed)
    Num(String),
    Str(String),
    Bytes(Vec<u8>),
    FormattedValue {
        value: Box<Expr>,
        conversion: Option<char>,
        format_spec: Option<Box<Expr>>,
    },
    /// f-string: a sequence of `Str` and `FormattedValue` parts
    JoinedStr(Vec<Expr>),
    NameConstant(Singleton),
    Ellipsis,
    /// Generic constant node; never produced by the parser
    Constant(Constant),
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        slice: Box<Slice>,
    },
    Starred(Box<Expr>),
    Name(String),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    /// Doc string recognized by the rewriter
    Doc(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Singleton {
    None,
    True,
    False,
}

impl Singleton {
    pub fn as_str(&self) -> &'static str {
        match self {
            Singleton::None => "None",
            Singleton::True => "True",
            Singleton::False => "False",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Singleton(Singleton),
    Num(String),
    Str(String),
    Bytes(Vec<u8>),
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Slice {
    Index(Expr),
    Slice {
        lower: Option<Expr>,
        upper: Option<Expr>,
        step: Option<Expr>,
    },
    ExtSlice(Vec<Slice>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOperator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

impl BinOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOperator::Add => "+",
            BinOperator::Sub => "-",
            BinOperator::Mult => "*",
            BinOperator::MatMult => "@",
            BinOperator::Div => "/",
            BinOperator::Mod => "%",
            BinOperator::Pow => "**",
            BinOperator::LShift => "<<",
            BinOperator::RShift => ">>",
            BinOperator::BitOr => "|",
            BinOperator::BitXor => "^",
            BinOperator::BitAnd => "&",
            BinOperator::FloorDiv => "//",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => BinOperator::Add,
            "-" => BinOperator::Sub,
            "*" => BinOperator::Mult,
            "@" => BinOperator::MatMult,
            "/" => BinOperator::Div,
            "%" => BinOperator::Mod,
            "**" => BinOperator::Pow,
            "<<" => BinOperator::LShift,
            ">>" => BinOperator::RShift,
            "|" => BinOperator::BitOr,
            "^" => BinOperator::BitXor,
            "&" => BinOperator::BitAnd,
            "//" => BinOperator::FloorDiv,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Invert,
    Not,
    UAdd,
    USub,
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Invert => "~",
            UnaryOperator::Not => "not ",
            UnaryOperator::UAdd => "+",
            UnaryOperator::USub => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOperator::Eq => "==",
            CmpOperator::NotEq => "!=",
            CmpOperator::Lt => "<",
            CmpOperator::LtE => "<=",
            CmpOperator::Gt => ">",
            CmpOperator::GtE => ">=",
            CmpOperator::Is => "is",
            CmpOperator::IsNot => "is not",
            CmpOperator::In => "in",
            CmpOperator::NotIn => "not in",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "==" => CmpOperator::Eq,
            "!=" | "<>" => CmpOperator::NotEq,
            "<" => CmpOperator::Lt,
            "<=" => CmpOperator::LtE,
            ">" => CmpOperator::Gt,
            ">=" => CmpOperator::GtE,
            "is" => CmpOperator::Is,
            "is not" => CmpOperator::IsNot,
            "in" => CmpOperator::In,
            "not in" => CmpOperator::NotIn,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_iter_covers_all_slots() {
        let loc = Location::default();
        let arg = |name: &str| Arg {
            name: name.to_string(),
            annotation: None,
            location: loc,
        };
        let args = Arguments {
            args: vec![arg("a"), arg("b")],
            vararg: Some(arg("rest")),
            kwonlyargs: vec![arg("key")],
            kw_defaults: vec![None],
            kwarg: Some(arg("options")),
            defaults: vec![],
        };

        let names: Vec<&str> = args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "rest", "key", "options"]);
    }

    #[test]
    fn test_operator_tokens() {
        assert_eq!(BinOperator::from_token("@"), Some(BinOperator::MatMult));
        assert_eq!(BinOperator::from_token("//"), Some(BinOperator::FloorDiv));
        assert_eq!(BinOperator::from_token("and"), None);
        assert_eq!(CmpOperator::from_token("not in"), Some(CmpOperator::NotIn));
        assert_eq!(CmpOperator::from_token("<>"), Some(CmpOperator::NotEq));
    }

    #[test]
    fn test_kind_names() {
        let loc = Location::new(1, 0);
        assert_eq!(Expr::name("x", loc).kind_name(), "Name");
        assert_eq!(Stmt::pass(loc).kind_name(), "Pass");
        assert_eq!(Expr::none(loc).as_name(), None);
    }
}
