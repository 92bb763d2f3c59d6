//! pydown-core: syntax tree, parser and unparser for the pydown downgrader
//!
//! Provides the Python 3.6 syntax tree, a tree-sitter based parser that
//! lowers into it, an owning tree transformer, the unparser used to write
//! 3.4 source back out, and span edits for the formatter.

pub mod ast;
pub mod edit;
pub mod error;
pub mod logging;
pub mod parser;
pub mod transform;
pub mod unparse;

pub use ast::{Expr, ExprKind, Location, Module, Stmt, StmtKind};
pub use edit::{apply_edits, Edit, EditError, Span};
pub use error::{ParseError, RewriteError};
pub use parser::parse_module;
pub use transform::Transformer;
pub use unparse::{unparse, Unparser};
