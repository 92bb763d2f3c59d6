//! Error types shared across the pydown crates

use thiserror::Error;

use crate::ast::Location;

/// The source text could not be turned into a syntax tree
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{path}:{line}:{column}: {message}")]
pub struct ParseError {
    pub path: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(path: &str, location: Location, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            line: location.line,
            column: location.column,
            message: message.into(),
        }
    }
}

/// Errors raised while rewriting a tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewriteError {
    #[error("{construct} is python3.6 specific and not supported ({location})")]
    Unsupported {
        construct: &'static str,
        location: Location,
    },
}
