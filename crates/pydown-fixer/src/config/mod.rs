//! Layout settings shared by the fixers and the unparser

mod whitespace;

pub use whitespace::{IndentStyle, LineEnding, WhitespaceConfig};
