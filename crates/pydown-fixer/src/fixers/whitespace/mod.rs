//! Whitespace fixers for Python code layout
//!
//! These fixers handle line endings, trailing whitespace and blank lines.
//! None of them change text inside multi-line string literals.

mod blank_lines_around_definitions;
mod line_ending;
mod no_extra_blank_lines;
mod single_blank_line_at_eof;
mod trailing_whitespace;

pub use blank_lines_around_definitions::BlankLinesAroundDefinitionsFixer;
pub use line_ending::LineEndingFixer;
pub use no_extra_blank_lines::NoExtraBlankLinesFixer;
pub use single_blank_line_at_eof::SingleBlankLineAtEofFixer;
pub use trailing_whitespace::TrailingWhitespaceFixer;
