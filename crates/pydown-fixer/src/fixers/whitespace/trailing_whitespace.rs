//! Remove trailing whitespace from lines

use pydown_core::Edit;

use crate::fixers::lines::scan_lines;
use crate::fixers::{edit_with_rule, Fixer, FixerConfig};

/// Removes trailing whitespace at the end of lines
///
/// Lines whose end lies inside a string literal keep their whitespace,
/// since it is part of the string's value.
pub struct TrailingWhitespaceFixer;

impl Fixer for TrailingWhitespaceFixer {
    fn name(&self) -> &'static str {
        "trailing_whitespace"
    }

    fn description(&self) -> &'static str {
        "Remove trailing whitespace at the end of lines"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn check(&self, source: &str, _config: &FixerConfig) -> Vec<Edit> {
        let mut edits = Vec::new();

        for (line_num, line) in scan_lines(source).iter().enumerate() {
            if line.open_string {
                continue;
            }
            let text = line.text(source);
            let trimmed = text.trim_end();
            if trimmed.len() < text.len() {
                edits.push(edit_with_rule(
                    line.start + trimmed.len(),
                    line.end,
                    String::new(),
                    format!("Remove trailing whitespace on line {}", line_num + 1),
                    self.name(),
                ));
            }
        }

        edits
    }
}
