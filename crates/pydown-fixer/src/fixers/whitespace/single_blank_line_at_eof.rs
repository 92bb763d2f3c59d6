//! Exactly one line terminator at end of file

use pydown_core::Edit;

use crate::fixers::{edit_with_rule, Fixer, FixerConfig};

pub struct SingleBlankLineAtEofFixer;

impl Fixer for SingleBlankLineAtEofFixer {
    fn name(&self) -> &'static str {
        "single_blank_line_at_eof"
    }

    fn description(&self) -> &'static str {
        "Ensure file ends with exactly one newline"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn check(&self, source: &str, config: &FixerConfig) -> Vec<Edit> {
        let terminator = config.line_ending.as_str();
        let last = source.trim_end().len();

        match &source[last..] {
            _ if last == 0 => Vec::new(),
            tail if tail == terminator => Vec::new(),
            tail => vec![edit_with_rule(
                last,
                source.len(),
                terminator.to_string(),
                format!("Replace {:?} at end of file with one line ending", tail),
                self.name(),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineEnding;

    fn check_with(source: &str, line_ending: LineEnding) -> Vec<Edit> {
        SingleBlankLineAtEofFixer.check(
            source,
            &FixerConfig {
                line_ending,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_correct_ending() {
        assert!(check_with("a = 1\n", LineEnding::Lf).is_empty());
        assert!(check_with("a = 1\r\n", LineEnding::CrLf).is_empty());
    }

    #[test]
    fn test_no_trailing_newline() {
        let edits = check_with("a = 1", LineEnding::Lf);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].replacement, "\n");
        assert_eq!(edits[0].start_offset(), 5);
    }

    #[test]
    fn test_multiple_trailing_newlines() {
        let edits = check_with("a = 1\n\n\n", LineEnding::Lf);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].end_offset(), 8);
    }

    #[test]
    fn test_crlf_to_single() {
        let edits = check_with("a = 1\r\n\r\n", LineEnding::CrLf);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].replacement, "\r\n");
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert!(check_with("", LineEnding::Lf).is_empty());
        assert!(check_with("  \n\n", LineEnding::Lf).is_empty());
    }
}
