//! Remove extra blank lines

use pydown_core::Edit;

use crate::fixers::lines::scan_lines;
use crate::fixers::{edit_with_rule, Fixer, FixerConfig};

/// Collapses runs of blank lines longer than `max_blank_lines` (default 2)
/// and drops blank lines at the start of the file
pub struct NoExtraBlankLinesFixer;

impl Fixer for NoExtraBlankLinesFixer {
    fn name(&self) -> &'static str {
        "no_extra_blank_lines"
    }

    fn description(&self) -> &'static str {
        "Remove extra blank lines"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn check(&self, source: &str, config: &FixerConfig) -> Vec<Edit> {
        let max = config.number("max_blank_lines", 2);
        let lines = scan_lines(source);
        let mut edits = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            if !lines[i].is_blank(source) {
                i += 1;
                continue;
            }
            let run_start = i;
            while i < lines.len() && lines[i].is_blank(source) {
                i += 1;
            }
            let allowed = if run_start == 0 { 0 } else { max };
            if i - run_start > allowed {
                edits.push(edit_with_rule(
                    lines[run_start + allowed].start,
                    lines[i - 1].next,
                    String::new(),
                    format!("Remove {} extra blank line(s)", i - run_start - allowed),
                    self.name(),
                ));
            }
        }

        edits
    }
}
