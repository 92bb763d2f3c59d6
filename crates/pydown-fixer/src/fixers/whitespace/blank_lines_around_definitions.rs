//! Blank lines around function and class definitions
//!
//! Top-level definitions are separated from surrounding statements by two
//! blank lines, nested ones by one (options `top_level_blank_lines` and
//! `nested_blank_lines`). A definition that opens its enclosing block gets
//! none, and decorators and comments directly above a definition stay
//! attached to it.

use pydown_core::Edit;
use regex::Regex;
use std::sync::OnceLock;

use crate::fixers::lines::{scan_lines, SourceLine};
use crate::fixers::{edit_with_rule, Fixer, FixerConfig};

pub struct BlankLinesAroundDefinitionsFixer;

static DEFINITION: OnceLock<Regex> = OnceLock::new();

fn is_definition(text: &str) -> bool {
    DEFINITION
        .get_or_init(|| Regex::new(r"^\s*(?:async\s+)?(?:def|class)\s").unwrap())
        .is_match(text)
}

fn is_decorator(text: &str) -> bool {
    text.trim_start().starts_with('@')
}

impl Fixer for BlankLinesAroundDefinitionsFixer {
    fn name(&self) -> &'static str {
        "blank_lines_around_definitions"
    }

    fn description(&self) -> &'static str {
        "Separate function and class definitions with blank lines"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn check(&self, source: &str, config: &FixerConfig) -> Vec<Edit> {
        let top_level = config.number("top_level_blank_lines", 2);
        let nested = config.number("nested_blank_lines", 1);
        let line_ending = config.line_ending.as_str();

        let lines = scan_lines(source);
        let mut edits = Vec::new();
        // indexes of code lines seen so far
        let mut code: Vec<usize> = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            if !line.is_code(source) {
                continue;
            }
            let text = line.text(source);
            let indent = line.indent(source);
            let Some(&prev) = code.last() else {
                code.push(index);
                continue;
            };
            let prev_line = &lines[prev];
            let prev_text = prev_line.text(source);
            let prev_indent = prev_line.indent(source);

            let opens_definition = (is_definition(text) || is_decorator(text))
                && !(is_decorator(prev_text) && prev_indent == indent)
                && prev_indent >= indent;

            // the nearest earlier statement at this level or above
            let follows_definition = code
                .iter()
                .rev()
                .map(|&i| &lines[i])
                .find(|l| l.indent(source) <= indent)
                .is_some_and(|l: &SourceLine| {
                    l.indent(source) == indent && is_definition(l.text(source))
                });

            code.push(index);
            if !opens_definition && !follows_definition {
                continue;
            }

            let required = if indent == 0 { top_level } else { nested };

            // comments directly above belong to the statement
            let mut target = index;
            while target > 0
                && lines[target - 1].is_comment(source)
                && lines[target - 1].indent(source) == indent
            {
                target -= 1;
            }

            let existing = lines[..target]
                .iter()
                .rev()
                .take_while(|l| l.is_blank(source))
                .count();
            if existing < required && target > 0 {
                edits.push(edit_with_rule(
                    lines[target].start,
                    lines[target].start,
                    line_ending.repeat(required - existing),
                    format!(
                        "Insert {} blank line(s) before line {}",
                        required - existing,
                        target + 1
                    ),
                    self.name(),
                ));
            }
        }

        edits
    }
}
