//! Normalize line endings
//!
//! Applies inside string literals too: Python reads every line terminator
//! in source as `\n`, so string values are unaffected.

use pydown_core::Edit;

use crate::fixers::{edit_with_rule, Fixer, FixerConfig};

/// Rewrites every line terminator to the configured one
pub struct LineEndingFixer;

/// Byte ranges of all `\r\n`, `\n` and bare `\r` terminators
fn terminators(source: &str) -> Vec<(usize, usize)> {
    let bytes = source.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let width = match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
            b'\r' | b'\n' => 1,
            _ => {
                i += 1;
                continue;
            }
        };
        found.push((i, i + width));
        i += width;
    }
    found
}

fn terminator_name(text: &str) -> &'static str {
    match text {
        "\r\n" => "CRLF",
        "\r" => "CR",
        _ => "LF",
    }
}

impl Fixer for LineEndingFixer {
    fn name(&self) -> &'static str {
        "line_ending"
    }

    fn description(&self) -> &'static str {
        "Normalize line endings (LF or CRLF)"
    }

    fn priority(&self) -> i32 {
        70
    }

    fn check(&self, source: &str, config: &FixerConfig) -> Vec<Edit> {
        let target = config.line_ending.as_str();

        terminators(source)
            .into_iter()
            .filter(|&(start, end)| &source[start..end] != target)
            .map(|(start, end)| {
                edit_with_rule(
                    start,
                    end,
                    target.to_string(),
                    format!(
                        "Convert {} to {}",
                        terminator_name(&source[start..end]),
                        terminator_name(target)
                    ),
                    self.name(),
                )
            })
            .collect()
    }
}
