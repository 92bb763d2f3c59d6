//! Terminal output for pydown
//!
//! Rewrite reports and rule listings are colored; diffs are plain unified
//! diffs so they can be piped into `patch`.

use colored::*;
use pydown_fixer::fixers::FixerInfo;
use pydown_rules::{Category, Change};
use similar::{ChangeTag, TextDiff};
use std::fmt::Write;
use std::path::Path;

/// Print the rewrites applied to `path` on stderr
pub fn report_changes(path: &Path, changes: &[Change]) {
    if changes.is_empty() {
        eprintln!("{}: No rewrites needed", path.display());
        return;
    }

    eprintln!("{}", path.display().to_string().bold());
    for change in changes {
        eprintln!(
            "  {} {} {}",
            format!("{}:{}", change.location.line, change.location.column).dimmed(),
            format!("[{}]", change.rule).cyan(),
            change.message
        );
    }
    eprintln!(
        "  {} Applied {} rewrite(s)",
        "OK".green(),
        changes.len()
    );
}

/// Render a unified diff between the input and the converted text
///
/// Returns an empty string when the two are identical.
pub fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let path_str = path.display().to_string();
    let mut out = String::new();

    let mut unified = diff.unified_diff();
    let mut hunks = unified.context_radius(3).iter_hunks().peekable();
    if hunks.peek().is_none() {
        return out;
    }

    let _ = writeln!(out, "--- a/{}", path_str);
    let _ = writeln!(out, "+++ b/{}", path_str);

    for hunk in hunks {
        let _ = writeln!(out, "{}", hunk.header());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            let _ = write!(out, "{}{}", sign, change.value());
            if change.missing_newline() {
                let _ = writeln!(out);
            }
        }
    }

    out
}

/// Print the available rules grouped by category, then the layout fixers
pub fn print_rules(rules: &[(&'static str, Category, &'static str)], fixers: &[FixerInfo]) {
    println!("{}", "Available rules:".bold());

    let categories = [
        Category::Imports,
        Category::Annotations,
        Category::Syntax,
        Category::Output,
    ];
    for category in categories {
        let in_category: Vec<_> = rules.iter().filter(|(_, c, _)| *c == category).collect();
        if in_category.is_empty() {
            continue;
        }
        println!();
        println!("  {}", category.as_str().yellow());
        for (name, _, description) in in_category {
            println!("    {} - {}", name.green(), description);
        }
    }

    println!();
    println!("{}", "Layout fixers (in run order):".bold());
    for fixer in fixers {
        println!("    {} - {}", fixer.name.green(), fixer.description);
    }
}
