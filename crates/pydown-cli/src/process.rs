//! The conversion pipeline
//!
//! Parse, rewrite, unparse, then lay the text out with the built-in fixers
//! and an optional external formatter. A leading shebang line is carried
//! through untouched.

use anyhow::{Context, Result};
use pydown_core::logging;
use pydown_core::unparse::DOWNGRADE_OVERRIDES;
use pydown_core::{parse_module, Unparser};
use pydown_fixer::{ExternalFormatter, FixerRegistry};
use pydown_rules::{Change, RewriteOptions, RuleRegistry};
use std::collections::HashSet;
use std::path::Path;

use crate::config::FormatConfig;

/// Everything a conversion needs besides the source text
pub struct Pipeline<'a> {
    pub rules: &'a RuleRegistry,
    pub enabled: HashSet<String>,
    pub options: RewriteOptions,
    pub format: FormatConfig,
}

/// Result of converting one file
#[derive(Debug)]
pub struct Conversion {
    pub output: String,
    pub changes: Vec<Change>,
}

/// A `#!` first line, without its terminator; the parser reads it as a comment
fn shebang(source: &str) -> Option<&str> {
    let line = source.lines().next()?;
    line.starts_with("#!").then_some(line)
}

impl Pipeline<'_> {
    pub fn convert(&self, source: &str, path: &Path) -> Result<Conversion> {
        logging::subsection("PARSE");
        let module = parse_module(source, &path.display().to_string())?;
        logging::log(&format!("Parsed {} top-level statement(s)", module.body.len()));

        logging::subsection("REWRITE");
        let outcome = self
            .rules
            .rewrite_all(module, &self.enabled, self.options.clone())?;

        let mut text = Unparser::new()
            .with_indent(self.format.indent.unit())
            .with_overrides(DOWNGRADE_OVERRIDES)
            .unparse_module(&outcome.module);

        if self.format.enabled {
            let (fixed, edits) = FixerRegistry::new()
                .check_all(&text, &self.format.fixer_config())
                .context("Failed to lay out converted source")?;
            logging::log(&format!("Layout fixers applied {} edit(s)", edits.len()));
            text = fixed;

            if let Some(command) = &self.format.command {
                text = ExternalFormatter::new(command.clone()).format(&text)?;
            }
        }

        let output = match shebang(source) {
            Some(line) => format!("{}{}{}", line, self.format.line_ending.as_str(), text),
            None => text,
        };

        Ok(Conversion {
            output,
            changes: outcome.changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pydown_fixer::{IndentStyle, LineEnding};

    fn pipeline(rules: &RuleRegistry) -> Pipeline<'_> {
        Pipeline {
            rules,
            enabled: rules.all_names().iter().map(|s| s.to_string()).collect(),
            options: RewriteOptions::default(),
            format: FormatConfig::default(),
        }
    }

    fn convert(source: &str) -> Result<Conversion> {
        let rules = RuleRegistry::new();
        pipeline(&rules).convert(source, Path::new("test.py"))
    }

    #[test]
    fn test_shebang_line() {
        assert_eq!(shebang("#!/usr/bin/env python3\nx = 1\n"), Some("#!/usr/bin/env python3"));
        assert_eq!(shebang("#!/bin/py\r\nx\n"), Some("#!/bin/py"));
        assert_eq!(shebang("#!/bin/py"), Some("#!/bin/py"));
        assert_eq!(shebang("# comment\nx\n"), None);
        assert_eq!(shebang("x = 1\n#!/bin/py\n"), None);
        assert_eq!(shebang(""), None);
    }

    #[test]
    fn test_full_conversion() {
        let source = "\
from typing import NamedTuple, List
class Point(NamedTuple):
    x: int
    y: int
def norm(p: Point) -> float:
    total: float = p.x + p.y
    return total
print(f'x={norm(Point(1, 2))}')
";
        let conversion = convert(source).unwrap();
        assert_eq!(
            conversion.output,
            "\
from collections import namedtuple


class Point(namedtuple('Point', ('x', 'y'))):
    pass


def norm(p):
    total = p.x + p.y
    return total


print('x=%s' % (norm(Point(1, 2)),))
"
        );
        let rules: HashSet<&str> = conversion.changes.iter().map(|c| c.rule).collect();
        assert!(rules.contains("typing_imports"));
        assert!(rules.contains("named_tuple"));
        assert!(rules.contains("function_annotations"));
        assert!(rules.contains("variable_annotations"));
        assert!(rules.contains("fstrings"));
    }

    #[test]
    fn test_shebang_preserved() {
        let conversion = convert("#!/usr/bin/env python3\nx: int = 1\n").unwrap();
        assert_eq!(conversion.output, "#!/usr/bin/env python3\nx = 1\n");
    }

    #[test]
    fn test_valid_program_is_unchanged() {
        let source = "import os\n\n\ndef main():\n    return os.getcwd()\n\n\nmain()\n";
        let conversion = convert(source).unwrap();
        assert_eq!(conversion.output, source);
        assert!(conversion.changes.is_empty());
    }

    #[test]
    fn test_unsupported_construct_fails() {
        let err = convert("async def f():\n    pass\n").unwrap_err();
        assert!(err.to_string().contains("python3.6 specific"));

        let err = convert("c = a @ b\n").unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn test_parse_error_fails() {
        assert!(convert("def f(:\n").is_err());
    }

    #[test]
    fn test_disabled_rules_are_skipped() {
        let rules = RuleRegistry::new();
        let mut pipeline = pipeline(&rules);
        pipeline.enabled = ["variable_annotations".to_string()].into_iter().collect();
        let conversion = pipeline
            .convert("def f(a: int):\n    b: int = a\n", Path::new("t.py"))
            .unwrap();
        assert_eq!(conversion.output, "def f(a: int):\n    b = a\n");
        assert_eq!(conversion.changes.len(), 1);
    }

    #[test]
    fn test_format_settings() {
        let rules = RuleRegistry::new();
        let mut pipeline = pipeline(&rules);
        pipeline.format.indent = IndentStyle::Spaces(2);
        pipeline.format.line_ending = LineEnding::CrLf;
        let conversion = pipeline
            .convert("#!/bin/py\nx = 1\ndef f():\n    return x\n", Path::new("t.py"))
            .unwrap();
        assert_eq!(
            conversion.output,
            "#!/bin/py\r\nx = 1\r\n\r\n\r\ndef f():\r\n  return x\r\n"
        );
    }

    #[test]
    fn test_format_disabled_keeps_unparsed_text() {
        let rules = RuleRegistry::new();
        let mut pipeline = pipeline(&rules);
        pipeline.format.enabled = false;
        let conversion = pipeline
            .convert("x = 1\n\n\ndef f():\n    pass\n", Path::new("t.py"))
            .unwrap();
        assert_eq!(conversion.output, "x = 1\ndef f():\n    pass\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_external_formatter() {
        let rules = RuleRegistry::new();
        let mut pipeline = pipeline(&rules);
        pipeline.format.command = Some(vec!["tr".into(), "a-z".into(), "A-Z".into()]);
        let conversion = pipeline.convert("x = 1\n", Path::new("t.py")).unwrap();
        assert_eq!(conversion.output, "X = 1\n");

        pipeline.format.command = Some(vec!["pydown-no-such-formatter".into()]);
        assert!(pipeline.convert("x = 1\n", Path::new("t.py")).is_err());
    }
}
