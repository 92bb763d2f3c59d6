//! Fixer implementations
//!
//! Each fixer inspects the source text and returns span edits. Fixers see
//! the output of the fixers that ran before them, in priority order.

pub mod lines;
mod registry;
pub mod whitespace;

pub use registry::{FixerInfo, FixerRegistry};

use std::collections::HashMap;

use pydown_core::{Edit, Span};

use crate::config::{IndentStyle, LineEnding, WhitespaceConfig};

/// Configuration passed to fixers
#[derive(Debug, Clone, Default)]
pub struct FixerConfig {
    /// Indentation style
    pub indent: IndentStyle,
    /// Line ending style
    pub line_ending: LineEnding,
    /// Fixer-specific options
    pub options: HashMap<String, ConfigValue>,
}

impl From<&WhitespaceConfig> for FixerConfig {
    fn from(ws: &WhitespaceConfig) -> Self {
        Self {
            indent: ws.indent,
            line_ending: ws.line_ending,
            options: HashMap::new(),
        }
    }
}

impl FixerConfig {
    /// Numeric option, or `default` when unset or not a number
    pub fn number(&self, key: &str, default: usize) -> usize {
        match self.options.get(key) {
            Some(ConfigValue::Number(n)) => *n,
            _ => default,
        }
    }
}

/// Configuration value types for fixer options
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    String(String),
    Number(usize),
}

/// A layout fixer applied to Python source
pub trait Fixer: Send + Sync {
    /// Internal name for this fixer
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Execution priority (higher = runs first)
    ///
    /// - 70: line endings
    /// - 60: trailing whitespace
    /// - 30: blank lines around definitions
    /// - 20: blank line cleanup
    /// - 10: end of file
    fn priority(&self) -> i32;

    /// Check the source and return edits to apply
    fn check(&self, source: &str, config: &FixerConfig) -> Vec<Edit>;
}

/// Create an Edit with a rule name
pub fn edit_with_rule(start: usize, end: usize, replacement: String, message: String, rule: &str) -> Edit {
    Edit::new(Span::new(start, end), replacement, message).with_rule(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_with_rule() {
        let edit = edit_with_rule(3, 5, "x".to_string(), "replace".to_string(), "demo");
        assert_eq!(edit.start_offset(), 3);
        assert_eq!(edit.end_offset(), 5);
        assert_eq!(edit.rule.as_deref(), Some("demo"));
    }

    #[test]
    fn test_number_option() {
        let mut config = FixerConfig::default();
        assert_eq!(config.number("max_blank_lines", 2), 2);
        config
            .options
            .insert("max_blank_lines".to_string(), ConfigValue::Number(1));
        assert_eq!(config.number("max_blank_lines", 2), 1);
        config
            .options
            .insert("max_blank_lines".to_string(), ConfigValue::Bool(true));
        assert_eq!(config.number("max_blank_lines", 2), 2);
    }

    #[test]
    fn test_from_whitespace_config() {
        let ws = WhitespaceConfig::new(IndentStyle::Tabs, LineEnding::CrLf);
        let config = FixerConfig::from(&ws);
        assert_eq!(config.indent, IndentStyle::Tabs);
        assert_eq!(config.line_ending, LineEnding::CrLf);
        assert!(config.options.is_empty());
    }
}
