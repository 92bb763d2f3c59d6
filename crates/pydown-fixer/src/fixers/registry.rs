//! The set of built-in layout fixers

use pydown_core::{apply_edits, Edit, EditError};

use super::whitespace::{
    BlankLinesAroundDefinitionsFixer, LineEndingFixer, NoExtraBlankLinesFixer,
    SingleBlankLineAtEofFixer, TrailingWhitespaceFixer,
};
use super::{Fixer, FixerConfig};

/// Name, description and priority of a fixer, for listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixerInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub priority: i32,
}

/// Fixers ordered from highest to lowest priority
pub struct FixerRegistry {
    fixers: Vec<Box<dyn Fixer>>,
}

impl FixerRegistry {
    pub fn new() -> Self {
        let mut registry = Self { fixers: Vec::new() };
        registry.register(Box::new(LineEndingFixer));
        registry.register(Box::new(TrailingWhitespaceFixer));
        registry.register(Box::new(BlankLinesAroundDefinitionsFixer));
        registry.register(Box::new(NoExtraBlankLinesFixer));
        registry.register(Box::new(SingleBlankLineAtEofFixer));
        registry
    }

    /// Add a fixer; equal priorities keep registration order
    pub fn register(&mut self, fixer: Box<dyn Fixer>) {
        let at = self
            .fixers
            .iter()
            .position(|f| f.priority() < fixer.priority())
            .unwrap_or(self.fixers.len());
        self.fixers.insert(at, fixer);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Fixer> {
        self.fixers
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.as_ref())
    }

    pub fn all(&self) -> impl Iterator<Item = &dyn Fixer> {
        self.fixers.iter().map(|f| f.as_ref())
    }

    pub fn list(&self) -> Vec<FixerInfo> {
        self.all()
            .map(|f| FixerInfo {
                name: f.name(),
                description: f.description(),
                priority: f.priority(),
            })
            .collect()
    }

    /// Run the named fixers over `source`
    ///
    /// Each fixer checks the text as left by the fixers before it, so edits
    /// from different fixers never conflict. Returns the fixed text and every
    /// edit made, for reporting.
    pub fn check(
        &self,
        source: &str,
        names: &[&str],
        config: &FixerConfig,
    ) -> Result<(String, Vec<Edit>), EditError> {
        self.run(source, config, |fixer| names.contains(&fixer.name()))
    }

    /// Run every fixer over `source`
    pub fn check_all(&self, source: &str, config: &FixerConfig) -> Result<(String, Vec<Edit>), EditError> {
        self.run(source, config, |_| true)
    }

    fn run(
        &self,
        source: &str,
        config: &FixerConfig,
        selected: impl Fn(&dyn Fixer) -> bool,
    ) -> Result<(String, Vec<Edit>), EditError> {
        let mut text = source.to_string();
        let mut applied = Vec::new();

        for fixer in self.all().filter(|f| selected(*f)) {
            let edits = fixer.check(&text, config);
            if edits.is_empty() {
                continue;
            }
            text = apply_edits(&text, &edits)?;
            applied.extend(edits);
        }

        Ok((text, applied))
    }

    pub fn len(&self) -> usize {
        self.fixers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixers.is_empty()
    }
}

impl Default for FixerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineEnding;

    struct Upper;

    impl Fixer for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn description(&self) -> &'static str {
            "Uppercase the first byte"
        }

        fn priority(&self) -> i32 {
            30
        }

        fn check(&self, source: &str, _config: &FixerConfig) -> Vec<Edit> {
            match source.get(..1) {
                Some(first) if first != first.to_uppercase() => {
                    vec![Edit::new(pydown_core::Span::new(0, 1), first.to_uppercase(), "upper")]
                }
                _ => Vec::new(),
            }
        }
    }

    #[test]
    fn test_builtin_fixers() {
        let registry = FixerRegistry::new();
        assert_eq!(registry.len(), 5);
        assert!(registry.get("line_ending").is_some());
        assert!(registry.get("blank_lines_around_definitions").is_some());
        assert!(registry.get("no_such_fixer").is_none());
    }

    #[test]
    fn test_descending_priority() {
        let priorities: Vec<i32> = FixerRegistry::new().list().iter().map(|i| i.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted);
        assert_eq!(FixerRegistry::new().list()[0].name, "line_ending");
    }

    #[test]
    fn test_register_keeps_order_for_equal_priority() {
        let mut registry = FixerRegistry::new();
        registry.register(Box::new(Upper));
        let names: Vec<&str> = registry.all().map(|f| f.name()).collect();
        let defs = names.iter().position(|n| *n == "blank_lines_around_definitions");
        let upper = names.iter().position(|n| *n == "upper");
        assert!(defs < upper);
        assert_eq!(registry.check_all("x = 1\n", &FixerConfig::default()).unwrap().0, "X = 1\n");
    }

    #[test]
    fn test_check_selected_fixer() {
        let registry = FixerRegistry::new();
        let (fixed, edits) = registry
            .check("a = 1   \n\n\n\n\nb = 2", &["trailing_whitespace"], &FixerConfig::default())
            .unwrap();
        assert_eq!(fixed, "a = 1\n\n\n\n\nb = 2");
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].rule.as_deref(), Some("trailing_whitespace"));
    }

    #[test]
    fn test_check_all_lays_out_unparsed_source() {
        let registry = FixerRegistry::new();
        let source = "import os\ndef main():\n    return os.getcwd()\nclass C:\n    x = 1\n    def m(self):\n        pass\nmain()";
        let (fixed, _) = registry.check_all(source, &FixerConfig::default()).unwrap();
        assert_eq!(
            fixed,
            "\
import os


def main():
    return os.getcwd()


class C:
    x = 1

    def m(self):
        pass


main()
"
        );
    }

    #[test]
    fn test_check_all_with_crlf() {
        let registry = FixerRegistry::new();
        let config = FixerConfig {
            line_ending: LineEnding::CrLf,
            ..Default::default()
        };
        let (fixed, _) = registry
            .check_all("x = 1\ndef f():\n    pass\n", &config)
            .unwrap();
        assert_eq!(fixed, "x = 1\r\n\r\n\r\ndef f():\r\n    pass\r\n");
    }

    #[test]
    fn test_already_formatted_source_has_no_edits() {
        let registry = FixerRegistry::new();
        let source = "import os\n\n\ndef main():\n    pass\n";
        let (fixed, edits) = registry.check_all(source, &FixerConfig::default()).unwrap();
        assert_eq!(fixed, source);
        assert!(edits.is_empty());
    }
}
