//! Rule: Drop imports of polyfill modules
//!
//! `typing` does not exist before 3.5. Annotations are stripped by the other
//! rules, so the imports have nothing left to serve.
//!
//! Example:
//! ```python
//! # Before
//! import os, typing
//! from typing import List, Optional
//!
//! # After
//! import os
//! ```

use pydown_core::ast::{Stmt, StmtKind};

use crate::context::RewriteContext;
use crate::registry::{Category, Rule};

pub struct TypingImportsRule;

impl Rule for TypingImportsRule {
    fn name(&self) -> &'static str {
        "typing_imports"
    }

    fn description(&self) -> &'static str {
        "Remove imports of polyfill modules such as typing"
    }

    fn category(&self) -> Category {
        Category::Imports
    }

    fn exit_stmt(&self, stmt: Stmt, ctx: &mut RewriteContext) -> Vec<Stmt> {
        let location = stmt.location;
        match stmt.kind {
            StmtKind::Import(names) => {
                let (dropped, kept): (Vec<_>, Vec<_>) = names
                    .into_iter()
                    .partition(|alias| ctx.options().is_polyfill(&alias.name));
                for alias in &dropped {
                    ctx.record(self.name(), location, format!("removed import of {}", alias.name));
                }
                if kept.is_empty() {
                    Vec::new()
                } else {
                    vec![Stmt::new(StmtKind::Import(kept), location)]
                }
            }
            StmtKind::ImportFrom {
                module: Some(module),
                level: 0,
                ..
            } if ctx.options().is_polyfill(&module) => {
                ctx.record(self.name(), location, format!("removed import from {}", module));
                Vec::new()
            }
            kind => vec![Stmt::new(kind, location)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RewriteOptions;
    use crate::test_utils::{apply, apply_with};

    #[test]
    fn test_import_typing_removed() {
        let (out, changes) = apply(&TypingImportsRule, "import typing\nx = 1\n");
        assert_eq!(out, "x = 1\n");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].rule, "typing_imports");
    }

    #[test]
    fn test_other_aliases_kept() {
        let (out, _) = apply(&TypingImportsRule, "import os, typing as t, sys\n");
        assert_eq!(out, "import os, sys\n");
    }

    #[test]
    fn test_from_typing_removed() {
        let (out, _) = apply(&TypingImportsRule, "from typing import List, Dict\nimport os\n");
        assert_eq!(out, "import os\n");
    }

    #[test]
    fn test_submodule_removed() {
        let (out, _) = apply(&TypingImportsRule, "import typing.io\nfrom typing.re import Match\n");
        assert_eq!(out, "");
    }

    #[test]
    fn test_similar_names_kept() {
        let source = "import typing_extensions\nfrom .typing import X\nfrom collections import deque\n";
        let (out, changes) = apply(&TypingImportsRule, source);
        assert_eq!(out, source);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_nested_import_leaves_valid_block() {
        let (out, _) = apply(&TypingImportsRule, "if TYPE_CHECKING:\n    from typing import List\n");
        assert_eq!(out, "if TYPE_CHECKING:\n    pass\n");
    }

    #[test]
    fn test_configured_polyfill_modules() {
        let options = RewriteOptions {
            polyfill_modules: vec!["typing".to_string(), "typing_extensions".to_string()],
            ..RewriteOptions::default()
        };
        let (out, _) = apply_with(
            &TypingImportsRule,
            "from typing_extensions import Protocol\nimport os\n",
            options,
        );
        assert_eq!(out, "import os\n");
    }
}
