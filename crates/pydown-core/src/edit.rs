//! Byte-range edits over source text
//!
//! The layout fixers describe their changes as [`Edit`]s instead of
//! rewriting the text themselves; [`apply_edits`] splices a batch of them
//! into the source in one pass.

use thiserror::Error;

/// A batch of edits that cannot be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("edit at offset {offset} overlaps the edit before it")]
    Overlap { offset: usize },

    #[error("edit range {start}..{end} is outside the {len}-byte source")]
    OutOfRange { start: usize, end: usize, len: usize },
}

/// Half-open byte range `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span, used for insertions
    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Replace the text covered by `span` with `replacement`
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub span: Span,
    pub replacement: String,
    /// Shown in verbose output and logs
    pub message: String,
    /// Fixer that produced the edit
    pub rule: Option<String>,
}

impl Edit {
    pub fn new(span: Span, replacement: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
            message: message.into(),
            rule: None,
        }
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn start_offset(&self) -> usize {
        self.span.start
    }

    pub fn end_offset(&self) -> usize {
        self.span.end
    }
}

/// Splice `edits` into `source`
///
/// Edits may come in any order. Insertions at the same offset keep their
/// relative order. Overlapping ranges, ranges past the end of the source and
/// ranges that split a UTF-8 character are rejected without touching the
/// text.
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by_key(|edit| (edit.span.start, edit.span.end));

    let mut output = String::with_capacity(source.len());
    let mut copied = 0;

    for edit in ordered {
        let Span { start, end } = edit.span;
        if start > end
            || end > source.len()
            || !source.is_char_boundary(start)
            || !source.is_char_boundary(end)
        {
            return Err(EditError::OutOfRange {
                start,
                end,
                len: source.len(),
            });
        }
        if start < copied {
            return Err(EditError::Overlap { offset: start });
        }

        output.push_str(&source[copied..start]);
        output.push_str(&edit.replacement);
        copied = end;
    }

    output.push_str(&source[copied..]);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(start: usize, end: usize, replacement: &str) -> Edit {
        Edit::new(Span::new(start, end), replacement, "test edit")
    }

    #[test]
    fn test_replace_range() {
        let result = apply_edits("x = 1   \n", &[edit(5, 8, "")]).unwrap();
        assert_eq!(result, "x = 1\n");
    }

    #[test]
    fn test_edits_in_any_order() {
        let source = "a = 1\r\nb = 2\r\n";
        let edits = [edit(12, 14, "\n"), edit(5, 7, "\n")];
        assert_eq!(apply_edits(source, &edits).unwrap(), "a = 1\nb = 2\n");
    }

    #[test]
    fn test_insertions_keep_order() {
        let source = "x = 1\ndef f():\n    pass\n";
        let edits = [
            Edit::new(Span::at(6), "\n", "first"),
            Edit::new(Span::at(6), "\n", "second"),
            edit(6, 9, "def"),
        ];
        assert_eq!(
            apply_edits(source, &edits).unwrap(),
            "x = 1\n\n\ndef f():\n    pass\n"
        );
    }

    #[test]
    fn test_no_edits() {
        assert_eq!(apply_edits("unchanged", &[]).unwrap(), "unchanged");
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            apply_edits("short", &[edit(0, 100, "x")]),
            Err(EditError::OutOfRange {
                start: 0,
                end: 100,
                len: 5
            })
        );
        assert!(apply_edits("short", &[edit(4, 2, "x")]).is_err());
    }

    #[test]
    fn test_split_character_rejected() {
        let result = apply_edits("é = 1", &[edit(1, 2, "")]);
        assert!(matches!(result, Err(EditError::OutOfRange { .. })));
    }

    #[test]
    fn test_overlap() {
        let result = apply_edits("abcdef", &[edit(0, 4, "x"), edit(2, 5, "y")]);
        assert_eq!(result, Err(EditError::Overlap { offset: 2 }));
    }

    #[test]
    fn test_span_helpers() {
        assert!(Span::at(3).is_empty());
        assert!(!Span::new(3, 4).is_empty());

        let edit = edit(0, 1, "").with_rule("trailing_whitespace");
        assert_eq!(edit.rule.as_deref(), Some("trailing_whitespace"));
    }
}
