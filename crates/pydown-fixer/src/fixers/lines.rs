//! String-aware line scanner for Python source
//!
//! Splits source into lines and tracks enough tokenizer state to tell code
//! lines from lines that are part of a multi-line string literal, a
//! bracketed expression or a backslash continuation.

/// One physical line of source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine {
    /// Offset of the first byte of the line
    pub start: usize,
    /// Offset of the line terminator (or end of source)
    pub end: usize,
    /// Offset of the next line
    pub next: usize,
    /// The line begins inside a multi-line string
    pub in_string: bool,
    /// The line terminator is inside a string
    pub open_string: bool,
    /// Unclosed brackets at the start of the line
    pub bracket_depth: usize,
    /// The previous line ended with a backslash continuation
    pub continuation: bool,
}

impl SourceLine {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// An empty or whitespace-only line outside any string
    pub fn is_blank(&self, source: &str) -> bool {
        !self.in_string && self.text(source).trim().is_empty()
    }

    /// The line begins a new logical line
    pub fn starts_statement(&self) -> bool {
        !self.in_string && self.bracket_depth == 0 && !self.continuation
    }

    pub fn is_comment(&self, source: &str) -> bool {
        self.starts_statement() && self.text(source).trim_start().starts_with('#')
    }

    /// A statement line that is neither blank nor a comment
    pub fn is_code(&self, source: &str) -> bool {
        self.starts_statement() && !self.is_blank(source) && !self.is_comment(source)
    }

    /// Width of the leading whitespace in bytes
    pub fn indent(&self, source: &str) -> usize {
        let text = self.text(source);
        text.len() - text.trim_start().len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Str { quote: u8, triple: bool },
}

/// Scan `source` into lines; handles `\n` and `\r\n` terminators
pub fn scan_lines(source: &str) -> Vec<SourceLine> {
    let bytes = source.as_bytes();
    let mut lines = Vec::new();
    let mut state = State::Code;
    let mut depth = 0usize;
    let mut continuation = false;
    let mut start = 0;

    while start < bytes.len() {
        let newline = bytes[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| start + p);
        let (end, next) = match newline {
            Some(nl) if nl > start && bytes[nl - 1] == b'\r' => (nl - 1, nl + 1),
            Some(nl) => (nl, nl + 1),
            None => (bytes.len(), bytes.len()),
        };

        let in_string = state != State::Code;
        let line_depth = depth;
        let line_continuation = continuation;
        let mut escaped_newline = false;

        let mut i = start;
        while i < end {
            let b = bytes[i];
            match state {
                State::Code => match b {
                    b'#' => break,
                    b'\'' | b'"' => {
                        let triple = bytes[i..end].starts_with(&[b, b, b]);
                        state = State::Str { quote: b, triple };
                        i += if triple { 3 } else { 1 };
                        continue;
                    }
                    b'(' | b'[' | b'{' => depth += 1,
                    b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                    b'\\' if i + 1 == end => escaped_newline = true,
                    _ => {}
                },
                State::Str { quote, triple } => {
                    if b == b'\\' {
                        escaped_newline = i + 1 == end;
                        i += 2;
                        continue;
                    }
                    if b == quote {
                        if !triple {
                            state = State::Code;
                        } else if bytes[i..end].starts_with(&[quote, quote, quote]) {
                            state = State::Code;
                            i += 3;
                            continue;
                        }
                    }
                }
            }
            i += 1;
        }

        // an unterminated single-quoted string ends with its line
        if let State::Str { triple: false, .. } = state {
            if !escaped_newline {
                state = State::Code;
            }
        }
        continuation = escaped_newline && state == State::Code;

        lines.push(SourceLine {
            start,
            end,
            next,
            in_string,
            open_string: state != State::Code,
            bracket_depth: line_depth,
            continuation: line_continuation,
        });
        start = next;
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines() {
        let source = "a = 1\nb = 2\n";
        let lines = scan_lines(source);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(source), "a = 1");
        assert_eq!(lines[1].start, 6);
        assert!(lines.iter().all(|l| l.starts_statement()));
    }

    #[test]
    fn test_crlf_terminators() {
        let source = "a = 1\r\nb = 2";
        let lines = scan_lines(source);
        assert_eq!(lines[0].text(source), "a = 1");
        assert_eq!(lines[0].next, 7);
        assert_eq!(lines[1].text(source), "b = 2");
        assert_eq!(lines[1].next, source.len());
    }

    #[test]
    fn test_triple_quoted_string() {
        let source = "x = \"\"\"one\n\ntwo  \n\"\"\"\ny = 1\n";
        let lines = scan_lines(source);
        assert!(!lines[0].in_string);
        assert!(lines[0].open_string);
        assert!(lines[1].in_string);
        assert!(!lines[1].is_blank(source));
        assert!(lines[2].open_string);
        assert!(lines[3].in_string);
        assert!(!lines[3].open_string);
        assert!(lines[4].starts_statement());
    }

    #[test]
    fn test_quotes_inside_strings_and_comments() {
        let source = "a = 'it\\'s'  # don't\nb = \"'''\"\nc = 1\n";
        let lines = scan_lines(source);
        assert!(lines.iter().all(|l| !l.in_string && !l.open_string));
    }

    #[test]
    fn test_brackets_and_continuations() {
        let source = "f(a,\n  b)\nx = 1 + \\\n    2\ny = 3\n";
        let lines = scan_lines(source);
        assert_eq!(lines[1].bracket_depth, 1);
        assert!(!lines[1].starts_statement());
        assert!(lines[2].starts_statement());
        assert!(lines[3].continuation);
        assert!(lines[4].starts_statement());
    }

    #[test]
    fn test_comment_and_code_lines() {
        let source = "    # note\n    pass\n\n";
        let lines = scan_lines(source);
        assert!(lines[0].is_comment(source));
        assert!(!lines[0].is_code(source));
        assert!(lines[1].is_code(source));
        assert_eq!(lines[1].indent(source), 4);
        assert!(lines[2].is_blank(source));
    }
}
