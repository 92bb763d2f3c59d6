//! Rendering overrides for 3.4 output
//!
//! - Doc strings are always written as triple-quoted blocks.
//! - Strings containing a line break are written as triple-quoted blocks
//!   instead of one long escaped line.
//! - `**mapping` entries of a dict display are written without the
//!   parentheses the base renderer puts around the operand.

use super::{push_escape, Override, Precedence, Unparser};
use crate::ast::{Expr, ExprKind};

/// Override table used by [`super::unparse`]
pub const DOWNGRADE_OVERRIDES: &[Override] = &[render_doc, render_multiline_str, render_dict];

pub fn render_doc(unparser: &mut Unparser, expr: &Expr, _prec: Precedence) -> bool {
    let ExprKind::Doc(value) = &expr.kind else {
        return false;
    };
    unparser.write(&triple_quoted(value));
    true
}

pub fn render_multiline_str(unparser: &mut Unparser, expr: &Expr, _prec: Precedence) -> bool {
    match &expr.kind {
        ExprKind::Str(value) if value.contains('\n') => {
            unparser.write(&triple_quoted(value));
            true
        }
        _ => false,
    }
}

pub fn render_dict(unparser: &mut Unparser, expr: &Expr, _prec: Precedence) -> bool {
    let ExprKind::Dict { keys, values } = &expr.kind else {
        return false;
    };

    unparser.write("{");
    for (i, (key, value)) in keys.iter().zip(values).enumerate() {
        if i > 0 {
            unparser.write(", ");
        }
        match key {
            Some(key) => {
                unparser.expr(key, Precedence::Test);
                unparser.write(": ");
                unparser.expr(value, Precedence::Test);
            }
            None => {
                unparser.write("**");
                unparser.expr(value, Precedence::BitOr);
            }
        }
    }
    unparser.write("}");
    true
}

/// A `"""`-delimited literal that evaluates to `value`
///
/// Line breaks and tabs stay literal. Backslashes, carriage returns and other
/// control characters are escaped, as is every third quote of a `"""` run and
/// a quote in last position, which would otherwise merge with the closing
/// delimiter.
pub fn triple_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 6);
    out.push_str("\"\"\"");

    let mut quote_run = 0;
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            quote_run += 1;
            if quote_run == 3 || chars.peek().is_none() {
                out.push_str("\\\"");
                quote_run = 0;
            } else {
                out.push('"');
            }
            continue;
        }
        quote_run = 0;

        match c {
            '\\' => out.push_str("\\\\"),
            '\n' | '\t' => out.push(c),
            '\r' => out.push_str("\\r"),
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => push_escape(&mut out, c),
            c => out.push(c),
        }
    }

    out.push_str("\"\"\"");
    out
}
