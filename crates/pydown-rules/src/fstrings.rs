//! Rule: Convert f-strings to `%` formatting
//!
//! Literal text is escaped (`%` becomes `%%`) and every replacement field
//! becomes a printf-style conversion. Static numeric and padding specs map to
//! the equivalent printf spec; any other spec falls back to `%s` with the
//! value passed through the `format()` builtin so the output is unchanged.
//!
//! Example:
//! ```python
//! # Before
//! f"x={n} y={m!r} ratio={r:.2f} done={p:,}"
//!
//! # After
//! 'x=%s y=%r ratio=%.2f done=%s' % (n, m, r, format(p, ','))
//! ```

use pydown_core::ast::{BinOperator, Expr, ExprKind};
use regex::Regex;
use std::sync::OnceLock;

use crate::context::RewriteContext;
use crate::registry::Rule;

pub struct FStringsRule;

/// Translate a static format spec to a printf spec (without the leading `%`)
///
/// Returns `None` when `%` formatting has no equivalent.
fn printf_spec(spec: &str, conversion: Option<char>) -> Option<String> {
    static SPEC_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = SPEC_REGEX.get_or_init(|| {
        // [align][0][width][.precision][type]
        Regex::new(r"^([<>])?(0)?(\d+)?(?:\.(\d+))?([deEfFgGoxXs])?$").unwrap()
    });

    let caps = regex.captures(spec)?;
    let align = caps.get(1).map(|m| m.as_str());
    let zero = caps.get(2).is_some();
    let width = caps.get(3).map(|m| m.as_str());
    let precision = caps.get(4).map(|m| m.as_str());
    let kind = caps.get(5).map(|m| m.as_str());

    let (text_like, kind) = match (conversion, kind) {
        (Some(conversion), None | Some("s")) => (true, conversion.to_string()),
        (Some(_), Some(_)) => return None,
        (None, Some(kind)) => (kind == "s", kind.to_string()),
        (None, None) if spec.is_empty() => (true, "s".to_string()),
        // numbers align right and strings left, so only an explicit
        // alignment is safe without a type
        (None, None) if align.is_some() && precision.is_none() && !zero => {
            (true, "s".to_string())
        }
        (None, None) => return None,
    };

    if matches!(kind.as_str(), "d" | "o" | "x" | "X") && precision.is_some() {
        return None;
    }
    if zero && (text_like || align == Some("<")) {
        return None;
    }

    let left = match align {
        Some("<") => true,
        Some(_) => false,
        None => text_like,
    };

    let mut out = String::new();
    if left && width.is_some() {
        out.push('-');
    }
    if zero {
        out.push('0');
    }
    if let Some(width) = width {
        out.push_str(width);
    }
    if let Some(precision) = precision {
        out.push('.');
        out.push_str(precision);
    }
    out.push_str(&kind);
    Some(out)
}

/// Text of a format spec without replacement fields
fn static_spec(spec: &Expr) -> Option<String> {
    match &spec.kind {
        ExprKind::Str(text) => Some(text.clone()),
        ExprKind::JoinedStr(parts) => parts
            .iter()
            .map(|part| match &part.kind {
                ExprKind::Str(text) => Some(text.as_str()),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

/// `format(value, spec)`, with the conversion applied to `value` first
fn format_call(value: Expr, conversion: Option<char>, spec: Expr) -> Expr {
    let location = value.location;
    let call = |func: &str, args: Vec<Expr>| {
        Expr::new(
            ExprKind::Call {
                func: Box::new(Expr::name(func, location)),
                args,
                keywords: Vec::new(),
            },
            location,
        )
    };

    let value = match conversion {
        Some('r') => call("repr", vec![value]),
        Some('a') => call("ascii", vec![value]),
        Some('s') => call("str", vec![value]),
        _ => value,
    };
    call("format", vec![value, spec])
}

impl Rule for FStringsRule {
    fn name(&self) -> &'static str {
        "fstrings"
    }

    fn description(&self) -> &'static str {
        "Convert f-strings to % formatting"
    }

    fn exit_expr(&self, expr: Expr, ctx: &mut RewriteContext) -> Expr {
        let location = expr.location;
        let values = match expr.kind {
            ExprKind::JoinedStr(values) => values,
            kind => return Expr::new(kind, location),
        };

        let has_fields = values
            .iter()
            .any(|v| matches!(v.kind, ExprKind::FormattedValue { .. }));
        if !has_fields {
            let text: String = values
                .iter()
                .filter_map(|v| match &v.kind {
                    ExprKind::Str(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            return Expr::str(text, location);
        }

        let mut format = String::new();
        let mut args = Vec::new();
        for value in values {
            match value.kind {
                ExprKind::Str(text) => format.push_str(&text.replace('%', "%%")),
                ExprKind::FormattedValue {
                    value,
                    conversion,
                    format_spec,
                } => {
                    let spec = match &format_spec {
                        None => Some(String::new()),
                        Some(spec) => static_spec(spec),
                    };
                    match spec.as_deref().and_then(|s| printf_spec(s, conversion)) {
                        Some(printf) => {
                            format.push('%');
                            format.push_str(&printf);
                            args.push(*value);
                        }
                        None => {
                            let spec = format_spec
                                .map(|s| *s)
                                .unwrap_or_else(|| Expr::str("", location));
                            ctx.record(
                                self.name(),
                                value.location,
                                "format spec has no % equivalent, kept through format()",
                            );
                            format.push_str("%s");
                            args.push(format_call(*value, conversion, spec));
                        }
                    }
                }
                kind => {
                    format.push_str("%s");
                    args.push(Expr::new(kind, value.location));
                }
            }
        }

        ctx.record(
            self.name(),
            location,
            format!("f-string with {} field(s) converted to % formatting", args.len()),
        );
        Expr::new(
            ExprKind::BinOp {
                left: Box::new(Expr::str(format, location)),
                op: BinOperator::Mod,
                right: Box::new(Expr::new(ExprKind::Tuple(args), location)),
            },
            location,
        )
    }
}
