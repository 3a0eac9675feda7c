//! Interpolated string parsing.
//!
//! Slots are `{expr}`, `{expr:spec}` or `{{expr}}`. A slot closes at the
//! brace that balances its opening one, so braces and string literals inside
//! nested calls do not end it early. Slot contents go through the ordinary
//! expression parser.

use super::expr::{LocalKinds, parse_expr_text};
use crate::error::CompileError;
use crate::ir::{FormatSpec, InterpPart, Interpolated};

pub fn parse_interpolated(
    text: &str,
    line: usize,
    kinds: &LocalKinds,
) -> Result<Interpolated, CompileError> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = Vec::new();
    let mut buf = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '{' => {
                let close = matching_brace(&chars, i, line)?;
                let inner: String = chars[i + 1..close].iter().collect();
                let inner = inner.trim();
                let inner = match inner.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(unwrapped) => unwrapped,
                    None => inner,
                };
                if !buf.is_empty() {
                    parts.push(InterpPart::Text(std::mem::take(&mut buf)));
                }
                parts.push(parse_slot(inner, line, kinds)?);
                i = close + 1;
            }
            '}' => {
                return Err(CompileError::syntax(
                    line,
                    "unbalanced '}' in interpolated string",
                ));
            }
            c => {
                buf.push(c);
                i += 1;
            }
        }
    }
    if !buf.is_empty() {
        parts.push(InterpPart::Text(buf));
    }
    Ok(Interpolated { parts })
}

/// Index of the `}` balancing the `{` at `open`.
fn matching_brace(chars: &[char], open: usize, line: usize) -> Result<usize, CompileError> {
    let mut depth = 0usize;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            '"' => {
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            '\'' if chars.get(i + 2) == Some(&'\'') => i += 2,
            _ => {}
        }
        i += 1;
    }
    Err(CompileError::syntax(line, "unterminated interpolation"))
}

fn parse_slot(inner: &str, line: usize, kinds: &LocalKinds) -> Result<InterpPart, CompileError> {
    let (expr_text, spec) = match top_level_colon(inner) {
        Some(at) => {
            let spec_text = inner[at + 1..].trim();
            let spec = FormatSpec::parse(spec_text).ok_or_else(|| {
                CompileError::syntax(line, format!("unknown format specifier '{}'", spec_text))
            })?;
            (&inner[..at], Some(spec))
        }
        None => (inner, None),
    };
    if expr_text.trim().is_empty() {
        return Err(CompileError::syntax(line, "empty interpolation slot"));
    }
    let expr = parse_expr_text(expr_text, line, kinds)?;
    Ok(InterpPart::Expr { expr, spec })
}

/// Byte offset of the last `:` outside parentheses and string literals.
fn top_level_colon(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut found = None;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ':' if depth == 0 => found = Some(i),
            _ => {}
        }
    }
    found
}
