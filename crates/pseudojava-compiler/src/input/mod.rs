//! Input readers - parse normalized pseudo-Java blocks into the IR.
//!
//! [`declarations`] walks the block tree for templates and their sections;
//! [`statements`] parses bodies; [`expr`] and [`interpolation`] handle the
//! expression and embedded-string grammars shared by both.

pub mod declarations;
pub mod expr;
pub mod interpolation;
pub mod statements;

pub use declarations::parse_program;

use crate::error::CompileError;
use crate::ir::{ContainerKind, Expr, Param, Primitive, Program, TypeExpr, Visibility};
use crate::lexer::blocks;
use crate::options::CompileOptions;
use crate::synonyms::{SynonymTable, normalize};
use crate::traits::Reader;
use expr::{LocalKinds, parse_args_text, parse_expr_text};

/// Static instance of the pseudo-Java reader.
pub static PSEUDOJAVA_READER: PseudoJavaReader = PseudoJavaReader;

/// Reads pseudo-Java: normalize synonyms, lex blocks, parse declarations.
pub struct PseudoJavaReader;

impl Reader for PseudoJavaReader {
    fn language(&self) -> &'static str {
        "pseudojava"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pj", "pjava"]
    }

    fn read(&self, source: &str, options: &CompileOptions) -> Result<Program, CompileError> {
        read_pseudojava(source, options)
    }
}

/// Parse pseudo-Java source into an unresolved [`Program`].
pub fn read_pseudojava(source: &str, options: &CompileOptions) -> Result<Program, CompileError> {
    let table = SynonymTable::new(&options.synonyms);
    let normalized = normalize(source, &table);
    let blocks = blocks(&normalized)?;
    parse_program(&blocks)
}

/// Split a leading visibility marker off `text`.
pub(crate) fn split_marker(text: &str) -> (Option<Visibility>, &str) {
    let text = text.trim_start();
    match text.chars().next().and_then(Visibility::from_marker) {
        Some(vis) => (Some(vis), text[1..].trim_start()),
        None => (None, text),
    }
}

pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Leading identifier of `text` and the remainder.
pub(crate) fn leading_word(text: &str) -> (&str, &str) {
    let end = text
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    (&text[..end], &text[end..])
}

/// Drop a trailing block colon.
pub(crate) fn strip_colon(text: &str) -> &str {
    let text = text.trim_end();
    text.strip_suffix(':').unwrap_or(text).trim_end()
}

/// Parse `int`, `arraylist/string`, `map/string,int` or `list<int>`.
pub(crate) fn parse_type(text: &str) -> Option<TypeExpr> {
    let text = text.trim();
    if let Some((name, args)) = text.split_once('/') {
        let name = name.trim();
        if !is_identifier(name) {
            return None;
        }
        let args = args
            .split(',')
            .map(parse_type)
            .collect::<Option<Vec<_>>>()?;
        return Some(TypeExpr {
            name: name.to_string(),
            args,
        });
    }
    if let Some((name, rest)) = text.split_once('<') {
        let inner = rest.strip_suffix('>')?;
        let name = name.trim();
        if !is_identifier(name) {
            return None;
        }
        let args = split_top_level(inner, ',')
            .into_iter()
            .map(parse_type)
            .collect::<Option<Vec<_>>>()?;
        return Some(TypeExpr {
            name: name.to_string(),
            args,
        });
    }
    is_identifier(text).then(|| TypeExpr::simple(text))
}

/// Split on `sep` outside parentheses, angle brackets and string literals.
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut start = 0;
    let mut prev = '\0';
    for (i, c) in text.char_indices() {
        if in_string {
            if c == '"' && prev != '\\' {
                in_string = false;
            }
        } else {
            match c {
                '"' => in_string = true,
                '(' | '<' | '[' => depth += 1,
                ')' | '>' | ']' => depth -= 1,
                _ if c == sep && depth == 0 => {
                    parts.push(&text[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            }
        }
        prev = c;
    }
    parts.push(&text[start..]);
    parts
}

/// How a declaration introduces its initial value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InitSep {
    Equals,
    With,
}

/// Pieces of `name as type [= init | with init]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TypedDecl<'a> {
    pub name: &'a str,
    pub ty: &'a str,
    pub init: Option<(InitSep, &'a str)>,
}

pub(crate) fn split_typed_decl(text: &str) -> Option<TypedDecl<'_>> {
    let (name, rest) = leading_word(text.trim_start());
    if name.is_empty() || !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start().strip_prefix("as")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim();

    let bytes = rest.as_bytes();
    let mut in_string = false;
    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if b == b'"' && bytes.get(i.wrapping_sub(1)) != Some(&b'\\') {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'=' => {
                let prev = if i > 0 { bytes[i - 1] } else { b' ' };
                let next = bytes.get(i + 1).copied().unwrap_or(b' ');
                if next != b'=' && !matches!(prev, b'=' | b'!' | b'<' | b'>') {
                    return Some(TypedDecl {
                        name,
                        ty: rest[..i].trim(),
                        init: Some((InitSep::Equals, rest[i + 1..].trim())),
                    });
                }
            }
            b'w' if rest[i..].starts_with("with")
                && (i == 0 || bytes[i - 1] == b' ')
                && rest[i + 4..].chars().next().is_none_or(char::is_whitespace) =>
            {
                return Some(TypedDecl {
                    name,
                    ty: rest[..i].trim(),
                    init: Some((InitSep::With, rest[i + 4..].trim())),
                });
            }
            _ => {}
        }
    }
    Some(TypedDecl {
        name,
        ty: rest,
        init: None,
    })
}

/// A named template type rather than a builtin.
pub(crate) fn is_class_type(ty: &TypeExpr) -> bool {
    Primitive::from_keyword(&ty.name).is_none()
        && ContainerKind::from_keyword(&ty.name).is_none()
        && !matches!(ty.name.as_str(), "string" | "String" | "str")
}

/// Initial value of a typed declaration. `with <container keyword>` and an
/// empty `with` mean a fresh default; `with args` on a template type
/// constructs it.
pub(crate) fn initializer(
    ty: &TypeExpr,
    init: Option<(InitSep, &str)>,
    line: usize,
    kinds: &LocalKinds,
) -> Result<Option<Expr>, CompileError> {
    let Some((sep, text)) = init else {
        return Ok(None);
    };
    let text = text.trim();
    match sep {
        InitSep::With if text.is_empty() || ContainerKind::from_keyword(text).is_some() => {
            if is_class_type(ty) {
                Ok(Some(Expr::New {
                    class: ty.name.clone(),
                    args: Vec::new(),
                }))
            } else {
                Ok(None)
            }
        }
        InitSep::With if is_class_type(ty) => Ok(Some(Expr::New {
            class: ty.name.clone(),
            args: parse_args_text(text, line, kinds)?,
        })),
        _ if text.is_empty() => Err(CompileError::syntax(line, "missing initial value")),
        _ => parse_expr_text(text, line, kinds).map(Some),
    }
}

/// Parse a parameter list: `a, b`, `int a, string b` or `a as int`.
pub(crate) fn parse_params(text: &str) -> Option<Vec<Param>> {
    let text = text.trim();
    if text.is_empty() {
        return Some(Vec::new());
    }
    split_top_level(text, ',')
        .into_iter()
        .map(|piece| {
            let piece = piece.trim();
            if let Some(decl) = split_typed_decl(piece) {
                if decl.init.is_some() {
                    return None;
                }
                return Some(Param {
                    name: decl.name.to_string(),
                    ty: Some(parse_type(decl.ty)?),
                    resolved: None,
                });
            }
            let words: Vec<&str> = piece.split_whitespace().collect();
            match words.as_slice() {
                [name] if is_identifier(name) => Some(Param::untyped(*name)),
                [ty, name] if is_identifier(name) => Some(Param {
                    name: name.to_string(),
                    ty: Some(parse_type(ty)?),
                    resolved: None,
                }),
                _ => None,
            }
        })
        .collect()
}
