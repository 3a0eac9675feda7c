//! Block lexer: turns normalized source into indentation-annotated lines.
//!
//! Indentation is tracked as a stack of indentation strings rather than
//! column counts, so a nested line must literally extend its parent's
//! leading whitespace. That keeps tabs and spaces from being mixed within a
//! block without having to pick a tab width.

use crate::error::CompileError;

const BLOCK_QUOTE: &str = "\"\"\"";

/// A non-blank source line with comments removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Nesting level, 0 for top-level lines.
    pub depth: usize,
    /// Line text without indentation, comments or trailing whitespace.
    pub content: String,
    /// 1-based line number in the source.
    pub line: usize,
}

/// A logical line together with the lines nested under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub line: usize,
    pub text: String,
    pub children: Vec<Block>,
}

impl Block {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Split `source` into logical lines.
pub fn lex(source: &str) -> Result<Vec<LogicalLine>, CompileError> {
    let mut lines = Vec::new();
    let mut levels: Vec<&str> = vec![""];
    let mut open_block: Option<usize> = None;

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;

        if open_block.is_some() {
            if raw.matches(BLOCK_QUOTE).count() % 2 == 1 {
                open_block = None;
            }
            continue;
        }
        if raw.trim_start().starts_with(BLOCK_QUOTE) {
            if raw.matches(BLOCK_QUOTE).count() % 2 == 1 {
                open_block = Some(line);
            }
            continue;
        }

        let code = strip_comment(raw).trim_end();
        let content = code.trim_start_matches([' ', '\t']);
        if content.is_empty() {
            continue;
        }
        let indent = &code[..code.len() - content.len()];

        let depth = match levels.last() {
            Some(top) if *top == indent => levels.len() - 1,
            Some(top) if indent.starts_with(top) => {
                if lines.is_empty() {
                    return Err(CompileError::structure(
                        line,
                        "first line must not be indented",
                    ));
                }
                levels.push(indent);
                levels.len() - 1
            }
            _ => {
                while levels.len() > 1 && levels.last() != Some(&indent) {
                    levels.pop();
                }
                if levels.last() != Some(&indent) {
                    return Err(CompileError::structure(
                        line,
                        "indentation does not match any enclosing level",
                    ));
                }
                levels.len() - 1
            }
        };

        lines.push(LogicalLine {
            depth,
            content: content.to_string(),
            line,
        });
    }

    if let Some(start) = open_block {
        return Err(CompileError::structure(
            start,
            "unterminated \"\"\" comment block",
        ));
    }

    tracing::debug!(lines = lines.len(), "lexed source");
    Ok(lines)
}

/// Group logical lines into a tree by depth.
pub fn nest(lines: Vec<LogicalLine>) -> Vec<Block> {
    let mut iter = lines.into_iter().peekable();
    collect(&mut iter, 0)
}

/// Lex and nest in one step.
pub fn blocks(source: &str) -> Result<Vec<Block>, CompileError> {
    Ok(nest(lex(source)?))
}

fn collect<I>(iter: &mut std::iter::Peekable<I>, depth: usize) -> Vec<Block>
where
    I: Iterator<Item = LogicalLine>,
{
    let mut out = Vec::new();
    while let Some(next) = iter.peek() {
        if next.depth < depth {
            break;
        }
        let Some(current) = iter.next() else { break };
        let children = collect(iter, current.depth + 1);
        out.push(Block {
            line: current.line,
            text: current.content,
            children,
        });
    }
    out
}

/// Cut `line` at the first `//` or `#` that is not inside a string or char
/// literal.
pub(crate) fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut i = 0;
    let mut in_string = false;
    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            match b {
                b'\\' => i += 1,
                b'"' => in_string = false,
                _ => {}
            }
        } else {
            match b {
                b'"' => in_string = true,
                b'\'' if bytes.get(i + 2) == Some(&b'\'') => i += 2,
                b'#' => return &line[..i],
                b'/' if bytes.get(i + 1) == Some(&b'/') => return &line[..i],
                _ => {}
            }
        }
        i += 1;
    }
    line
}
