//! Synonym normalization.
//!
//! Surface keywords such as `blueprint`, `inherits` or `can-do` are rewritten
//! to their canonical form before anything else looks at the source, so the
//! parsers only ever deal with `template`, `abstract`, `extends`,
//! `implements` and `create`.
//!
//! Rewriting is positional. Only the keyword slots of template headers,
//! section headers and object-creation statements are considered, so an
//! identifier that happens to be spelled like a synonym is left alone.

use crate::lexer::strip_comment;
use crate::options::SynonymOverrides;

/// A synonym family, named by its canonical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Template,
    Abstract,
    Extends,
    Implements,
    Create,
}

impl Family {
    pub const ALL: [Family; 5] = [
        Family::Template,
        Family::Abstract,
        Family::Extends,
        Family::Implements,
        Family::Create,
    ];

    pub fn canonical(self) -> &'static str {
        match self {
            Family::Template => "template",
            Family::Abstract => "abstract",
            Family::Extends => "extends",
            Family::Implements => "implements",
            Family::Create => "create",
        }
    }

    fn defaults(self) -> &'static [&'static str] {
        match self {
            Family::Template => &["template", "blueprint", "design", "class"],
            Family::Abstract => &["abstract", "contract", "basic", "base", "must-do"],
            Family::Extends => &["extends", "inherits", "is-a"],
            Family::Implements => &["implements", "can", "can-do", "capable"],
            Family::Create => &["create", "make", "spawn", "build", "initialize"],
        }
    }
}

/// Immutable surface-to-canonical keyword table.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    /// Sorted longest surface first.
    entries: Vec<(String, Family)>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::new(&SynonymOverrides::default())
    }
}

impl SynonymTable {
    /// Built-in families plus `extra` surfaces. An extra surface already
    /// claimed by another family is ignored.
    pub fn new(extra: &SynonymOverrides) -> Self {
        let mut entries: Vec<(String, Family)> = Vec::new();
        for family in Family::ALL {
            for surface in family.defaults() {
                entries.push((surface.to_string(), family));
            }
        }

        let extras = [
            (Family::Template, &extra.template),
            (Family::Abstract, &extra.abstract_),
            (Family::Extends, &extra.extends),
            (Family::Implements, &extra.implements),
            (Family::Create, &extra.create),
        ];
        for (family, surfaces) in extras {
            for surface in surfaces {
                let surface = surface.trim().to_string();
                if surface.is_empty() || !surface.chars().all(is_word_char) {
                    tracing::warn!(%surface, "ignoring malformed synonym");
                    continue;
                }
                match entries.iter().find(|(s, _)| *s == surface) {
                    Some((_, existing)) if *existing != family => {
                        tracing::warn!(
                            %surface,
                            family = existing.canonical(),
                            "synonym already belongs to another family"
                        );
                    }
                    Some(_) => {}
                    None => entries.push((surface, family)),
                }
            }
        }

        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { entries }
    }

    /// Canonical token for a whole word, if it is a known surface.
    pub fn canonical(&self, word: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(s, _)| s == word)
            .map(|(_, f)| f.canonical())
    }

    /// Longest surface that starts `text` and ends on a word boundary.
    pub fn match_prefix(&self, text: &str) -> Option<(Family, usize)> {
        self.entries.iter().find_map(|(surface, family)| {
            let rest = text.strip_prefix(surface.as_str())?;
            match rest.chars().next() {
                Some(c) if is_word_char(c) => None,
                _ => Some((*family, surface.len())),
            }
        })
    }
}

/// Rewrite every recognized surface keyword in `source` to canonical form.
pub fn normalize(source: &str, table: &SynonymTable) -> String {
    let mut out = String::with_capacity(source.len());
    let mut in_block = false;

    for raw in source.split_inclusive('\n') {
        let quotes = raw.matches("\"\"\"").count();
        if in_block || raw.trim_start().starts_with("\"\"\"") {
            if quotes % 2 == 1 {
                in_block = !in_block;
            }
            out.push_str(raw);
            continue;
        }
        match rewrite_line(raw, table) {
            Some(line) => out.push_str(&line),
            None => out.push_str(raw),
        }
    }
    out
}

/// A replacement of `source[start..end]` by a canonical token.
type Edit = (usize, usize, &'static str);

fn rewrite_line(line: &str, table: &SynonymTable) -> Option<String> {
    let code = strip_comment(line);
    let start = code.len() - code.trim_start().len();

    let edits = section_header(code, start, table)
        .or_else(|| creation(code, start, table))
        .or_else(|| template_header(code, start, table))?;
    if edits.iter().all(|(s, e, canon)| &line[*s..*e] == *canon) {
        return None;
    }

    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for (s, e, canon) in edits {
        out.push_str(&line[last..s]);
        out.push_str(canon);
        last = e;
    }
    out.push_str(&line[last..]);
    Some(out)
}

/// `<template-word> vars:`, `<template-word> methods:`, `<abstract-word> methods:`.
fn section_header(code: &str, start: usize, table: &SynonymTable) -> Option<Vec<Edit>> {
    let (family, len) = table.match_prefix(&code[start..])?;
    let rest = code[start + len..].trim();
    let rest = rest.strip_suffix(':').unwrap_or(rest).trim_end();
    let ok = match family {
        Family::Template => rest == "vars" || rest == "methods",
        Family::Abstract => rest == "methods",
        _ => false,
    };
    ok.then(|| vec![(start, start + len, family.canonical())])
}

/// `<create-word> <name> as ...`.
fn creation(code: &str, start: usize, table: &SynonymTable) -> Option<Vec<Edit>> {
    let (family, len) = table.match_prefix(&code[start..])?;
    if family != Family::Create {
        return None;
    }
    let mut cur = Cursor::new(code, start + len);
    if !cur.skip_ws() {
        return None;
    }
    cur.ident()?;
    if !cur.skip_ws() || !cur.keyword("as") {
        return None;
    }
    Some(vec![(start, start + len, family.canonical())])
}

/// `[abstract|interface]* [template] Name [extends P] [implements A, B][:]`.
fn template_header(code: &str, start: usize, table: &SynonymTable) -> Option<Vec<Edit>> {
    let mut edits = Vec::new();
    let mut cur = Cursor::new(code, start);
    let mut qualified = false;

    loop {
        cur.skip_ws();
        if let Some((Family::Abstract, len)) = table.match_prefix(cur.rest()) {
            edits.push((cur.pos, cur.pos + len, Family::Abstract.canonical()));
            cur.pos += len;
            qualified = true;
        } else if cur.keyword("interface") {
            qualified = true;
        } else {
            break;
        }
    }
    if let Some((Family::Template, len)) = table.match_prefix(cur.rest()) {
        edits.push((cur.pos, cur.pos + len, Family::Template.canonical()));
        cur.pos += len;
        qualified = true;
    }
    if !qualified {
        return None;
    }

    cur.skip_ws();
    cur.ident()?;
    loop {
        cur.skip_ws();
        let rest = cur.rest().trim_end();
        if rest.is_empty() || rest == ":" {
            return Some(edits);
        }
        match table.match_prefix(rest) {
            Some((family @ (Family::Extends | Family::Implements), len)) => {
                edits.push((cur.pos, cur.pos + len, family.canonical()));
                cur.pos += len;
            }
            _ => return None,
        }
        loop {
            cur.skip_ws();
            cur.ident()?;
            cur.skip_ws();
            if !cur.eat(',') {
                break;
            }
        }
    }
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Skip whitespace; true if any was skipped.
    fn skip_ws(&mut self) -> bool {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        rest.len() != trimmed.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_alphabetic() || c == '_' => {}
            _ => return None,
        }
        let end = chars
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += end;
        Some(&rest[..end])
    }

    /// Consume `word` if it appears here as a whole word.
    fn keyword(&mut self, word: &str) -> bool {
        match self.rest().strip_prefix(word) {
            Some(after) if !after.starts_with(is_word_char) => {
                self.pos += word.len();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(src: &str) -> String {
        normalize(src, &SynonymTable::default())
    }

    #[test]
    fn test_canonical_tokens_are_fixed_points() {
        let table = SynonymTable::default();
        for family in Family::ALL {
            assert_eq!(table.canonical(family.canonical()), Some(family.canonical()));
        }
    }

    #[test]
    fn test_every_surface_maps_to_one_family() {
        let table = SynonymTable::default();
        for family in Family::ALL {
            for surface in family.defaults() {
                assert_eq!(table.canonical(surface), Some(family.canonical()));
            }
        }
    }

    #[test]
    fn test_longest_match_wins() {
        let table = SynonymTable::default();
        assert_eq!(
            table.match_prefix("can-do Drivable"),
            Some((Family::Implements, 6))
        );
        assert_eq!(table.match_prefix("candy"), None);
        assert_eq!(table.match_prefix("must-do methods"), Some((Family::Abstract, 7)));
    }

    #[test]
    fn test_header_rewrite() {
        assert_eq!(
            norm("contract blueprint Animal is-a Thing can-do Speak, Walk:\n"),
            "abstract template Animal extends Thing implements Speak, Walk:\n"
        );
        assert_eq!(norm("class Car:\n"), "template Car:\n");
        assert_eq!(norm("interface Drivable capable Movable:\n"), "interface Drivable implements Movable:\n");
    }

    #[test]
    fn test_section_headers() {
        assert_eq!(norm("    class vars:\n"), "    template vars:\n");
        assert_eq!(norm("    blueprint methods:\n"), "    template methods:\n");
        assert_eq!(norm("    must-do methods:\n"), "    abstract methods:\n");
        assert_eq!(norm("    instance vars:\n"), "    instance vars:\n");
    }

    #[test]
    fn test_creation_verbs() {
        assert_eq!(
            norm("    spawn car as Car with \"Civic\"\n"),
            "    create car as Car with \"Civic\"\n"
        );
        assert_eq!(norm("    make(x)\n"), "    make(x)\n");
    }

    #[test]
    fn test_identifiers_and_strings_untouched() {
        let src = "    base = class + 1\n    print \"class Car is-a Vehicle\"\n    design as string\n";
        assert_eq!(norm(src), src);
    }

    #[test]
    fn test_block_comments_untouched() {
        let src = "\"\"\"\nclass Car:\n\"\"\"\nclass Bus:\n";
        assert_eq!(norm(src), "\"\"\"\nclass Car:\n\"\"\"\ntemplate Bus:\n");
    }

    #[test]
    fn test_extra_synonyms() {
        let extra = SynonymOverrides {
            template: vec!["kind".into(), "make".into()],
            ..Default::default()
        };
        let table = SynonymTable::new(&extra);
        assert_eq!(table.canonical("kind"), Some("template"));
        assert_eq!(table.canonical("make"), Some("create"));
        assert_eq!(normalize("kind Car:\n", &table), "template Car:\n");
    }
}
