//! Expression tokenizer and parser.
//!
//! Expressions are parsed by precedence climbing over a flat token list.
//! Collection phrases (`add x to items`, `size of items`, ...) are recognized
//! in primary position; their keyword words (`to`, `from`, `in`, ...) are not
//! operators, so operand parsing stops at them naturally.

use super::interpolation::parse_interpolated;
use crate::error::CompileError;
use crate::ir::*;
use std::collections::HashMap;

/// Container kinds of locals known while parsing a body.
pub type LocalKinds = HashMap<String, ContainerKind>;

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Ident(String),
    Number(String),
    Str(String),
    /// Contents of an `f"..."` literal.
    FStr(String),
    Char(char),
    Punct(&'static str),
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Ident(s) => format!("'{}'", s),
            Tok::Number(n) => format!("number {}", n),
            Tok::Str(_) | Tok::FStr(_) => "string literal".to_string(),
            Tok::Char(c) => format!("'{}'", c),
            Tok::Punct(p) => format!("'{}'", p),
        }
    }
}

const PUNCTS: &[&str] = &[
    "==", "!=", "<=", ">=", "&&", "||", "+=", "-=", "*=", "/=", "%=", "++", "--", "->", "+", "-",
    "*", "/", "%", "<", ">", "!", "=", "(", ")", "[", "]", ",", ".", ":",
];

/// Split `text` into tokens.
pub fn tokenize(text: &str, line: usize) -> Result<Vec<Tok>, CompileError> {
    let chars: Vec<char> = text.chars().collect();
    let mut toks = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == 'f' && chars.get(i + 1) == Some(&'"') {
            let (body, next) = scan_fstring(&chars, i + 2, line)?;
            toks.push(Tok::FStr(body));
            i = next;
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            toks.push(Tok::Ident(chars[start..i].iter().collect()));
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()) {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            if chars
                .get(i)
                .is_some_and(|s| matches!(s, 'f' | 'F' | 'd' | 'D' | 'l' | 'L'))
            {
                i += 1;
            }
            toks.push(Tok::Number(chars[start..i].iter().collect()));
        } else if c == '"' || c == '\'' {
            let (body, next) = scan_string(&chars, i + 1, c, line)?;
            let mut it = body.chars();
            match (c, it.next(), it.next()) {
                ('\'', Some(ch), None) => toks.push(Tok::Char(ch)),
                _ => toks.push(Tok::Str(body)),
            }
            i = next;
        } else {
            let rest: String = chars[i..chars.len().min(i + 2)].iter().collect();
            let Some(p) = PUNCTS.iter().find(|p| rest.starts_with(**p)) else {
                return Err(CompileError::syntax(
                    line,
                    format!("unexpected character '{}'", c),
                ));
            };
            toks.push(Tok::Punct(*p));
            i += p.len();
        }
    }
    Ok(toks)
}

/// Scan a quoted literal starting after the opening quote; returns the
/// decoded body and the index after the closing quote.
fn scan_string(
    chars: &[char],
    mut i: usize,
    quote: char,
    line: usize,
) -> Result<(String, usize), CompileError> {
    let mut body = String::new();
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let Some(&esc) = chars.get(i + 1) else { break };
                body.push(match esc {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
                i += 2;
            }
            c if c == quote => return Ok((body, i + 1)),
            c => {
                body.push(c);
                i += 1;
            }
        }
    }
    Err(CompileError::syntax(line, "unterminated string literal"))
}

/// Like [`scan_string`] but quotes inside `{...}` open nested literals
/// instead of closing the f-string. Escapes are kept verbatim for the
/// interpolation parser.
fn scan_fstring(chars: &[char], mut i: usize, line: usize) -> Result<(String, usize), CompileError> {
    let mut body = String::new();
    let mut depth = 0usize;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' if i + 1 < chars.len() => {
                if depth == 0 {
                    body.push(match chars[i + 1] {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                } else {
                    body.push(c);
                    body.push(chars[i + 1]);
                }
                i += 2;
                continue;
            }
            '"' if depth == 0 => return Ok((body, i + 1)),
            '"' => {
                body.push(c);
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        body.push(chars[i]);
                        i += 1;
                    }
                    body.push(chars[i]);
                    i += 1;
                }
                if i < chars.len() {
                    body.push('"');
                }
                i += 1;
                continue;
            }
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        body.push(c);
        i += 1;
    }
    Err(CompileError::syntax(line, "unterminated f-string"))
}

/// Parse a complete expression from `text`.
pub fn parse_expr_text(text: &str, line: usize, kinds: &LocalKinds) -> Result<Expr, CompileError> {
    let toks = tokenize(text, line)?;
    let mut parser = ExprParser::new(&toks, line, kinds);
    let expr = parser.expr()?;
    parser.finish()?;
    Ok(expr)
}

/// Parse a comma-separated argument list (without parentheses).
pub fn parse_args_text(
    text: &str,
    line: usize,
    kinds: &LocalKinds,
) -> Result<Vec<Expr>, CompileError> {
    let toks = tokenize(text, line)?;
    if toks.is_empty() {
        return Ok(Vec::new());
    }
    let mut parser = ExprParser::new(&toks, line, kinds);
    let mut args = vec![parser.expr()?];
    while parser.eat_punct(",") {
        args.push(parser.expr()?);
    }
    parser.finish()?;
    Ok(args)
}

pub struct ExprParser<'a> {
    toks: &'a [Tok],
    pos: usize,
    line: usize,
    kinds: &'a LocalKinds,
}

impl<'a> ExprParser<'a> {
    pub fn new(toks: &'a [Tok], line: usize, kinds: &'a LocalKinds) -> Self {
        Self {
            toks,
            pos: 0,
            line,
            kinds,
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.toks.len()
    }

    /// Fail unless every token was consumed.
    pub fn finish(&self) -> Result<(), CompileError> {
        match self.peek() {
            None => Ok(()),
            Some(tok) => Err(self.error(format!("unexpected {}", tok.describe()))),
        }
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::syntax(self.line, message)
    }

    fn peek(&self) -> Option<&'a Tok> {
        self.toks.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a Tok> {
        self.toks.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<&'a Tok> {
        let tok = self.toks.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    pub fn eat_punct(&mut self, p: &str) -> bool {
        if matches!(self.peek(), Some(Tok::Punct(q)) if *q == p) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<(), CompileError> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", p)))
        }
    }

    fn peek_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Tok::Ident(w)) if w == word)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.peek_word(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self, word: &str, verb: CollectionVerb) -> Result<(), CompileError> {
        if self.eat_word(word) {
            Ok(())
        } else {
            Err(self.error(format!(
                "expected '{}' in '{}' phrase",
                word,
                verb.phrase()
            )))
        }
    }

    fn ident(&mut self) -> Result<String, CompileError> {
        match self.next() {
            Some(Tok::Ident(name)) => Ok(name.clone()),
            Some(tok) => Err(self.error(format!("expected a name, found {}", tok.describe()))),
            None => Err(self.error("expected a name")),
        }
    }

    pub fn expr(&mut self) -> Result<Expr, CompileError> {
        self.binary(1)
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        match self.peek()? {
            Tok::Punct(p) => match *p {
                "+" => Some(BinaryOp::Add),
                "-" => Some(BinaryOp::Sub),
                "*" => Some(BinaryOp::Mul),
                "/" => Some(BinaryOp::Div),
                "%" => Some(BinaryOp::Mod),
                "==" => Some(BinaryOp::Eq),
                "!=" => Some(BinaryOp::Ne),
                "<" => Some(BinaryOp::Lt),
                "<=" => Some(BinaryOp::Le),
                ">" => Some(BinaryOp::Gt),
                ">=" => Some(BinaryOp::Ge),
                "&&" => Some(BinaryOp::And),
                "||" => Some(BinaryOp::Or),
                _ => None,
            },
            Tok::Ident(w) if w == "and" => Some(BinaryOp::And),
            Tok::Ident(w) if w == "or" => Some(BinaryOp::Or),
            _ => None,
        }
    }

    fn binary(&mut self, min_prec: u8) -> Result<Expr, CompileError> {
        let mut left = self.unary()?;
        while let Some(op) = self.binary_op() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.pos += 1;
            let right = self.binary(prec + 1)?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, CompileError> {
        let op = if self.eat_punct("!") || self.eat_word("not") {
            Some(UnaryOp::Not)
        } else if self.eat_punct("-") {
            Some(UnaryOp::Neg)
        } else {
            None
        };
        match op {
            Some(op) => Ok(Expr::Unary {
                op,
                expr: Box::new(self.unary()?),
            }),
            None => self.postfix(),
        }
    }

    /// Primary followed by `.field` / `.method(args)` chains.
    pub fn postfix(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.primary()?;
        while self.eat_punct(".") {
            let name = self.ident()?;
            if self.eat_punct("(") {
                let args = self.call_args()?;
                expr = Expr::call(Some(expr), name, args);
            } else {
                expr = Expr::FieldRef {
                    object: Box::new(expr),
                    field: name,
                };
            }
        }
        Ok(expr)
    }

    /// Arguments after an opening parenthesis, through the closing one.
    fn call_args(&mut self) -> Result<Vec<Expr>, CompileError> {
        let mut args = Vec::new();
        if self.eat_punct(")") {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat_punct(")") {
                return Ok(args);
            }
            self.expect_punct(",")?;
        }
    }

    fn primary(&mut self) -> Result<Expr, CompileError> {
        let Some(tok) = self.next() else {
            return Err(self.error("expected an expression"));
        };
        match tok {
            Tok::Number(n) => Ok(Expr::number(n.clone())),
            Tok::Str(s) => Ok(Expr::string(s.clone())),
            Tok::Char(c) => Ok(Expr::Literal(Literal::Char(*c))),
            Tok::FStr(body) => Ok(Expr::Interpolated(parse_interpolated(
                body, self.line, self.kinds,
            )?)),
            Tok::Punct("(") => {
                let inner = self.expr()?;
                self.expect_punct(")")?;
                Ok(inner)
            }
            Tok::Ident(word) => self.word(word),
            Tok::Punct(p) => Err(self.error(format!("unexpected '{}'", p))),
        }
    }

    fn word(&mut self, word: &str) -> Result<Expr, CompileError> {
        match word {
            "true" | "True" => return Ok(Expr::Literal(Literal::Bool(true))),
            "false" | "False" => return Ok(Expr::Literal(Literal::Bool(false))),
            "null" | "None" => return Ok(Expr::Literal(Literal::Null)),
            "new" => {
                let class = self.ident()?;
                self.expect_punct("(")?;
                let args = self.call_args()?;
                return Ok(Expr::New { class, args });
            }
            _ => {}
        }

        if self.eat_punct("(") {
            let args = self.call_args()?;
            return Ok(Expr::call(None, word, args));
        }
        if let Some(op) = self.collection_phrase(word)? {
            return Ok(op);
        }
        Ok(Expr::var(word))
    }

    /// Whether the next token can begin an operand.
    fn operand_follows(&self) -> bool {
        match self.peek() {
            Some(Tok::Punct(p)) => matches!(*p, "(" | "-" | "!"),
            Some(Tok::Ident(w)) => !matches!(w.as_str(), "and" | "or"),
            Some(_) => true,
            None => false,
        }
    }

    /// `word` opens a phrase only when an operand follows it; in
    /// `remove value from xs` it is the operand itself.
    fn phrase_keyword(&self, word: &str) -> bool {
        self.peek_word(word)
            && match self.peek_at(1) {
                Some(Tok::Ident(w)) => w != "from",
                Some(_) => true,
                None => false,
            }
    }

    /// Whether the next token can begin a collection target.
    fn target_follows(&self) -> bool {
        matches!(self.peek(), Some(Tok::Ident(w)) if !matches!(w.as_str(), "and" | "or" | "not"))
    }

    /// Recognize a collection verb phrase introduced by `word`.
    fn collection_phrase(&mut self, word: &str) -> Result<Option<Expr>, CompileError> {
        use CollectionVerb::*;

        let start = self.pos;
        let (verb, operands) = match word {
            "add" | "append" | "push" | "enqueue" | "offer" if self.operand_follows() => {
                let verb = match word {
                    "add" => Add,
                    "append" => Append,
                    "push" => Push,
                    "enqueue" => Enqueue,
                    _ => Offer,
                };
                let item = self.expr()?;
                if !(self.eat_word("to") || self.eat_word("onto") || self.eat_word("into")) {
                    return Err(self.error(format!("expected 'to' in '{}' phrase", verb.phrase())));
                }
                (verb, vec![item])
            }
            "insert" if self.operand_follows() => {
                let item = self.expr()?;
                self.expect_word("into", Insert)?;
                let target = self.postfix()?;
                self.expect_word("at", Insert)?;
                let index = self.expr()?;
                return self.finish_phrase(Insert, vec![item, index], target).map(Some);
            }
            "remove" if self.phrase_keyword("index") => {
                self.pos += 1;
                let index = self.expr()?;
                self.expect_word("from", RemoveIndex)?;
                (RemoveIndex, vec![index])
            }
            "remove" if self.phrase_keyword("value") => {
                self.pos += 1;
                let item = self.expr()?;
                self.expect_word("from", RemoveValue)?;
                (RemoveValue, vec![item])
            }
            "remove" if self.operand_follows() => {
                let item = self.expr()?;
                self.expect_word("from", Remove)?;
                (Remove, vec![item])
            }
            "get" if self.peek_word("item") && matches!(self.peek_at(1), Some(Tok::Ident(w)) if w == "at") => {
                self.pos += 2;
                let index = self.expr()?;
                self.expect_word("from", GetAt)?;
                (GetAt, vec![index])
            }
            "get" if self.operand_follows() => {
                let key = self.expr()?;
                self.expect_word("from", Get)?;
                (Get, vec![key])
            }
            "set" if self.operand_follows() => {
                let index = self.expr()?;
                self.expect_word("in", Set)?;
                let target = self.postfix()?;
                self.expect_word("to", Set)?;
                let value = self.expr()?;
                return self.finish_phrase(Set, vec![index, value], target).map(Some);
            }
            "put" if self.operand_follows() => {
                let key = self.expr()?;
                self.expect_word("with", Put)?;
                let value = self.expr()?;
                self.expect_word("in", Put)?;
                (Put, vec![key, value])
            }
            "pop" | "dequeue" | "poll" | "peek" => {
                let verb = match word {
                    "pop" => Pop,
                    "dequeue" => Dequeue,
                    "poll" => Poll,
                    _ => Peek,
                };
                let _ = self.eat_word("from") || self.eat_word("at");
                if !self.target_follows() {
                    self.pos = start;
                    return Ok(None);
                }
                (verb, Vec::new())
            }
            "contains" | "has" if self.operand_follows() => {
                let item = self.expr()?;
                self.expect_word("in", Contains)?;
                (Contains, vec![item])
            }
            "index" if self.peek_word("of") => {
                self.pos += 1;
                let item = self.expr()?;
                self.expect_word("in", IndexOf)?;
                (IndexOf, vec![item])
            }
            "size" | "length" | "count" | "keys" | "values"
                if self.peek_word("of") && self.peek_at(1).is_some() =>
            {
                self.pos += 1;
                let verb = match word {
                    "keys" => Keys,
                    "values" => Values,
                    _ => Size,
                };
                (verb, Vec::new())
            }
            "first" | "last"
                if (self.peek_word("in") || self.peek_word("of")) && self.peek_at(1).is_some() =>
            {
                self.pos += 1;
                (if word == "first" { First } else { Last }, Vec::new())
            }
            "is" if self.peek_word("empty") => {
                self.pos += 1;
                let _ = self.eat_word("in");
                (IsEmpty, Vec::new())
            }
            "sort" | "reverse" | "shuffle" | "clear" if self.target_follows() => {
                let verb = match word {
                    "sort" => Sort,
                    "reverse" => Reverse,
                    "shuffle" => Shuffle,
                    _ => Clear,
                };
                (verb, Vec::new())
            }
            _ => return Ok(None),
        };

        let target = self.postfix()?;
        self.finish_phrase(verb, operands, target).map(Some)
    }

    /// Attach the target, checking the verb when the target is a local of
    /// known kind.
    fn finish_phrase(
        &self,
        verb: CollectionVerb,
        operands: Vec<Expr>,
        target: Expr,
    ) -> Result<Expr, CompileError> {
        let kind = match &target {
            Expr::VarRef(name) => self.kinds.get(name).copied(),
            _ => None,
        };
        if let Some(kind) = kind {
            if !kind.supports(verb) {
                return Err(self.error(format!(
                    "'{}' is not defined for {} {}",
                    verb.phrase(),
                    kind.label(),
                    describe_target(&target)
                )));
            }
        }
        Ok(Expr::CollectionOp(Box::new(CollectionOp {
            verb,
            operands,
            target,
            kind,
        })))
    }
}

/// Source-like rendering of a collection target for messages.
pub fn describe_target(target: &Expr) -> String {
    match target {
        Expr::VarRef(name) => format!("'{}'", name),
        Expr::FieldRef { object, field } => match object.as_ref() {
            Expr::VarRef(obj) => format!("'{}.{}'", obj, field),
            _ => format!("'{}'", field),
        },
        _ => "target".to_string(),
    }
}
