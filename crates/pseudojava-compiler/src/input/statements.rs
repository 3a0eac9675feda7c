//! Body parser: statements of constructors, methods and `main`.

use super::expr::{ExprParser, LocalKinds, Tok, parse_args_text, parse_expr_text, tokenize};
use super::interpolation::parse_interpolated;
use super::{initializer, is_class_type, is_identifier, leading_word, parse_type, split_typed_decl, strip_colon};
use crate::error::CompileError;
use crate::ir::*;
use crate::lexer::Block;

const ASSIGN_OPS: &[(&str, AssignOp)] = &[
    ("=", AssignOp::Set),
    ("+=", AssignOp::Add),
    ("-=", AssignOp::Sub),
    ("*=", AssignOp::Mul),
    ("/=", AssignOp::Div),
    ("%=", AssignOp::Mod),
];

/// Parses one body, tracking the container kinds of its locals so that a
/// verb applied to a local of known kind is checked immediately.
pub struct BodyParser {
    kinds: LocalKinds,
}

impl BodyParser {
    pub fn new(params: &[Param]) -> Self {
        let kinds = params
            .iter()
            .filter_map(|p| {
                let kind = ContainerKind::from_keyword(&p.ty.as_ref()?.name)?;
                Some((p.name.clone(), kind))
            })
            .collect();
        Self { kinds }
    }

    pub fn parse_body(&mut self, blocks: &[Block]) -> Result<Vec<Stmt>, CompileError> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < blocks.len() {
            let block = &blocks[i];
            i += 1;
            let (word, rest) = leading_word(&block.text);
            let kind = match word {
                "if" => {
                    let cond = self.condition(rest, block)?;
                    let then_branch = self.nested(block)?;
                    let else_branch = self.else_chain(blocks, &mut i)?;
                    StmtKind::If {
                        cond,
                        then_branch,
                        else_branch,
                    }
                }
                "elif" | "else" => {
                    return Err(CompileError::syntax(
                        block.line,
                        format!("'{}' without a matching 'if'", word),
                    ));
                }
                "while" => StmtKind::While {
                    cond: self.condition(rest, block)?,
                    body: self.nested(block)?,
                },
                "for" => self.for_loop(rest, block)?,
                _ => {
                    if block.has_children() {
                        return Err(CompileError::syntax(
                            block.line,
                            "unexpected indented block",
                        ));
                    }
                    self.simple(word, rest, &block.text, block.line)?
                }
            };
            out.push(Stmt::new(kind, block.line));
        }
        Ok(out)
    }

    fn nested(&mut self, block: &Block) -> Result<Vec<Stmt>, CompileError> {
        if !block.has_children() {
            return Err(CompileError::syntax(
                block.line,
                "expected an indented block",
            ));
        }
        self.parse_body(&block.children)
    }

    fn condition(&self, rest: &str, block: &Block) -> Result<Expr, CompileError> {
        let text = strip_colon(rest);
        if text.is_empty() {
            return Err(CompileError::syntax(block.line, "missing condition"));
        }
        parse_expr_text(text, block.line, &self.kinds)
    }

    /// `elif`/`else` blocks following an `if`, folded into nested ifs.
    fn else_chain(
        &mut self,
        blocks: &[Block],
        i: &mut usize,
    ) -> Result<Option<Vec<Stmt>>, CompileError> {
        let Some(block) = blocks.get(*i) else {
            return Ok(None);
        };
        let (word, rest) = leading_word(&block.text);
        let elif_rest = match word {
            "elif" => Some(rest),
            "else" => {
                let (next, tail) = leading_word(rest.trim_start());
                (next == "if").then_some(tail)
            }
            _ => return Ok(None),
        };
        *i += 1;

        match elif_rest {
            Some(rest) => {
                let cond = self.condition(rest, block)?;
                let then_branch = self.nested(block)?;
                let else_branch = self.else_chain(blocks, i)?;
                Ok(Some(vec![Stmt::new(
                    StmtKind::If {
                        cond,
                        then_branch,
                        else_branch,
                    },
                    block.line,
                )]))
            }
            None => {
                if !strip_colon(rest).is_empty() {
                    return Err(CompileError::syntax(
                        block.line,
                        "unexpected text after 'else'",
                    ));
                }
                self.nested(block).map(Some)
            }
        }
    }

    fn for_loop(&mut self, rest: &str, block: &Block) -> Result<StmtKind, CompileError> {
        let line = block.line;
        let header = strip_colon(rest).trim_start();
        let header = match leading_word(header) {
            ("each", tail) => tail.trim_start(),
            _ => header,
        };
        let (var, tail) = leading_word(header);
        let (in_word, source) = leading_word(tail.trim_start());
        if var.is_empty() || in_word != "in" {
            return Err(CompileError::syntax(
                line,
                "expected 'for <name> in <range or collection>'",
            ));
        }

        let iter = match range_args(source.trim(), line, &self.kinds)? {
            Some(mut args) => {
                let step = if args.len() == 3 { args.pop() } else { None };
                let (start, end) = match args.len() {
                    1 => (Expr::number("0"), args.remove(0)),
                    2 => {
                        let end = args.remove(1);
                        (args.remove(0), end)
                    }
                    _ => {
                        return Err(CompileError::syntax(
                            line,
                            "range takes one to three arguments",
                        ));
                    }
                };
                ForIter::Range { start, end, step }
            }
            None => ForIter::Each(parse_expr_text(source, line, &self.kinds)?),
        };
        Ok(StmtKind::For {
            var: var.to_string(),
            iter,
            body: self.nested(block)?,
        })
    }

    fn simple(
        &mut self,
        word: &str,
        rest: &str,
        text: &str,
        line: usize,
    ) -> Result<StmtKind, CompileError> {
        match word {
            "print" if rest.is_empty() || rest.starts_with([' ', '(']) => {
                return self.print(rest.trim(), line);
            }
            "return" if rest.is_empty() || rest.starts_with(' ') => {
                let rest = rest.trim();
                if rest.is_empty() {
                    return Ok(StmtKind::Return(None));
                }
                return Ok(StmtKind::Return(Some(parse_expr_text(
                    rest,
                    line,
                    &self.kinds,
                )?)));
            }
            "break" if rest.trim().is_empty() => return Ok(StmtKind::Break),
            "continue" if rest.trim().is_empty() => return Ok(StmtKind::Continue),
            "create" if rest.starts_with(' ') => return self.create(rest, line),
            "var" if rest.starts_with(' ') => {
                let (name, value) = rest
                    .split_once('=')
                    .ok_or_else(|| CompileError::syntax(line, "expected 'var <name> = <value>'"))?;
                let name = name.trim();
                if !is_identifier(name) {
                    return Err(CompileError::syntax(line, format!("invalid name '{}'", name)));
                }
                return Ok(StmtKind::VarDecl {
                    name: name.to_string(),
                    ty: None,
                    resolved: None,
                    init: Some(parse_expr_text(value, line, &self.kinds)?),
                });
            }
            _ => {}
        }

        if let Some(decl) = split_typed_decl(text) {
            return self.typed_decl(decl.name, decl.ty, decl.init, line);
        }

        let toks = tokenize(text, line)?;
        if let [head @ .., Tok::Punct(p)] = toks.as_slice() {
            if *p == "++" || *p == "--" {
                let target = self.assign_target(head, line)?;
                let op = if *p == "++" { AssignOp::Add } else { AssignOp::Sub };
                return Ok(StmtKind::Assign {
                    target,
                    op,
                    value: Expr::number("1"),
                });
            }
        }
        if let Some((at, op)) = find_assign_op(&toks) {
            let target = self.assign_target(&toks[..at], line)?;
            let mut parser = ExprParser::new(&toks[at + 1..], line, &self.kinds);
            let value = parser.expr()?;
            parser.finish()?;
            return Ok(StmtKind::Assign { target, op, value });
        }

        let mut parser = ExprParser::new(&toks, line, &self.kinds);
        let expr = parser.expr()?;
        parser.finish()?;
        match expr {
            Expr::MethodCall { .. } | Expr::New { .. } | Expr::CollectionOp(_) => {
                Ok(StmtKind::Expr(expr))
            }
            _ => Err(CompileError::syntax(
                line,
                format!("'{}' is not a statement", text),
            )),
        }
    }

    fn assign_target(&self, toks: &[Tok], line: usize) -> Result<Expr, CompileError> {
        let mut parser = ExprParser::new(toks, line, &self.kinds);
        let target = parser.postfix()?;
        parser.finish()?;
        match target {
            Expr::VarRef(_) | Expr::FieldRef { .. } => Ok(target),
            _ => Err(CompileError::syntax(line, "invalid assignment target")),
        }
    }

    /// `print f"..."`, `print "..." + x`, or `print bare text {x}`.
    fn print(&self, rest: &str, line: usize) -> Result<StmtKind, CompileError> {
        if rest.is_empty() {
            return Ok(StmtKind::Print(None));
        }
        let expression_led = rest.starts_with("f\"")
            || rest.starts_with('"')
            || rest.starts_with('\'')
            || rest.starts_with('(');
        let expr = if expression_led {
            match parse_expr_text(rest, line, &self.kinds)? {
                Expr::Literal(Literal::String(s)) => {
                    Expr::Interpolated(parse_interpolated(&s, line, &self.kinds)?)
                }
                other => other,
            }
        } else {
            Expr::Interpolated(parse_interpolated(rest, line, &self.kinds)?)
        };
        Ok(StmtKind::Print(Some(expr)))
    }

    /// `create <name> as <Type> [with <args>]`.
    fn create(&mut self, rest: &str, line: usize) -> Result<StmtKind, CompileError> {
        let decl = split_typed_decl(rest).ok_or_else(|| {
            CompileError::syntax(line, "expected 'create <name> as <type> [with <args>]'")
        })?;
        let mut kind = self.typed_decl(decl.name, decl.ty, decl.init, line)?;
        if let StmtKind::VarDecl {
            ty: Some(ty), init, ..
        } = &mut kind
        {
            if init.is_none() && is_class_type(ty) {
                *init = Some(Expr::New {
                    class: ty.name.clone(),
                    args: Vec::new(),
                });
            }
        }
        Ok(kind)
    }

    fn typed_decl(
        &mut self,
        name: &str,
        ty_text: &str,
        init: Option<(super::InitSep, &str)>,
        line: usize,
    ) -> Result<StmtKind, CompileError> {
        let ty = parse_type(ty_text)
            .ok_or_else(|| CompileError::syntax(line, format!("invalid type '{}'", ty_text)))?;
        let init = initializer(&ty, init, line, &self.kinds)?;
        if let Some(kind) = ContainerKind::from_keyword(&ty.name) {
            self.kinds.insert(name.to_string(), kind);
        } else {
            self.kinds.remove(name);
        }
        Ok(StmtKind::VarDecl {
            name: name.to_string(),
            ty: Some(ty),
            resolved: None,
            init,
        })
    }
}

/// Arguments of a `range(...)` source, or `None` for collection iteration.
fn range_args(
    source: &str,
    line: usize,
    kinds: &LocalKinds,
) -> Result<Option<Vec<Expr>>, CompileError> {
    let (word, rest) = leading_word(source);
    if word != "range" {
        return Ok(None);
    }
    let Some(inner) = rest
        .trim()
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
    else {
        return Ok(None);
    };
    parse_args_text(inner, line, kinds).map(Some)
}

/// First assignment operator outside parentheses.
fn find_assign_op(toks: &[Tok]) -> Option<(usize, AssignOp)> {
    let mut depth = 0i32;
    for (i, tok) in toks.iter().enumerate() {
        if let Tok::Punct(p) = tok {
            match *p {
                "(" | "[" => depth += 1,
                ")" | "]" => depth -= 1,
                _ if depth == 0 => {
                    if let Some((_, op)) = ASSIGN_OPS.iter().find(|(s, _)| s == p) {
                        return Some((i, *op));
                    }
                }
                _ => {}
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::blocks;

    fn body(src: &str) -> Result<Vec<Stmt>, CompileError> {
        let tree = blocks(src).unwrap();
        BodyParser::new(&[]).parse_body(&tree)
    }

    fn kinds(src: &str) -> Vec<StmtKind> {
        body(src).unwrap().into_iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_assignments() {
        let stmts = kinds("x = 1\nthis.total += x\ncount++\n");
        assert_eq!(
            stmts[0],
            StmtKind::Assign {
                target: Expr::var("x"),
                op: AssignOp::Set,
                value: Expr::number("1")
            }
        );
        assert!(matches!(
            &stmts[1],
            StmtKind::Assign { target: Expr::FieldRef { field, .. }, op: AssignOp::Add, .. } if field == "total"
        ));
        assert!(matches!(
            &stmts[2],
            StmtKind::Assign { op: AssignOp::Add, value, .. } if *value == Expr::number("1")
        ));
    }

    #[test]
    fn test_if_elif_else_chain() {
        let stmts = kinds("if x > 1:\n    a()\nelif x > 0:\n    b()\nelse:\n    c()\nd()\n");
        assert_eq!(stmts.len(), 2);
        let StmtKind::If { else_branch: Some(chain), .. } = &stmts[0] else {
            panic!("expected if");
        };
        let StmtKind::If { else_branch: Some(last), .. } = &chain[0].kind else {
            panic!("expected nested if");
        };
        assert!(matches!(last[0].kind, StmtKind::Expr(_)));
    }

    #[test]
    fn test_for_forms() {
        let stmts = kinds(
            "for i in range(5):\n    a(i)\nfor i in range(1, 10, 2):\n    a(i)\nfor each s in students:\n    a(s)\n",
        );
        assert!(matches!(
            &stmts[0],
            StmtKind::For { iter: ForIter::Range { start, step: None, .. }, .. } if *start == Expr::number("0")
        ));
        assert!(matches!(
            &stmts[1],
            StmtKind::For { iter: ForIter::Range { step: Some(_), .. }, .. }
        ));
        assert!(matches!(
            &stmts[2],
            StmtKind::For { var, iter: ForIter::Each(Expr::VarRef(c)), .. } if var == "s" && c == "students"
        ));
    }

    #[test]
    fn test_declarations() {
        let stmts = kinds(
            "create alice as Student with \"Alice\", 20\nnums as arraylist/int\ntotal as double = 0.0\nvar n = 3\n",
        );
        assert!(matches!(
            &stmts[0],
            StmtKind::VarDecl { name, init: Some(Expr::New { class, args }), .. }
                if name == "alice" && class == "Student" && args.len() == 2
        ));
        assert!(matches!(&stmts[1], StmtKind::VarDecl { init: None, .. }));
        assert!(matches!(&stmts[2], StmtKind::VarDecl { init: Some(_), .. }));
        assert!(matches!(&stmts[3], StmtKind::VarDecl { ty: None, .. }));
    }

    #[test]
    fn test_print_forms() {
        let stmts = kinds("print Hello {name}!\nprint f\"{x:.2f}\"\nprint \"Total: \" + t\nprint\n");
        let StmtKind::Print(Some(Expr::Interpolated(bare))) = &stmts[0] else {
            panic!("expected interpolated print");
        };
        assert_eq!(bare.parts.len(), 3);
        assert!(matches!(&stmts[1], StmtKind::Print(Some(Expr::Interpolated(_)))));
        assert!(matches!(&stmts[2], StmtKind::Print(Some(Expr::Binary { .. }))));
        assert_eq!(stmts[3], StmtKind::Print(None));
    }

    #[test]
    fn test_local_kind_checked_at_parse_time() {
        let err = body("ages as arraylist/int\nput \"Alice\" with 25 in ages\n").unwrap_err();
        assert!(matches!(err, CompileError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(body("x + 1\n"), Err(CompileError::Syntax { .. })));
        assert!(matches!(body("else:\n    a()\n"), Err(CompileError::Syntax { .. })));
        assert!(matches!(body("a()\n    b()\n"), Err(CompileError::Syntax { .. })));
        assert!(matches!(body("if x:\n"), Err(CompileError::Syntax { .. })));
    }
}
