//! Scope walk over constructor and method bodies.
//!
//! Types locals, fixes the container kind of every collection operation and
//! rejects verbs the target's kind does not define.

use super::types::{check_initializer, map_type};
use crate::error::CompileError;
use crate::input::expr::describe_target;
use crate::ir::*;
use std::collections::{HashMap, HashSet};

/// Member types of one template, inherited members included.
#[derive(Debug, Default)]
struct Members {
    /// Nearest declaration first.
    fields: Vec<(String, JavaType)>,
    /// Name, arity and return type.
    methods: Vec<(String, usize, Option<JavaType>)>,
}

impl Members {
    fn field(&self, name: &str) -> Option<&JavaType> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    fn returns(&self, name: &str, arity: usize) -> Option<&JavaType> {
        self.methods
            .iter()
            .find(|(n, a, _)| n == name && *a == arity)
            .and_then(|(_, _, t)| t.as_ref())
    }
}

fn collect_members(templates: &[TemplateDecl]) -> HashMap<String, Members> {
    let by_name: HashMap<&str, &TemplateDecl> =
        templates.iter().map(|t| (t.name.as_str(), t)).collect();
    let mut out = HashMap::new();
    for t in templates {
        let mut members = Members::default();
        let mut current = Some(t);
        let mut hops = 0;
        while let Some(owner) = current {
            for f in owner.all_fields() {
                if let Some(ty) = &f.resolved {
                    members.fields.push((f.name.clone(), ty.clone()));
                }
            }
            for m in owner
                .methods
                .iter()
                .chain(&owner.static_methods)
                .chain(&owner.abstract_methods)
            {
                members
                    .methods
                    .push((m.name.clone(), m.params.len(), m.return_type.clone()));
            }
            for g in &owner.getters {
                if let Some(f) = owner.field(&g.field) {
                    members.methods.push((
                        super::hierarchy::accessor_name("get", &g.field),
                        0,
                        f.resolved.clone(),
                    ));
                }
            }
            current = owner.parent.as_deref().and_then(|p| by_name.get(p).copied());
            hops += 1;
            if hops > templates.len() {
                break;
            }
        }
        out.insert(t.name.clone(), members);
    }
    out
}

/// Resolve every body in `templates`. Member types must already be mapped.
pub fn resolve_bodies(templates: &mut [TemplateDecl]) -> Result<(), CompileError> {
    let members = collect_members(templates);
    let names: HashSet<String> = templates.iter().map(|t| t.name.clone()).collect();

    for t in templates.iter_mut() {
        let mut walker = Walker {
            members: &members,
            names: &names,
            template: &t.name,
            scopes: Vec::new(),
        };
        for ctor in &mut t.constructors {
            walker.callable(&ctor.params, &mut ctor.body)?;
        }
        for m in t.methods.iter_mut().chain(t.static_methods.iter_mut()) {
            walker.callable(&m.params, &mut m.body)?;
        }
        for f in t.static_fields.iter_mut().chain(t.fields.iter_mut()) {
            if let Some(default) = &mut f.default {
                walker.scopes.push(HashMap::new());
                walker.expr(default, f.line)?;
                walker.scopes.pop();
            }
        }
        tracing::trace!(template = %t.name, "bodies resolved");
    }
    Ok(())
}

struct Walker<'a> {
    members: &'a HashMap<String, Members>,
    names: &'a HashSet<String>,
    template: &'a str,
    /// Innermost last. `Inferred` marks a local whose type is unknown.
    scopes: Vec<HashMap<String, JavaType>>,
}

impl Walker<'_> {
    fn callable(&mut self, params: &[Param], body: &mut Vec<Stmt>) -> Result<(), CompileError> {
        let frame = params
            .iter()
            .map(|p| {
                let ty = p.resolved.clone().unwrap_or(JavaType::Inferred);
                (p.name.clone(), ty)
            })
            .collect();
        self.scopes = vec![frame];
        self.stmts(body)?;
        self.scopes.clear();
        Ok(())
    }

    fn block(&mut self, body: &mut Vec<Stmt>) -> Result<(), CompileError> {
        self.scopes.push(HashMap::new());
        self.stmts(body)?;
        self.scopes.pop();
        Ok(())
    }

    fn stmts(&mut self, body: &mut Vec<Stmt>) -> Result<(), CompileError> {
        for stmt in body.iter_mut() {
            self.promote_first_assignment(stmt);
            self.stmt(stmt)?;
        }
        Ok(())
    }

    /// `x = value` with no `x` in scope declares `x`.
    fn promote_first_assignment(&self, stmt: &mut Stmt) {
        let StmtKind::Assign {
            target: Expr::VarRef(name),
            op: AssignOp::Set,
            value,
        } = &stmt.kind
        else {
            return;
        };
        if self.local(name).is_some() || self.field(self.template, name).is_some() {
            return;
        }
        stmt.kind = StmtKind::VarDecl {
            name: name.clone(),
            ty: None,
            resolved: None,
            init: Some(value.clone()),
        };
    }

    fn declare(&mut self, name: &str, ty: JavaType) {
        if let Some(frame) = self.scopes.last_mut() {
            frame.insert(name.to_string(), ty);
        }
    }

    fn stmt(&mut self, stmt: &mut Stmt) -> Result<(), CompileError> {
        let line = stmt.line;
        match &mut stmt.kind {
            StmtKind::VarDecl {
                name,
                ty,
                resolved,
                init,
            } => {
                if let Some(init) = init.as_mut() {
                    self.expr(init, line)?;
                }
                let (declared, known) = match (ty.as_ref(), init.as_ref()) {
                    (Some(ty), init) => {
                        let mapped = map_type(ty, self.names, line)?;
                        if let Some(init) = init {
                            check_initializer(name, &mapped, init, line)?;
                        }
                        (mapped.clone(), mapped)
                    }
                    (None, Some(Expr::New { class, .. })) => {
                        let class = JavaType::Class(class.clone());
                        (class.clone(), class)
                    }
                    (None, Some(init)) => (
                        JavaType::Inferred,
                        self.type_of(init).unwrap_or(JavaType::Inferred),
                    ),
                    (None, None) => (JavaType::Inferred, JavaType::Inferred),
                };
                *resolved = Some(declared);
                let name = name.clone();
                self.declare(&name, known);
            }
            StmtKind::Assign { target, value, .. } => {
                self.expr(target, line)?;
                self.expr(value, line)?;
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.expr(cond, line)?;
                self.block(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.block(else_branch)?;
                }
            }
            StmtKind::For { var, iter, body } => {
                let var_ty = match iter {
                    ForIter::Range { start, end, step } => {
                        self.expr(start, line)?;
                        self.expr(end, line)?;
                        if let Some(step) = step {
                            self.expr(step, line)?;
                        }
                        JavaType::Primitive(Primitive::Int)
                    }
                    ForIter::Each(collection) => {
                        self.expr(collection, line)?;
                        self.type_of(collection)
                            .and_then(|t| t.element().cloned())
                            .unwrap_or(JavaType::Inferred)
                    }
                };
                self.scopes.push(HashMap::new());
                let var = var.clone();
                self.declare(&var, var_ty);
                self.stmts(body)?;
                self.scopes.pop();
            }
            StmtKind::While { cond, body } => {
                self.expr(cond, line)?;
                self.block(body)?;
            }
            StmtKind::Return(Some(e)) | StmtKind::Expr(e) | StmtKind::Print(Some(e)) => {
                self.expr(e, line)?;
            }
            StmtKind::Return(None) | StmtKind::Print(None) | StmtKind::Break | StmtKind::Continue => {}
        }
        Ok(())
    }

    fn expr(&mut self, expr: &mut Expr, line: usize) -> Result<(), CompileError> {
        match expr {
            Expr::Literal(_) | Expr::VarRef(_) => {}
            Expr::FieldRef { object, .. } => self.expr(object, line)?,
            Expr::MethodCall { receiver, args, .. } => {
                if let Some(receiver) = receiver {
                    self.expr(receiver, line)?;
                }
                for arg in args {
                    self.expr(arg, line)?;
                }
            }
            Expr::New { args, .. } => {
                for arg in args {
                    self.expr(arg, line)?;
                }
            }
            Expr::Binary { left, right, .. } => {
                self.expr(left, line)?;
                self.expr(right, line)?;
            }
            Expr::Unary { expr, .. } => self.expr(expr, line)?,
            Expr::CollectionOp(op) => {
                for operand in &mut op.operands {
                    self.expr(operand, line)?;
                }
                self.expr(&mut op.target, line)?;
                op.kind = Some(self.kind_for(op, line)?);
            }
            Expr::Interpolated(interp) => {
                for part in &mut interp.parts {
                    if let InterpPart::Expr { expr, spec } = part {
                        self.expr(expr, line)?;
                        if *spec == Some(FormatSpec::Decimal)
                            && let Some(ty @ JavaType::Primitive(Primitive::Float | Primitive::Double)) =
                                self.type_of(expr)
                        {
                            return Err(CompileError::semantic(
                                line,
                                format!("format 'd' needs an integer, but the value is {}", ty.render()),
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn kind_for(&self, op: &CollectionOp, line: usize) -> Result<ContainerKind, CompileError> {
        let target = describe_target(&op.target);
        let kind = match self.type_of(&op.target) {
            Some(ty) => ty.container().ok_or_else(|| {
                CompileError::semantic(
                    line,
                    format!(
                        "'{}' needs a collection, but {} is {}",
                        op.verb.phrase(),
                        target,
                        ty.render()
                    ),
                )
            })?,
            None => {
                return Err(CompileError::semantic(
                    line,
                    format!("cannot determine the collection type of {}", target),
                ));
            }
        };
        if !kind.supports(op.verb) {
            return Err(CompileError::semantic(
                line,
                format!(
                    "'{}' is not defined for {} {}",
                    op.verb.phrase(),
                    kind.label(),
                    target
                ),
            ));
        }
        Ok(kind)
    }

    fn local(&self, name: &str) -> Option<&JavaType> {
        self.scopes.iter().rev().find_map(|frame| frame.get(name))
    }

    fn field(&self, template: &str, name: &str) -> Option<&JavaType> {
        self.members.get(template).and_then(|m| m.field(name))
    }

    /// Template a receiver expression refers to: an instance's class, or a
    /// template name used for static access.
    fn owner_of(&self, object: &Expr) -> Option<String> {
        if let Expr::VarRef(name) = object
            && self.local(name).is_none()
            && self.names.contains(name)
        {
            return Some(name.clone());
        }
        match self.type_of(object)? {
            JavaType::Class(class) => Some(class),
            _ => None,
        }
    }

    fn type_of(&self, expr: &Expr) -> Option<JavaType> {
        let known = |ty: &JavaType| (*ty != JavaType::Inferred).then(|| ty.clone());
        match expr {
            Expr::VarRef(name) if name == "this" => Some(JavaType::Class(self.template.to_string())),
            Expr::VarRef(name) => match self.local(name) {
                Some(ty) => known(ty),
                None => self.field(self.template, name).and_then(known),
            },
            Expr::FieldRef { object, field } => {
                let owner = self.owner_of(object)?;
                self.field(&owner, field).and_then(known)
            }
            Expr::MethodCall {
                receiver,
                name,
                args,
            } => {
                let owner = match receiver {
                    Some(r) => self.owner_of(r)?,
                    None => self.template.to_string(),
                };
                self.members
                    .get(&owner)
                    .and_then(|m| m.returns(name, args.len()))
                    .cloned()
            }
            Expr::New { class, .. } => Some(JavaType::Class(class.clone())),
            Expr::Literal(lit) => match lit {
                Literal::Number(n) if n.contains('.') => Some(JavaType::Primitive(Primitive::Double)),
                Literal::Number(_) => Some(JavaType::Primitive(Primitive::Int)),
                Literal::String(_) => Some(JavaType::String),
                Literal::Char(_) => Some(JavaType::Primitive(Primitive::Char)),
                Literal::Bool(_) => Some(JavaType::Primitive(Primitive::Boolean)),
                Literal::Null => None,
            },
            Expr::Interpolated(_) => Some(JavaType::String),
            Expr::Unary { op: UnaryOp::Not, .. } => Some(JavaType::Primitive(Primitive::Boolean)),
            Expr::Unary { expr, .. } => self.type_of(expr),
            Expr::Binary { left, op, right } => match op {
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                    let (l, r) = (self.type_of(left), self.type_of(right));
                    if l == Some(JavaType::String) || r == Some(JavaType::String) {
                        Some(JavaType::String)
                    } else {
                        l.or(r)
                    }
                }
                _ => Some(JavaType::Primitive(Primitive::Boolean)),
            },
            Expr::CollectionOp(op) => {
                let target = self.type_of(&op.target)?;
                collection_result(op.verb, &target)
            }
        }
    }
}

/// Type a collection phrase evaluates to when used as a value.
fn collection_result(verb: CollectionVerb, target: &JavaType) -> Option<JavaType> {
    use CollectionVerb::*;
    match verb {
        Get | GetAt | First | Last | Pop | Peek | Dequeue | Poll | RemoveIndex => {
            target.element().cloned()
        }
        Size | IndexOf => Some(JavaType::Primitive(Primitive::Int)),
        Contains | IsEmpty => Some(JavaType::Primitive(Primitive::Boolean)),
        Keys => match target {
            JavaType::Collection { args, .. } => args.first().map(|k| JavaType::Collection {
                kind: ContainerKind::HashSet,
                args: vec![k.clone()],
            }),
            _ => None,
        },
        // Generated as a copy, so the value is a real list.
        Values => target.element().map(|v| JavaType::Collection {
            kind: ContainerKind::List,
            args: vec![v.clone()],
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(p: Primitive) -> JavaType {
        JavaType::Collection {
            kind: ContainerKind::List,
            args: vec![JavaType::Primitive(p)],
        }
    }

    fn template_with_field(name: &str, ty: JavaType, body: Vec<Stmt>) -> TemplateDecl {
        let mut t = TemplateDecl::new("Bag", TemplateKind::Concrete, 1);
        t.fields.push(FieldDecl {
            name: name.into(),
            ty: TypeExpr::simple("unused"),
            resolved: Some(ty),
            visibility: Visibility::Private,
            default: None,
            is_static: false,
            line: 2,
        });
        t.methods.push(MethodDecl {
            name: "run".into(),
            params: Vec::new(),
            returns: None,
            return_type: None,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            body,
            line: 3,
        });
        t
    }

    fn op_stmt(verb: CollectionVerb, operands: Vec<Expr>, target: Expr) -> Stmt {
        Stmt::expr(
            Expr::CollectionOp(Box::new(CollectionOp {
                verb,
                operands,
                target,
                kind: None,
            })),
            4,
        )
    }

    fn resolved_kind(t: &TemplateDecl) -> Option<ContainerKind> {
        match &t.methods[0].body[0].kind {
            StmtKind::Expr(Expr::CollectionOp(op)) => op.kind,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_field_kind_attached() {
        let body = vec![op_stmt(CollectionVerb::Add, vec![Expr::number("1")], Expr::var("items"))];
        let mut ts = vec![template_with_field("items", list_of(Primitive::Int), body)];
        resolve_bodies(&mut ts).unwrap();
        assert_eq!(resolved_kind(&ts[0]), Some(ContainerKind::List));
    }

    #[test]
    fn test_invalid_verb_on_field() {
        let body = vec![op_stmt(
            CollectionVerb::Put,
            vec![Expr::string("Alice"), Expr::number("25")],
            Expr::this_field("items"),
        )];
        let mut ts = vec![template_with_field("items", list_of(Primitive::Int), body)];
        let err = resolve_bodies(&mut ts).unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));
        assert_eq!(err.message(), "'put' is not defined for list 'this.items'");
    }

    #[test]
    fn test_unknown_target_rejected() {
        let body = vec![op_stmt(CollectionVerb::Sort, Vec::new(), Expr::var("ghost"))];
        let mut ts = vec![template_with_field("items", list_of(Primitive::Int), body)];
        assert!(matches!(
            resolve_bodies(&mut ts),
            Err(CompileError::Semantic { .. })
        ));
    }

    #[test]
    fn test_locals_and_loop_variables() {
        let local = Stmt::new(
            StmtKind::VarDecl {
                name: "seen".into(),
                ty: Some(TypeExpr {
                    name: "hashset".into(),
                    args: vec![TypeExpr::simple("int")],
                }),
                resolved: None,
                init: None,
            },
            4,
        );
        let each = Stmt::new(
            StmtKind::For {
                var: "n".into(),
                iter: ForIter::Each(Expr::var("items")),
                body: vec![op_stmt(CollectionVerb::Add, vec![Expr::var("n")], Expr::var("seen"))],
            },
            5,
        );
        let mut ts = vec![template_with_field("items", list_of(Primitive::Int), vec![local, each])];
        resolve_bodies(&mut ts).unwrap();
        match &ts[0].methods[0].body[0].kind {
            StmtKind::VarDecl { resolved, .. } => {
                assert_eq!(resolved.as_ref().map(JavaType::render).as_deref(), Some("Set<Integer>"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_first_assignment_declares() {
        let body = vec![
            Stmt::assign(Expr::var("total"), Expr::number("0"), 4),
            Stmt::assign(Expr::var("total"), Expr::number("1"), 5),
        ];
        let mut ts = vec![template_with_field("items", list_of(Primitive::Int), body)];
        resolve_bodies(&mut ts).unwrap();
        let body = &ts[0].methods[0].body;
        assert!(matches!(body[0].kind, StmtKind::VarDecl { .. }));
        assert!(matches!(body[1].kind, StmtKind::Assign { .. }));
    }
}
