//! Constructor synthesis: auto-assignment bodies and parent constructor calls.

use crate::error::CompileError;
use crate::ir::*;
use std::collections::HashMap;

/// What a derived template needs to know about its parent.
struct Shape {
    parent: Option<String>,
    fields: Vec<String>,
    constructors: Vec<Vec<String>>,
}

/// Expand auto-assignment constructors and put a parent constructor call at
/// the top of every derived constructor. Already-expanded constructors are
/// left alone; an explicit `super(...)` must open the body and stays there.
pub fn synthesize(templates: &mut [TemplateDecl]) -> Result<(), CompileError> {
    let shapes: HashMap<String, Shape> = templates
        .iter()
        .map(|t| {
            let shape = Shape {
                parent: t.parent.clone(),
                fields: t.fields.iter().map(|f| f.name.clone()).collect(),
                constructors: t
                    .constructors
                    .iter()
                    .map(|c| c.params.iter().map(|p| p.name.clone()).collect())
                    .collect(),
            };
            (t.name.clone(), shape)
        })
        .collect();

    for t in templates.iter_mut() {
        let parent = t.parent.as_deref().and_then(|p| shapes.get(p));
        if let Some(parent) = parent
            && t.constructors.is_empty()
            && !parent.accepts_no_args()
        {
            return Err(CompileError::declaration(
                t.line,
                format!(
                    "template '{}' needs a constructor: its parent '{}' has no zero-argument constructor",
                    t.name,
                    t.parent.as_deref().unwrap_or_default()
                ),
            ));
        }

        let fields = visible_fields(&t.name, &shapes);
        for ctor in &mut t.constructors {
            expand(ctor, &t.name, t.parent.as_deref(), parent, &fields)?;
        }
    }
    Ok(())
}

impl Shape {
    fn accepts_no_args(&self) -> bool {
        self.constructors.is_empty() || self.constructors.iter().any(Vec::is_empty)
    }
}

/// Instance fields of `name` and its ancestors, nearest first.
fn visible_fields<'a>(name: &str, shapes: &'a HashMap<String, Shape>) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut current = shapes.get(name);
    let mut hops = 0;
    while let Some(shape) = current {
        out.extend(shape.fields.iter().map(String::as_str));
        current = shape.parent.as_deref().and_then(|p| shapes.get(p));
        hops += 1;
        if hops > shapes.len() {
            break;
        }
    }
    out
}

fn expand(
    ctor: &mut ConstructorDecl,
    template: &str,
    parent_name: Option<&str>,
    parent: Option<&Shape>,
    fields: &[&str],
) -> Result<(), CompileError> {
    if ctor.style == ConstructorStyle::Synthesized {
        return Ok(());
    }
    let is_super = |s: &Stmt| matches!(&s.kind, StmtKind::Expr(e) if e.is_super_call());
    if let Some(misplaced) = ctor.body.iter().skip(1).find(|s| is_super(*s)) {
        return Err(CompileError::declaration(
            misplaced.line,
            format!(
                "super(...) must be the first statement of the constructor of '{}'",
                template
            ),
        ));
    }
    let has_super = ctor.body.first().is_some_and(is_super);

    let mut prologue = Vec::new();
    // Parameters passed straight to an explicit parent call belong to the parent.
    let mut consumed: Vec<&str> = match ctor.body.first().map(|s| &s.kind) {
        Some(StmtKind::Expr(Expr::MethodCall { args, .. })) if has_super => args
            .iter()
            .filter_map(|a| match a {
                Expr::VarRef(v) => Some(v.as_str()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    if let (Some(parent), false) = (parent, has_super) {
        let names: Vec<&str> = ctor.params.iter().map(|p| p.name.as_str()).collect();
        let best = parent
            .constructors
            .iter()
            .filter(|params| params.iter().all(|p| names.contains(&p.as_str())))
            .max_by_key(|params| params.len());
        let args = match best {
            Some(params) => params.iter().map(String::as_str).collect::<Vec<_>>(),
            None if parent.accepts_no_args() => Vec::new(),
            None => {
                return Err(CompileError::declaration(
                    ctor.line,
                    format!(
                        "no constructor of '{}' matches the parameters of '{}'; call super(...) explicitly",
                        parent_name.unwrap_or_default(),
                        template
                    ),
                ));
            }
        };
        prologue.push(Stmt::expr(
            Expr::call(None, "super", args.iter().map(|a| Expr::var(*a)).collect()),
            ctor.line,
        ));
        consumed = args;
    }

    if ctor.style == ConstructorStyle::AutoAssign {
        let assigned_in_body: Vec<&str> = ctor
            .body
            .iter()
            .filter_map(|s| match &s.kind {
                StmtKind::Assign {
                    target: Expr::FieldRef { object, field },
                    ..
                } if matches!(object.as_ref(), Expr::VarRef(v) if v == "this") => {
                    Some(field.as_str())
                }
                _ => None,
            })
            .collect();
        for param in &ctor.params {
            let name = param.name.as_str();
            if consumed.contains(&name) || assigned_in_body.contains(&name) {
                continue;
            }
            if fields.contains(&name) {
                prologue.push(Stmt::assign(
                    Expr::this_field(name),
                    Expr::var(name),
                    ctor.line,
                ));
            } else if ctor.body.is_empty() {
                return Err(CompileError::declaration(
                    ctor.line,
                    format!(
                        "constructor parameter '{}' has no matching field in template '{}'",
                        name, template
                    ),
                ));
            }
        }
        ctor.style = ConstructorStyle::Synthesized;
    }

    if !prologue.is_empty() {
        let at = usize::from(has_super);
        ctor.body.splice(at..at, prologue);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> FieldDecl {
        FieldDecl {
            name: name.into(),
            ty: TypeExpr::simple("string"),
            resolved: None,
            visibility: Visibility::Private,
            default: None,
            is_static: false,
            line: 1,
        }
    }

    fn ctor(params: &[&str], style: ConstructorStyle, body: Vec<Stmt>) -> ConstructorDecl {
        ConstructorDecl {
            params: params.iter().map(|p| Param::untyped(*p)).collect(),
            style,
            body,
            visibility: Visibility::Public,
            line: 3,
        }
    }

    fn template(name: &str, parent: Option<&str>, fields: &[&str], ctors: Vec<ConstructorDecl>) -> TemplateDecl {
        let mut t = TemplateDecl::new(name, TemplateKind::Concrete, 1);
        t.parent = parent.map(String::from);
        t.fields = fields.iter().map(|f| field(f)).collect();
        t.constructors = ctors;
        t
    }

    #[test]
    fn test_auto_assign_in_declaration_order() {
        let mut ts = vec![template(
            "Car",
            None,
            &["make", "year"],
            vec![ctor(&["make", "year"], ConstructorStyle::AutoAssign, Vec::new())],
        )];
        synthesize(&mut ts).unwrap();
        let c = &ts[0].constructors[0];
        assert_eq!(c.style, ConstructorStyle::Synthesized);
        assert_eq!(
            c.body,
            vec![
                Stmt::assign(Expr::this_field("make"), Expr::var("make"), 3),
                Stmt::assign(Expr::this_field("year"), Expr::var("year"), 3),
            ]
        );
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut ts = vec![template(
            "Car",
            None,
            &["make"],
            vec![ctor(&["make", "color"], ConstructorStyle::AutoAssign, Vec::new())],
        )];
        let err = synthesize(&mut ts).unwrap_err();
        assert!(matches!(err, CompileError::Declaration { .. }));
        assert!(err.message().contains("color"));
    }

    #[test]
    fn test_parent_call_consumes_parameters() {
        let mut ts = vec![
            template(
                "Animal",
                None,
                &["name"],
                vec![ctor(&["name"], ConstructorStyle::AutoAssign, Vec::new())],
            ),
            template(
                "Dog",
                Some("Animal"),
                &["breed"],
                vec![ctor(&["name", "breed"], ConstructorStyle::AutoAssign, Vec::new())],
            ),
        ];
        synthesize(&mut ts).unwrap();
        let body = &ts[1].constructors[0].body;
        assert_eq!(body.len(), 2);
        assert_eq!(
            body[0],
            Stmt::expr(Expr::call(None, "super", vec![Expr::var("name")]), 3)
        );
        assert_eq!(
            body[1],
            Stmt::assign(Expr::this_field("breed"), Expr::var("breed"), 3)
        );
    }

    #[test]
    fn test_explicit_super_kept_and_idempotent() {
        let explicit = vec![Stmt::expr(
            Expr::call(None, "super", vec![Expr::string("Rex")]),
            4,
        )];
        let mut ts = vec![
            template("Animal", None, &["name"], vec![ctor(&["name"], ConstructorStyle::AutoAssign, Vec::new())]),
            template("Dog", Some("Animal"), &[], vec![ctor(&[], ConstructorStyle::Explicit, explicit.clone())]),
        ];
        synthesize(&mut ts).unwrap();
        let once = ts.clone();
        synthesize(&mut ts).unwrap();
        assert_eq!(ts, once);
        assert_eq!(ts[1].constructors[0].body, explicit);
    }

    #[test]
    fn test_explicit_super_stays_ahead_of_assignments() {
        let explicit = Stmt::expr(Expr::call(None, "super", vec![Expr::var("name")]), 4);
        let mut ts = vec![
            template("Animal", None, &["name"], vec![ctor(&["name"], ConstructorStyle::AutoAssign, Vec::new())]),
            template(
                "Dog",
                Some("Animal"),
                &["breed"],
                vec![ctor(&["name", "breed"], ConstructorStyle::AutoAssign, vec![explicit.clone()])],
            ),
        ];
        synthesize(&mut ts).unwrap();
        assert_eq!(
            ts[1].constructors[0].body,
            vec![
                explicit,
                Stmt::assign(Expr::this_field("breed"), Expr::var("breed"), 3),
            ]
        );
    }

    #[test]
    fn test_super_after_other_statements_rejected() {
        let body = vec![
            Stmt::new(StmtKind::Print(Some(Expr::string("before"))), 4),
            Stmt::expr(Expr::call(None, "super", vec![Expr::var("name")]), 5),
        ];
        let mut ts = vec![
            template("Animal", None, &["name"], vec![ctor(&["name"], ConstructorStyle::AutoAssign, Vec::new())]),
            template("Dog", Some("Animal"), &[], vec![ctor(&["name"], ConstructorStyle::Explicit, body)]),
        ];
        let err = synthesize(&mut ts).unwrap_err();
        assert!(matches!(err, CompileError::Declaration { line: 5, .. }), "{:?}", err);
        assert!(err.message().contains("first statement"));
    }

    #[test]
    fn test_parent_without_default_constructor() {
        let mut ts = vec![
            template("Animal", None, &["name"], vec![ctor(&["name"], ConstructorStyle::AutoAssign, Vec::new())]),
            template("Dog", Some("Animal"), &[], Vec::new()),
        ];
        assert!(matches!(
            synthesize(&mut ts),
            Err(CompileError::Declaration { .. })
        ));
    }

    #[test]
    fn test_body_after_assignment() {
        let extra = Stmt::assign(
            Expr::this_field("count"),
            Expr::number("0"),
            4,
        );
        let mut ts = vec![template(
            "Counter",
            None,
            &["label", "count"],
            vec![ctor(&["label"], ConstructorStyle::AutoAssign, vec![extra.clone()])],
        )];
        synthesize(&mut ts).unwrap();
        let body = &ts[0].constructors[0].body;
        assert_eq!(body.len(), 2);
        assert_eq!(body[1], extra);
    }
}
