//! Pseudo-type to Java type mapping and parameter type inference.

use crate::error::CompileError;
use crate::ir::*;
use std::collections::HashSet;

/// Map a declared pseudo-type to its Java type.
pub fn map_type(
    ty: &TypeExpr,
    templates: &HashSet<String>,
    line: usize,
) -> Result<JavaType, CompileError> {
    if let Some(p) = Primitive::from_keyword(&ty.name) {
        no_args(ty, line)?;
        return Ok(JavaType::Primitive(p));
    }
    if matches!(ty.name.as_str(), "string" | "String" | "str") {
        no_args(ty, line)?;
        return Ok(JavaType::String);
    }
    if let Some(kind) = ContainerKind::from_keyword(&ty.name) {
        let mut args = ty
            .args
            .iter()
            .map(|a| map_type(a, templates, line))
            .collect::<Result<Vec<_>, _>>()?;
        let expected = if kind == ContainerKind::Map { 2 } else { 1 };
        if kind == ContainerKind::Map && args.len() == 1 {
            args.insert(0, JavaType::String);
        }
        if args.len() != expected {
            return Err(CompileError::semantic(
                line,
                format!(
                    "'{}' takes {} type argument{}, found '{}'",
                    ty.name,
                    expected,
                    if expected == 1 { "" } else { "s" },
                    ty
                ),
            ));
        }
        if args.iter().any(|a| matches!(a, JavaType::Inferred)) {
            return Err(CompileError::semantic(line, format!("invalid type '{}'", ty)));
        }
        return Ok(JavaType::Collection { kind, args });
    }
    if templates.contains(&ty.name) || ty.name.starts_with(char::is_uppercase) {
        no_args(ty, line)?;
        return Ok(JavaType::Class(ty.name.clone()));
    }
    Err(CompileError::semantic(
        line,
        format!("unknown type '{}'", ty),
    ))
}

fn no_args(ty: &TypeExpr, line: usize) -> Result<(), CompileError> {
    if ty.args.is_empty() {
        Ok(())
    } else {
        Err(CompileError::semantic(
            line,
            format!("type '{}' does not take type arguments", ty.name),
        ))
    }
}

/// Reject literal initializers that cannot have the declared type.
pub fn check_initializer(
    name: &str,
    ty: &JavaType,
    init: &Expr,
    line: usize,
) -> Result<(), CompileError> {
    let Expr::Literal(lit) = init else {
        return Ok(());
    };
    let ok = match (ty, lit) {
        (_, Literal::Null) => !matches!(ty, JavaType::Primitive(_)),
        (JavaType::Primitive(p), lit) => match p {
            Primitive::Boolean => matches!(lit, Literal::Bool(_)),
            Primitive::Char => matches!(lit, Literal::Char(_)),
            Primitive::Float | Primitive::Double => matches!(lit, Literal::Number(_)),
            Primitive::Int | Primitive::Long | Primitive::Short | Primitive::Byte => {
                matches!(lit, Literal::Number(n) if !n.contains('.'))
                    || matches!(lit, Literal::Char(_))
            }
        },
        (JavaType::String, lit) => matches!(lit, Literal::String(_)),
        (JavaType::Collection { .. }, _) => false,
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(CompileError::semantic(
            line,
            format!(
                "'{}' is declared as {} but initialized with an incompatible literal",
                name,
                ty.render()
            ),
        ))
    }
}

/// Singular forms a plural collection field name may stand for.
fn singulars(plural: &str) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(stem) = plural.strip_suffix("ies") {
        out.push(format!("{}y", stem));
    }
    if let Some(stem) = plural.strip_suffix("es") {
        out.push(stem.to_string());
    }
    if let Some(stem) = plural.strip_suffix('s') {
        out.push(stem.to_string());
    }
    out
}

/// Type of an untyped parameter. `fields` holds the template's own and
/// inherited fields, nearest first.
pub fn infer_param(
    param: &str,
    fields: &[(&str, &JavaType)],
    template: &str,
    line: usize,
) -> Result<JavaType, CompileError> {
    if let Some((_, ty)) = fields.iter().find(|(name, _)| *name == param) {
        return Ok((*ty).clone());
    }
    for (name, ty) in fields {
        if let Some(element) = ty.element() {
            if singulars(name).iter().any(|s| s == param) {
                return Ok(element.clone());
            }
        }
    }
    if fields.is_empty() {
        return Ok(guess_from_name(param));
    }
    Err(CompileError::declaration(
        line,
        format!(
            "cannot infer the type of parameter '{}' in template '{}'; write '{} as <type>'",
            param, template, param
        ),
    ))
}

fn guess_from_name(param: &str) -> JavaType {
    match param {
        "a" | "b" | "x" | "y" | "z" | "n" | "m" => JavaType::Primitive(Primitive::Double),
        "count" | "size" | "index" | "length" => JavaType::Primitive(Primitive::Int),
        "flag" | "enabled" | "active" | "valid" => JavaType::Primitive(Primitive::Boolean),
        _ => JavaType::String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(text: &str) -> TypeExpr {
        crate::input::parse_type(text).unwrap()
    }

    fn map(text: &str) -> Result<JavaType, CompileError> {
        let templates: HashSet<String> = ["Car".to_string()].into_iter().collect();
        map_type(&ty(text), &templates, 1)
    }

    #[test]
    fn test_builtin_types() {
        assert_eq!(map("int").unwrap().render(), "int");
        assert_eq!(map("string").unwrap().render(), "String");
        assert_eq!(map("arraylist/string").unwrap().render(), "List<String>");
        assert_eq!(map("map/int").unwrap().render(), "Map<String, Integer>");
        assert_eq!(map("hashmap/string,double").unwrap().render(), "Map<String, Double>");
        assert_eq!(map("treeset/int").unwrap().render(), "SortedSet<Integer>");
        assert_eq!(map("stack/char").unwrap().render(), "Deque<Character>");
        assert_eq!(map("queue/Car").unwrap().render(), "Queue<Car>");
    }

    #[test]
    fn test_class_types() {
        assert_eq!(map("Car").unwrap(), JavaType::Class("Car".into()));
        assert_eq!(map("Scanner").unwrap(), JavaType::Class("Scanner".into()));
        assert!(matches!(map("widget"), Err(CompileError::Semantic { .. })));
        assert!(matches!(map("list"), Err(CompileError::Semantic { .. })));
        assert!(matches!(map("int/string"), Err(CompileError::Semantic { .. })));
    }

    #[test]
    fn test_literal_mismatch() {
        let int = JavaType::Primitive(Primitive::Int);
        assert!(check_initializer("n", &int, &Expr::number("3"), 1).is_ok());
        assert!(check_initializer("n", &int, &Expr::string("3"), 1).is_err());
        assert!(check_initializer("n", &int, &Expr::number("3.5"), 1).is_err());
        assert!(check_initializer("s", &JavaType::String, &Expr::number("1"), 1).is_err());
        assert!(check_initializer("s", &JavaType::String, &Expr::var("x"), 1).is_ok());
    }

    #[test]
    fn test_param_inference() {
        let string = JavaType::String;
        let grades = JavaType::Collection {
            kind: ContainerKind::List,
            args: vec![JavaType::Primitive(Primitive::Double)],
        };
        let fields = [("name", &string), ("grades", &grades)];
        assert_eq!(infer_param("name", &fields, "S", 1).unwrap(), JavaType::String);
        assert_eq!(
            infer_param("grade", &fields, "S", 1).unwrap(),
            JavaType::Primitive(Primitive::Double)
        );
        assert!(matches!(
            infer_param("mystery", &fields, "S", 1),
            Err(CompileError::Declaration { .. })
        ));
        assert_eq!(
            infer_param("count", &[], "Util", 1).unwrap(),
            JavaType::Primitive(Primitive::Int)
        );
        assert_eq!(
            infer_param("x", &[], "Util", 1).unwrap(),
            JavaType::Primitive(Primitive::Double)
        );
    }
}
