//! Declaration parser: templates, their sections, `main` and free methods.

use super::statements::BodyParser;
use super::expr::LocalKinds;
use super::{
    initializer, is_identifier, leading_word, parse_params, parse_type, split_marker,
    split_typed_decl, strip_colon,
};
use crate::error::CompileError;
use crate::ir::*;
use crate::lexer::Block;

/// Sub-sections of a template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    StaticVars,
    InstanceVars,
    Constructors,
    StaticMethods,
    InstanceMethods,
    AbstractMethods,
    Accessors { getters: bool, setters: bool },
}

/// Section headers after normalization, whitespace collapsed.
const SECTIONS: &[(&str, Section)] = &[
    ("template vars", Section::StaticVars),
    ("static vars", Section::StaticVars),
    ("instance vars", Section::InstanceVars),
    ("vars", Section::InstanceVars),
    ("constructor", Section::Constructors),
    ("constructors", Section::Constructors),
    ("template methods", Section::StaticMethods),
    ("static methods", Section::StaticMethods),
    ("instance methods", Section::InstanceMethods),
    ("methods", Section::InstanceMethods),
    ("abstract methods", Section::AbstractMethods),
    (
        "getters setters",
        Section::Accessors {
            getters: true,
            setters: true,
        },
    ),
    (
        "getters and setters",
        Section::Accessors {
            getters: true,
            setters: true,
        },
    ),
    (
        "getters, setters",
        Section::Accessors {
            getters: true,
            setters: true,
        },
    ),
    (
        "setters and getters",
        Section::Accessors {
            getters: true,
            setters: true,
        },
    ),
    (
        "getters",
        Section::Accessors {
            getters: true,
            setters: false,
        },
    ),
    (
        "setters",
        Section::Accessors {
            getters: false,
            setters: true,
        },
    ),
];

/// Build the declaration forest from top-level blocks.
pub fn parse_program(blocks: &[Block]) -> Result<Program, CompileError> {
    let mut program = Program::default();

    for block in blocks {
        let (word, rest) = leading_word(&block.text);
        match word {
            "program" => {
                let name = strip_colon(rest).trim();
                if !is_identifier(name) {
                    return Err(CompileError::declaration(
                        block.line,
                        format!("invalid program name '{}'", name),
                    ));
                }
                if program.name.is_some() {
                    return Err(CompileError::declaration(
                        block.line,
                        "program name declared twice",
                    ));
                }
                program.name = Some(name.to_string());
            }
            "main" if matches!(strip_colon(rest).trim(), "" | "()") => {
                if program.entry.is_some() {
                    return Err(CompileError::declaration(
                        block.line,
                        "duplicate main block",
                    ));
                }
                let body = BodyParser::new(&[]).parse_body(&block.children)?;
                program.entry = Some(MethodDecl {
                    name: "main".to_string(),
                    params: Vec::new(),
                    returns: None,
                    return_type: None,
                    visibility: Visibility::Public,
                    is_static: true,
                    is_abstract: false,
                    body,
                    line: block.line,
                });
            }
            "method" if rest.starts_with(' ') => {
                let mut method = parse_method(rest, block, "program")?;
                method.is_static = true;
                program.free_methods.push(method);
            }
            "template" | "abstract" | "interface" => {
                program.templates.push(parse_template(block)?);
            }
            _ => {
                return Err(CompileError::declaration(
                    block.line,
                    format!("unrecognized top-level line '{}'", block.text),
                ));
            }
        }
    }

    tracing::debug!(
        templates = program.templates.len(),
        free_methods = program.free_methods.len(),
        has_main = program.entry.is_some(),
        "parsed declarations"
    );
    Ok(program)
}

/// Parse a header such as
/// `abstract template Animal extends Thing implements Speak, Walk:`.
fn parse_header(text: &str, line: usize) -> Result<TemplateDecl, CompileError> {
    let header = strip_colon(text).replace(',', " , ");
    let mut words = header.split_whitespace().peekable();

    let mut is_abstract = false;
    let mut is_interface = false;
    while let Some(&word) = words.peek() {
        match word {
            "abstract" => is_abstract = true,
            "interface" => is_interface = true,
            _ => break,
        }
        words.next();
    }
    if words.peek() == Some(&"template") {
        words.next();
    }

    let name = words
        .next()
        .filter(|n| is_identifier(n))
        .ok_or_else(|| CompileError::declaration(line, "expected a template name"))?;
    let kind = if is_interface {
        TemplateKind::Interface
    } else if is_abstract {
        TemplateKind::Abstract
    } else {
        TemplateKind::Concrete
    };
    let mut decl = TemplateDecl::new(name, kind, line);

    let mut parents = Vec::new();
    let mut capabilities = Vec::new();
    let mut list: Option<&mut Vec<String>> = None;
    let mut expecting = false;
    for word in words {
        match word {
            "extends" => {
                list = Some(&mut parents);
                expecting = true;
                continue;
            }
            "implements" => {
                list = Some(&mut capabilities);
                expecting = true;
                continue;
            }
            "," if !expecting => {
                expecting = true;
                continue;
            }
            _ => {}
        }
        match list.as_deref_mut() {
            Some(names) if expecting && is_identifier(word) => {
                names.push(word.to_string());
                expecting = false;
            }
            _ => {
                return Err(CompileError::declaration(
                    line,
                    format!("unexpected '{}' in header of template '{}'", word, name),
                ));
            }
        }
    }
    if expecting {
        return Err(CompileError::declaration(
            line,
            format!("incomplete header of template '{}'", name),
        ));
    }

    if kind == TemplateKind::Interface {
        decl.capabilities = parents.into_iter().chain(capabilities).collect();
    } else {
        if parents.len() > 1 {
            return Err(CompileError::declaration(
                line,
                format!("template '{}' can extend only one template", name),
            ));
        }
        decl.parent = parents.pop();
        decl.capabilities = capabilities;
    }
    Ok(decl)
}

fn parse_template(block: &Block) -> Result<TemplateDecl, CompileError> {
    let mut decl = parse_header(&block.text, block.line)?;

    for section in &block.children {
        let (header, inline) = match section.text.split_once(':') {
            Some((head, tail)) => (head, tail.trim()),
            None => (section.text.as_str(), ""),
        };
        let key = header.split_whitespace().collect::<Vec<_>>().join(" ");
        let Some(&(_, kind)) = SECTIONS.iter().find(|(name, _)| *name == key) else {
            return Err(CompileError::declaration(
                section.line,
                format!(
                    "unrecognized section '{}' in template '{}'",
                    header.trim(),
                    decl.name
                ),
            ));
        };

        if let Section::Accessors { getters, setters } = kind {
            if !inline.is_empty() {
                add_accessors(&mut decl, inline, section.line, getters, setters)?;
            }
            for entry in &section.children {
                if entry.has_children() {
                    return Err(nested_entry(entry, &decl.name));
                }
                add_accessors(&mut decl, &entry.text, entry.line, getters, setters)?;
            }
            continue;
        }
        if !inline.is_empty() {
            return Err(CompileError::declaration(
                section.line,
                format!(
                    "unexpected '{}' after section header in template '{}'",
                    inline, decl.name
                ),
            ));
        }

        for entry in &section.children {
            match kind {
                Section::StaticVars | Section::InstanceVars => {
                    if entry.has_children() {
                        return Err(nested_entry(entry, &decl.name));
                    }
                    let field = parse_field(entry, kind == Section::StaticVars, &decl.name)?;
                    if decl.field(&field.name).is_some() {
                        return Err(CompileError::declaration(
                            entry.line,
                            format!("duplicate field '{}' in template '{}'", field.name, decl.name),
                        ));
                    }
                    if field.is_static {
                        decl.static_fields.push(field);
                    } else {
                        decl.fields.push(field);
                    }
                }
                Section::Constructors => {
                    let ctor = parse_constructor(entry, &decl.name)?;
                    decl.constructors.push(ctor);
                }
                Section::StaticMethods => {
                    let mut method = parse_method(&entry.text, entry, &decl.name)?;
                    method.is_static = true;
                    decl.static_methods.push(method);
                }
                Section::InstanceMethods => {
                    let mut method = parse_method(&entry.text, entry, &decl.name)?;
                    if decl.kind == TemplateKind::Interface && method.body.is_empty() {
                        method.is_abstract = true;
                        decl.abstract_methods.push(method);
                    } else {
                        decl.methods.push(method);
                    }
                }
                Section::AbstractMethods => {
                    if entry.has_children() {
                        return Err(CompileError::declaration(
                            entry.line,
                            format!(
                                "abstract method in template '{}' cannot have a body",
                                decl.name
                            ),
                        ));
                    }
                    let mut method = parse_method(&entry.text, entry, &decl.name)?;
                    method.is_abstract = true;
                    decl.abstract_methods.push(method);
                }
                Section::Accessors { .. } => {}
            }
        }
    }

    tracing::trace!(
        template = %decl.name,
        fields = decl.fields.len(),
        static_fields = decl.static_fields.len(),
        constructors = decl.constructors.len(),
        "parsed template"
    );
    Ok(decl)
}

fn nested_entry(entry: &Block, template: &str) -> CompileError {
    CompileError::declaration(
        entry.line,
        format!("unexpected indented block in template '{}'", template),
    )
}

/// `[*|-|+] name as type [with expr | = expr]`.
fn parse_field(entry: &Block, is_static: bool, template: &str) -> Result<FieldDecl, CompileError> {
    let (vis, rest) = split_marker(&entry.text);
    let decl = split_typed_decl(rest).ok_or_else(|| {
        CompileError::declaration(
            entry.line,
            format!(
                "expected '<name> as <type>' in template '{}', found '{}'",
                template, entry.text
            ),
        )
    })?;
    let ty = parse_type(decl.ty).ok_or_else(|| {
        CompileError::declaration(
            entry.line,
            format!("invalid type '{}' in template '{}'", decl.ty, template),
        )
    })?;
    let default = initializer(&ty, decl.init, entry.line, &LocalKinds::new())?;
    Ok(FieldDecl {
        name: decl.name.to_string(),
        ty,
        resolved: None,
        visibility: vis.unwrap_or_default(),
        default,
        is_static,
        line: entry.line,
    })
}

/// `[vis] a, b:` (auto-assigning) or `[vis] Name(a, b):` (explicit when a
/// body follows).
fn parse_constructor(entry: &Block, template: &str) -> Result<ConstructorDecl, CompileError> {
    let (vis, rest) = split_marker(&entry.text);
    let rest = strip_colon(rest);

    let (params_text, parenthesized) = match rest.find('(') {
        Some(open) => {
            let name = rest[..open].trim();
            if name != template {
                return Err(CompileError::declaration(
                    entry.line,
                    format!(
                        "constructor name '{}' does not match template '{}'",
                        name, template
                    ),
                ));
            }
            let inner = rest[open + 1..].strip_suffix(')').ok_or_else(|| {
                CompileError::declaration(entry.line, "expected ')' after constructor parameters")
            })?;
            (inner, true)
        }
        None => (rest, false),
    };
    let params = parse_params(params_text).ok_or_else(|| {
        CompileError::declaration(
            entry.line,
            format!("invalid constructor parameters in template '{}'", template),
        )
    })?;
    let body = BodyParser::new(&params).parse_body(&entry.children)?;
    let style = if parenthesized && !body.is_empty() {
        ConstructorStyle::Explicit
    } else {
        ConstructorStyle::AutoAssign
    };
    Ok(ConstructorDecl {
        params,
        style,
        body,
        visibility: vis.unwrap_or_default(),
        line: entry.line,
    })
}

/// `[vis] name(params) [returns T | -> T | as T]` with an optional body.
fn parse_method(text: &str, entry: &Block, owner: &str) -> Result<MethodDecl, CompileError> {
    let invalid = |what: &str| {
        CompileError::declaration(
            entry.line,
            format!("{} in '{}' ({})", what, entry.text.trim(), owner),
        )
    };

    let (vis, rest) = split_marker(text);
    let rest = strip_colon(rest);
    let (name, after) = leading_word(rest);
    if !is_identifier(name) {
        return Err(invalid("expected a method name"));
    }

    let after = after.trim_start();
    let (params, after) = match after.strip_prefix('(') {
        Some(inner) => {
            let close = inner.rfind(')').ok_or_else(|| invalid("expected ')'"))?;
            let params =
                parse_params(&inner[..close]).ok_or_else(|| invalid("invalid parameters"))?;
            (params, inner[close + 1..].trim())
        }
        None => (Vec::new(), after),
    };

    let returns = if after.is_empty() {
        None
    } else {
        let ty_text = ["returns", "->", "as", ":"]
            .iter()
            .find_map(|kw| after.strip_prefix(kw))
            .ok_or_else(|| invalid("unexpected text after parameters"))?;
        let ty = parse_type(ty_text).ok_or_else(|| invalid("invalid return type"))?;
        (ty.name != "void").then_some(ty)
    };

    let body = BodyParser::new(&params).parse_body(&entry.children)?;
    Ok(MethodDecl {
        name: name.to_string(),
        params,
        returns,
        return_type: None,
        visibility: vis.unwrap_or_default(),
        is_static: false,
        is_abstract: false,
        body,
        line: entry.line,
    })
}

/// Entries like `* name, - age` from a getters/setters section.
fn add_accessors(
    decl: &mut TemplateDecl,
    text: &str,
    line: usize,
    getters: bool,
    setters: bool,
) -> Result<(), CompileError> {
    for item in text.split(',') {
        let (vis, name) = split_marker(item);
        let name = name.trim();
        if !is_identifier(name) {
            return Err(CompileError::declaration(
                line,
                format!(
                    "invalid accessor entry '{}' in template '{}'",
                    item.trim(),
                    decl.name
                ),
            ));
        }
        let accessor = Accessor {
            field: name.to_string(),
            visibility: vis.unwrap_or(Visibility::Public),
            line,
        };
        if getters && !decl.getters.iter().any(|a| a.field == name) {
            decl.getters.push(accessor.clone());
        }
        if setters && !decl.setters.iter().any(|a| a.field == name) {
            decl.setters.push(accessor);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::blocks;

    fn parse(src: &str) -> Result<Program, CompileError> {
        parse_program(&blocks(src)?)
    }

    const STUDENT: &str = r#"
template Student extends Person implements Gradable:
    template vars:
        * total as int = 0
    instance vars:
        - studentId as string
        * grades as arraylist/double with arraylist
    constructor:
        * name, studentId:
            total += 1
        * Student(name):
            this.name = name
    instance methods:
        * average() returns double:
            return 0.0
    getters setters:
        * studentId
"#;

    #[test]
    fn test_template_sections() {
        let program = parse(STUDENT).unwrap();
        let t = &program.templates[0];
        assert_eq!(t.name, "Student");
        assert_eq!(t.parent.as_deref(), Some("Person"));
        assert_eq!(t.capabilities, vec!["Gradable"]);
        assert_eq!(t.static_fields[0].name, "total");
        assert!(t.static_fields[0].is_static);
        assert_eq!(t.fields[0].visibility, Visibility::Private);
        assert_eq!(t.fields[1].default, None);
        assert_eq!(t.constructors[0].style, ConstructorStyle::AutoAssign);
        assert_eq!(t.constructors[0].body.len(), 1);
        assert_eq!(t.constructors[1].style, ConstructorStyle::Explicit);
        assert_eq!(t.methods[0].returns, Some(TypeExpr::simple("double")));
        assert_eq!(t.getters[0].field, "studentId");
        assert_eq!(t.setters.len(), 1);
    }

    #[test]
    fn test_header_kinds() {
        let program = parse(
            "abstract template Shape:\n    abstract methods:\n        area() returns double\ninterface Drawable extends Visible implements Sized:\n    methods:\n        draw()\n",
        )
        .unwrap();
        assert_eq!(program.templates[0].kind, TemplateKind::Abstract);
        assert!(program.templates[0].abstract_methods[0].is_abstract);
        let iface = &program.templates[1];
        assert_eq!(iface.kind, TemplateKind::Interface);
        assert_eq!(iface.capabilities, vec!["Visible", "Sized"]);
        assert_eq!(iface.abstract_methods[0].name, "draw");
    }

    #[test]
    fn test_program_main_and_free_methods() {
        let program = parse(
            "program Demo\nmethod square(int n) returns int:\n    return n * n\nmain:\n    print {square(3)}\n",
        )
        .unwrap();
        assert_eq!(program.name.as_deref(), Some("Demo"));
        assert!(program.free_methods[0].is_static);
        assert_eq!(program.entry.as_ref().map(|m| m.body.len()), Some(1));
    }

    #[test]
    fn test_declaration_errors() {
        let err = parse("template Car:\n    wheels:\n        x as int\n").unwrap_err();
        assert!(matches!(err, CompileError::Declaration { line: 2, .. }));
        assert!(err.message().contains("Car"));

        let err = parse("template Car:\n    instance vars:\n        name\n").unwrap_err();
        assert!(matches!(err, CompileError::Declaration { line: 3, .. }));

        let err = parse("template Car:\n    constructor:\n        * Bus(x):\n").unwrap_err();
        assert!(matches!(err, CompileError::Declaration { .. }));

        let err = parse("template Car extends A, B:\n").unwrap_err();
        assert!(matches!(err, CompileError::Declaration { .. }));

        let err = parse("print hi\n").unwrap_err();
        assert!(matches!(err, CompileError::Declaration { line: 1, .. }));
    }

    #[test]
    fn test_inline_accessors() {
        let program =
            parse("template P:\n    instance vars:\n        - age as int\n    getters: - age\n").unwrap();
        let t = &program.templates[0];
        assert_eq!(t.getters[0].visibility, Visibility::Private);
        assert!(t.setters.is_empty());
    }
}
