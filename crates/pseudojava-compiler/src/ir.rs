//! Abstract syntax model for pseudo-Java compilation units.
//!
//! The declaration and statement parsers build this model; the resolver
//! attaches resolved Java types and inheritance links to it in place, and the
//! Java writer walks it. Nothing here outlives a single compilation.

use serde::{Deserialize, Serialize};

/// A parsed compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Name from a leading `program <Name>` line.
    pub name: Option<String>,
    pub templates: Vec<TemplateDecl>,
    /// Top-level `main` block, before the resolver hosts it on a driver.
    pub entry: Option<MethodDecl>,
    /// Top-level `method` blocks, before the resolver hosts them on a driver.
    pub free_methods: Vec<MethodDecl>,
    /// Template that holds `main`, set by the resolver.
    pub driver: Option<String>,
}

impl Program {
    pub fn template(&self, name: &str) -> Option<&TemplateDecl> {
        self.templates.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Concrete,
    Abstract,
    Interface,
}

/// Field and member visibility, written as a leading marker in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// `*`
    Public,
    /// `-`
    Private,
    /// `+`
    Protected,
    /// no marker
    #[default]
    Package,
}

impl Visibility {
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '*' => Some(Visibility::Public),
            '-' => Some(Visibility::Private),
            '+' => Some(Visibility::Protected),
            _ => None,
        }
    }

    /// Java modifier keyword, `None` for package-private.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Public => Some("public"),
            Visibility::Private => Some("private"),
            Visibility::Protected => Some("protected"),
            Visibility::Package => None,
        }
    }

    /// Java access order: private, package, protected, public.
    fn rank(self) -> u8 {
        match self {
            Visibility::Private => 0,
            Visibility::Package => 1,
            Visibility::Protected => 2,
            Visibility::Public => 3,
        }
    }

    /// An override declared with `self` would reduce access below `other`.
    pub fn is_weaker_than(self, other: Visibility) -> bool {
        self.rank() < other.rank()
    }
}

/// One class, abstract class or interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDecl {
    pub name: String,
    pub kind: TemplateKind,
    pub parent: Option<String>,
    pub capabilities: Vec<String>,
    pub static_fields: Vec<FieldDecl>,
    pub fields: Vec<FieldDecl>,
    pub constructors: Vec<ConstructorDecl>,
    pub static_methods: Vec<MethodDecl>,
    pub methods: Vec<MethodDecl>,
    pub abstract_methods: Vec<MethodDecl>,
    pub getters: Vec<Accessor>,
    pub setters: Vec<Accessor>,
    /// Created by the resolver to host `main`.
    pub synthetic: bool,
    pub line: usize,
}

impl TemplateDecl {
    pub fn new(name: impl Into<String>, kind: TemplateKind, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            capabilities: Vec::new(),
            static_fields: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            static_methods: Vec::new(),
            methods: Vec::new(),
            abstract_methods: Vec::new(),
            getters: Vec::new(),
            setters: Vec::new(),
            synthetic: false,
            line,
        }
    }

    /// Static and instance fields, statics first.
    pub fn all_fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.static_fields.iter().chain(self.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.all_fields().find(|f| f.name == name)
    }
}

/// A getters/setters shortcut entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessor {
    pub field: String,
    pub visibility: Visibility,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    /// Set by the resolver.
    pub resolved: Option<JavaType>,
    pub visibility: Visibility,
    pub default: Option<Expr>,
    pub is_static: bool,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    /// Declared type, if the source gave one.
    pub ty: Option<TypeExpr>,
    pub resolved: Option<JavaType>,
}

impl Param {
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            resolved: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstructorStyle {
    /// Parameter list only; assignments not yet synthesized.
    AutoAssign,
    /// Auto-assignment body already synthesized by the resolver.
    Synthesized,
    Explicit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    pub params: Vec<Param>,
    pub style: ConstructorStyle,
    /// Explicit body, or the statements that run after auto-assignment.
    pub body: Vec<Stmt>,
    pub visibility: Visibility,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    /// Declared return type; `None` means void.
    pub returns: Option<TypeExpr>,
    pub return_type: Option<JavaType>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub body: Vec<Stmt>,
    pub line: usize,
}

/// A pseudo-type as written: `int`, `string`, `arraylist/string`,
/// `map/string,int`, or a template name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeExpr {
    pub name: String,
    pub args: Vec<TypeExpr>,
}

impl TypeExpr {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }
}

impl std::fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("/")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}", arg)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Int,
    Byte,
    Short,
    Long,
    Float,
    Double,
    Boolean,
    Char,
}

impl Primitive {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "int" => Some(Primitive::Int),
            "byte" => Some(Primitive::Byte),
            "short" => Some(Primitive::Short),
            "long" => Some(Primitive::Long),
            "float" => Some(Primitive::Float),
            "double" => Some(Primitive::Double),
            "boolean" | "bool" => Some(Primitive::Boolean),
            "char" => Some(Primitive::Char),
            _ => None,
        }
    }

    pub fn java_name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Boolean => "boolean",
            Primitive::Char => "char",
        }
    }

    /// Boxed class used in generic positions.
    pub fn wrapper(self) -> &'static str {
        match self {
            Primitive::Int => "Integer",
            Primitive::Byte => "Byte",
            Primitive::Short => "Short",
            Primitive::Long => "Long",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
            Primitive::Boolean => "Boolean",
            Primitive::Char => "Character",
        }
    }
}

/// Canonical container kinds that collection verbs are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerKind {
    List,
    Map,
    HashSet,
    TreeSet,
    LinkedList,
    Queue,
    Stack,
}

impl ContainerKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "arraylist" | "list" => Some(ContainerKind::List),
            "hashmap" | "map" => Some(ContainerKind::Map),
            "hashset" | "set" => Some(ContainerKind::HashSet),
            "treeset" | "sortedset" => Some(ContainerKind::TreeSet),
            "linkedlist" | "deque" => Some(ContainerKind::LinkedList),
            "queue" => Some(ContainerKind::Queue),
            "stack" => Some(ContainerKind::Stack),
            _ => None,
        }
    }

    /// Java type used for declarations.
    pub fn interface_name(self) -> &'static str {
        match self {
            ContainerKind::List => "List",
            ContainerKind::Map => "Map",
            ContainerKind::HashSet => "Set",
            ContainerKind::TreeSet => "SortedSet",
            ContainerKind::LinkedList => "LinkedList",
            ContainerKind::Queue => "Queue",
            ContainerKind::Stack => "Deque",
        }
    }

    /// Java class used for construction.
    pub fn impl_name(self) -> &'static str {
        match self {
            ContainerKind::List => "ArrayList",
            ContainerKind::Map => "LinkedHashMap",
            ContainerKind::HashSet => "HashSet",
            ContainerKind::TreeSet => "TreeSet",
            ContainerKind::LinkedList => "LinkedList",
            ContainerKind::Queue | ContainerKind::Stack => "ArrayDeque",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContainerKind::List => "list",
            ContainerKind::Map => "map",
            ContainerKind::HashSet => "hash set",
            ContainerKind::TreeSet => "sorted set",
            ContainerKind::LinkedList => "linked list",
            ContainerKind::Queue => "queue",
            ContainerKind::Stack => "stack",
        }
    }

    /// Whether `verb` is defined for this kind.
    pub fn supports(self, verb: CollectionVerb) -> bool {
        use CollectionVerb::*;
        match self {
            ContainerKind::List => matches!(
                verb,
                Add | Append
                    | Insert
                    | Remove
                    | RemoveIndex
                    | RemoveValue
                    | Get
                    | GetAt
                    | Set
                    | Contains
                    | Size
                    | IsEmpty
                    | First
                    | Last
                    | IndexOf
                    | Sort
                    | Reverse
                    | Shuffle
                    | Clear
            ),
            ContainerKind::LinkedList => {
                ContainerKind::List.supports(verb)
                    || matches!(verb, Push | Pop | Peek | Enqueue | Dequeue | Offer | Poll)
            }
            ContainerKind::Map => matches!(
                verb,
                Put | Get | Remove | Contains | Size | IsEmpty | Clear | Keys | Values
            ),
            ContainerKind::HashSet => {
                matches!(verb, Add | Remove | Contains | Size | IsEmpty | Clear)
            }
            ContainerKind::TreeSet => matches!(
                verb,
                Add | Remove | Contains | Size | IsEmpty | Clear | First | Last
            ),
            ContainerKind::Queue => matches!(
                verb,
                Add | Enqueue | Offer | Dequeue | Poll | Peek | Contains | Size | IsEmpty | Clear
            ),
            ContainerKind::Stack => {
                matches!(verb, Push | Pop | Peek | Contains | Size | IsEmpty | Clear)
            }
        }
    }
}

/// A resolved Java type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JavaType {
    Primitive(Primitive),
    String,
    Collection {
        kind: ContainerKind,
        args: Vec<JavaType>,
    },
    Class(String),
    /// Local declared with `var`.
    Inferred,
}

impl JavaType {
    pub fn container(&self) -> Option<ContainerKind> {
        match self {
            JavaType::Collection { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Element type of a single-argument collection, value type of a map.
    pub fn element(&self) -> Option<&JavaType> {
        match self {
            JavaType::Collection { args, .. } => args.last(),
            _ => None,
        }
    }

    /// Declaration spelling, e.g. `List<Integer>`.
    pub fn render(&self) -> String {
        match self {
            JavaType::Primitive(p) => p.java_name().to_string(),
            JavaType::String => "String".to_string(),
            JavaType::Collection { kind, args } => {
                format!("{}<{}>", kind.interface_name(), render_args(args))
            }
            JavaType::Class(name) => name.clone(),
            JavaType::Inferred => "var".to_string(),
        }
    }

    /// Spelling inside generic arguments; primitives are boxed.
    pub fn render_boxed(&self) -> String {
        match self {
            JavaType::Primitive(p) => p.wrapper().to_string(),
            other => other.render(),
        }
    }

    /// Fresh empty instance for collection types.
    pub fn empty_instance(&self) -> Option<String> {
        match self {
            JavaType::Collection { kind, args } => {
                Some(format!("new {}<{}>()", kind.impl_name(), render_args(args)))
            }
            _ => None,
        }
    }
}

fn render_args(args: &[JavaType]) -> String {
    args.iter()
        .map(JavaType::render_boxed)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: usize) -> Self {
        Self { kind, line }
    }

    pub fn expr(expr: Expr, line: usize) -> Self {
        Self::new(StmtKind::Expr(expr), line)
    }

    pub fn assign(target: Expr, value: Expr, line: usize) -> Self {
        Self::new(
            StmtKind::Assign {
                target,
                op: AssignOp::Set,
                value,
            },
            line,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    VarDecl {
        name: String,
        /// `None` for `var name = ...`.
        ty: Option<TypeExpr>,
        resolved: Option<JavaType>,
        init: Option<Expr>,
    },
    Assign {
        target: Expr,
        op: AssignOp,
        value: Expr,
    },
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    For {
        var: String,
        iter: ForIter,
        body: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Expr(Expr),
    Print(Option<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForIter {
    Range {
        start: Expr,
        end: Expr,
        step: Option<Expr>,
    },
    Each(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    VarRef(String),
    FieldRef {
        object: Box<Expr>,
        field: String,
    },
    /// `receiver` absent means `this` or a call on the enclosing template.
    MethodCall {
        receiver: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
    },
    New {
        class: String,
        args: Vec<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    CollectionOp(Box<CollectionOp>),
    Interpolated(Interpolated),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::VarRef(name.into())
    }

    pub fn number(text: impl Into<String>) -> Self {
        Expr::Literal(Literal::Number(text.into()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn this_field(field: impl Into<String>) -> Self {
        Expr::FieldRef {
            object: Box::new(Expr::var("this")),
            field: field.into(),
        }
    }

    pub fn call(receiver: Option<Expr>, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::MethodCall {
            receiver: receiver.map(Box::new),
            name: name.into(),
            args,
        }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Whether this is a call to the parent constructor.
    pub fn is_super_call(&self) -> bool {
        matches!(self, Expr::MethodCall { receiver: None, name, .. } if name == "super")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Numeric text as written (`42`, `3.14`, `2.5f`, `10L`).
    Number(String),
    String(String),
    Char(char),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne => 3,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Verbs of the declarative collection vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionVerb {
    Add,
    Append,
    Insert,
    Remove,
    RemoveIndex,
    RemoveValue,
    Get,
    GetAt,
    Set,
    Put,
    Push,
    Pop,
    Peek,
    Enqueue,
    Dequeue,
    Offer,
    Poll,
    Contains,
    Size,
    IsEmpty,
    First,
    Last,
    IndexOf,
    Sort,
    Reverse,
    Shuffle,
    Clear,
    Keys,
    Values,
}

impl CollectionVerb {
    /// Source phrase, for diagnostics.
    pub fn phrase(self) -> &'static str {
        match self {
            CollectionVerb::Add => "add",
            CollectionVerb::Append => "append",
            CollectionVerb::Insert => "insert",
            CollectionVerb::Remove => "remove",
            CollectionVerb::RemoveIndex => "remove index",
            CollectionVerb::RemoveValue => "remove value",
            CollectionVerb::Get => "get",
            CollectionVerb::GetAt => "get item at",
            CollectionVerb::Set => "set",
            CollectionVerb::Put => "put",
            CollectionVerb::Push => "push",
            CollectionVerb::Pop => "pop",
            CollectionVerb::Peek => "peek",
            CollectionVerb::Enqueue => "enqueue",
            CollectionVerb::Dequeue => "dequeue",
            CollectionVerb::Offer => "offer",
            CollectionVerb::Poll => "poll",
            CollectionVerb::Contains => "contains",
            CollectionVerb::Size => "size of",
            CollectionVerb::IsEmpty => "is empty",
            CollectionVerb::First => "first in",
            CollectionVerb::Last => "last in",
            CollectionVerb::IndexOf => "index of",
            CollectionVerb::Sort => "sort",
            CollectionVerb::Reverse => "reverse",
            CollectionVerb::Shuffle => "shuffle",
            CollectionVerb::Clear => "clear",
            CollectionVerb::Keys => "keys of",
            CollectionVerb::Values => "values of",
        }
    }
}

/// A canonicalized collection operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionOp {
    pub verb: CollectionVerb,
    /// Operands in phrase order: item, index, key/value.
    pub operands: Vec<Expr>,
    pub target: Expr,
    /// Kind of the target, once known.
    pub kind: Option<ContainerKind>,
}

/// A string with embedded expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolated {
    pub parts: Vec<InterpPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InterpPart {
    Text(String),
    Expr {
        expr: Expr,
        spec: Option<FormatSpec>,
    },
}

/// Numeric format specifier captured after `:` inside braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatSpec {
    /// `.<N>f`
    Fixed(u8),
    /// `f`
    Float,
    /// `d`
    Decimal,
}

impl FormatSpec {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec {
            "f" => Some(FormatSpec::Float),
            "d" => Some(FormatSpec::Decimal),
            _ => {
                let digits = spec.strip_prefix('.')?.strip_suffix('f')?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                digits.parse().ok().map(FormatSpec::Fixed)
            }
        }
    }

    /// `String.format` conversion.
    pub fn placeholder(self) -> String {
        match self {
            FormatSpec::Fixed(n) => format!("%.{}f", n),
            FormatSpec::Float => "%f".to_string(),
            FormatSpec::Decimal => "%d".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_spec_parse() {
        assert_eq!(FormatSpec::parse(".2f"), Some(FormatSpec::Fixed(2)));
        assert_eq!(FormatSpec::parse(".10f"), Some(FormatSpec::Fixed(10)));
        assert_eq!(FormatSpec::parse("f"), Some(FormatSpec::Float));
        assert_eq!(FormatSpec::parse("d"), Some(FormatSpec::Decimal));
        assert_eq!(FormatSpec::parse(".f"), None);
        assert_eq!(FormatSpec::parse("x"), None);
        assert_eq!(FormatSpec::Fixed(1).placeholder(), "%.1f");
    }

    #[test]
    fn test_verb_compatibility() {
        assert!(ContainerKind::List.supports(CollectionVerb::Add));
        assert!(!ContainerKind::List.supports(CollectionVerb::Put));
        assert!(ContainerKind::Map.supports(CollectionVerb::Put));
        assert!(!ContainerKind::HashSet.supports(CollectionVerb::GetAt));
        assert!(ContainerKind::Stack.supports(CollectionVerb::Push));
        assert!(!ContainerKind::Queue.supports(CollectionVerb::Push));
        assert!(ContainerKind::LinkedList.supports(CollectionVerb::Sort));
        assert!(ContainerKind::LinkedList.supports(CollectionVerb::Poll));
    }

    #[test]
    fn test_render_boxes_generic_arguments() {
        let ty = JavaType::Collection {
            kind: ContainerKind::Map,
            args: vec![JavaType::String, JavaType::Primitive(Primitive::Int)],
        };
        assert_eq!(ty.render(), "Map<String, Integer>");
        assert_eq!(
            ty.empty_instance().as_deref(),
            Some("new LinkedHashMap<String, Integer>()")
        );
        assert_eq!(ty.element(), Some(&JavaType::Primitive(Primitive::Int)));
    }

    #[test]
    fn test_type_expr_display() {
        let ty = TypeExpr {
            name: "map".into(),
            args: vec![TypeExpr::simple("string"), TypeExpr::simple("int")],
        };
        assert_eq!(ty.to_string(), "map/string,int");
    }
}
