//! Java writer for the resolved model.
//!
//! Emits one compilation unit per template, or a single unit holding every
//! template with the driver type public. Output depends only on the model and
//! the options, so identical inputs give byte-identical files.

use super::CompilationUnit;
use crate::error::CompileError;
use crate::ir::*;
use crate::options::{CompileOptions, Layout};
use crate::resolve::hierarchy::accessor_name;
use crate::resolve::is_entry_point;
use crate::traits::Writer;

/// Static instance of the Java writer.
pub static JAVA_WRITER: JavaWriterImpl = JavaWriterImpl;

/// Java writer implementing the Writer trait.
pub struct JavaWriterImpl;

impl Writer for JavaWriterImpl {
    fn language(&self) -> &'static str {
        "java"
    }

    fn extension(&self) -> &'static str {
        "java"
    }

    fn write(
        &self,
        program: &Program,
        options: &CompileOptions,
    ) -> Result<Vec<CompilationUnit>, CompileError> {
        JavaWriter::emit(program, options)
    }
}

/// Emits a resolved program as Java source.
pub struct JavaWriter<'a> {
    program: &'a Program,
    output: String,
    indent: usize,
    width: usize,
}

impl<'a> JavaWriter<'a> {
    fn new(program: &'a Program, options: &CompileOptions) -> Self {
        Self {
            program,
            output: String::new(),
            indent: 0,
            width: options.indent,
        }
    }

    /// Emit every compilation unit of `program`.
    pub fn emit(
        program: &Program,
        options: &CompileOptions,
    ) -> Result<Vec<CompilationUnit>, CompileError> {
        let mut units = Vec::new();
        match options.layout {
            Layout::PerTemplate => {
                for t in &program.templates {
                    let mut writer = JavaWriter::new(program, options);
                    writer.write_imports(&options.imports);
                    writer.write_template(t, true)?;
                    units.push(writer.finish(&t.name));
                }
            }
            Layout::SingleFile => {
                let primary = program
                    .driver
                    .as_deref()
                    .or_else(|| program.templates.first().map(|t| t.name.as_str()));
                if let Some(primary) = primary {
                    let mut writer = JavaWriter::new(program, options);
                    writer.write_imports(&options.imports);
                    for (i, t) in program.templates.iter().enumerate() {
                        if i > 0 {
                            writer.output.push('\n');
                        }
                        writer.write_template(t, t.name == primary)?;
                    }
                    units.push(writer.finish(primary));
                }
            }
        }
        tracing::debug!(units = units.len(), "generated");
        Ok(units)
    }

    fn finish(self, type_name: &str) -> CompilationUnit {
        CompilationUnit {
            file_name: format!("{}.java", type_name),
            type_name: type_name.to_string(),
            source: self.output,
        }
    }

    fn write_imports(&mut self, imports: &[String]) {
        for import in imports {
            self.output.push_str(&format!("import {};\n", import));
        }
        if !imports.is_empty() {
            self.output.push('\n');
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent * self.width {
            self.output.push(' ');
        }
    }

    fn write_template(&mut self, t: &TemplateDecl, public: bool) -> Result<(), CompileError> {
        if public {
            self.output.push_str("public ");
        }
        self.output.push_str(match t.kind {
            TemplateKind::Concrete => "class ",
            TemplateKind::Abstract => "abstract class ",
            TemplateKind::Interface => "interface ",
        });
        self.output.push_str(&t.name);
        if t.kind == TemplateKind::Interface {
            if !t.capabilities.is_empty() {
                self.output.push_str(" extends ");
                self.output.push_str(&t.capabilities.join(", "));
            }
        } else {
            if let Some(parent) = &t.parent {
                self.output.push_str(" extends ");
                self.output.push_str(parent);
            }
            if !t.capabilities.is_empty() {
                self.output.push_str(" implements ");
                self.output.push_str(&t.capabilities.join(", "));
            }
        }
        self.output.push_str(" {\n");
        self.indent += 1;

        let mut first = true;
        let mut gap = |output: &mut String| {
            if !first {
                output.push('\n');
            }
            first = false;
        };

        if t.all_fields().next().is_some() {
            gap(&mut self.output);
            for field in t.all_fields() {
                self.write_field(field)?;
            }
        }
        for ctor in &t.constructors {
            gap(&mut self.output);
            self.write_constructor(t, ctor)?;
        }
        for method in t.static_methods.iter().chain(&t.methods) {
            gap(&mut self.output);
            self.write_method(t, method)?;
        }
        for method in &t.abstract_methods {
            gap(&mut self.output);
            self.write_method(t, method)?;
        }
        for getter in &t.getters {
            let name = accessor_name("get", &getter.field);
            if !declares(t, &name, 0) {
                gap(&mut self.output);
                self.write_getter(t, getter, &name)?;
            }
        }
        for setter in &t.setters {
            let name = accessor_name("set", &setter.field);
            if !declares(t, &name, 1) {
                gap(&mut self.output);
                self.write_setter(t, setter, &name)?;
            }
        }

        self.indent -= 1;
        self.output.push_str("}\n");
        Ok(())
    }

    fn write_modifiers(&mut self, visibility: Visibility, is_static: bool) {
        if let Some(keyword) = visibility.keyword() {
            self.output.push_str(keyword);
            self.output.push(' ');
        }
        if is_static {
            self.output.push_str("static ");
        }
    }

    fn write_field(&mut self, field: &FieldDecl) -> Result<(), CompileError> {
        let ty = resolved(field.resolved.as_ref(), field.line, &field.name)?;
        self.write_indent();
        self.write_modifiers(field.visibility, field.is_static);
        self.output.push_str(&format!("{} {}", ty.render(), field.name));
        if let Some(default) = &field.default {
            self.output.push_str(" = ");
            self.write_expr(default)?;
        } else if let Some(empty) = ty.empty_instance() {
            self.output.push_str(" = ");
            self.output.push_str(&empty);
        }
        self.output.push_str(";\n");
        Ok(())
    }

    fn write_params(&mut self, params: &[Param], line: usize) -> Result<(), CompileError> {
        self.output.push('(');
        for (i, p) in params.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            let ty = resolved(p.resolved.as_ref(), line, &p.name)?;
            self.output.push_str(&format!("{} {}", ty.render(), p.name));
        }
        self.output.push(')');
        Ok(())
    }

    fn write_constructor(
        &mut self,
        t: &TemplateDecl,
        ctor: &ConstructorDecl,
    ) -> Result<(), CompileError> {
        if ctor.style == ConstructorStyle::AutoAssign {
            return Err(CompileError::generation(
                ctor.line,
                format!("constructor of '{}' was never synthesized", t.name),
            ));
        }
        self.write_indent();
        self.write_modifiers(ctor.visibility, false);
        self.output.push_str(&t.name);
        self.write_params(&ctor.params, ctor.line)?;
        self.write_body(&ctor.body)?;
        Ok(())
    }

    fn write_method(&mut self, t: &TemplateDecl, m: &MethodDecl) -> Result<(), CompileError> {
        self.write_indent();
        if is_entry_point(m) {
            self.output.push_str("public static void main(String[] args)");
            return self.write_body(&m.body);
        }

        let returns = match (&m.returns, &m.return_type) {
            (None, _) => "void".to_string(),
            (Some(_), Some(ty)) => ty.render(),
            (Some(ty), None) => {
                return Err(CompileError::generation(
                    m.line,
                    format!("return type '{}' of '{}' was never resolved", ty, m.name),
                ));
            }
        };
        let in_interface = t.kind == TemplateKind::Interface;
        if !in_interface {
            self.write_modifiers(m.visibility, m.is_static);
        } else if m.is_static {
            self.output.push_str("static ");
        }
        if m.is_abstract && !in_interface {
            self.output.push_str("abstract ");
        }
        self.output.push_str(&format!("{} {}", returns, m.name));
        self.write_params(&m.params, m.line)?;
        if m.is_abstract {
            self.output.push_str(";\n");
            Ok(())
        } else {
            self.write_body(&m.body)
        }
    }

    fn write_getter(
        &mut self,
        t: &TemplateDecl,
        accessor: &Accessor,
        name: &str,
    ) -> Result<(), CompileError> {
        let (owner, field) = self.field_of(&t.name, &accessor.field, accessor.line)?;
        let ty = resolved(field.resolved.as_ref(), accessor.line, &field.name)?;
        self.write_indent();
        self.write_modifiers(accessor.visibility, field.is_static);
        self.output
            .push_str(&format!("{} {}() {{\n", ty.render(), name));
        self.indent += 1;
        self.write_indent();
        self.output
            .push_str(&format!("return {}.{};\n", receiver(owner, field), field.name));
        self.indent -= 1;
        self.write_indent();
        self.output.push_str("}\n");
        Ok(())
    }

    fn write_setter(
        &mut self,
        t: &TemplateDecl,
        accessor: &Accessor,
        name: &str,
    ) -> Result<(), CompileError> {
        let (owner, field) = self.field_of(&t.name, &accessor.field, accessor.line)?;
        let ty = resolved(field.resolved.as_ref(), accessor.line, &field.name)?;
        self.write_indent();
        self.write_modifiers(accessor.visibility, field.is_static);
        self.output
            .push_str(&format!("void {}({} value) {{\n", name, ty.render()));
        self.indent += 1;
        self.write_indent();
        self.output
            .push_str(&format!("{}.{} = value;\n", receiver(owner, field), field.name));
        self.indent -= 1;
        self.write_indent();
        self.output.push_str("}\n");
        Ok(())
    }

    /// Field `name` of `template` or its nearest ancestor declaring it.
    fn field_of(
        &self,
        template: &str,
        name: &str,
        line: usize,
    ) -> Result<(&'a str, &'a FieldDecl), CompileError> {
        let mut current = self.program.template(template);
        let mut hops = 0;
        while let Some(owner) = current {
            if let Some(field) = owner.field(name) {
                return Ok((owner.name.as_str(), field));
            }
            current = owner.parent.as_deref().and_then(|p| self.program.template(p));
            hops += 1;
            if hops > self.program.templates.len() {
                break;
            }
        }
        Err(CompileError::generation(
            line,
            format!("accessor refers to missing field '{}'", name),
        ))
    }

    /// ` {`, the indented statements, then the closing brace line.
    fn write_body(&mut self, body: &[Stmt]) -> Result<(), CompileError> {
        self.output.push_str(" {\n");
        self.indent += 1;
        for stmt in body {
            self.write_stmt(stmt)?;
        }
        self.indent -= 1;
        self.write_indent();
        self.output.push_str("}\n");
        Ok(())
    }

    /// Like [`Self::write_body`] without the trailing newline.
    fn write_block(&mut self, body: &[Stmt]) -> Result<(), CompileError> {
        self.output.push_str("{\n");
        self.indent += 1;
        for stmt in body {
            self.write_stmt(stmt)?;
        }
        self.indent -= 1;
        self.write_indent();
        self.output.push('}');
        Ok(())
    }

    fn write_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        self.write_indent();
        match &stmt.kind {
            StmtKind::VarDecl {
                name,
                resolved: ty,
                init,
                ..
            } => {
                let ty = resolved(ty.as_ref(), stmt.line, name)?;
                self.output.push_str(&format!("{} {}", ty.render(), name));
                match init {
                    Some(init) => {
                        self.output.push_str(" = ");
                        self.write_expr(init)?;
                    }
                    None => match default_value(ty) {
                        Some(value) => {
                            self.output.push_str(" = ");
                            self.output.push_str(&value);
                        }
                        None => {
                            return Err(CompileError::generation(
                                stmt.line,
                                format!("local '{}' has neither a type nor a value", name),
                            ));
                        }
                    },
                }
                self.output.push(';');
            }
            StmtKind::Assign { target, op, value } => {
                self.write_expr(target)?;
                self.output.push_str(&format!(" {} ", op.symbol()));
                self.write_expr(value)?;
                self.output.push(';');
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.write_if(cond, then_branch, else_branch.as_deref())?,
            StmtKind::For { var, iter, body } => {
                match iter {
                    ForIter::Range { start, end, step } => {
                        let descending = step.as_ref().is_some_and(is_negative);
                        self.output.push_str(&format!("for (int {} = ", var));
                        self.write_expr(start)?;
                        self.output.push_str(&format!(
                            "; {} {} ",
                            var,
                            if descending { ">" } else { "<" }
                        ));
                        self.write_expr(end)?;
                        match step {
                            Some(step) => {
                                self.output.push_str(&format!("; {} += ", var));
                                self.write_expr(step)?;
                                self.output.push_str(") ");
                            }
                            None => self.output.push_str(&format!("; {}++) ", var)),
                        }
                    }
                    ForIter::Each(collection) => {
                        self.output.push_str(&format!("for (var {} : ", var));
                        self.write_expr(collection)?;
                        self.output.push_str(") ");
                    }
                }
                self.write_block(body)?;
            }
            StmtKind::While { cond, body } => {
                self.output.push_str("while (");
                self.write_expr(cond)?;
                self.output.push_str(") ");
                self.write_block(body)?;
            }
            StmtKind::Return(value) => {
                self.output.push_str("return");
                if let Some(value) = value {
                    self.output.push(' ');
                    self.write_expr(value)?;
                }
                self.output.push(';');
            }
            StmtKind::Break => self.output.push_str("break;"),
            StmtKind::Continue => self.output.push_str("continue;"),
            StmtKind::Expr(expr) => {
                self.write_expr(expr)?;
                self.output.push(';');
            }
            StmtKind::Print(value) => {
                self.output.push_str("System.out.println(");
                if let Some(value) = value {
                    self.write_expr(value)?;
                }
                self.output.push_str(");");
            }
        }
        self.output.push('\n');
        Ok(())
    }

    fn write_if(
        &mut self,
        cond: &Expr,
        then_branch: &[Stmt],
        else_branch: Option<&[Stmt]>,
    ) -> Result<(), CompileError> {
        self.output.push_str("if (");
        self.write_expr(cond)?;
        self.output.push_str(") ");
        self.write_block(then_branch)?;
        match else_branch {
            Some(
                [
                    Stmt {
                        kind:
                            StmtKind::If {
                                cond,
                                then_branch,
                                else_branch,
                            },
                        ..
                    },
                ],
            ) => {
                self.output.push_str(" else ");
                self.write_if(cond, then_branch, else_branch.as_deref())?;
            }
            Some(stmts) => {
                self.output.push_str(" else ");
                self.write_block(stmts)?;
            }
            None => {}
        }
        Ok(())
    }

    fn write_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        self.write_prec(expr, 0)
    }

    /// Receiver position: anything looser than a call is parenthesized.
    fn write_operand(&mut self, expr: &Expr) -> Result<(), CompileError> {
        self.write_prec(expr, POSTFIX)
    }

    fn write_prec(&mut self, expr: &Expr, min: u8) -> Result<(), CompileError> {
        match expr {
            Expr::Literal(lit) => self.write_literal(lit),
            Expr::VarRef(name) => self.output.push_str(name),
            Expr::FieldRef { object, field } => {
                self.write_operand(object)?;
                self.output.push('.');
                self.output.push_str(field);
            }
            Expr::MethodCall {
                receiver,
                name,
                args,
            } => {
                if let Some(receiver) = receiver {
                    self.write_operand(receiver)?;
                    self.output.push('.');
                }
                self.output.push_str(name);
                self.write_args(args.iter())?;
            }
            Expr::New { class, args } => {
                self.output.push_str("new ");
                self.output.push_str(class);
                self.write_args(args.iter())?;
            }
            Expr::Binary { left, op, right } => {
                if let Some((literal, other)) = string_comparison(left, *op, right) {
                    let negated = *op == BinaryOp::Ne;
                    let paren = negated && min > UNARY;
                    if paren {
                        self.output.push('(');
                    }
                    if negated {
                        self.output.push('!');
                    }
                    self.write_operand(literal)?;
                    self.output.push_str(".equals(");
                    self.write_expr(other)?;
                    self.output.push(')');
                    if paren {
                        self.output.push(')');
                    }
                    return Ok(());
                }
                let prec = op.precedence();
                let paren = prec < min;
                if paren {
                    self.output.push('(');
                }
                self.write_prec(left, prec)?;
                self.output.push_str(&format!(" {} ", op.symbol()));
                self.write_prec(right, prec + 1)?;
                if paren {
                    self.output.push(')');
                }
            }
            Expr::Unary { op, expr } => {
                let paren = min > UNARY;
                if paren {
                    self.output.push('(');
                }
                self.output.push(match op {
                    UnaryOp::Neg => '-',
                    UnaryOp::Not => '!',
                });
                self.write_prec(expr, POSTFIX)?;
                if paren {
                    self.output.push(')');
                }
            }
            Expr::CollectionOp(op) => self.write_collection_op(op)?,
            Expr::Interpolated(interp) => self.write_interpolated(interp)?,
        }
        Ok(())
    }

    fn write_args<'e>(&mut self, args: impl Iterator<Item = &'e Expr>) -> Result<(), CompileError> {
        self.output.push('(');
        for (i, arg) in args.enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_expr(arg)?;
        }
        self.output.push(')');
        Ok(())
    }

    fn write_literal(&mut self, lit: &Literal) {
        match lit {
            Literal::Number(n) => self.output.push_str(n),
            Literal::String(s) => {
                self.output.push('"');
                self.output.push_str(&escape_string(s));
                self.output.push('"');
            }
            Literal::Char(c) => {
                self.output.push('\'');
                match c {
                    '\'' => self.output.push_str("\\'"),
                    '\\' => self.output.push_str("\\\\"),
                    '\n' => self.output.push_str("\\n"),
                    '\t' => self.output.push_str("\\t"),
                    '\0' => self.output.push_str("\\0"),
                    c => self.output.push(*c),
                }
                self.output.push('\'');
            }
            Literal::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Literal::Null => self.output.push_str("null"),
        }
    }

    fn write_interpolated(&mut self, interp: &Interpolated) -> Result<(), CompileError> {
        let mut format = String::new();
        let mut args = Vec::new();
        for part in &interp.parts {
            match part {
                InterpPart::Text(text) => format.push_str(text),
                InterpPart::Expr { expr, spec } => {
                    format.push_str(&spec.map_or_else(|| "%s".to_string(), FormatSpec::placeholder));
                    args.push(expr);
                }
            }
        }
        if args.is_empty() {
            self.write_literal(&Literal::String(format));
            return Ok(());
        }

        let mut escaped = String::new();
        for part in &interp.parts {
            match part {
                InterpPart::Text(text) => escaped.push_str(&escape_string(text).replace('%', "%%")),
                InterpPart::Expr { spec, .. } => escaped
                    .push_str(&spec.map_or_else(|| "%s".to_string(), FormatSpec::placeholder)),
            }
        }
        self.output.push_str("String.format(\"");
        self.output.push_str(&escaped);
        self.output.push('"');
        for arg in args {
            self.output.push_str(", ");
            self.write_expr(arg)?;
        }
        self.output.push(')');
        Ok(())
    }

    fn write_collection_op(&mut self, op: &CollectionOp) -> Result<(), CompileError> {
        use CollectionVerb::*;
        let kind = op.kind.ok_or_else(|| {
            CompileError::generation(
                0,
                format!("'{}' reached generation without a collection type", op.verb.phrase()),
            )
        })?;
        let operand = |i: usize| {
            op.operands.get(i).ok_or_else(|| {
                CompileError::generation(
                    0,
                    format!("'{}' is missing operand {}", op.verb.phrase(), i + 1),
                )
            })
        };
        let target = &op.target;
        let is_list = matches!(kind, ContainerKind::List | ContainerKind::LinkedList);

        match op.verb {
            Add | Append => self.call(target, "add", &[operand(0)?]),
            Insert => self.call(target, "add", &[operand(1)?, operand(0)?]),
            Remove | RemoveValue if is_list => {
                let value = operand(0)?;
                self.write_operand(target)?;
                self.output.push_str(".remove(");
                if !matches!(value, Expr::Literal(Literal::String(_))) {
                    self.output.push_str("(Object) ");
                    self.write_operand(value)?;
                } else {
                    self.write_expr(value)?;
                }
                self.output.push(')');
                Ok(())
            }
            Remove | RemoveValue | RemoveIndex => self.call(target, "remove", &[operand(0)?]),
            Get | GetAt => self.call(target, "get", &[operand(0)?]),
            Set => self.call(target, "set", &[operand(0)?, operand(1)?]),
            Put => self.call(target, "put", &[operand(0)?, operand(1)?]),
            Push => self.call(target, "push", &[operand(0)?]),
            Pop => self.call(target, "pop", &[]),
            Peek => self.call(target, "peek", &[]),
            Enqueue | Offer => self.call(target, "offer", &[operand(0)?]),
            Dequeue | Poll => self.call(target, "poll", &[]),
            Contains if kind == ContainerKind::Map => {
                self.call(target, "containsKey", &[operand(0)?])
            }
            Contains => self.call(target, "contains", &[operand(0)?]),
            Size => self.call(target, "size", &[]),
            IsEmpty => self.call(target, "isEmpty", &[]),
            First => match kind {
                ContainerKind::List => self.call(target, "get", &[&Expr::number("0")]),
                ContainerKind::TreeSet => self.call(target, "first", &[]),
                _ => self.call(target, "getFirst", &[]),
            },
            Last => match kind {
                ContainerKind::List => {
                    let index = Expr::binary(
                        Expr::call(Some(target.clone()), "size", Vec::new()),
                        BinaryOp::Sub,
                        Expr::number("1"),
                    );
                    self.call(target, "get", &[&index])
                }
                ContainerKind::TreeSet => self.call(target, "last", &[]),
                _ => self.call(target, "getLast", &[]),
            },
            IndexOf => self.call(target, "indexOf", &[operand(0)?]),
            Sort => self.utility("sort", target),
            Reverse => self.utility("reverse", target),
            Shuffle => self.utility("shuffle", target),
            Clear => self.call(target, "clear", &[]),
            Keys => self.call(target, "keySet", &[]),
            Values => {
                self.output.push_str("new ArrayList<>(");
                self.call(target, "values", &[])?;
                self.output.push(')');
                Ok(())
            }
        }
    }

    fn call(&mut self, target: &Expr, method: &str, args: &[&Expr]) -> Result<(), CompileError> {
        self.write_operand(target)?;
        self.output.push('.');
        self.output.push_str(method);
        self.write_args(args.iter().copied())
    }

    fn utility(&mut self, method: &str, target: &Expr) -> Result<(), CompileError> {
        self.output.push_str("Collections.");
        self.output.push_str(method);
        self.write_args(std::iter::once(target))
    }
}

/// Binding strength of prefix operators.
const UNARY: u8 = 7;
/// Binding strength of calls, member access and literals.
const POSTFIX: u8 = 8;

fn resolved<'t>(
    ty: Option<&'t JavaType>,
    line: usize,
    name: &str,
) -> Result<&'t JavaType, CompileError> {
    ty.ok_or_else(|| {
        CompileError::generation(line, format!("'{}' has no resolved type", name))
    })
}

/// `this` for instance fields, the owning type for static ones.
fn receiver<'f>(owner: &'f str, field: &FieldDecl) -> &'f str {
    if field.is_static { owner } else { "this" }
}

fn declares(t: &TemplateDecl, name: &str, arity: usize) -> bool {
    t.methods
        .iter()
        .chain(&t.static_methods)
        .any(|m| m.name == name && m.params.len() == arity)
}

/// Initial value for a local declared without one.
fn default_value(ty: &JavaType) -> Option<String> {
    match ty {
        JavaType::Primitive(Primitive::Boolean) => Some("false".to_string()),
        JavaType::Primitive(Primitive::Char) => Some("'\\0'".to_string()),
        JavaType::Primitive(_) => Some("0".to_string()),
        JavaType::String | JavaType::Class(_) => Some("null".to_string()),
        JavaType::Collection { .. } => ty.empty_instance(),
        JavaType::Inferred => None,
    }
}

fn is_negative(step: &Expr) -> bool {
    match step {
        Expr::Unary {
            op: UnaryOp::Neg, ..
        } => true,
        Expr::Literal(Literal::Number(n)) => n.starts_with('-'),
        _ => false,
    }
}

/// `==`/`!=` against a string literal, as (literal, other side).
fn string_comparison<'e>(
    left: &'e Expr,
    op: BinaryOp,
    right: &'e Expr,
) -> Option<(&'e Expr, &'e Expr)> {
    if !matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
        return None;
    }
    let is_string = |e: &Expr| matches!(e, Expr::Literal(Literal::String(_)));
    if is_string(right) {
        Some((right, left))
    } else if is_string(left) {
        Some((left, right))
    } else {
        None
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
