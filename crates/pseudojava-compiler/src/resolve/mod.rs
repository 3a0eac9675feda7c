//! Semantic resolution over a parsed [`Program`].
//!
//! Runs in place and in a fixed order: host `main` and free methods on a
//! driver, check template shapes and the inheritance graph, verify every
//! concrete template's obligations, map declared types, infer untyped
//! parameters, synthesize constructors, then walk bodies. Running it again on
//! its own output changes nothing.

pub mod bodies;
pub mod constructors;
pub mod hierarchy;
pub mod types;

use crate::error::CompileError;
use crate::ir::*;
use crate::options::CompileOptions;
use hierarchy::Hierarchy;
use std::collections::HashSet;

/// Driver name used when nothing else names one.
pub const DEFAULT_DRIVER: &str = "MainProgram";

/// Resolve `program` in place.
pub fn resolve(program: &mut Program, options: &CompileOptions) -> Result<(), CompileError> {
    host_entry(program, options)?;

    let widened = {
        let mut graph = Hierarchy::new(&program.templates)?;
        check_shapes(&program.templates)?;
        graph.check_links()?;
        for t in &program.templates {
            graph.check_complete(&t.name)?;
        }
        narrowed_overrides(&mut graph, &program.templates)
    };
    for (index, method, visibility) in widened {
        program.templates[index].methods[method].visibility = visibility;
    }

    map_member_types(&mut program.templates)?;
    infer_params(&mut program.templates)?;
    constructors::synthesize(&mut program.templates)?;
    bodies::resolve_bodies(&mut program.templates)?;

    tracing::debug!(
        templates = program.templates.len(),
        driver = program.driver.as_deref().unwrap_or("-"),
        "resolved"
    );
    Ok(())
}

/// Move `main` and top-level methods onto their host template.
fn host_entry(program: &mut Program, options: &CompileOptions) -> Result<(), CompileError> {
    if program.entry.is_none() && program.free_methods.is_empty() {
        return Ok(());
    }

    let named = options.program_name.clone().or_else(|| program.name.clone());
    let host = match named {
        Some(name) => name,
        None => match program.templates.first() {
            Some(first) if first.kind == TemplateKind::Concrete => first.name.clone(),
            _ => DEFAULT_DRIVER.to_string(),
        },
    };

    let line = program
        .entry
        .as_ref()
        .map(|m| m.line)
        .or_else(|| program.free_methods.first().map(|m| m.line))
        .unwrap_or(0);
    let index = match program.templates.iter().position(|t| t.name == host) {
        Some(i) => i,
        None => {
            let mut driver = TemplateDecl::new(host.clone(), TemplateKind::Concrete, line);
            driver.synthetic = true;
            program.templates.push(driver);
            program.templates.len() - 1
        }
    };

    let target = &mut program.templates[index];
    if target.kind != TemplateKind::Concrete {
        return Err(CompileError::declaration(
            line,
            format!("'{}' cannot hold main: it is not a concrete template", host),
        ));
    }
    for method in program.free_methods.drain(..) {
        if target
            .static_methods
            .iter()
            .any(|m| m.name == method.name && m.params.len() == method.params.len())
        {
            return Err(CompileError::declaration(
                method.line,
                format!("method '{}' is already declared in '{}'", method.name, host),
            ));
        }
        target.static_methods.push(method);
    }
    if let Some(entry) = program.entry.take() {
        if target.static_methods.iter().any(is_entry_point) {
            return Err(CompileError::declaration(
                entry.line,
                format!("'{}' already declares main", host),
            ));
        }
        target.static_methods.push(entry);
    }
    tracing::debug!(driver = %host, synthetic = target.synthetic, "hosted entry point");
    program.driver = Some(host);
    Ok(())
}

/// Methods declared with less access than the signature they implement or
/// override, as `(template, method, required)` indices.
fn narrowed_overrides(
    graph: &mut Hierarchy<'_>,
    templates: &[TemplateDecl],
) -> Vec<(usize, usize, Visibility)> {
    let mut out = Vec::new();
    for (ti, t) in templates.iter().enumerate() {
        if t.kind == TemplateKind::Interface {
            continue;
        }
        let mut required: Vec<(String, usize, Visibility)> = graph
            .obligations(&t.name)
            .iter()
            .map(|sig| (sig.name.clone(), sig.arity, sig.visibility))
            .collect();
        for ancestor in graph.ancestors(&t.name) {
            for m in &ancestor.methods {
                required.push((m.name.clone(), m.params.len(), m.visibility));
            }
        }
        for (mi, m) in t.methods.iter().enumerate() {
            let strongest = required
                .iter()
                .filter(|(name, arity, _)| *name == m.name && *arity == m.params.len())
                .map(|(_, _, vis)| *vis)
                .fold(m.visibility, |acc, vis| {
                    if acc.is_weaker_than(vis) { vis } else { acc }
                });
            if strongest != m.visibility {
                out.push((ti, mi, strongest));
            }
        }
    }
    out
}

/// Whether `method` is the program entry point.
pub fn is_entry_point(method: &MethodDecl) -> bool {
    method.is_static && method.name == "main" && method.params.is_empty()
}

fn check_shapes(templates: &[TemplateDecl]) -> Result<(), CompileError> {
    let by_name = |name: &str| templates.iter().find(|t| t.name == name);
    for t in templates {
        match t.kind {
            TemplateKind::Interface => {
                if let Some(f) = t.fields.first() {
                    return Err(CompileError::declaration(
                        f.line,
                        format!("interface '{}' cannot declare instance variable '{}'", t.name, f.name),
                    ));
                }
                if let Some(c) = t.constructors.first() {
                    return Err(CompileError::declaration(
                        c.line,
                        format!("interface '{}' cannot declare constructors", t.name),
                    ));
                }
                if let Some(m) = t.methods.first() {
                    return Err(CompileError::declaration(
                        m.line,
                        format!("interface '{}' cannot give method '{}' a body", t.name, m.name),
                    ));
                }
            }
            TemplateKind::Concrete => {
                if let Some(m) = t.abstract_methods.first() {
                    return Err(CompileError::declaration(
                        m.line,
                        format!(
                            "template '{}' declares abstract method '{}' but is not abstract",
                            t.name, m.name
                        ),
                    ));
                }
            }
            TemplateKind::Abstract => {}
        }

        for accessor in t.getters.iter().chain(&t.setters) {
            let mut owner = Some(t);
            let mut found = false;
            let mut hops = 0;
            while let Some(o) = owner {
                if o.field(&accessor.field).is_some() {
                    found = true;
                    break;
                }
                owner = o.parent.as_deref().and_then(by_name);
                hops += 1;
                if hops > templates.len() {
                    break;
                }
            }
            if !found {
                return Err(CompileError::declaration(
                    accessor.line,
                    format!(
                        "accessor for unknown field '{}' in template '{}'",
                        accessor.field, t.name
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn map_member_types(templates: &mut [TemplateDecl]) -> Result<(), CompileError> {
    let names: HashSet<String> = templates.iter().map(|t| t.name.clone()).collect();
    for t in templates.iter_mut() {
        for f in t.static_fields.iter_mut().chain(t.fields.iter_mut()) {
            let ty = types::map_type(&f.ty, &names, f.line)?;
            if let Some(default) = &f.default {
                types::check_initializer(&f.name, &ty, default, f.line)?;
            }
            f.resolved = Some(ty);
        }
        let methods = t
            .methods
            .iter_mut()
            .chain(t.static_methods.iter_mut())
            .chain(t.abstract_methods.iter_mut());
        for m in methods {
            m.return_type = m
                .returns
                .as_ref()
                .map(|r| types::map_type(r, &names, m.line))
                .transpose()?;
            for p in &mut m.params {
                if let Some(ty) = &p.ty {
                    p.resolved = Some(types::map_type(ty, &names, m.line)?);
                }
            }
        }
        for c in &mut t.constructors {
            for p in &mut c.params {
                if let Some(ty) = &p.ty {
                    p.resolved = Some(types::map_type(ty, &names, c.line)?);
                }
            }
        }
    }
    Ok(())
}

fn infer_params(templates: &mut [TemplateDecl]) -> Result<(), CompileError> {
    let visible: Vec<Vec<(String, JavaType)>> = templates
        .iter()
        .map(|t| {
            let mut fields = Vec::new();
            let mut owner = Some(t);
            let mut hops = 0;
            while let Some(o) = owner {
                for f in o.all_fields() {
                    if let Some(ty) = &f.resolved {
                        fields.push((f.name.clone(), ty.clone()));
                    }
                }
                owner = o
                    .parent
                    .as_deref()
                    .and_then(|p| templates.iter().find(|t| t.name == p));
                hops += 1;
                if hops > templates.len() {
                    break;
                }
            }
            fields
        })
        .collect();

    for (t, fields) in templates.iter_mut().zip(&visible) {
        let fields: Vec<(&str, &JavaType)> = fields.iter().map(|(n, ty)| (n.as_str(), ty)).collect();
        let fill = |params: &mut [Param], line: usize| -> Result<(), CompileError> {
            for p in params.iter_mut().filter(|p| p.resolved.is_none()) {
                p.resolved = Some(types::infer_param(&p.name, &fields, &t.name, line)?);
            }
            Ok(())
        };
        for c in &mut t.constructors {
            fill(&mut c.params, c.line)?;
        }
        for m in t
            .methods
            .iter_mut()
            .chain(t.static_methods.iter_mut())
            .chain(t.abstract_methods.iter_mut())
        {
            fill(&mut m.params, m.line)?;
        }
    }
    Ok(())
}
