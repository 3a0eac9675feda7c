//! Inheritance and capability graph.
//!
//! Links are checked once, cycles rejected, and each template's obligation
//! set (every abstract signature reachable through parents and capabilities)
//! is computed once and memoized.

use crate::error::CompileError;
use crate::ir::*;
use std::collections::HashMap;
use std::rc::Rc;

/// An abstract method signature, matched by name and arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub arity: usize,
    /// Template that declared it.
    pub origin: String,
    /// Least access an implementation may declare.
    pub visibility: Visibility,
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// Name-indexed view over the templates of one program.
pub struct Hierarchy<'a> {
    templates: &'a [TemplateDecl],
    index: HashMap<&'a str, usize>,
    obligations: HashMap<usize, Rc<Vec<Signature>>>,
}

impl<'a> Hierarchy<'a> {
    /// Index `templates`, rejecting duplicate names.
    pub fn new(templates: &'a [TemplateDecl]) -> Result<Self, CompileError> {
        let mut index = HashMap::new();
        for (i, t) in templates.iter().enumerate() {
            if index.insert(t.name.as_str(), i).is_some() {
                return Err(CompileError::declaration(
                    t.line,
                    format!("template '{}' is declared more than once", t.name),
                ));
            }
        }
        Ok(Self {
            templates,
            index,
            obligations: HashMap::new(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&'a TemplateDecl> {
        self.index.get(name).map(|&i| &self.templates[i])
    }

    /// Check that every parent and capability exists and has the right kind,
    /// and that the graph is acyclic.
    pub fn check_links(&self) -> Result<(), CompileError> {
        for t in self.templates {
            if let Some(parent) = &t.parent {
                let target = self.lookup(parent, t)?;
                if target.kind == TemplateKind::Interface {
                    return Err(CompileError::resolution(
                        t.line,
                        format!(
                            "template '{}' cannot extend interface '{}'; use implements",
                            t.name, parent
                        ),
                    ));
                }
            }
            for cap in &t.capabilities {
                let target = self.lookup(cap, t)?;
                if target.kind != TemplateKind::Interface {
                    return Err(CompileError::resolution(
                        t.line,
                        format!(
                            "template '{}' can only implement interfaces, but '{}' is not one",
                            t.name, cap
                        ),
                    ));
                }
            }
        }

        let mut state = vec![Visit::New; self.templates.len()];
        let mut path = Vec::new();
        for i in 0..self.templates.len() {
            self.visit(i, &mut state, &mut path)?;
        }
        Ok(())
    }

    fn lookup(&self, name: &str, from: &TemplateDecl) -> Result<&'a TemplateDecl, CompileError> {
        self.get(name).ok_or_else(|| {
            CompileError::resolution(
                from.line,
                format!(
                    "template '{}' refers to undeclared template '{}'",
                    from.name, name
                ),
            )
        })
    }

    fn edges(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        let t = &self.templates[i];
        t.parent
            .iter()
            .chain(t.capabilities.iter())
            .filter_map(|name| self.index.get(name.as_str()).copied())
    }

    fn visit(
        &self,
        i: usize,
        state: &mut [Visit],
        path: &mut Vec<usize>,
    ) -> Result<(), CompileError> {
        match state[i] {
            Visit::Done => return Ok(()),
            Visit::Active => {
                let start = path.iter().position(|&p| p == i).unwrap_or(0);
                let mut names: Vec<&str> = path[start..]
                    .iter()
                    .map(|&p| self.templates[p].name.as_str())
                    .collect();
                names.push(&self.templates[i].name);
                return Err(CompileError::resolution(
                    self.templates[i].line,
                    format!("inheritance cycle: {}", names.join(" -> ")),
                ));
            }
            Visit::New => {}
        }
        state[i] = Visit::Active;
        path.push(i);
        for next in self.edges(i).collect::<Vec<_>>() {
            self.visit(next, state, path)?;
        }
        path.pop();
        state[i] = Visit::Done;
        Ok(())
    }

    /// Parent chain of `name`, nearest first. Requires an acyclic graph.
    pub fn ancestors(&self, name: &str) -> Vec<&'a TemplateDecl> {
        let mut out = Vec::new();
        let mut current = self.get(name).and_then(|t| t.parent.as_deref());
        while let Some(parent) = current {
            let Some(t) = self.get(parent) else { break };
            out.push(t);
            current = t.parent.as_deref();
        }
        out
    }

    /// Every abstract signature reachable from `name`.
    pub fn obligations(&mut self, name: &str) -> Rc<Vec<Signature>> {
        let Some(&i) = self.index.get(name) else {
            return Rc::new(Vec::new());
        };
        if let Some(cached) = self.obligations.get(&i) {
            return Rc::clone(cached);
        }

        let t = &self.templates[i];
        let mut set: Vec<Signature> = Vec::new();
        let mut add = |sig: Signature| {
            match set
                .iter_mut()
                .find(|s| s.name == sig.name && s.arity == sig.arity)
            {
                Some(existing) => {
                    if existing.visibility.is_weaker_than(sig.visibility) {
                        existing.visibility = sig.visibility;
                    }
                }
                None => set.push(sig),
            }
        };
        for m in &t.abstract_methods {
            add(Signature {
                name: m.name.clone(),
                arity: m.params.len(),
                origin: t.name.clone(),
                visibility: if t.kind == TemplateKind::Interface {
                    Visibility::Public
                } else {
                    m.visibility
                },
            });
        }
        let linked: Vec<&str> = t
            .parent
            .iter()
            .chain(t.capabilities.iter())
            .map(String::as_str)
            .collect();
        for other in linked {
            for sig in self.obligations(other).iter() {
                add(sig.clone());
            }
        }

        let set = Rc::new(set);
        self.obligations.insert(i, Rc::clone(&set));
        set
    }

    /// Verify that a concrete template implements its whole obligation set,
    /// counting inherited concrete methods and synthesized accessors.
    pub fn check_complete(&mut self, name: &str) -> Result<(), CompileError> {
        let Some(t) = self.get(name) else {
            return Ok(());
        };
        if t.kind != TemplateKind::Concrete {
            return Ok(());
        }

        let mut available: Vec<(String, usize)> = Vec::new();
        for owner in std::iter::once(t).chain(self.ancestors(name)) {
            for m in &owner.methods {
                available.push((m.name.clone(), m.params.len()));
            }
            for g in &owner.getters {
                available.push((accessor_name("get", &g.field), 0));
            }
            for s in &owner.setters {
                available.push((accessor_name("set", &s.field), 1));
            }
        }

        let obligations = self.obligations(name);
        for sig in obligations.iter() {
            if !available
                .iter()
                .any(|(n, arity)| *n == sig.name && *arity == sig.arity)
            {
                return Err(CompileError::incomplete(
                    t.line,
                    format!(
                        "template '{}' does not implement '{}' required by '{}'",
                        t.name, sig, sig.origin
                    ),
                ));
            }
        }
        tracing::trace!(template = %t.name, obligations = obligations.len(), "implementation complete");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

/// `get` + `studentId` gives `getStudentId`.
pub fn accessor_name(prefix: &str, field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", prefix, first.to_uppercase(), chars.as_str()),
        None => prefix.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str, kind: TemplateKind, parent: Option<&str>, caps: &[&str]) -> TemplateDecl {
        let mut t = TemplateDecl::new(name, kind, 1);
        t.parent = parent.map(String::from);
        t.capabilities = caps.iter().map(|c| c.to_string()).collect();
        t
    }

    fn method(name: &str, arity: usize, is_abstract: bool) -> MethodDecl {
        MethodDecl {
            name: name.into(),
            params: (0..arity).map(|i| Param::untyped(format!("p{}", i))).collect(),
            returns: None,
            return_type: None,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract,
            body: Vec::new(),
            line: 1,
        }
    }

    #[test]
    fn test_accessor_name() {
        assert_eq!(accessor_name("get", "studentId"), "getStudentId");
        assert_eq!(accessor_name("set", "name"), "setName");
    }

    #[test]
    fn test_undeclared_and_wrong_kind_links() {
        let ts = vec![template("A", TemplateKind::Concrete, Some("Missing"), &[])];
        let err = Hierarchy::new(&ts).unwrap().check_links().unwrap_err();
        assert!(matches!(err, CompileError::Resolution { .. }));

        let ts = vec![
            template("I", TemplateKind::Interface, None, &[]),
            template("A", TemplateKind::Concrete, Some("I"), &[]),
        ];
        assert!(Hierarchy::new(&ts).unwrap().check_links().is_err());

        let ts = vec![
            template("B", TemplateKind::Concrete, None, &[]),
            template("A", TemplateKind::Concrete, None, &["B"]),
        ];
        assert!(Hierarchy::new(&ts).unwrap().check_links().is_err());
    }

    #[test]
    fn test_cycle_detected() {
        let ts = vec![
            template("A", TemplateKind::Concrete, Some("B"), &[]),
            template("B", TemplateKind::Concrete, Some("A"), &[]),
        ];
        let err = Hierarchy::new(&ts).unwrap().check_links().unwrap_err();
        assert!(err.message().contains("A -> B -> A"));
    }

    #[test]
    fn test_duplicate_names() {
        let ts = vec![
            template("A", TemplateKind::Concrete, None, &[]),
            template("A", TemplateKind::Concrete, None, &[]),
        ];
        assert!(matches!(
            Hierarchy::new(&ts),
            Err(CompileError::Declaration { .. })
        ));
    }

    #[test]
    fn test_obligations_through_parents_and_capabilities() {
        let mut speak = template("Speaker", TemplateKind::Interface, None, &[]);
        speak.abstract_methods.push(method("speak", 0, true));
        let mut animal = template("Animal", TemplateKind::Abstract, None, &["Speaker"]);
        animal.abstract_methods.push(method("move", 1, true));
        let mut dog = template("Dog", TemplateKind::Concrete, Some("Animal"), &[]);
        dog.methods.push(method("speak", 0, false));
        let ts = vec![speak, animal, dog];

        let mut h = Hierarchy::new(&ts).unwrap();
        h.check_links().unwrap();
        assert_eq!(h.obligations("Dog").len(), 2);
        let err = h.check_complete("Dog").unwrap_err();
        assert!(matches!(err, CompileError::IncompleteImplementation { .. }));
        assert!(err.message().contains("move/1"));
    }

    #[test]
    fn test_obligation_access() {
        let mut speak = template("Speaker", TemplateKind::Interface, None, &[]);
        let mut quiet = method("speak", 0, true);
        quiet.visibility = Visibility::Package;
        speak.abstract_methods.push(quiet);
        let mut animal = template("Animal", TemplateKind::Abstract, None, &["Speaker"]);
        let mut walk = method("walk", 0, true);
        walk.visibility = Visibility::Protected;
        animal.abstract_methods.push(walk);
        let ts = vec![speak, animal];

        let mut h = Hierarchy::new(&ts).unwrap();
        let required = h.obligations("Animal");
        let access = |name: &str| {
            required
                .iter()
                .find(|s| s.name == name)
                .map(|s| s.visibility)
        };
        assert_eq!(access("speak"), Some(Visibility::Public));
        assert_eq!(access("walk"), Some(Visibility::Protected));
    }

    #[test]
    fn test_inherited_implementation_and_accessors_satisfy() {
        let mut named = template("Named", TemplateKind::Interface, None, &[]);
        named.abstract_methods.push(method("getName", 0, true));
        let mut base = template("Base", TemplateKind::Abstract, None, &["Named"]);
        base.getters.push(Accessor {
            field: "name".into(),
            visibility: Visibility::Public,
            line: 1,
        });
        let leaf = template("Leaf", TemplateKind::Concrete, Some("Base"), &[]);
        let ts = vec![named, base, leaf];
        let mut h = Hierarchy::new(&ts).unwrap();
        assert!(h.check_complete("Leaf").is_ok());
    }
}
