//! The declaration table: parsed declaration skeletons for a set of files.

use std::sync::Arc;

use crate::base::{FileId, Name};

use super::SyntaxError;
use super::ast::{NamespaceItem, SourceUnit, TypeDecl};

/// Parsed units keyed by file, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DeclarationTable {
    units: Vec<(FileId, Arc<SourceUnit>)>,
}

/// One type declaration together with where it appears.
#[derive(Debug, Clone)]
pub struct DeclaredType<'a> {
    pub file: FileId,
    /// Namespace segments, outermost first.
    pub namespace: Vec<Name>,
    /// Enclosing type declarations, outermost first.
    pub enclosing: Vec<&'a TypeDecl>,
    pub decl: &'a TypeDecl,
}

impl DeclaredType<'_> {
    /// Dotted path of the declared type, including namespaces and enclosing types.
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = self.namespace.iter().map(|n| n.as_str()).collect();
        parts.extend(self.enclosing.iter().map(|t| t.name.as_str()));
        parts.push(self.decl.name.as_str());
        parts.join(".")
    }
}

impl DeclarationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` and add it under `file`, replacing an earlier unit for the same file.
    pub fn add_source(&mut self, file: FileId, text: &str) -> Result<(), SyntaxError> {
        let unit = crate::parser::parse(text)?;
        self.add_unit(file, Arc::new(unit));
        Ok(())
    }

    pub fn add_unit(&mut self, file: FileId, unit: Arc<SourceUnit>) {
        match self.units.iter_mut().find(|(f, _)| *f == file) {
            Some(slot) => slot.1 = unit,
            None => self.units.push((file, unit)),
        }
    }

    pub fn remove(&mut self, file: FileId) {
        self.units.retain(|(f, _)| *f != file);
    }

    pub fn units(&self) -> impl Iterator<Item = (FileId, &SourceUnit)> {
        self.units.iter().map(|(f, u)| (*f, u.as_ref()))
    }

    pub fn file_count(&self) -> usize {
        self.units.len()
    }

    /// Every type declaration in every unit, depth-first in source order.
    pub fn declared_types(&self) -> Vec<DeclaredType<'_>> {
        let mut out = Vec::new();
        for (file, unit) in self.units() {
            collect_items(file, &unit.items, &mut Vec::new(), &mut out);
        }
        out
    }
}

fn collect_items<'a>(
    file: FileId,
    items: &'a [NamespaceItem],
    namespace: &mut Vec<Name>,
    out: &mut Vec<DeclaredType<'a>>,
) {
    for item in items {
        match item {
            NamespaceItem::Namespace(ns) => {
                let depth = namespace.len();
                namespace.extend(ns.path.iter().cloned());
                collect_items(file, &ns.items, namespace, out);
                namespace.truncate(depth);
            }
            NamespaceItem::Type(decl) => {
                collect_type(file, decl, namespace, &mut Vec::new(), out);
            }
        }
    }
}

fn collect_type<'a>(
    file: FileId,
    decl: &'a TypeDecl,
    namespace: &[Name],
    enclosing: &mut Vec<&'a TypeDecl>,
    out: &mut Vec<DeclaredType<'a>>,
) {
    out.push(DeclaredType {
        file,
        namespace: namespace.to_vec(),
        enclosing: enclosing.clone(),
        decl,
    });
    enclosing.push(decl);
    for nested in decl.nested_types() {
        collect_type(file, nested, namespace, enclosing, out);
    }
    enclosing.pop();
}
