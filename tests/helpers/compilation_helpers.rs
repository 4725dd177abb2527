//! Helpers for building compilations from source and querying them by name.

use typegraph::base::FileId;
use typegraph::hir::{Compilation, CompilationOptions, TypeId};
use typegraph::syntax::DeclarationTable;

/// Builds a compilation over a single source file.
pub fn compile(source: &str) -> Compilation {
    compile_with(source, CompilationOptions::default())
}

/// Builds a compilation over a single source file with custom options.
pub fn compile_with(source: &str, options: CompilationOptions) -> Compilation {
    compile_files_with(&[source], options)
}

/// Builds a compilation over several files, numbered in order.
pub fn compile_files(sources: &[&str]) -> Compilation {
    compile_files_with(sources, CompilationOptions::default())
}

pub fn compile_files_with(sources: &[&str], options: CompilationOptions) -> Compilation {
    let mut decls = DeclarationTable::new();
    for (index, source) in sources.iter().enumerate() {
        if let Err(err) = decls.add_source(FileId::new(index as u32), source) {
            panic!("parse error in file {index}: {err}\n{source}");
        }
    }
    Compilation::new(&decls, options)
}

/// Looks a type up by dotted name; `List<>` / `Map<,>` select generic arity.
pub fn type_id(compilation: &Compilation, name: &str) -> TypeId {
    let (path, arity) = match name.strip_suffix('>').and_then(|n| n.split_once('<')) {
        Some((path, commas)) => (path, commas.matches(',').count() + 1),
        None => (name, 0),
    };
    compilation
        .find_type(path, arity)
        .unwrap_or_else(|| panic!("type '{name}' not declared"))
}

/// Rendered cycle-checked base of `name`.
pub fn base_name(compilation: &Compilation, name: &str) -> Option<String> {
    let ty = type_id(compilation, name);
    compilation.base_type(ty).map(|b| compilation.display(b))
}

/// Rendered cycle-checked interface list of `name`.
pub fn interface_names(compilation: &Compilation, name: &str) -> Vec<String> {
    let ty = type_id(compilation, name);
    compilation
        .interfaces(ty)
        .iter()
        .map(|i| compilation.display(i))
        .collect()
}

pub fn all_interface_names(compilation: &Compilation, name: &str) -> Vec<String> {
    let ty = type_id(compilation, name);
    compilation
        .all_interfaces(ty)
        .iter()
        .map(|i| compilation.display(i))
        .collect()
}

/// Qualified names of the members `member` finds on `name`.
pub fn member_names(compilation: &Compilation, name: &str, member: &str) -> Vec<String> {
    let ty = type_id(compilation, name);
    compilation
        .lookup_member(ty, member)
        .into_iter()
        .map(|s| compilation.display_symbol(s))
        .collect()
}
