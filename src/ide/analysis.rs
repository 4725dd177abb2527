//! AnalysisHost and Analysis: file-driven state over compilations.
//!
//! The `AnalysisHost` owns all mutable state (file texts, the Salsa database,
//! the cached compilation) and hands out `Analysis` snapshots for querying.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//!
//! // Apply file changes
//! host.set_file_content("shapes.cs", "class Circle : Shape {} class Shape {}");
//!
//! // Get a snapshot for queries
//! let analysis = host.analysis();
//! assert_eq!(analysis.base_type_name("Circle").as_deref(), Some("Shape"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::base::{FileId, LineCol, LineIndex};
use crate::hir::{
    Compilation, CompilationOptions, Diagnostic, FileText, LookupOptions, RootDatabase, SymbolRef,
    TypeId, parse_file,
};
use crate::syntax::{DeclarationTable, SyntaxError};

struct FileEntry {
    id: FileId,
    input: FileText,
    line_index: LineIndex,
}

/// Owns all mutable state for the IDE layer.
///
/// Apply changes via `set_file_content()` and `remove_file()`,
/// then get a consistent snapshot via `analysis()`.
pub struct AnalysisHost {
    db: RootDatabase,
    files: HashMap<String, FileEntry>,
    next_file_id: u32,
    options: CompilationOptions,
    /// Rebuilt lazily after any file change.
    compilation: Option<Arc<Compilation>>,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    /// Create a new empty AnalysisHost.
    pub fn new() -> Self {
        Self::with_options(CompilationOptions::default())
    }

    pub fn with_options(options: CompilationOptions) -> Self {
        Self {
            db: RootDatabase::new(),
            files: HashMap::new(),
            next_file_id: 0,
            options,
            compilation: None,
        }
    }

    /// Set the content of a file. Returns its syntax errors, if any.
    ///
    /// A file that fails to parse contributes no declarations until fixed.
    pub fn set_file_content(&mut self, path: &str, content: &str) -> Vec<SyntaxError> {
        let id = match self.files.get(path) {
            Some(entry) => entry.id,
            None => {
                let id = FileId::new(self.next_file_id);
                self.next_file_id += 1;
                id
            }
        };
        let input = FileText::new(&self.db, id, content.to_string());
        let errors = parse_file(&self.db, input).errors;
        self.files.insert(
            path.to_string(),
            FileEntry {
                id,
                input,
                line_index: LineIndex::new(content),
            },
        );
        self.compilation = None;
        errors
    }

    /// Remove a file from storage.
    pub fn remove_file(&mut self, path: &str) {
        if self.files.remove(path).is_some() {
            self.compilation = None;
        }
    }

    /// Check if a file exists in storage.
    pub fn has_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Get the number of files loaded.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Get the FileId for a path, if it exists.
    pub fn get_file_id(&self, path: &str) -> Option<FileId> {
        self.files.get(path).map(|e| e.id)
    }

    /// Get a consistent snapshot for querying.
    ///
    /// The compilation is rebuilt first if any file changed since the last snapshot.
    pub fn analysis(&mut self) -> Analysis<'_> {
        let compilation = match &self.compilation {
            Some(compilation) => compilation.clone(),
            None => {
                let compilation = Arc::new(self.build_compilation());
                self.compilation = Some(compilation.clone());
                compilation
            }
        };
        Analysis {
            compilation,
            files: &self.files,
        }
    }

    fn build_compilation(&self) -> Compilation {
        let mut entries: Vec<&FileEntry> = self.files.values().collect();
        entries.sort_by_key(|e| e.id);

        let mut decls = DeclarationTable::new();
        for entry in entries {
            if let Some(unit) = parse_file(&self.db, entry.input).unit {
                decls.add_unit(entry.id, unit);
            }
        }
        tracing::debug!("[PARSE] building compilation over {} files", decls.file_count());
        Compilation::new(&decls, self.options.clone())
    }
}

/// An immutable snapshot of the analysis state.
///
/// Names are dotted paths such as `N.Outer.Inner`; generic types are found
/// by the arity of their last segment's type argument list, e.g. `List<>`
/// or `Dictionary<,>`.
pub struct Analysis<'a> {
    compilation: Arc<Compilation>,
    files: &'a HashMap<String, FileEntry>,
}

impl Analysis<'_> {
    /// The compilation behind this snapshot.
    pub fn compilation(&self) -> &Compilation {
        &self.compilation
    }

    /// Find a type by dotted name, e.g. `N.Outer.Inner` or `N.List<>`.
    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        let (path, arity) = split_arity(name);
        self.compilation.find_type(path, arity)
    }

    /// Rendered cycle-checked base type, e.g. `Shape`, `N.List<N.C>` or `?Missing`.
    pub fn base_type_name(&self, name: &str) -> Option<String> {
        let ty = self.find_type(name)?;
        self.compilation
            .base_type(ty)
            .map(|base| self.compilation.display(base))
    }

    pub fn interface_names(&self, name: &str) -> Vec<String> {
        self.find_type(name)
            .map(|ty| {
                self.compilation
                    .interfaces(ty)
                    .iter()
                    .map(|i| self.compilation.display(i))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn all_interface_names(&self, name: &str) -> Vec<String> {
        self.find_type(name)
            .map(|ty| {
                self.compilation
                    .all_interfaces(ty)
                    .iter()
                    .map(|i| self.compilation.display(i))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Qualified names of the members `member` resolves to on `type_name`.
    pub fn lookup_member_names(&self, type_name: &str, member: &str) -> Vec<String> {
        self.lookup(type_name, member, LookupOptions::default())
            .into_iter()
            .map(|s| self.compilation.display_symbol(s))
            .collect()
    }

    fn lookup(&self, type_name: &str, member: &str, options: LookupOptions) -> Vec<SymbolRef> {
        self.find_type(type_name)
            .map(|ty| self.compilation.lookup_member_with(ty, member, options))
            .unwrap_or_default()
    }

    /// All semantic diagnostics, resolving every type.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.compilation.diagnostics()
    }

    /// Semantic diagnostics located in `path`.
    pub fn file_diagnostics(&self, path: &str) -> Vec<Diagnostic> {
        let Some(file) = self.get_file_id(path) else {
            return Vec::new();
        };
        self.diagnostics()
            .into_iter()
            .filter(|d| d.file() == Some(file))
            .collect()
    }

    /// Zero-based line and column where a diagnostic starts.
    pub fn diagnostic_position(&self, diagnostic: &Diagnostic) -> Option<LineCol> {
        let location = diagnostic.location?;
        let entry = self.files.values().find(|e| e.id == location.file)?;
        Some(entry.line_index.line_col(location.range.start()))
    }

    /// Render a diagnostic message.
    pub fn message(&self, diagnostic: &Diagnostic) -> String {
        diagnostic.kind.message(self.compilation.symbols())
    }

    /// Get the FileId for a path.
    pub fn get_file_id(&self, path: &str) -> Option<FileId> {
        self.files.get(path).map(|e| e.id)
    }
}

/// `List<,>` → (`List`, 2); `List` → (`List`, 0).
fn split_arity(name: &str) -> (&str, usize) {
    match name.strip_suffix('>').and_then(|n| n.split_once('<')) {
        Some((path, commas)) => (path, commas.matches(',').count() + 1),
        None => (name, 0),
    }
}
