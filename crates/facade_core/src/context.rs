use std::collections::HashMap;

use indexmap::IndexSet;
use oxc_span::Span;

use crate::diagnostics::{Diagnostic, ReportMode, Reporter, TranslateError};
use crate::names::{DeclarationPath, Library, LibraryId, NameRewriter};
use crate::resolve::UnionPolicy;
use crate::symbols::SymbolSource;
use crate::types::{FileId, SymbolId};

/// All mutable state of one translation run.
///
/// Owns the libraries, the name cache, the import edges and the reporter.
/// Files translated into one merged output share a library; nothing in here
/// outlives the run.
pub struct TranslationContext<'s> {
    symbols: &'s dyn SymbolSource,
    names: NameRewriter,
    libraries: Vec<Library>,
    file_libraries: HashMap<FileId, LibraryId>,
    current: Option<LibraryId>,
    /// (importing library, imported library), in first-use order.
    imports: IndexSet<(LibraryId, LibraryId)>,
    reporter: Reporter,
    position: Span,
    /// Type parameters the declaration being emitted can declare itself.
    type_scopes: Vec<Vec<String>>,
    /// Aliases currently being expanded, to stop recursive aliases.
    pub(crate) alias_stack: Vec<SymbolId>,
    union_policy: UnionPolicy,
    /// Nonzero while resolving text that is never emitted.
    detached: u32,
}

impl<'s> TranslationContext<'s> {
    pub fn new(symbols: &'s dyn SymbolSource, mode: ReportMode, union_policy: UnionPolicy) -> Self {
        Self {
            symbols,
            names: NameRewriter::new(),
            libraries: Vec::new(),
            file_libraries: HashMap::new(),
            current: None,
            imports: IndexSet::new(),
            reporter: Reporter::new(mode),
            position: Span::default(),
            type_scopes: Vec::new(),
            alias_stack: Vec::new(),
            union_policy,
            detached: 0,
        }
    }

    pub fn symbols(&self) -> &'s dyn SymbolSource {
        self.symbols
    }

    pub fn union_policy(&self) -> UnionPolicy {
        self.union_policy
    }

    // -- Libraries -----------------------------------------------------------

    /// Create a new output unit whose namespace starts with the target's
    /// core names already taken.
    pub fn add_library(&mut self, name: impl Into<String>) -> LibraryId {
        let id = LibraryId(self.libraries.len() as u32);
        self.libraries.push(Library::with_prelude(id, name));
        id
    }

    /// Declarations of `file` are allocated in `library`.
    pub fn assign_file(&mut self, file: FileId, library: LibraryId) {
        self.file_libraries.insert(file, library);
    }

    pub fn library(&self, id: LibraryId) -> Option<&Library> {
        self.libraries.get(id.0 as usize)
    }

    pub fn library_of(&self, file: FileId) -> Option<LibraryId> {
        self.file_libraries.get(&file).copied()
    }

    /// Make `library` the unit currently being emitted.
    pub fn enter_library(&mut self, library: LibraryId) {
        self.current = Some(library);
    }

    pub fn current_library(&self) -> Option<LibraryId> {
        self.current
    }

    /// Libraries the given one references, in first-use order.
    pub fn imports_of(&self, library: LibraryId) -> Vec<LibraryId> {
        self.imports
            .iter()
            .filter(|(from, _)| *from == library)
            .map(|(_, to)| *to)
            .collect()
    }

    // -- Names ---------------------------------------------------------------

    /// Allocate the flat name of `path` in `library`.
    pub fn allocate(&mut self, path: &DeclarationPath, library: LibraryId) -> Result<String, TranslateError> {
        let position = self.position;
        let Some(lib) = self.libraries.get_mut(library.0 as usize) else {
            return Err(TranslateError::structural(
                position,
                format!("no library {} for `{}`", library.0, path.dotted()),
            ));
        };
        Ok(self.names.allocate(path, lib))
    }

    /// The target name of a declared symbol, allocated on first use in the
    /// library owning the symbol's file. Referencing a symbol of another
    /// library records an import edge. `None` when the symbol has no legal
    /// name in the target.
    pub fn name_for_symbol(&mut self, id: SymbolId) -> Result<Option<String>, TranslateError> {
        let symbols = self.symbols;
        let Some(info) = symbols.symbol(id) else {
            return Ok(None);
        };
        if let Some(external) = &info.external_name {
            return Ok(Some(external.clone()));
        }
        let Some(library) = self.library_of(info.file) else {
            return Err(TranslateError::structural(
                info.span,
                format!("`{}` belongs to a file outside this run", info.path.dotted()),
            ));
        };
        if !info.has_legal_name() {
            return Ok(None);
        }
        if self.detached == 0
            && let Some(current) = self.current.filter(|c| *c != library)
        {
            self.imports.insert((current, library));
        }
        self.allocate(&info.path, library).map(Some)
    }

    /// Run `f` for text that only decides something (a dedup key, whether a
    /// member is concrete) and is never written out. References made inside
    /// record no imports.
    pub fn detached<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.detached += 1;
        let result = f(self);
        self.detached -= 1;
        result
    }

    // -- Diagnostics -----------------------------------------------------------

    /// Set the source position subsequent diagnostics are keyed by.
    pub fn at(&mut self, span: Span) {
        self.position = span;
    }

    pub fn position(&self) -> Span {
        self.position
    }

    pub fn report(&mut self, diagnostic: Diagnostic) -> Result<(), TranslateError> {
        self.reporter.report(diagnostic)
    }

    pub fn report_unsupported(&mut self, reason: impl Into<String>) -> Result<(), TranslateError> {
        let diagnostic = Diagnostic::unsupported(self.position, reason);
        self.reporter.report(diagnostic)
    }

    pub fn report_unresolved(&mut self, name: impl Into<String>) -> Result<(), TranslateError> {
        let diagnostic = Diagnostic::unresolved(self.position, name);
        self.reporter.report(diagnostic)
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Drain collected diagnostics (sorted by position).
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.reporter.take()
    }

    // -- Type parameter scopes ---------------------------------------------------

    pub fn push_type_params(&mut self, names: &[String]) {
        self.type_scopes.push(names.to_vec());
    }

    pub fn pop_type_params(&mut self) {
        self.type_scopes.pop();
    }

    pub fn type_param_in_scope(&self, name: &str) -> bool {
        self.type_scopes
            .iter()
            .any(|scope| scope.iter().any(|n| n == name))
    }
}
