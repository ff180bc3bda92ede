use std::collections::HashMap;

use oxc_span::Span;

use crate::ident::{self, Validity};
use crate::names::DeclarationPath;
use crate::types::{FileId, FunctionSig, Member, MemberKind, SymbolId, TypeRef};

// ---------------------------------------------------------------------------
// Symbol data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    Interface,
    Alias,
    Enum,
    Function,
    Variable,
    TypeParameter,
    Namespace,
}

impl SymbolKind {
    /// Whether a reference to this symbol in type position names a type.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            SymbolKind::Class
                | SymbolKind::Interface
                | SymbolKind::Alias
                | SymbolKind::Enum
                | SymbolKind::TypeParameter
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    Call,
    Construct,
}

/// One resolved source declaration.
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub name: String,
    pub kind: SymbolKind,
    pub file: FileId,
    /// Enclosing namespace, if any.
    pub parent: Option<SymbolId>,
    pub path: DeclarationPath,
    pub type_params: Vec<String>,
    /// Target of an alias declaration.
    pub aliased: Option<TypeRef>,
    /// Own members: fields, methods and signatures for classes and
    /// interfaces, overload signatures (as `Call`) for functions, the single
    /// property for variables, enum values (as properties) for enums.
    pub members: Vec<Member>,
    /// `extends` of a class first, then `implements`/interface `extends`.
    pub bases: Vec<TypeRef>,
    /// Whether `bases[0]` is a class's superclass.
    pub has_superclass: bool,
    /// Set for platform types that already exist in the target under a fixed
    /// name and never get allocated.
    pub external_name: Option<String>,
    pub span: Span,
}

impl SymbolInfo {
    pub fn new(name: impl Into<String>, kind: SymbolKind, file: FileId, path: DeclarationPath) -> Self {
        Self {
            name: name.into(),
            kind,
            file,
            parent: None,
            path,
            type_params: Vec::new(),
            aliased: None,
            members: Vec::new(),
            bases: Vec::new(),
            has_superclass: false,
            external_name: None,
            span: Span::default(),
        }
    }

    /// A platform type, e.g. `Promise` known in the target as `Future`.
    pub fn external(name: impl Into<String>, target_name: impl Into<String>) -> Self {
        let name = name.into();
        let mut info = Self::new(
            name.clone(),
            SymbolKind::Class,
            FileId::AMBIENT,
            DeclarationPath::of_type([name]),
        );
        info.external_name = Some(target_name.into());
        info
    }

    pub fn with_type_params(mut self, type_params: Vec<String>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn with_aliased(mut self, aliased: TypeRef) -> Self {
        self.aliased = Some(aliased);
        self
    }

    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    pub fn with_parent(mut self, parent: Option<SymbolId>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Whether the declared name can be spelled in the target at all,
    /// possibly escaped. Declarations without one are only kept as stubs.
    pub fn has_legal_name(&self) -> bool {
        ident::validate(&self.name, self.path.kind()) != Validity::Unusable
    }
}

// ---------------------------------------------------------------------------
// Semantic collaborator interface
// ---------------------------------------------------------------------------

/// What the engine needs to know about declarations it did not build itself.
pub trait SymbolSource {
    fn symbol(&self, id: SymbolId) -> Option<&SymbolInfo>;

    /// Property members declared directly on the symbol.
    fn properties(&self, id: SymbolId) -> Vec<&Member>;

    /// Declared base types (`extends` / `implements`).
    fn base_types(&self, id: SymbolId) -> &[TypeRef];

    /// Call or construct signatures declared directly on the symbol.
    fn signatures(&self, id: SymbolId, kind: SignatureKind) -> Vec<&FunctionSig>;

    /// Dotted name below the module, e.g. `ns.inner.Foo`.
    fn qualified_name(&self, id: SymbolId) -> String;
}

// ---------------------------------------------------------------------------
// In-memory symbol table
// ---------------------------------------------------------------------------

/// Symbol store filled by the frontend lowering. Ids are assigned in
/// registration order, which is also the emission order.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<SymbolInfo>,
    /// Path segments below the module → symbols declared there.
    by_scoped_name: HashMap<Vec<String>, Vec<SymbolId>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration, returning its id.
    pub fn register(&mut self, info: SymbolInfo) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        let key = Self::scoped_key(&info);
        self.by_scoped_name.entry(key).or_default().push(id);
        self.symbols.push(info);
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&SymbolInfo> {
        self.symbols.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut SymbolInfo> {
        self.symbols.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate all symbols in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &SymbolInfo)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, info)| (SymbolId(i as u32), info))
    }

    /// Symbols declared directly in `parent` (or at the top of `file`).
    pub fn children(&self, file: FileId, parent: Option<SymbolId>) -> Vec<SymbolId> {
        self.iter()
            .filter(|(_, info)| info.file == file && info.parent == parent)
            .map(|(id, _)| id)
            .collect()
    }

    /// Find a declaration by its module-relative scoped name, preferring
    /// `file`, then any other input file, then platform types.
    pub fn lookup(
        &self,
        scoped: &[String],
        file: FileId,
        accept: impl Fn(SymbolKind) -> bool,
    ) -> Option<SymbolId> {
        let candidates = self.by_scoped_name.get(scoped)?;
        let accept = &accept;
        let matching = move || {
            candidates
                .iter()
                .copied()
                .filter(move |id| self.get(*id).is_some_and(|info| accept(info.kind)))
        };
        matching()
            .find(|id| self.get(*id).is_some_and(|info| info.file == file))
            .or_else(|| {
                matching().find(|id| self.get(*id).is_some_and(|info| info.file != FileId::AMBIENT))
            })
            .or_else(|| matching().next())
    }

    /// Platform types use their whole path; input declarations drop the
    /// leading module segment.
    fn scoped_key(info: &SymbolInfo) -> Vec<String> {
        let segments = info.path.segments();
        if info.file == FileId::AMBIENT {
            segments.to_vec()
        } else {
            segments.iter().skip(1).cloned().collect()
        }
    }
}

impl SymbolSource for SymbolTable {
    fn symbol(&self, id: SymbolId) -> Option<&SymbolInfo> {
        self.get(id)
    }

    fn properties(&self, id: SymbolId) -> Vec<&Member> {
        self.get(id)
            .map(|info| {
                info.members
                    .iter()
                    .filter(|m| matches!(m.kind, MemberKind::Property { .. }))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn base_types(&self, id: SymbolId) -> &[TypeRef] {
        self.get(id).map(|info| info.bases.as_slice()).unwrap_or(&[])
    }

    fn signatures(&self, id: SymbolId, kind: SignatureKind) -> Vec<&FunctionSig> {
        self.get(id)
            .map(|info| {
                info.members
                    .iter()
                    .filter_map(|m| match (&m.kind, kind) {
                        (MemberKind::Call(sig), SignatureKind::Call)
                        | (MemberKind::Construct(sig), SignatureKind::Construct) => Some(sig),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn qualified_name(&self, id: SymbolId) -> String {
        match self.get(id) {
            Some(info) => Self::scoped_key(info).join("."),
            None => format!("<symbol {}>", id.0),
        }
    }
}
