use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::ident::{self, Validity};

// ---------------------------------------------------------------------------
// Declaration paths
// ---------------------------------------------------------------------------

/// Whether a flat name will denote a type or a value. Both share one
/// namespace in the target; the kind only affects which words are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Type,
    Value,
}

/// Position of one source declaration in the hierarchical namespace:
/// module, enclosing namespaces, then the declaration's own name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclarationPath {
    segments: Vec<String>,
    kind: NameKind,
}

impl DeclarationPath {
    pub fn new<I, S>(segments: I, kind: NameKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            kind,
        }
    }

    pub fn of_type<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(segments, NameKind::Type)
    }

    pub fn of_value<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(segments, NameKind::Value)
    }

    /// Path of a declaration nested directly inside this one.
    pub fn child(&self, name: impl Into<String>, kind: NameKind) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments, kind }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn kind(&self) -> NameKind {
        self.kind
    }

    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Dotted spelling, used in diagnostics and annotations.
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

// ---------------------------------------------------------------------------
// Libraries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LibraryId(pub u32);

/// Names already taken in the target's core library. Seeded into libraries
/// created with [`Library::with_prelude`] so generated declarations never
/// shadow them.
pub const PRELUDE_NAMES: &[&str] = &[
    "bool", "DateTime", "double", "dynamic", "Error", "Function", "Future", "int", "Iterable",
    "Iterator", "List", "Map", "Null", "num", "Object", "RegExp", "Set", "String", "Symbol",
    "Type",
];

/// The set of flat names allocated in one output compilation unit.
#[derive(Debug, Clone)]
pub struct Library {
    id: LibraryId,
    name: String,
    used: HashSet<String>,
}

impl Library {
    pub fn new(id: LibraryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            used: HashSet::new(),
        }
    }

    pub fn with_prelude(id: LibraryId, name: impl Into<String>) -> Self {
        let mut library = Self::new(id, name);
        library
            .used
            .extend(PRELUDE_NAMES.iter().map(|n| n.to_string()));
        library
    }

    pub fn id(&self) -> LibraryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Only the name rewriter registers names.
    fn claim(&mut self, name: &str) -> bool {
        self.used.insert(name.to_string())
    }
}

// ---------------------------------------------------------------------------
// Name allocation
// ---------------------------------------------------------------------------

/// The flat name assigned to a declaration path. Never changes once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub name: String,
    pub library: LibraryId,
}

/// Flattens declaration paths into collision-free names.
///
/// Candidates are tried shortest suffix first: the leaf, then the leaf
/// prefixed by its enclosing scope, and so on up to the full path, joined
/// with `_`. When every suffix is taken the leaf gets a counter (`A2`, `A3`,
/// ...). Results are memoized per path.
#[derive(Debug, Default)]
pub struct NameRewriter {
    records: HashMap<DeclarationPath, NameRecord>,
}

impl NameRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate (or recall) the flat name of `path` in `library`.
    pub fn allocate(&mut self, path: &DeclarationPath, library: &mut Library) -> String {
        if let Some(record) = self.records.get(path) {
            return record.name.clone();
        }

        let name = Self::first_free(path, library);
        library.claim(&name);
        debug!(path = %path.dotted(), library = library.name(), %name, "allocated name");
        self.records.insert(
            path.clone(),
            NameRecord {
                name: name.clone(),
                library: library.id(),
            },
        );
        name
    }

    /// The record created for `path`, if it was allocated.
    pub fn record(&self, path: &DeclarationPath) -> Option<&NameRecord> {
        self.records.get(path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn first_free(path: &DeclarationPath, library: &Library) -> String {
        let segments = path.segments();
        for take in 1..=segments.len() {
            let candidate = segments[segments.len() - take..].join("_");
            let candidate = match ident::validate(&candidate, path.kind()) {
                Validity::Usable => candidate,
                Validity::Escaped(escaped) => escaped,
                Validity::Unusable => continue,
            };
            if !library.contains(&candidate) {
                return candidate;
            }
        }

        let base = ident::escape(path.leaf(), path.kind())
            .unwrap_or_else(|| ident::sanitize(path.leaf()));
        std::iter::once(base.clone())
            .chain((2u32..).map(|n| format!("{base}{n}")))
            .find(|candidate| !library.contains(candidate))
            .unwrap_or(base)
    }
}
