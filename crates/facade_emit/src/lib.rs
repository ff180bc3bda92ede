//! Synthesized target declarations.
//!
//! The declaration visitor never edits source nodes; it appends fresh
//! [`OutputDecl`]s to an [`OutputArena`], linking children to parents by
//! index. Rendering walks the arena and produces plain lines.

use std::fmt::Write as _;

/// Index of a declaration in its [`OutputArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// One output compilation unit. Its header is the library directive.
    Library,
    Import,
    /// A body-carrying type declaration (class, enum facade).
    Class,
    /// Member of a class: field, accessor, method, constructor, operator.
    Member,
    /// Top-level function or variable accessor.
    Function,
    /// A declaration with no legal rendering, emitted fully commented out.
    Stub,
}

/// One synthesized declaration.
#[derive(Debug, Clone)]
pub struct OutputDecl {
    pub kind: DeclKind,
    /// Metadata lines placed above the header, e.g. `@JS()`.
    pub metadata: Vec<String>,
    /// The declaration itself, complete up to (not including) a body.
    pub header: String,
    /// Documentation lines, written as `///` comments.
    pub docs: Vec<String>,
    pub parent: Option<DeclId>,
    pub children: Vec<DeclId>,
}

impl OutputDecl {
    pub fn new(kind: DeclKind, header: impl Into<String>) -> Self {
        Self {
            kind,
            metadata: Vec::new(),
            header: header.into(),
            docs: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, line: impl Into<String>) -> Self {
        self.metadata.push(line.into());
        self
    }

    pub fn with_docs(mut self, docs: impl IntoIterator<Item = String>) -> Self {
        self.docs.extend(docs);
        self
    }
}

/// Append-only store of output declarations.
#[derive(Debug, Default)]
pub struct OutputArena {
    decls: Vec<OutputDecl>,
}

const INDENT: &str = "  ";

impl OutputArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `decl` under `parent` (or as a root) and return its id.
    pub fn add(&mut self, mut decl: OutputDecl, parent: Option<DeclId>) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        decl.parent = parent;
        self.decls.push(decl);
        if let Some(parent) = parent.and_then(|p| self.decls.get_mut(p.0 as usize)) {
            parent.children.push(id);
        }
        id
    }

    /// Like [`add`](Self::add), but placed at `index` among the parent's
    /// children (or last when `index` is past the end).
    pub fn add_at(&mut self, decl: OutputDecl, parent: DeclId, index: usize) -> DeclId {
        let id = self.add(decl, Some(parent));
        if let Some(parent) = self.decls.get_mut(parent.0 as usize) {
            parent.children.pop();
            let index = index.min(parent.children.len());
            parent.children.insert(index, id);
        }
        id
    }

    pub fn get(&self, id: DeclId) -> Option<&OutputDecl> {
        self.decls.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut OutputDecl> {
        self.decls.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Declarations without a parent, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.decls
            .iter()
            .enumerate()
            .filter(|(_, decl)| decl.parent.is_none())
            .map(|(i, _)| DeclId(i as u32))
    }

    pub fn children(&self, id: DeclId) -> &[DeclId] {
        self.get(id).map(|decl| decl.children.as_slice()).unwrap_or(&[])
    }

    /// Render `root` and everything below it.
    pub fn render(&self, root: DeclId) -> String {
        let mut out = String::new();
        self.render_into(&mut out, root, 0);
        out
    }

    fn render_into(&self, out: &mut String, id: DeclId, depth: usize) {
        let Some(decl) = self.get(id) else {
            return;
        };
        let pad = INDENT.repeat(depth);

        if decl.kind == DeclKind::Stub {
            for doc in &decl.docs {
                let _ = writeln!(out, "{pad}/// {doc}");
            }
            for line in decl.metadata.iter().chain(std::iter::once(&decl.header)) {
                let _ = writeln!(out, "{pad}// {line}");
            }
            return;
        }

        for doc in &decl.docs {
            let _ = writeln!(out, "{pad}/// {doc}");
        }
        for line in &decl.metadata {
            let _ = writeln!(out, "{pad}{line}");
        }

        match decl.kind {
            DeclKind::Library => {
                let _ = writeln!(out, "{pad}{}", decl.header);
                let mut previous = None;
                for child in &decl.children {
                    let kind = self.get(*child).map(|c| c.kind);
                    // Imports form one block; every other declaration is
                    // separated by a blank line.
                    if !(previous == Some(DeclKind::Import) && kind == Some(DeclKind::Import)) {
                        out.push('\n');
                    }
                    self.render_into(out, *child, depth);
                    previous = kind;
                }
            }
            DeclKind::Class => {
                let _ = writeln!(out, "{pad}{} {{", decl.header);
                for child in &decl.children {
                    self.render_into(out, *child, depth + 1);
                }
                let _ = writeln!(out, "{pad}}}");
            }
            DeclKind::Import | DeclKind::Member | DeclKind::Function => {
                let _ = writeln!(out, "{pad}{}", decl.header);
                for child in &decl.children {
                    self.render_into(out, *child, depth + 1);
                }
            }
            DeclKind::Stub => {}
        }
    }
}
