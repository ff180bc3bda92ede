use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::context::TranslationContext;
use crate::diagnostics::TranslateError;
use crate::resolve::TypeNameResolver;
use crate::symbols::SymbolKind;
use crate::types::{SymbolId, TypeRef};

/// Text of a type with every annotation suppressed. Two types with the
/// same key render identically and are interchangeable in the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalTypeKey(pub String);

impl fmt::Display for CanonicalTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Distinct types in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct MergedTypeSet {
    entries: IndexMap<CanonicalTypeKey, TypeRef>,
}

impl MergedTypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless a type with the same key is present. Returns whether
    /// the set grew.
    pub fn insert(&mut self, key: CanonicalTypeKey, ty: TypeRef) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, ty);
        true
    }

    pub fn contains(&self, key: &CanonicalTypeKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CanonicalTypeKey> {
        self.entries.keys()
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeRef> {
        self.entries.values()
    }
}

/// Reduces many type expressions to one.
///
/// Unions and intersections are flattened into their members, and aliases
/// without parameters are looked through, so `type AB = A | B` merged with
/// `C` yields `{A, B, C}`.
#[derive(Debug, Clone, Default)]
pub struct TypeMerger {
    set: MergedTypeSet,
}

impl TypeMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, ctx: &mut TranslationContext<'_>, ty: &TypeRef) -> Result<(), TranslateError> {
        let ty = follow_aliases(ctx, ty);
        match ty {
            TypeRef::Union(members) | TypeRef::Intersection(members) => {
                for member in members {
                    self.merge(ctx, member)?;
                }
                Ok(())
            }
            _ => {
                let key = CanonicalTypeKey(TypeNameResolver::new(ctx).canonical_key(ty)?);
                if self.set.insert(key.clone(), ty.clone()) {
                    debug!(%key, "merged type");
                }
                Ok(())
            }
        }
    }

    pub fn set(&self) -> &MergedTypeSet {
        &self.set
    }

    pub fn into_set(self) -> MergedTypeSet {
        self.set
    }

    /// The single type standing for everything merged: nothing for an empty
    /// merge, the type itself for one, otherwise a union in first-seen order.
    pub fn to_representative(&self) -> Option<TypeRef> {
        match self.set.len() {
            0 => None,
            1 => self.set.types().next().cloned(),
            _ => Some(TypeRef::Union(self.set.types().cloned().collect())),
        }
    }
}

/// Look through aliases that take no parameters. Aliases currently being
/// expanded by the resolver, and alias chains that loop, are left in place
/// so the resolver can report them.
fn follow_aliases<'t, 's: 't>(ctx: &TranslationContext<'s>, mut ty: &'t TypeRef) -> &'t TypeRef {
    let symbols = ctx.symbols();
    let mut seen: HashSet<SymbolId> = HashSet::new();
    loop {
        let id = match ty {
            TypeRef::Alias(id) => *id,
            TypeRef::Nominal { symbol, type_args } if type_args.is_empty() => *symbol,
            _ => return ty,
        };
        let Some(info) = symbols.symbol(id) else {
            return ty;
        };
        let followable = info.kind == SymbolKind::Alias
            && info.type_params.is_empty()
            && !ctx.alias_stack.contains(&id)
            && seen.insert(id);
        match (&info.aliased, followable) {
            (Some(aliased), true) => ty = aliased,
            _ => return ty,
        }
    }
}
