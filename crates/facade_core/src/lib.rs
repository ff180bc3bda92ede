pub mod context;
pub mod diagnostics;
pub mod ident;
pub mod merge;
pub mod names;
pub mod overload;
pub mod params;
pub mod resolve;
pub mod source_text;
pub mod symbols;
pub mod types;

pub use context::TranslationContext;
pub use diagnostics::{Diagnostic, ReportMode, Reporter, TranslateError};
pub use merge::{CanonicalTypeKey, MergedTypeSet, TypeMerger};
pub use names::{DeclarationPath, Library, LibraryId, NameKind, NameRewriter};
pub use overload::{MemberGroup, MergedOverload, OverloadGrouper, OverloadKey};
pub use params::{MergedParameter, ParameterMerger};
pub use resolve::{ResolveOptions, ResolvedType, TypeNameResolver, UnionPolicy};
pub use symbols::{SignatureKind, SymbolInfo, SymbolKind, SymbolSource, SymbolTable};
pub use types::{FileId, FunctionSig, LiteralKind, Member, MemberKind, Param, PrimitiveKind, SymbolId, TypeRef};

/// Render `ty` as target type text.
pub fn resolve_type_name(
    ctx: &mut TranslationContext<'_>,
    ty: &TypeRef,
    options: ResolveOptions<'_>,
) -> Result<ResolvedType, TranslateError> {
    TypeNameResolver::new(ctx).resolve(ty, options)
}

/// Merge `types` into one representative, `None` when there are none.
pub fn merge_types(ctx: &mut TranslationContext<'_>, types: &[TypeRef]) -> Result<Option<TypeRef>, TranslateError> {
    let mut merger = TypeMerger::new();
    for ty in types {
        merger.merge(ctx, ty)?;
    }
    Ok(merger.to_representative())
}

/// Collapse same-keyed callable members into one.
pub fn merge_overload_group(ctx: &mut TranslationContext<'_>, group: &[Member]) -> Result<MemberGroup, TranslateError> {
    let bucket: Vec<&Member> = group.iter().collect();
    overload::merge_signatures(ctx, &bucket)
}

/// Flat, collision-free name of `path` within `library`.
pub fn allocate_name(
    ctx: &mut TranslationContext<'_>,
    path: &DeclarationPath,
    library: LibraryId,
) -> Result<String, TranslateError> {
    ctx.allocate(path, library)
}
