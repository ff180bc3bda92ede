use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::context::TranslationContext;
use crate::diagnostics::TranslateError;
use crate::merge::TypeMerger;
use crate::source_text::{function_type_text, type_text};
use crate::symbols::{SymbolInfo, SymbolKind};
use crate::types::{FunctionSig, LiteralKind, Member, MemberKind, Param, PrimitiveKind, SymbolId, TypeRef};

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

/// How a union with several concretely-renderable members is displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnionPolicy {
    /// Fall back to the untyped type.
    #[default]
    Opaque,
    /// Show the first concrete member in source order.
    FirstConcrete,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'o> {
    /// The result will itself be placed inside a comment.
    pub inside_comment: bool,
    /// The result is an argument of a generic type.
    pub inside_type_argument: bool,
    /// Drop this node's own annotation (nested ones are kept).
    pub hide_comment: bool,
    /// Arguments supplied at the reference site of an [`TypeRef::Alias`].
    pub type_arguments: Option<&'o [TypeRef]>,
    /// Concrete bindings for type parameters.
    pub resolved_type_arguments: Option<&'o HashMap<String, TypeRef>>,
    /// Overrides the run's union policy.
    pub policy: Option<UnionPolicy>,
}

impl<'o> ResolveOptions<'o> {
    /// Options for the key used to deduplicate types: text only.
    pub fn canonical() -> Self {
        Self {
            inside_comment: true,
            hide_comment: true,
            ..Self::default()
        }
    }

    /// Options for a child node: comment context and bindings carry over,
    /// everything else resets.
    fn nested(self) -> Self {
        Self {
            inside_comment: self.inside_comment,
            resolved_type_arguments: self.resolved_type_arguments,
            policy: self.policy,
            ..Self::default()
        }
    }

    fn type_argument(self) -> Self {
        Self {
            inside_type_argument: true,
            ..self.nested()
        }
    }

    fn annotations_visible(&self) -> bool {
        !self.inside_comment && !self.hide_comment
    }
}

/// Target text of a type plus what the text could not express.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub text: String,
    pub annotation: Option<String>,
}

impl ResolvedType {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            annotation: None,
        }
    }

    /// Whether the text names an actual type rather than the untyped or
    /// absent one.
    pub fn is_concrete(&self) -> bool {
        !matches!(self.text.as_str(), UNTYPED | ABSENT | NULL)
    }

    /// Text followed by its annotation as an inline block comment.
    pub fn render(&self) -> String {
        match &self.annotation {
            Some(annotation) => format!("{} /*{}*/", self.text, annotation),
            None => self.text.clone(),
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

pub const UNTYPED: &str = "dynamic";
pub const ABSENT: &str = "void";
pub const NULL: &str = "Null";
pub const FUNCTION: &str = "Function";

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Renders source type expressions as target type text.
pub struct TypeNameResolver<'c, 's> {
    ctx: &'c mut TranslationContext<'s>,
}

impl<'c, 's> TypeNameResolver<'c, 's> {
    pub fn new(ctx: &'c mut TranslationContext<'s>) -> Self {
        Self { ctx }
    }

    /// Dedup key of `ty`: its text with every annotation suppressed.
    pub fn canonical_key(&mut self, ty: &TypeRef) -> Result<String, TranslateError> {
        let resolved = self
            .ctx
            .detached(|ctx| TypeNameResolver::new(ctx).resolve(ty, ResolveOptions::canonical()))?;
        Ok(resolved.text)
    }

    pub fn resolve(&mut self, ty: &TypeRef, options: ResolveOptions<'_>) -> Result<ResolvedType, TranslateError> {
        trace!(ty = %type_text(ty, self.ctx.symbols()), "resolve");
        match ty {
            TypeRef::Primitive(kind) => Ok(self.resolve_primitive(*kind, options)),
            TypeRef::Nominal { symbol, type_args } => self.resolve_symbol(*symbol, type_args, options),
            TypeRef::Alias(symbol) => {
                let args = options.type_arguments.unwrap_or(&[]);
                self.resolve_symbol(*symbol, args, options)
            }
            TypeRef::Function(sig) => self.resolve_function(sig, options),
            TypeRef::Array(elem) => {
                let elem = self.representative(std::slice::from_ref(elem.as_ref()))?;
                let elem = self.resolve(&elem, options.type_argument())?;
                Ok(ResolvedType::plain(format!("List<{}>", elem.render())))
            }
            TypeRef::Tuple(elems) => {
                let elem = self.representative(elems)?;
                // The tuple's own annotation already lists every position.
                let elem_options = ResolveOptions {
                    hide_comment: true,
                    ..options.type_argument()
                };
                let elem = self.resolve(&elem, elem_options)?;
                let annotation = type_text(ty, self.ctx.symbols());
                Ok(annotate(format!("List<{}>", elem.render()), Some(annotation), options))
            }
            TypeRef::Structural(members) => self.resolve_structural(ty, members, options),
            TypeRef::TypeParam(name) => {
                if let Some(bound) = options.resolved_type_arguments.and_then(|m| m.get(name)) {
                    return self.resolve(bound, options);
                }
                if self.ctx.type_param_in_scope(name) {
                    Ok(ResolvedType::plain(name.clone()))
                } else {
                    Ok(annotate(UNTYPED, Some(name.clone()), options))
                }
            }
            TypeRef::Literal { kind, text } => {
                let base = match kind {
                    LiteralKind::String | LiteralKind::Template => "String",
                    LiteralKind::Number => "num",
                    LiteralKind::Boolean => "bool",
                    LiteralKind::BigInt => UNTYPED,
                };
                Ok(annotate(base, Some(text.clone()), options))
            }
            TypeRef::Union(members) | TypeRef::Intersection(members) => {
                self.resolve_union(ty, members, options)
            }
            TypeRef::Unresolved(text) => Ok(annotate(UNTYPED, Some(text.clone()), options)),
        }
    }

    fn resolve_primitive(&mut self, kind: PrimitiveKind, options: ResolveOptions<'_>) -> ResolvedType {
        let text = match kind {
            PrimitiveKind::Number => "num",
            PrimitiveKind::String => "String",
            PrimitiveKind::Boolean => "bool",
            PrimitiveKind::Null => NULL,
            PrimitiveKind::Void | PrimitiveKind::Undefined | PrimitiveKind::Never => {
                if options.inside_type_argument {
                    NULL
                } else {
                    ABSENT
                }
            }
            PrimitiveKind::Any | PrimitiveKind::Unknown => UNTYPED,
            PrimitiveKind::Object => "Object",
            PrimitiveKind::Symbol | PrimitiveKind::BigInt => {
                return annotate(UNTYPED, Some(kind.keyword().to_string()), options);
            }
        };
        ResolvedType::plain(text)
    }

    // -- Declared types ------------------------------------------------------

    fn resolve_symbol(
        &mut self,
        id: SymbolId,
        args: &[TypeRef],
        options: ResolveOptions<'_>,
    ) -> Result<ResolvedType, TranslateError> {
        let symbols = self.ctx.symbols();
        let Some(info) = symbols.symbol(id) else {
            let name = symbols.qualified_name(id);
            self.ctx.report_unresolved(name.clone())?;
            return Ok(annotate(UNTYPED, Some(name), options));
        };

        match info.kind {
            SymbolKind::Alias => self.resolve_alias(id, info, args, options),
            SymbolKind::Class | SymbolKind::Interface | SymbolKind::Enum => {
                let Some(name) = self.ctx.name_for_symbol(id)? else {
                    return Ok(annotate(UNTYPED, Some(info.name.clone()), options));
                };
                // `Promise<void>` carries no information in its argument.
                if args.is_empty() || (args.len() == 1 && args[0].is_absent()) {
                    return Ok(ResolvedType::plain(name));
                }
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.resolve(arg, options.type_argument())?.render());
                }
                Ok(ResolvedType::plain(format!("{}<{}>", name, rendered.join(", "))))
            }
            SymbolKind::Function
            | SymbolKind::Variable
            | SymbolKind::TypeParameter
            | SymbolKind::Namespace => {
                let name = symbols.qualified_name(id);
                self.ctx.report_unsupported(format!("`{name}` does not name a type"))?;
                Ok(annotate(UNTYPED, Some(name), options))
            }
        }
    }

    /// Aliases do not exist in the target: the aliased type is rendered
    /// in place, with the alias's parameters replaced by the arguments.
    fn resolve_alias(
        &mut self,
        id: SymbolId,
        info: &SymbolInfo,
        args: &[TypeRef],
        options: ResolveOptions<'_>,
    ) -> Result<ResolvedType, TranslateError> {
        let Some(aliased) = &info.aliased else {
            return Ok(annotate(UNTYPED, Some(info.name.clone()), options));
        };
        if self.ctx.alias_stack.contains(&id) {
            self.ctx
                .report_unsupported(format!("recursive type alias `{}`", info.name))?;
            return Ok(annotate(UNTYPED, Some(info.name.clone()), options));
        }

        let body = if info.type_params.is_empty() {
            aliased.clone()
        } else {
            let bindings: HashMap<String, TypeRef> = info
                .type_params
                .iter()
                .enumerate()
                .map(|(i, param)| (param.clone(), args.get(i).cloned().unwrap_or_else(TypeRef::any)))
                .collect();
            substitute(aliased, &bindings)
        };

        self.ctx.alias_stack.push(id);
        let result = self.resolve(
            &body,
            ResolveOptions {
                type_arguments: None,
                ..options
            },
        );
        self.ctx.alias_stack.pop();
        result
    }

    // -- Functions and shapes ------------------------------------------------

    fn resolve_function(&mut self, sig: &FunctionSig, options: ResolveOptions<'_>) -> Result<ResolvedType, TranslateError> {
        if sig.has_variadic() {
            let annotation = function_type_text(sig, self.ctx.symbols());
            return Ok(annotate(FUNCTION, Some(annotation), options));
        }

        self.ctx.push_type_params(&sig.type_params);
        let result = self.render_function(sig, options.nested());
        self.ctx.pop_type_params();
        result.map(ResolvedType::plain)
    }

    /// `R Function<T>(A, [B])`
    fn render_function(&mut self, sig: &FunctionSig, nested: ResolveOptions<'_>) -> Result<String, TranslateError> {
        let ret = self.resolve(&sig.return_type, nested)?.render();
        let mut required = Vec::new();
        let mut optional = Vec::new();
        for param in &sig.params {
            let rendered = self.resolve(&param.ty, nested)?.render();
            if param.optional || !optional.is_empty() {
                optional.push(rendered);
            } else {
                required.push(rendered);
            }
        }
        let mut params = required.join(", ");
        if !optional.is_empty() {
            if !params.is_empty() {
                params.push_str(", ");
            }
            params.push('[');
            params.push_str(&optional.join(", "));
            params.push(']');
        }
        let generics = if sig.type_params.is_empty() {
            String::new()
        } else {
            format!("<{}>", sig.type_params.join(", "))
        };
        Ok(format!("{ret} {FUNCTION}{generics}({params})"))
    }

    fn resolve_structural(
        &mut self,
        ty: &TypeRef,
        members: &[Member],
        options: ResolveOptions<'_>,
    ) -> Result<ResolvedType, TranslateError> {
        if let [member] = members
            && let MemberKind::Call(sig) = &member.kind
        {
            return self.resolve_function(sig, options);
        }
        // Index-only shapes and everything else keep the literal as written.
        Ok(annotate(UNTYPED, Some(type_text(ty, self.ctx.symbols())), options))
    }

    // -- Unions ----------------------------------------------------------------

    fn resolve_union(
        &mut self,
        ty: &TypeRef,
        members: &[TypeRef],
        options: ResolveOptions<'_>,
    ) -> Result<ResolvedType, TranslateError> {
        let mut merger = TypeMerger::new();
        for member in members {
            merger.merge(self.ctx, member)?;
        }

        let display = ResolveOptions {
            hide_comment: true,
            type_arguments: None,
            ..options
        };
        let mut candidates = Vec::new();
        for member in merger.set().types() {
            let resolved = self
                .ctx
                .detached(|ctx| TypeNameResolver::new(ctx).resolve(member, display))?;
            if resolved.is_concrete() {
                candidates.push(member);
            }
        }

        // Only the displayed member is referenced by the output.
        let policy = options.policy.unwrap_or(self.ctx.union_policy());
        let shown = match (candidates.len(), policy) {
            (1, _) | (_, UnionPolicy::FirstConcrete) if !candidates.is_empty() => {
                self.resolve(candidates[0], display)?.text
            }
            _ => UNTYPED.to_string(),
        };

        let annotation = (members.len() > 1).then(|| type_text(ty, self.ctx.symbols()));
        Ok(annotate(shown, annotation, options))
    }

    /// Merge `types` and return the representative, `any` for none.
    fn representative(&mut self, types: &[TypeRef]) -> Result<TypeRef, TranslateError> {
        let mut merger = TypeMerger::new();
        for ty in types {
            merger.merge(self.ctx, ty)?;
        }
        Ok(merger.to_representative().unwrap_or_else(TypeRef::any))
    }
}

fn annotate(text: impl Into<String>, annotation: Option<String>, options: ResolveOptions<'_>) -> ResolvedType {
    ResolvedType {
        text: text.into(),
        annotation: annotation.filter(|_| options.annotations_visible()),
    }
}

// ---------------------------------------------------------------------------
// Substitution
// ---------------------------------------------------------------------------

/// Replace type parameters by their bindings. Parameters declared by a
/// nested function signature shadow outer bindings of the same name.
pub fn substitute(ty: &TypeRef, bindings: &HashMap<String, TypeRef>) -> TypeRef {
    match ty {
        TypeRef::TypeParam(name) => bindings.get(name).cloned().unwrap_or_else(|| ty.clone()),
        TypeRef::Nominal { symbol, type_args } => TypeRef::Nominal {
            symbol: *symbol,
            type_args: type_args.iter().map(|t| substitute(t, bindings)).collect(),
        },
        TypeRef::Function(sig) => TypeRef::Function(substitute_sig(sig, bindings)),
        TypeRef::Array(elem) => TypeRef::Array(Box::new(substitute(elem, bindings))),
        TypeRef::Tuple(elems) => TypeRef::Tuple(elems.iter().map(|t| substitute(t, bindings)).collect()),
        TypeRef::Structural(members) => {
            TypeRef::Structural(members.iter().map(|m| substitute_member(m, bindings)).collect())
        }
        TypeRef::Union(members) => TypeRef::Union(members.iter().map(|t| substitute(t, bindings)).collect()),
        TypeRef::Intersection(members) => {
            TypeRef::Intersection(members.iter().map(|t| substitute(t, bindings)).collect())
        }
        TypeRef::Primitive(_) | TypeRef::Alias(_) | TypeRef::Literal { .. } | TypeRef::Unresolved(_) => {
            ty.clone()
        }
    }
}

fn substitute_sig(sig: &FunctionSig, bindings: &HashMap<String, TypeRef>) -> FunctionSig {
    let shadowed;
    let bindings = if sig.type_params.iter().any(|p| bindings.contains_key(p)) {
        let mut inner = bindings.clone();
        for param in &sig.type_params {
            inner.remove(param);
        }
        shadowed = inner;
        &shadowed
    } else {
        bindings
    };
    FunctionSig {
        type_params: sig.type_params.clone(),
        params: sig
            .params
            .iter()
            .map(|p| Param {
                ty: substitute(&p.ty, bindings),
                ..p.clone()
            })
            .collect(),
        return_type: Box::new(substitute(&sig.return_type, bindings)),
    }
}

fn substitute_member(member: &Member, bindings: &HashMap<String, TypeRef>) -> Member {
    let kind = match &member.kind {
        MemberKind::Property { ty, optional, readonly } => MemberKind::Property {
            ty: substitute(ty, bindings),
            optional: *optional,
            readonly: *readonly,
        },
        MemberKind::Method { sig, optional } => MemberKind::Method {
            sig: substitute_sig(sig, bindings),
            optional: *optional,
        },
        MemberKind::Call(sig) => MemberKind::Call(substitute_sig(sig, bindings)),
        MemberKind::Construct(sig) => MemberKind::Construct(substitute_sig(sig, bindings)),
        MemberKind::Index(sig) => MemberKind::Index(substitute_sig(sig, bindings)),
        MemberKind::Nested(id) => MemberKind::Nested(*id),
    };
    Member {
        kind,
        ..member.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Diagnostic, ReportMode};
    use crate::names::DeclarationPath;
    use crate::symbols::SymbolTable;
    use crate::types::FileId;

    struct Fixture {
        table: SymbolTable,
        x: SymbolId,
        promise: SymbolId,
    }

    fn fixture() -> Fixture {
        let mut table = SymbolTable::new();
        let x = table.register(SymbolInfo::new(
            "X",
            SymbolKind::Interface,
            FileId(0),
            DeclarationPath::of_type(["m", "X"]),
        ));
        let promise = table.register(SymbolInfo::external("Promise", "Future"));
        Fixture { table, x, promise }
    }

    fn context(table: &SymbolTable) -> TranslationContext<'_> {
        let mut ctx = TranslationContext::new(table, ReportMode::Batch, UnionPolicy::default());
        let lib = ctx.add_library("m");
        ctx.assign_file(FileId(0), lib);
        ctx.enter_library(lib);
        ctx
    }

    fn render(ctx: &mut TranslationContext<'_>, ty: &TypeRef) -> String {
        TypeNameResolver::new(ctx)
            .resolve(ty, ResolveOptions::default())
            .unwrap()
            .render()
    }

    #[test]
    fn test_primitives() {
        let f = fixture();
        let mut ctx = context(&f.table);
        assert_eq!(render(&mut ctx, &TypeRef::number()), "num");
        assert_eq!(render(&mut ctx, &TypeRef::string()), "String");
        assert_eq!(render(&mut ctx, &TypeRef::void()), "void");
        assert_eq!(render(&mut ctx, &TypeRef::any()), "dynamic");
        assert_eq!(
            render(&mut ctx, &TypeRef::primitive(PrimitiveKind::Symbol)),
            "dynamic /*symbol*/"
        );
    }

    #[test]
    fn test_union_with_one_concrete_member() {
        let f = fixture();
        let mut ctx = context(&f.table);
        let ty = TypeRef::Union(vec![
            TypeRef::nominal(f.x),
            TypeRef::primitive(PrimitiveKind::Undefined),
            TypeRef::any(),
        ]);
        assert_eq!(render(&mut ctx, &ty), "X /*X|undefined|any*/");
    }

    #[test]
    fn test_union_policy() {
        let f = fixture();
        let mut ctx = context(&f.table);
        let ty = TypeRef::Union(vec![TypeRef::number(), TypeRef::string()]);
        assert_eq!(render(&mut ctx, &ty), "dynamic /*number|string*/");

        let first = ResolveOptions {
            policy: Some(UnionPolicy::FirstConcrete),
            ..ResolveOptions::default()
        };
        let resolved = TypeNameResolver::new(&mut ctx).resolve(&ty, first).unwrap();
        assert_eq!(resolved.render(), "num /*number|string*/");
    }

    #[test]
    fn test_comment_flags() {
        let f = fixture();
        let mut ctx = context(&f.table);
        let tuple = TypeRef::Tuple(vec![TypeRef::string(), TypeRef::array(TypeRef::any())]);
        let mut resolver = TypeNameResolver::new(&mut ctx);

        let shown = resolver.resolve(&tuple, ResolveOptions::default()).unwrap();
        assert_eq!(shown.render(), "List<dynamic> /*[string, any[]]*/");

        let hidden = ResolveOptions {
            hide_comment: true,
            ..ResolveOptions::default()
        };
        assert_eq!(resolver.resolve(&tuple, hidden).unwrap().render(), "List<dynamic>");

        // Nested annotations survive `hide_comment` but not `inside_comment`.
        let nested = TypeRef::array(TypeRef::primitive(PrimitiveKind::BigInt));
        assert_eq!(
            resolver.resolve(&nested, hidden).unwrap().render(),
            "List<dynamic /*bigint*/>"
        );
        assert_eq!(resolver.canonical_key(&nested).unwrap(), "List<dynamic>");
    }

    #[test]
    fn test_alias_is_transparent() {
        let mut f = fixture();
        let alias = f.table.register(
            SymbolInfo::new("Id", SymbolKind::Alias, FileId(0), DeclarationPath::of_type(["m", "Id"]))
                .with_aliased(TypeRef::string()),
        );
        let mut ctx = context(&f.table);
        assert_eq!(render(&mut ctx, &TypeRef::nominal(alias)), render(&mut ctx, &TypeRef::string()));
        assert_eq!(render(&mut ctx, &TypeRef::Alias(alias)), "String");
    }

    #[test]
    fn test_generic_alias_is_substituted() {
        let mut f = fixture();
        let alias = f.table.register(
            SymbolInfo::new("Box", SymbolKind::Alias, FileId(0), DeclarationPath::of_type(["m", "Box"]))
                .with_type_params(vec!["T".to_string()])
                .with_aliased(TypeRef::array(TypeRef::type_param("T"))),
        );
        let mut ctx = context(&f.table);
        let ty = TypeRef::generic(alias, vec![TypeRef::nominal(f.x)]);
        assert_eq!(render(&mut ctx, &ty), "List<X>");
    }

    #[test]
    fn test_recursive_alias_is_reported() {
        let mut table = SymbolTable::new();
        let id = table.register(SymbolInfo::new(
            "Loop",
            SymbolKind::Alias,
            FileId(0),
            DeclarationPath::of_type(["m", "Loop"]),
        ));
        if let Some(info) = table.get_mut(id) {
            info.aliased = Some(TypeRef::array(TypeRef::nominal(id)));
        }
        let mut ctx = context(&table);
        assert_eq!(render(&mut ctx, &TypeRef::nominal(id)), "List<dynamic /*Loop*/>");
        assert!(matches!(
            ctx.take_diagnostics().as_slice(),
            [Diagnostic::Unsupported { .. }]
        ));
    }

    #[test]
    fn test_void_type_argument_is_dropped() {
        let f = fixture();
        let mut ctx = context(&f.table);
        assert_eq!(
            render(&mut ctx, &TypeRef::generic(f.promise, vec![TypeRef::void()])),
            "Future"
        );
        assert_eq!(
            render(&mut ctx, &TypeRef::generic(f.promise, vec![TypeRef::nominal(f.x)])),
            "Future<X>"
        );
    }

    #[test]
    fn test_function_types() {
        let f = fixture();
        let mut ctx = context(&f.table);
        let sig = FunctionSig::new(
            vec![
                Param::new("a", TypeRef::string()),
                Param::new("b", TypeRef::number()).optional(),
            ],
            TypeRef::boolean(),
        );
        assert_eq!(render(&mut ctx, &TypeRef::Function(sig)), "bool Function(String, [num])");

        let variadic = FunctionSig::new(
            vec![Param::new("xs", TypeRef::array(TypeRef::number())).rest()],
            TypeRef::void(),
        );
        assert_eq!(
            render(&mut ctx, &TypeRef::Function(variadic)),
            "Function /*(...xs: number[]) => void*/"
        );
    }

    #[test]
    fn test_structural_shapes() {
        let f = fixture();
        let mut ctx = context(&f.table);
        let callable = TypeRef::Structural(vec![Member::call(FunctionSig::new(vec![], TypeRef::number()))]);
        assert_eq!(render(&mut ctx, &callable), "num Function()");

        let dict = TypeRef::Structural(vec![Member::index("k", TypeRef::string(), TypeRef::number())]);
        assert_eq!(render(&mut ctx, &dict), "dynamic /*{ [k: string]: number }*/");
    }

    #[test]
    fn test_type_params() {
        let f = fixture();
        let mut ctx = context(&f.table);
        assert_eq!(render(&mut ctx, &TypeRef::type_param("T")), "dynamic /*T*/");

        ctx.push_type_params(&["T".to_string()]);
        assert_eq!(render(&mut ctx, &TypeRef::type_param("T")), "T");
        ctx.pop_type_params();

        let bindings = HashMap::from([("T".to_string(), TypeRef::number())]);
        let options = ResolveOptions {
            resolved_type_arguments: Some(&bindings),
            ..ResolveOptions::default()
        };
        let resolved = TypeNameResolver::new(&mut ctx)
            .resolve(&TypeRef::array(TypeRef::type_param("T")), options)
            .unwrap();
        assert_eq!(resolved.render(), "List<num>");
    }

    #[test]
    fn test_unresolved_is_not_fatal() {
        let f = fixture();
        let mut ctx = context(&f.table);
        let ty = TypeRef::Unresolved("keyof Foo".to_string());
        assert_eq!(render(&mut ctx, &ty), "dynamic /*keyof Foo*/");
    }

    #[test]
    fn test_substitute_respects_shadowing() {
        let bindings = HashMap::from([("T".to_string(), TypeRef::number())]);
        let inner = FunctionSig::new(vec![Param::new("x", TypeRef::type_param("T"))], TypeRef::void())
            .with_type_params(vec!["T".to_string()]);
        let ty = TypeRef::Tuple(vec![TypeRef::type_param("T"), TypeRef::Function(inner.clone())]);
        assert_eq!(
            substitute(&ty, &bindings),
            TypeRef::Tuple(vec![TypeRef::number(), TypeRef::Function(inner)])
        );
    }
}
