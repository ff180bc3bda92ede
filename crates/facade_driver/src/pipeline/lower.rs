//! Lowering of oxc type syntax into [`TypeRef`] values.

use facade_core::{
    Diagnostic, FileId, FunctionSig, LiteralKind, Member, MemberKind, Param, PrimitiveKind,
    SymbolId, SymbolKind, SymbolTable, TypeRef,
};
use oxc_ast::ast::*;
use oxc_span::{GetSpan, Span};

use super::prelude::ARRAY_TYPES;
use super::utils::{property_key_name, span_text, ts_type_name_string};

/// Lowers the type expressions of one declaration.
///
/// Names are looked up from the innermost enclosing namespace outwards.
/// Anything that cannot be lowered becomes [`TypeRef::Unresolved`] and leaves
/// a diagnostic behind.
pub(crate) struct TypeLowerer<'t> {
    table: &'t SymbolTable,
    file: FileId,
    source: &'t str,
    /// Namespace segments enclosing the declaration, below the module.
    scope: &'t [String],
    type_params: Vec<Vec<String>>,
    this_type: Option<TypeRef>,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> TypeLowerer<'t> {
    pub(crate) fn new(table: &'t SymbolTable, file: FileId, source: &'t str, scope: &'t [String]) -> Self {
        Self {
            table,
            file,
            source,
            scope,
            type_params: Vec::new(),
            this_type: None,
            diagnostics: Vec::new(),
        }
    }

    /// What `this` means inside a class or interface body.
    pub(crate) fn with_this(mut self, this_type: TypeRef) -> Self {
        self.this_type = Some(this_type);
        self
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn text(&self, span: Span) -> &'t str {
        span_text(self.source, span)
    }

    /// Bring declared type parameters into scope and return their names.
    pub(crate) fn push_type_params(&mut self, decl: Option<&TSTypeParameterDeclaration<'_>>) -> Vec<String> {
        let names: Vec<String> = decl
            .map(|d| d.params.iter().map(|p| p.name.name.to_string()).collect())
            .unwrap_or_default();
        self.type_params.push(names.clone());
        names
    }

    pub(crate) fn pop_type_params(&mut self) {
        self.type_params.pop();
    }

    fn unsupported(&mut self, span: Span, reason: &str) -> TypeRef {
        self.diagnostics.push(Diagnostic::unsupported(span, reason));
        TypeRef::Unresolved(self.text(span).to_string())
    }

    // -- Types ---------------------------------------------------------------

    /// The annotated type, `any` when there is no annotation.
    pub(crate) fn lower_annotation(&mut self, annotation: Option<&TSTypeAnnotation<'_>>) -> TypeRef {
        match annotation {
            Some(annotation) => self.lower_type(&annotation.type_annotation),
            None => TypeRef::any(),
        }
    }

    pub(crate) fn lower_type(&mut self, ty: &TSType<'_>) -> TypeRef {
        match ty {
            TSType::TSAnyKeyword(_) => TypeRef::any(),
            TSType::TSUnknownKeyword(_) => TypeRef::primitive(PrimitiveKind::Unknown),
            TSType::TSNumberKeyword(_) => TypeRef::number(),
            TSType::TSStringKeyword(_) => TypeRef::string(),
            TSType::TSBooleanKeyword(_) => TypeRef::boolean(),
            TSType::TSNullKeyword(_) => TypeRef::primitive(PrimitiveKind::Null),
            TSType::TSUndefinedKeyword(_) => TypeRef::primitive(PrimitiveKind::Undefined),
            TSType::TSVoidKeyword(_) => TypeRef::void(),
            TSType::TSNeverKeyword(_) => TypeRef::primitive(PrimitiveKind::Never),
            TSType::TSObjectKeyword(_) => TypeRef::primitive(PrimitiveKind::Object),
            TSType::TSSymbolKeyword(_) => TypeRef::primitive(PrimitiveKind::Symbol),
            TSType::TSBigIntKeyword(_) => TypeRef::primitive(PrimitiveKind::BigInt),
            TSType::TSThisType(this) => match &self.this_type {
                Some(this_type) => this_type.clone(),
                None => self.unsupported(this.span, "`this` type outside a class or interface"),
            },
            TSType::TSTypeReference(reference) => {
                let name = ts_type_name_string(&reference.type_name);
                self.lower_reference(&name, reference.type_arguments.as_deref(), reference.span)
            }
            TSType::TSArrayType(array) => TypeRef::array(self.lower_type(&array.element_type)),
            TSType::TSTupleType(tuple) => TypeRef::Tuple(
                tuple
                    .element_types
                    .iter()
                    .map(|elem| self.lower_tuple_element(elem))
                    .collect(),
            ),
            TSType::TSUnionType(union) => {
                TypeRef::Union(union.types.iter().map(|t| self.lower_type(t)).collect())
            }
            TSType::TSIntersectionType(intersection) => {
                TypeRef::Intersection(intersection.types.iter().map(|t| self.lower_type(t)).collect())
            }
            TSType::TSFunctionType(func) => TypeRef::Function(self.lower_signature(
                func.type_parameters.as_deref(),
                &func.params,
                Some(&*func.return_type),
            )),
            TSType::TSTypeLiteral(literal) => {
                let mut members = Vec::new();
                for sig in &literal.members {
                    self.lower_member_signature(sig, &mut members);
                }
                TypeRef::Structural(members)
            }
            TSType::TSParenthesizedType(inner) => self.lower_type(&inner.type_annotation),
            TSType::TSLiteralType(literal) => {
                let kind = match &literal.literal {
                    TSLiteral::BooleanLiteral(_) => LiteralKind::Boolean,
                    TSLiteral::NumericLiteral(_) => LiteralKind::Number,
                    TSLiteral::BigIntLiteral(_) => LiteralKind::BigInt,
                    TSLiteral::StringLiteral(_) => LiteralKind::String,
                    TSLiteral::TemplateLiteral(_) => LiteralKind::Template,
                    // `-1`
                    _ => LiteralKind::Number,
                };
                TypeRef::Literal {
                    kind,
                    text: self.text(literal.span).to_string(),
                }
            }
            TSType::TSTypeOperatorType(op) => match op.operator {
                TSTypeOperatorOperator::Readonly => self.lower_type(&op.type_annotation),
                TSTypeOperatorOperator::Keyof => self.unsupported(op.span, "keyof type"),
                TSTypeOperatorOperator::Unique => self.unsupported(op.span, "unique symbol type"),
            },
            // Predicates are booleans at run time.
            TSType::TSTypePredicate(_) => TypeRef::boolean(),
            TSType::TSConditionalType(t) => self.unsupported(t.span, "conditional type"),
            TSType::TSMappedType(t) => self.unsupported(t.span, "mapped type"),
            TSType::TSIndexedAccessType(t) => self.unsupported(t.span, "indexed access type"),
            TSType::TSTypeQuery(t) => self.unsupported(t.span, "typeof type"),
            TSType::TSTemplateLiteralType(t) => self.unsupported(t.span, "template literal type"),
            TSType::TSImportType(t) => self.unsupported(t.span, "import type"),
            TSType::TSConstructorType(t) => self.unsupported(t.span, "constructor type"),
            TSType::TSInferType(t) => self.unsupported(t.span, "infer type"),
            other => {
                let span = other.span();
                self.unsupported(span, "type form")
            }
        }
    }

    fn lower_tuple_element(&mut self, elem: &TSTupleElement<'_>) -> TypeRef {
        match elem {
            TSTupleElement::TSOptionalType(optional) => self.lower_type(&optional.type_annotation),
            TSTupleElement::TSRestType(rest) => self.lower_type(&rest.type_annotation),
            TSTupleElement::TSNamedTupleMember(named) => self.lower_tuple_element(&named.element_type),
            other => match other.as_ts_type() {
                Some(ty) => self.lower_type(ty),
                None => self.unsupported(other.span(), "tuple element"),
            },
        }
    }

    /// `name<args>` in type position.
    pub(crate) fn lower_reference(
        &mut self,
        name: &str,
        args: Option<&TSTypeParameterInstantiation<'_>>,
        span: Span,
    ) -> TypeRef {
        if !name.contains('.') && self.type_params.iter().any(|scope| scope.iter().any(|p| p == name)) {
            return TypeRef::type_param(name);
        }

        let mut type_args: Vec<TypeRef> = args
            .map(|a| a.params.iter().map(|t| self.lower_type(t)).collect())
            .unwrap_or_default();

        let segments: Vec<&str> = name.split('.').collect();
        match self.lookup_type(&segments) {
            Some(id) => TypeRef::generic(id, type_args),
            None if ARRAY_TYPES.contains(&name) => {
                TypeRef::array(type_args.drain(..).next().unwrap_or_else(TypeRef::any))
            }
            None => {
                self.diagnostics.push(Diagnostic::unresolved(span, name));
                TypeRef::Unresolved(self.text(span).to_string())
            }
        }
    }

    /// Try `scope[..depth] ++ segments` from the innermost scope outwards.
    fn lookup_type(&self, segments: &[&str]) -> Option<SymbolId> {
        (0..=self.scope.len()).rev().find_map(|depth| {
            let key: Vec<String> = self.scope[..depth]
                .iter()
                .cloned()
                .chain(segments.iter().map(|s| s.to_string()))
                .collect();
            self.table.lookup(&key, self.file, SymbolKind::is_type)
        })
    }

    // -- Signatures ------------------------------------------------------------

    pub(crate) fn lower_signature(
        &mut self,
        type_params: Option<&TSTypeParameterDeclaration<'_>>,
        params: &FormalParameters<'_>,
        return_type: Option<&TSTypeAnnotation<'_>>,
    ) -> FunctionSig {
        let names = self.push_type_params(type_params);
        let params = self.lower_params(params);
        let ret = self.lower_annotation(return_type);
        self.pop_type_params();
        FunctionSig::new(params, ret).with_type_params(names)
    }

    fn lower_params(&mut self, params: &FormalParameters<'_>) -> Vec<Param> {
        let mut out = Vec::with_capacity(params.items.len() + 1);
        for (i, param) in params.items.iter().enumerate() {
            let name = match &param.pattern {
                BindingPattern::BindingIdentifier(id) => id.name.to_string(),
                _ => format!("arg{i}"),
            };
            let ty = self.lower_annotation(param.type_annotation.as_deref());
            let mut lowered = Param::new(name, ty);
            lowered.optional = param.optional;
            out.push(lowered);
        }
        if let Some(rest) = &params.rest {
            out.push(self.lower_rest(rest));
        }
        out
    }

    /// `...name: T[]`. Without an annotation the rest takes `any[]`.
    fn lower_rest(&mut self, rest: &FormalParameterRest<'_>) -> Param {
        let name = match &rest.rest.argument {
            BindingPattern::BindingIdentifier(id) => id.name.to_string(),
            _ => "args".to_string(),
        };
        let ty = match rest.type_annotation.as_deref() {
            Some(annotation) => self.lower_type(&annotation.type_annotation),
            None => TypeRef::array(TypeRef::any()),
        };
        Param::new(name, ty).rest()
    }

    // -- Members ---------------------------------------------------------------

    /// Lower one interface or type-literal member and append it to `out`.
    /// Accessor pairs become a single property.
    pub(crate) fn lower_member_signature(&mut self, sig: &TSSignature<'_>, out: &mut Vec<Member>) {
        match sig {
            TSSignature::TSPropertySignature(prop) => {
                let Some(name) = property_key_name(&prop.key) else {
                    self.diagnostics.push(Diagnostic::unsupported(prop.span, "computed property name"));
                    return;
                };
                let ty = self.lower_annotation(prop.type_annotation.as_deref());
                out.push(Member {
                    name: Some(name),
                    kind: MemberKind::Property {
                        ty,
                        optional: prop.optional,
                        readonly: prop.readonly,
                    },
                    is_static: false,
                    span: prop.span,
                });
            }
            TSSignature::TSMethodSignature(method) => {
                let Some(name) = property_key_name(&method.key) else {
                    self.diagnostics.push(Diagnostic::unsupported(method.span, "computed method name"));
                    return;
                };
                match method.kind {
                    TSMethodSignatureKind::Get => {
                        let ty = self.lower_annotation(method.return_type.as_deref());
                        push_accessor(out, name, ty, false, false, method.span);
                    }
                    TSMethodSignatureKind::Set => {
                        let ty = self.lower_annotation(
                            method
                                .params
                                .items
                                .first()
                                .and_then(|p| p.type_annotation.as_deref()),
                        );
                        push_accessor(out, name, ty, true, false, method.span);
                    }
                    TSMethodSignatureKind::Method => {
                        let sig = self.lower_signature(
                            method.type_parameters.as_deref(),
                            &method.params,
                            method.return_type.as_deref(),
                        );
                        out.push(Member {
                            name: Some(name),
                            kind: MemberKind::Method {
                                sig,
                                optional: method.optional,
                            },
                            is_static: false,
                            span: method.span,
                        });
                    }
                }
            }
            TSSignature::TSCallSignatureDeclaration(call) => {
                let sig = self.lower_signature(
                    call.type_parameters.as_deref(),
                    &call.params,
                    call.return_type.as_deref(),
                );
                out.push(Member::call(sig).with_span(call.span));
            }
            TSSignature::TSConstructSignatureDeclaration(construct) => {
                let sig = self.lower_signature(
                    construct.type_parameters.as_deref(),
                    &construct.params,
                    construct.return_type.as_deref(),
                );
                out.push(Member::construct(sig).with_span(construct.span));
            }
            TSSignature::TSIndexSignature(index) => {
                out.push(self.lower_index_signature(index));
            }
        }
    }

    pub(crate) fn lower_index_signature(&mut self, index: &TSIndexSignature<'_>) -> Member {
        let (key_name, key) = match index.parameters.first() {
            Some(param) => (
                param.name.to_string(),
                self.lower_type(&param.type_annotation.type_annotation),
            ),
            None => ("key".to_string(), TypeRef::string()),
        };
        let value = self.lower_type(&index.type_annotation.type_annotation);
        Member::index(key_name, key, value)
            .with_static(index.r#static)
            .with_span(index.span)
    }
}

/// Add a getter or setter. A getter alone is a read-only property; the other
/// half of a pair makes it writable.
pub(crate) fn push_accessor(
    out: &mut Vec<Member>,
    name: String,
    ty: TypeRef,
    is_setter: bool,
    is_static: bool,
    span: Span,
) {
    let existing = out.iter_mut().find(|m| {
        m.is_static == is_static
            && m.name.as_deref() == Some(name.as_str())
            && matches!(m.kind, MemberKind::Property { .. })
    });
    if let Some(member) = existing {
        if let MemberKind::Property { readonly, .. } = &mut member.kind {
            *readonly = false;
        }
        return;
    }
    out.push(Member {
        name: Some(name),
        kind: MemberKind::Property {
            ty,
            optional: false,
            readonly: !is_setter,
        },
        is_static,
        span,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::prelude::register_platform_types;
    use facade_core::{DeclarationPath, SymbolInfo};
    use facade_frontend::Allocator;
    use facade_frontend::parse::parse_source;
    use std::path::Path;

    /// Lower the annotation of `declare let x: <ty>;`.
    fn lower(table: &SymbolTable, ty: &str) -> (TypeRef, Vec<Diagnostic>) {
        let source = format!("declare let x: {ty};");
        let allocator = Allocator::default();
        let parsed = parse_source(&allocator, &source, Path::new("t.d.ts"));
        assert!(parsed.is_ok(), "{:?}", parsed.errors);
        let Some(Statement::VariableDeclaration(decl)) = parsed.program.body.first() else {
            panic!("expected a variable declaration");
        };
        let mut lowerer = TypeLowerer::new(table, FileId(0), &source, &[]);
        let lowered = lowerer.lower_annotation(decl.declarations[0].type_annotation.as_deref());
        (lowered, lowerer.into_diagnostics())
    }

    #[test]
    fn test_keywords_and_arrays() {
        let table = SymbolTable::new();
        assert_eq!(lower(&table, "number").0, TypeRef::number());
        assert_eq!(lower(&table, "string[]").0, TypeRef::array(TypeRef::string()));
        assert_eq!(
            lower(&table, "Array<boolean>").0,
            TypeRef::array(TypeRef::boolean())
        );
        assert_eq!(
            lower(&table, "readonly number[]").0,
            TypeRef::array(TypeRef::number())
        );
    }

    #[test]
    fn test_union_and_literal() {
        let table = SymbolTable::new();
        let (ty, diagnostics) = lower(&table, "'a' | 1 | null");
        assert!(diagnostics.is_empty());
        assert_eq!(
            ty,
            TypeRef::Union(vec![
                TypeRef::Literal { kind: LiteralKind::String, text: "'a'".to_string() },
                TypeRef::Literal { kind: LiteralKind::Number, text: "1".to_string() },
                TypeRef::primitive(PrimitiveKind::Null),
            ])
        );
    }

    #[test]
    fn test_references_resolve_through_table() {
        let mut table = SymbolTable::new();
        register_platform_types(&mut table);
        let foo = table.register(SymbolInfo::new(
            "Foo",
            SymbolKind::Interface,
            FileId(0),
            DeclarationPath::of_type(["t", "Foo"]),
        ));
        let (ty, _) = lower(&table, "Foo");
        assert_eq!(ty, TypeRef::nominal(foo));

        let (ty, _) = lower(&table, "Promise<Foo>");
        let TypeRef::Nominal { type_args, .. } = ty else {
            panic!("expected a nominal type");
        };
        assert_eq!(type_args, vec![TypeRef::nominal(foo)]);
    }

    #[test]
    fn test_unknown_name_is_unresolved() {
        let table = SymbolTable::new();
        let (ty, diagnostics) = lower(&table, "Missing<string>");
        assert_eq!(ty, TypeRef::Unresolved("Missing<string>".to_string()));
        assert!(matches!(
            &diagnostics[..],
            [Diagnostic::SymbolResolution { name, .. }] if name == "Missing"
        ));
    }

    #[test]
    fn test_mapped_type_is_unsupported() {
        let table = SymbolTable::new();
        let (ty, diagnostics) = lower(&table, "{ [K in 'a']: number }");
        assert!(matches!(ty, TypeRef::Unresolved(_)));
        assert!(matches!(&diagnostics[..], [Diagnostic::Unsupported { .. }]));
    }

    #[test]
    fn test_function_type_with_rest() {
        let table = SymbolTable::new();
        let (ty, _) = lower(&table, "<T>(a: T, b?: string, ...more: number[]) => T");
        let TypeRef::Function(sig) = ty else {
            panic!("expected a function type");
        };
        assert_eq!(sig.type_params, ["T"]);
        assert_eq!(*sig.return_type, TypeRef::type_param("T"));
        assert_eq!(sig.params[0], Param::new("a", TypeRef::type_param("T")));
        assert!(sig.params[1].optional);
        assert_eq!(
            sig.params[2],
            Param::new("more", TypeRef::array(TypeRef::number())).rest()
        );
        assert_eq!(sig.params[2].argument_type(), &TypeRef::number());
    }

    #[test]
    fn test_rest_without_annotation_takes_any() {
        let table = SymbolTable::new();
        let (ty, diagnostics) = lower(&table, "(...args) => void");
        let TypeRef::Function(sig) = ty else {
            panic!("expected a function type");
        };
        assert_eq!(sig.params, [Param::new("args", TypeRef::array(TypeRef::any())).rest()]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_type_literal_members() {
        let table = SymbolTable::new();
        let (ty, _) = lower(
            &table,
            "{ readonly a: number; get b(): string; set b(v: string); (x: number): void }",
        );
        let TypeRef::Structural(members) = ty else {
            panic!("expected a type literal");
        };
        assert_eq!(members.len(), 3);
        assert!(matches!(members[0].kind, MemberKind::Property { readonly: true, .. }));
        assert!(matches!(members[1].kind, MemberKind::Property { readonly: false, .. }));
        assert!(matches!(members[2].kind, MemberKind::Call(_)));
    }
}
