//! Populates the symbol table from parsed programs.
//!
//! Every file is walked twice. The declare pass registers one symbol per
//! declaration (merging interface/class redeclarations and namespace
//! reopenings); the define pass, run once all files are declared, lowers
//! members, bases and aliased types so that references can point forward
//! and across files.

use std::collections::HashMap;

use facade_core::{
    DeclarationPath, Diagnostic, FileId, Member, MemberKind, NameKind, SymbolId, SymbolInfo,
    SymbolKind, SymbolTable, TypeRef,
};
use oxc_ast::ast::*;
use oxc_span::{GetSpan, Span};
use tracing::trace;

use super::lower::{TypeLowerer, push_accessor};
use super::utils::{binding_name, enum_member_name, expression_name, property_key_name, ts_type_name_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    Declare,
    Define,
}

/// Symbols registered by the declare pass, keyed by where they were declared.
pub(crate) type Declared = HashMap<(DeclarationPath, SymbolKind), SymbolId>;

/// Enclosing namespace of the statements being walked.
#[derive(Debug, Clone, Default)]
struct Scope {
    parent: Option<SymbolId>,
    /// Namespace segments below the module.
    names: Vec<String>,
}

impl Scope {
    fn enter(&self, namespace: SymbolId, name: &str) -> Self {
        let mut names = self.names.clone();
        names.push(name.to_string());
        Self {
            parent: Some(namespace),
            names,
        }
    }
}

pub(crate) struct Collector<'c> {
    table: &'c mut SymbolTable,
    declared: &'c mut Declared,
    file: FileId,
    module: &'c str,
    source: &'c str,
    pass: Pass,
    diagnostics: Vec<Diagnostic>,
}

impl<'c> Collector<'c> {
    pub(crate) fn new(
        table: &'c mut SymbolTable,
        declared: &'c mut Declared,
        file: FileId,
        module: &'c str,
        source: &'c str,
        pass: Pass,
    ) -> Self {
        Self {
            table,
            declared,
            file,
            module,
            source,
            pass,
            diagnostics: Vec::new(),
        }
    }

    /// Walk `program` and return the diagnostics raised while lowering.
    pub(crate) fn run(mut self, program: &Program<'_>) -> Vec<Diagnostic> {
        self.statements(&program.body, &Scope::default());
        self.diagnostics
    }

    fn statements(&mut self, body: &[Statement<'_>], scope: &Scope) {
        for stmt in body {
            self.statement(stmt, scope);
        }
    }

    fn statement(&mut self, stmt: &Statement<'_>, scope: &Scope) {
        match stmt {
            Statement::TSInterfaceDeclaration(d) => self.interface(d, scope),
            Statement::ClassDeclaration(c) => self.class(c, scope),
            Statement::TSTypeAliasDeclaration(a) => self.alias(a, scope),
            Statement::TSEnumDeclaration(e) => self.enumeration(e, scope),
            Statement::FunctionDeclaration(f) => self.function(f, scope),
            Statement::VariableDeclaration(v) => self.variables(v, scope),
            Statement::TSModuleDeclaration(m) => self.module(m, scope),
            Statement::ExportNamedDeclaration(export) => {
                if let Some(decl) = &export.declaration {
                    self.declaration(decl, scope);
                }
            }
            Statement::ExportDefaultDeclaration(export) => match &export.declaration {
                ExportDefaultDeclarationKind::ClassDeclaration(c) => self.class(c, scope),
                ExportDefaultDeclarationKind::FunctionDeclaration(f) => self.function(f, scope),
                ExportDefaultDeclarationKind::TSInterfaceDeclaration(d) => self.interface(d, scope),
                _ => {}
            },
            _ => {}
        }
    }

    fn declaration(&mut self, decl: &Declaration<'_>, scope: &Scope) {
        match decl {
            Declaration::TSInterfaceDeclaration(d) => self.interface(d, scope),
            Declaration::ClassDeclaration(c) => self.class(c, scope),
            Declaration::TSTypeAliasDeclaration(a) => self.alias(a, scope),
            Declaration::TSEnumDeclaration(e) => self.enumeration(e, scope),
            Declaration::FunctionDeclaration(f) => self.function(f, scope),
            Declaration::VariableDeclaration(v) => self.variables(v, scope),
            Declaration::TSModuleDeclaration(m) => self.module(m, scope),
            _ => {}
        }
    }

    // -- Registration ----------------------------------------------------------

    fn path(&self, name: &str, kind: SymbolKind, scope: &Scope) -> DeclarationPath {
        let name_kind = match kind {
            SymbolKind::Function | SymbolKind::Variable => NameKind::Value,
            _ => NameKind::Type,
        };
        let segments = std::iter::once(self.module)
            .chain(scope.names.iter().map(String::as_str))
            .chain(std::iter::once(name));
        DeclarationPath::new(segments, name_kind)
    }

    /// Register a declaration, or return the symbol it merges into.
    fn declare(&mut self, name: &str, kind: SymbolKind, scope: &Scope, span: Span) -> SymbolId {
        let path = self.path(name, kind, scope);
        if let Some(id) = self.declared.get(&(path.clone(), kind)) {
            return *id;
        }

        // Interfaces merge into a class of the same name and vice versa.
        let partner = match kind {
            SymbolKind::Class => Some(SymbolKind::Interface),
            SymbolKind::Interface => Some(SymbolKind::Class),
            _ => None,
        };
        if let Some(id) = partner.and_then(|p| self.declared.get(&(path.clone(), p)).copied()) {
            if kind == SymbolKind::Class
                && let Some(info) = self.table.get_mut(id)
            {
                info.kind = SymbolKind::Class;
            }
            self.declared.insert((path, kind), id);
            return id;
        }

        let info = SymbolInfo::new(name, kind, self.file, path.clone())
            .with_parent(scope.parent)
            .with_span(span);
        let id = self.table.register(info);
        trace!(name, ?kind, id = id.0, "declared");
        self.declared.insert((path, kind), id);
        id
    }

    fn lookup(&self, name: &str, kind: SymbolKind, scope: &Scope) -> Option<SymbolId> {
        self.declared.get(&(self.path(name, kind, scope), kind)).copied()
    }

    /// In the define pass, the symbol the declare pass registered.
    fn defined(&self, name: &str, kind: SymbolKind, scope: &Scope) -> Option<SymbolId> {
        match self.pass {
            Pass::Declare => None,
            Pass::Define => self.lookup(name, kind, scope),
        }
    }

    /// `Name<T, U>` as seen from inside the declaration itself.
    fn self_type(id: SymbolId, type_params: &[String]) -> TypeRef {
        TypeRef::generic(id, type_params.iter().map(TypeRef::type_param).collect())
    }

    fn finish(&mut self, id: SymbolId, diagnostics: Vec<Diagnostic>) -> Option<&mut SymbolInfo> {
        self.diagnostics.extend(diagnostics);
        self.table.get_mut(id)
    }

    // -- Declarations ----------------------------------------------------------

    fn interface(&mut self, decl: &TSInterfaceDeclaration<'_>, scope: &Scope) {
        let name = decl.id.name.as_str();
        if self.pass == Pass::Declare {
            self.declare(name, SymbolKind::Interface, scope, decl.span);
            return;
        }
        let Some(id) = self.defined(name, SymbolKind::Interface, scope) else {
            return;
        };

        let mut lowerer = TypeLowerer::new(self.table, self.file, self.source, &scope.names);
        let type_params = lowerer.push_type_params(decl.type_parameters.as_deref());
        let mut lowerer = lowerer.with_this(Self::self_type(id, &type_params));

        let mut members = Vec::new();
        for sig in &decl.body.body {
            lowerer.lower_member_signature(sig, &mut members);
        }
        let mut bases = Vec::new();
        for heritage in &decl.extends {
            match expression_name(&heritage.expression) {
                Some(base) => bases.push(lowerer.lower_reference(
                    &base,
                    heritage.type_arguments.as_deref(),
                    heritage.span,
                )),
                None => bases.push(TypeRef::Unresolved(
                    super::utils::span_text(self.source, heritage.span).to_string(),
                )),
            }
        }

        let diagnostics = lowerer.into_diagnostics();
        if let Some(info) = self.finish(id, diagnostics) {
            if info.type_params.is_empty() {
                info.type_params = type_params;
            }
            info.members.extend(members);
            info.bases.extend(bases);
        }
    }

    fn class(&mut self, class: &Class<'_>, scope: &Scope) {
        let Some(ident) = &class.id else {
            return;
        };
        let name = ident.name.as_str();
        if self.pass == Pass::Declare {
            self.declare(name, SymbolKind::Class, scope, class.span);
            return;
        }
        let Some(id) = self.defined(name, SymbolKind::Class, scope) else {
            return;
        };

        let mut lowerer = TypeLowerer::new(self.table, self.file, self.source, &scope.names);
        let type_params = lowerer.push_type_params(class.type_parameters.as_deref());
        let this_type = Self::self_type(id, &type_params);
        let mut lowerer = lowerer.with_this(this_type.clone());

        let mut members = Vec::new();
        for element in &class.body.body {
            class_element(&mut lowerer, element, &this_type, &mut members);
        }

        let mut bases = Vec::new();
        let has_superclass = class.super_class.is_some();
        if let Some(superclass) = &class.super_class {
            let span = superclass.span();
            match expression_name(superclass) {
                Some(base) => bases.push(lowerer.lower_reference(
                    &base,
                    class.super_type_arguments.as_deref(),
                    span,
                )),
                None => bases.push(TypeRef::Unresolved(
                    super::utils::span_text(self.source, span).to_string(),
                )),
            }
        }
        for implemented in &class.implements {
            let base = ts_type_name_string(&implemented.expression);
            bases.push(lowerer.lower_reference(
                &base,
                implemented.type_arguments.as_deref(),
                implemented.span,
            ));
        }

        let diagnostics = lowerer.into_diagnostics();
        if let Some(info) = self.finish(id, diagnostics) {
            info.type_params = type_params;
            info.members.extend(members);
            if has_superclass {
                // The superclass always comes first.
                let mut all = bases;
                all.append(&mut info.bases);
                info.bases = all;
                info.has_superclass = true;
            } else {
                info.bases.extend(bases);
            }
        }
    }

    fn alias(&mut self, alias: &TSTypeAliasDeclaration<'_>, scope: &Scope) {
        let name = alias.id.name.as_str();
        if self.pass == Pass::Declare {
            self.declare(name, SymbolKind::Alias, scope, alias.span);
            return;
        }
        let Some(id) = self.defined(name, SymbolKind::Alias, scope) else {
            return;
        };

        let mut lowerer = TypeLowerer::new(self.table, self.file, self.source, &scope.names);
        let type_params = lowerer.push_type_params(alias.type_parameters.as_deref());
        let aliased = lowerer.lower_type(&alias.type_annotation);
        let diagnostics = lowerer.into_diagnostics();
        if let Some(info) = self.finish(id, diagnostics) {
            info.type_params = type_params;
            info.aliased = Some(aliased);
        }
    }

    fn enumeration(&mut self, decl: &TSEnumDeclaration<'_>, scope: &Scope) {
        let name = decl.id.name.as_str();
        if self.pass == Pass::Declare {
            self.declare(name, SymbolKind::Enum, scope, decl.span);
            return;
        }
        let Some(id) = self.defined(name, SymbolKind::Enum, scope) else {
            return;
        };

        let mut members = Vec::new();
        for member in &decl.body.members {
            let Some(value_name) = enum_member_name(&member.id) else {
                self.diagnostics
                    .push(Diagnostic::unsupported(member.span, "computed enum member"));
                continue;
            };
            let ty = match &member.initializer {
                Some(Expression::StringLiteral(_)) | Some(Expression::TemplateLiteral(_)) => {
                    TypeRef::string()
                }
                _ => TypeRef::number(),
            };
            members.push(Member {
                name: Some(value_name),
                kind: MemberKind::Property {
                    ty,
                    optional: false,
                    readonly: true,
                },
                is_static: true,
                span: member.span,
            });
        }
        if let Some(info) = self.table.get_mut(id) {
            info.members.extend(members);
        }
    }

    fn function(&mut self, func: &Function<'_>, scope: &Scope) {
        let Some(ident) = &func.id else {
            return;
        };
        let name = ident.name.as_str();
        if self.pass == Pass::Declare {
            self.declare(name, SymbolKind::Function, scope, func.span);
            return;
        }
        let Some(id) = self.defined(name, SymbolKind::Function, scope) else {
            return;
        };
        // An implementation following its overloads adds no signature.
        let has_overloads = self.table.get(id).is_some_and(|info| !info.members.is_empty());
        if func.body.is_some() && has_overloads {
            return;
        }

        let mut lowerer = TypeLowerer::new(self.table, self.file, self.source, &scope.names);
        let sig = lowerer.lower_signature(
            func.type_parameters.as_deref(),
            &func.params,
            func.return_type.as_deref(),
        );
        let diagnostics = lowerer.into_diagnostics();
        if let Some(info) = self.finish(id, diagnostics) {
            info.members.push(Member::call(sig).with_span(func.span));
        }
    }

    fn variables(&mut self, decl: &VariableDeclaration<'_>, scope: &Scope) {
        let readonly = matches!(decl.kind, VariableDeclarationKind::Const);
        for declarator in &decl.declarations {
            let Some(name) = binding_name(&declarator.id) else {
                if self.pass == Pass::Define {
                    self.diagnostics
                        .push(Diagnostic::unsupported(declarator.span, "destructuring declaration"));
                }
                continue;
            };
            if self.pass == Pass::Declare {
                self.declare(&name, SymbolKind::Variable, scope, declarator.span);
                continue;
            }
            let Some(id) = self.defined(&name, SymbolKind::Variable, scope) else {
                continue;
            };

            let mut lowerer = TypeLowerer::new(self.table, self.file, self.source, &scope.names);
            let ty = lowerer.lower_annotation(declarator.type_annotation.as_deref());
            let diagnostics = lowerer.into_diagnostics();
            if let Some(info) = self.finish(id, diagnostics) {
                info.members.push(Member {
                    name: Some(name),
                    kind: MemberKind::Property {
                        ty,
                        optional: false,
                        readonly,
                    },
                    is_static: false,
                    span: declarator.span,
                });
            }
        }
    }

    /// `namespace a.b { }` nests; `declare module "x"` and `declare global`
    /// add their declarations to the enclosing scope.
    fn module(&mut self, decl: &TSModuleDeclaration<'_>, scope: &Scope) {
        let name = match &decl.id {
            TSModuleDeclarationName::Identifier(id) if id.name.as_str() != "global" => Some(id.name.to_string()),
            _ => None,
        };

        let inner = match name {
            Some(name) => {
                let id = match self.pass {
                    Pass::Declare => Some(self.declare(&name, SymbolKind::Namespace, scope, decl.span)),
                    Pass::Define => self.lookup(&name, SymbolKind::Namespace, scope),
                };
                let Some(id) = id else {
                    return;
                };
                scope.enter(id, &name)
            }
            None => scope.clone(),
        };

        match &decl.body {
            Some(TSModuleDeclarationBody::TSModuleBlock(block)) => self.statements(&block.body, &inner),
            Some(TSModuleDeclarationBody::TSModuleDeclaration(nested)) => self.module(nested, &inner),
            None => {}
        }
    }
}

/// Lower one class body element into `out`. Private members are not part of
/// the facade.
fn class_element(lowerer: &mut TypeLowerer<'_>, element: &ClassElement<'_>, this_type: &TypeRef, out: &mut Vec<Member>) {
    match element {
        ClassElement::MethodDefinition(method) => {
            if method.accessibility == Some(TSAccessibility::Private) {
                return;
            }
            let Some(name) = property_key_name(&method.key) else {
                return;
            };
            let func = &method.value;
            match method.kind {
                MethodDefinitionKind::Constructor => {
                    let mut sig = lowerer.lower_signature(
                        func.type_parameters.as_deref(),
                        &func.params,
                        None,
                    );
                    sig.return_type = Box::new(this_type.clone());
                    out.push(Member::construct(sig).with_span(method.span));
                }
                MethodDefinitionKind::Get => {
                    let ty = lowerer.lower_annotation(func.return_type.as_deref());
                    push_accessor(out, name, ty, false, method.r#static, method.span);
                }
                MethodDefinitionKind::Set => {
                    let ty = lowerer.lower_annotation(
                        func.params
                            .items
                            .first()
                            .and_then(|p| p.type_annotation.as_deref()),
                    );
                    push_accessor(out, name, ty, true, method.r#static, method.span);
                }
                MethodDefinitionKind::Method => {
                    let sig = lowerer.lower_signature(
                        func.type_parameters.as_deref(),
                        &func.params,
                        func.return_type.as_deref(),
                    );
                    out.push(Member {
                        name: Some(name),
                        kind: MemberKind::Method {
                            sig,
                            optional: method.optional,
                        },
                        is_static: method.r#static,
                        span: method.span,
                    });
                }
            }
        }
        ClassElement::PropertyDefinition(prop) => {
            if prop.accessibility == Some(TSAccessibility::Private) {
                return;
            }
            let Some(name) = property_key_name(&prop.key) else {
                return;
            };
            let ty = lowerer.lower_annotation(prop.type_annotation.as_deref());
            out.push(Member {
                name: Some(name),
                kind: MemberKind::Property {
                    ty,
                    optional: prop.optional,
                    readonly: prop.readonly,
                },
                is_static: prop.r#static,
                span: prop.span,
            });
        }
        ClassElement::TSIndexSignature(index) => {
            out.push(lowerer.lower_index_signature(index));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::prelude::register_platform_types;
    use facade_core::SymbolSource;
    use facade_frontend::Allocator;
    use facade_frontend::parse::parse_source;
    use std::path::Path;

    /// Declare then define one file named `m`.
    fn collect(source: &str) -> (SymbolTable, Vec<Diagnostic>) {
        let allocator = Allocator::default();
        let parsed = parse_source(&allocator, source, Path::new("m.d.ts"));
        assert!(parsed.is_ok(), "{:?}", parsed.errors);

        let mut table = SymbolTable::new();
        register_platform_types(&mut table);
        let mut declared = Declared::new();
        let mut diagnostics = Vec::new();
        for pass in [Pass::Declare, Pass::Define] {
            let collector = Collector::new(&mut table, &mut declared, FileId(0), "m", source, pass);
            diagnostics.extend(collector.run(&parsed.program));
        }
        (table, diagnostics)
    }

    fn find(table: &SymbolTable, scoped: &[&str]) -> SymbolId {
        let key: Vec<String> = scoped.iter().map(|s| s.to_string()).collect();
        table
            .lookup(&key, FileId(0), |_| true)
            .unwrap_or_else(|| panic!("no symbol {scoped:?}"))
    }

    #[test]
    fn test_function_overloads_accumulate() {
        let (table, diagnostics) = collect(
            "declare function f(a: string): number;\n\
             declare function f(a: string, b: number): string;",
        );
        assert!(diagnostics.is_empty());
        let f = find(&table, &["f"]);
        assert_eq!(table.signatures(f, facade_core::SignatureKind::Call).len(), 2);
    }

    #[test]
    fn test_forward_reference_and_namespace() {
        let (table, _) = collect(
            "declare namespace ns { interface Foo { next: Bar } interface Bar { n: number } }",
        );
        let foo = find(&table, &["ns", "Foo"]);
        let bar = find(&table, &["ns", "Bar"]);
        let ns = find(&table, &["ns"]);
        let info = table.symbol(foo).unwrap();
        assert_eq!(info.parent, Some(ns));
        assert_eq!(info.path.dotted(), "m.ns.Foo");
        assert!(matches!(
            &info.members[0].kind,
            MemberKind::Property { ty: TypeRef::Nominal { symbol, .. }, .. } if *symbol == bar
        ));
    }

    #[test]
    fn test_interface_merges_into_class() {
        let (table, _) = collect(
            "declare class A { x: number; }\ninterface A { y: string; }",
        );
        let a = find(&table, &["A"]);
        let info = table.symbol(a).unwrap();
        assert_eq!(info.kind, SymbolKind::Class);
        assert_eq!(info.members.len(), 2);
    }

    #[test]
    fn test_class_heritage_and_members() {
        let (table, diagnostics) = collect(
            "declare class Base {}\n\
             interface I {}\n\
             declare class C<T> extends Base implements I {\n\
               constructor(x: T);\n\
               private hidden: number;\n\
               static count: number;\n\
               get size(): number;\n\
               clone(): this;\n\
             }",
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let c = find(&table, &["C"]);
        let info = table.symbol(c).unwrap();
        assert!(info.has_superclass);
        assert_eq!(info.bases, vec![TypeRef::nominal(find(&table, &["Base"])), TypeRef::nominal(find(&table, &["I"]))]);
        assert_eq!(info.type_params, ["T"]);

        let names: Vec<_> = info.members.iter().map(|m| m.name.as_deref()).collect();
        assert_eq!(names, [None, Some("count"), Some("size"), Some("clone")]);
        assert!(info.members[1].is_static);
        let clone = info.members[3].signature().unwrap();
        assert_eq!(*clone.return_type, TypeRef::generic(c, vec![TypeRef::type_param("T")]));
    }

    #[test]
    fn test_enum_and_variables() {
        let (table, _) = collect(
            "declare enum E { A, B = 'b' }\ndeclare const version: string;\ndeclare let count: number;",
        );
        let e = table.symbol(find(&table, &["E"])).unwrap();
        assert!(matches!(&e.members[1].kind, MemberKind::Property { ty, readonly: true, .. } if *ty == TypeRef::string()));
        let version = table.symbol(find(&table, &["version"])).unwrap();
        assert!(matches!(version.members[0].kind, MemberKind::Property { readonly: true, .. }));
        let count = table.symbol(find(&table, &["count"])).unwrap();
        assert!(matches!(count.members[0].kind, MemberKind::Property { readonly: false, .. }));
    }

    #[test]
    fn test_ambient_module_is_transparent() {
        let (table, _) = collect("declare module 'lib' { export interface Opts { a: number } }");
        let opts = table.symbol(find(&table, &["Opts"])).unwrap();
        assert_eq!(opts.parent, None);
    }

    #[test]
    fn test_unresolved_reference_is_reported() {
        let (table, diagnostics) = collect("declare function g(): Missing;");
        let g = table.symbol(find(&table, &["g"])).unwrap();
        assert_eq!(
            *g.members[0].signature().unwrap().return_type,
            TypeRef::Unresolved("Missing".to_string())
        );
        assert_eq!(diagnostics, vec![Diagnostic::unresolved(Span::new(22, 29), "Missing")]);
    }
}
