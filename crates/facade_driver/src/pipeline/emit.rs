//! The declaration visitor: turns collected symbols into output declarations.

use facade_core::ident::{self, Validity};
use facade_core::source_text::type_text;
use facade_core::{
    FileId, FunctionSig, LibraryId, Member, MemberGroup, MemberKind, NameKind, OverloadGrouper,
    ResolveOptions, SignatureKind, SymbolId, SymbolInfo, SymbolKind, SymbolSource, SymbolTable,
    TranslateError, TranslationContext, TypeNameResolver, TypeRef,
};
use facade_emit::{DeclId, DeclKind, OutputArena, OutputDecl};
use tracing::debug;

const JS_IMPORT: &str = "import 'package:js/js.dart';";

/// A rendered parameter list and the pieces around it.
struct RenderedSignature {
    ret: String,
    generics: String,
    params: String,
}

/// Walks the symbols of one library and appends their facades to an arena.
pub(crate) struct DeclarationVisitor<'c, 's> {
    ctx: &'c mut TranslationContext<'s>,
    table: &'s SymbolTable,
    arena: OutputArena,
}

impl<'c, 's> DeclarationVisitor<'c, 's> {
    pub(crate) fn new(ctx: &'c mut TranslationContext<'s>, table: &'s SymbolTable) -> Self {
        Self {
            ctx,
            table,
            arena: OutputArena::new(),
        }
    }

    pub(crate) fn context(&mut self) -> &mut TranslationContext<'s> {
        self.ctx
    }

    /// Start the output unit of `library`.
    pub(crate) fn begin(&mut self, library: LibraryId, name: &str) -> DeclId {
        self.ctx.enter_library(library);
        let root = self.arena.add(
            OutputDecl::new(DeclKind::Library, format!("library {};", ident::sanitize(name)))
                .with_metadata("@JS()"),
            None,
        );
        self.arena
            .add(OutputDecl::new(DeclKind::Import, JS_IMPORT), Some(root));
        root
    }

    /// Add the imports recorded while emitting and render the unit.
    pub(crate) fn finish(mut self, library: LibraryId, root: DeclId) -> String {
        let imports = self.ctx.imports_of(library);
        for (i, imported) in imports.iter().enumerate() {
            let Some(name) = self.ctx.library(*imported).map(|l| ident::sanitize(l.name())) else {
                continue;
            };
            self.arena.add_at(
                OutputDecl::new(DeclKind::Import, format!("import '{name}.dart';")),
                root,
                i + 1,
            );
        }
        debug!(library = library.0, decls = self.arena.len(), "rendered library");
        self.arena.render(root)
    }

    /// Emit every declaration of `file`. Namespaces are flattened.
    pub(crate) fn emit_file(&mut self, file: FileId, root: DeclId) -> Result<(), TranslateError> {
        self.emit_scope(file, None, root)
    }

    fn emit_scope(&mut self, file: FileId, parent: Option<SymbolId>, root: DeclId) -> Result<(), TranslateError> {
        let table = self.table;
        for id in table.children(file, parent) {
            let Some(info) = table.symbol(id) else {
                continue;
            };
            self.ctx.at(info.span);
            match info.kind {
                SymbolKind::Namespace => self.emit_scope(file, Some(id), root)?,
                SymbolKind::Class | SymbolKind::Interface | SymbolKind::Enum => {
                    self.emit_class(id, info, root)?
                }
                SymbolKind::Function => self.emit_function(id, info, root)?,
                SymbolKind::Variable => self.emit_variable(id, info, root)?,
                // Aliases are inlined at every use.
                SymbolKind::Alias | SymbolKind::TypeParameter => {}
            }
        }
        Ok(())
    }

    // -- Helpers -----------------------------------------------------------------

    fn render_type(&mut self, ty: &TypeRef) -> Result<String, TranslateError> {
        Ok(TypeNameResolver::new(self.ctx)
            .resolve(ty, ResolveOptions::default())?
            .render())
    }

    /// `@JS()` when the flat name is the JavaScript name, `@JS("a.B")`
    /// otherwise.
    fn js_annotation(&self, id: SymbolId, info: &SymbolInfo, name: &str) -> String {
        if info.parent.is_none() && info.name == name {
            "@JS()".to_string()
        } else {
            format!("@JS(\"{}\")", self.table.qualified_name(id))
        }
    }

    fn render_signature(&mut self, sig: &FunctionSig, with_generics: bool) -> Result<RenderedSignature, TranslateError> {
        if with_generics {
            self.ctx.push_type_params(&sig.type_params);
        }
        let result = self.render_signature_parts(sig, with_generics);
        if with_generics {
            self.ctx.pop_type_params();
        }
        result
    }

    fn render_signature_parts(&mut self, sig: &FunctionSig, with_generics: bool) -> Result<RenderedSignature, TranslateError> {
        let ret = self.render_type(&sig.return_type)?;
        let mut required = Vec::new();
        let mut optional = Vec::new();
        for (i, param) in sig.params.iter().enumerate() {
            let ty = self.render_type(param.argument_type())?;
            let name = ident::escape(&param.name, NameKind::Value)
                .unwrap_or_else(|| format!("arg{i}"));
            let rendered = format!("{ty} {name}");
            // Rest parameters take at most one argument here.
            if param.optional || param.rest || !optional.is_empty() {
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
        let generics = if with_generics && !sig.type_params.is_empty() {
            format!("<{}>", sig.type_params.join(", "))
        } else {
            String::new()
        };
        Ok(RenderedSignature { ret, generics, params })
    }

    // -- Top-level declarations ------------------------------------------------------

    fn emit_function(&mut self, id: SymbolId, info: &SymbolInfo, root: DeclId) -> Result<(), TranslateError> {
        if self.table.signatures(id, SignatureKind::Call).is_empty() {
            return Err(TranslateError::structural(info.span, format!("function `{}` has no signature", info.name)));
        }
        // `None` for a name with no legal spelling: every overload is a stub.
        let name = self.ctx.name_for_symbol(id)?;
        for group in OverloadGrouper::apply(self.ctx, &info.members)? {
            let member = group.effective();
            let Some(sig) = member.signature() else {
                continue;
            };
            self.ctx.at(member.span);
            let RenderedSignature { ret, generics, params } = self.render_signature(sig, true)?;
            let Some(name) = name.as_deref() else {
                self.stub(format!("external {ret} {}{generics}({params});", info.name), root);
                continue;
            };
            let js = self.js_annotation(id, info, name);
            // Overloads are call signatures; name them like the source does.
            let docs: Vec<String> = group.docs().iter().map(|doc| format!("{}{doc}", info.name)).collect();
            self.arena.add(
                OutputDecl::new(DeclKind::Function, format!("external {ret} {name}{generics}({params});"))
                    .with_metadata(js)
                    .with_docs(docs),
                Some(root),
            );
        }
        Ok(())
    }

    fn emit_variable(&mut self, id: SymbolId, info: &SymbolInfo, root: DeclId) -> Result<(), TranslateError> {
        let table = self.table;
        let Some(MemberKind::Property { ty, readonly, .. }) =
            table.properties(id).into_iter().next().map(|m| &m.kind)
        else {
            return Err(TranslateError::structural(info.span, format!("variable `{}` has no type", info.name)));
        };
        let ty = self.render_type(ty)?;
        let Some(name) = self.ctx.name_for_symbol(id)? else {
            self.stub(format!("external {ty} get {};", info.name), root);
            return Ok(());
        };
        let js = self.js_annotation(id, info, &name);
        self.arena.add(
            OutputDecl::new(DeclKind::Function, format!("external {ty} get {name};")).with_metadata(js.clone()),
            Some(root),
        );
        if !readonly {
            self.arena.add(
                OutputDecl::new(DeclKind::Function, format!("external set {name}({ty} value);")).with_metadata(js),
                Some(root),
            );
        }
        Ok(())
    }

    fn emit_class(&mut self, id: SymbolId, info: &SymbolInfo, root: DeclId) -> Result<(), TranslateError> {
        let Some(name) = self.ctx.name_for_symbol(id)? else {
            let keyword = match info.kind {
                SymbolKind::Interface => "abstract class",
                _ => "class",
            };
            self.stub(format!("{keyword} {} {{}}", info.name), root);
            return Ok(());
        };
        self.ctx.push_type_params(&info.type_params);
        let result = self.emit_class_body(id, info, &name, root);
        self.ctx.pop_type_params();
        result
    }

    fn emit_class_body(&mut self, id: SymbolId, info: &SymbolInfo, name: &str, root: DeclId) -> Result<(), TranslateError> {
        let mut superclass = None;
        let mut interfaces = Vec::new();
        let mut notes = Vec::new();
        let table = self.table;
        for (i, base) in table.base_types(id).iter().enumerate() {
            if !self.is_nominal_base(base) {
                notes.push(format!("Base type `{}` is not representable.", type_text(base, self.table)));
                continue;
            }
            let rendered = self.render_type(base)?;
            if i == 0 && info.has_superclass && info.kind == SymbolKind::Class {
                superclass = Some(rendered);
            } else {
                interfaces.push(rendered);
            }
        }

        let generics = if info.type_params.is_empty() {
            String::new()
        } else {
            format!("<{}>", info.type_params.join(", "))
        };
        let mut header = match info.kind {
            SymbolKind::Interface => format!("abstract class {name}{generics}"),
            _ => format!("class {name}{generics}"),
        };
        if let Some(superclass) = superclass {
            header.push_str(&format!(" extends {superclass}"));
        }
        if !interfaces.is_empty() {
            header.push_str(&format!(" implements {}", interfaces.join(", ")));
        }

        let mut decl = OutputDecl::new(DeclKind::Class, header)
            .with_metadata(self.js_annotation(id, info, name))
            .with_docs(notes);
        if info.kind == SymbolKind::Interface {
            decl = decl.with_metadata("@anonymous");
        }
        let class_decl = self.arena.add(decl, Some(root));

        for group in OverloadGrouper::apply(self.ctx, &info.members)? {
            self.emit_member(&group, name, class_decl)?;
        }
        Ok(())
    }

    /// Only declared classes and interfaces can be extended or implemented.
    fn is_nominal_base(&self, base: &TypeRef) -> bool {
        let TypeRef::Nominal { symbol, .. } = base else {
            return false;
        };
        self.table.symbol(*symbol).is_some_and(|info| {
            info.external_name.is_none()
                && info.has_legal_name()
                && matches!(info.kind, SymbolKind::Class | SymbolKind::Interface)
        })
    }

    // -- Members -----------------------------------------------------------------------

    fn emit_member(&mut self, group: &MemberGroup, class_name: &str, parent: DeclId) -> Result<(), TranslateError> {
        let member = group.effective();
        self.ctx.at(member.span);
        let docs = group.docs().to_vec();
        let modifier = if member.is_static { "static " } else { "" };

        match &member.kind {
            MemberKind::Property { ty, readonly, .. } => {
                let raw = member_name(member);
                let ty = self.render_type(ty)?;
                let name = match ident::validate(raw, NameKind::Value) {
                    Validity::Usable => raw.to_string(),
                    Validity::Escaped(escaped) => escaped,
                    Validity::Unusable => {
                        self.stub(format!("external {modifier}{ty} get {raw};"), parent);
                        return Ok(());
                    }
                };
                let js = (name != raw).then(|| format!("@JS(\"{raw}\")"));
                self.member(format!("external {modifier}{ty} get {name};"), js.clone(), docs, parent);
                if !readonly {
                    self.member(format!("external {modifier}set {name}({ty} value);"), js, Vec::new(), parent);
                }
            }
            MemberKind::Method { sig, .. } => {
                let raw = member_name(member);
                let RenderedSignature { ret, generics, params } = self.render_signature(sig, true)?;
                let header = |name: &str| format!("external {modifier}{ret} {name}{generics}({params});");
                match ident::validate(raw, NameKind::Value) {
                    Validity::Usable => self.member(header(raw), None, docs, parent),
                    Validity::Escaped(escaped) => {
                        self.member(header(&escaped), Some(format!("@JS(\"{raw}\")")), docs, parent)
                    }
                    Validity::Unusable => self.stub(header(raw), parent),
                }
            }
            MemberKind::Call(sig) => {
                let RenderedSignature { ret, generics, params } = self.render_signature(sig, true)?;
                self.member(format!("external {ret} call{generics}({params});"), None, docs, parent);
            }
            MemberKind::Construct(sig) => {
                // Factories cannot declare type parameters of their own.
                let RenderedSignature { params, .. } = self.render_signature(sig, false)?;
                self.member(format!("external factory {class_name}({params});"), None, docs, parent);
            }
            MemberKind::Index(sig) => {
                let RenderedSignature { ret, params, .. } = self.render_signature(sig, false)?;
                self.member(format!("external {ret} operator []({params});"), None, docs, parent);
                let key = params.trim_start_matches('[').trim_end_matches(']');
                self.member(
                    format!("external void operator []=({key}, {ret} value);"),
                    None,
                    Vec::new(),
                    parent,
                );
            }
            MemberKind::Nested(_) => {}
        }
        Ok(())
    }

    fn member(&mut self, header: String, js: Option<String>, docs: Vec<String>, parent: DeclId) {
        let mut decl = OutputDecl::new(DeclKind::Member, header).with_docs(docs);
        if let Some(js) = js {
            decl = decl.with_metadata(js);
        }
        self.arena.add(decl, Some(parent));
    }

    fn stub(&mut self, header: String, parent: DeclId) {
        debug!(%header, "emitting stub");
        self.arena.add(
            OutputDecl::new(DeclKind::Stub, header)
                .with_docs(["No legal name in the target; kept for reference.".to_string()]),
            Some(parent),
        );
    }
}

fn member_name(member: &Member) -> &str {
    member.name.as_deref().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use facade_core::{DeclarationPath, ReportMode, UnionPolicy};

    use super::*;

    fn emit(table: &SymbolTable) -> Result<String, TranslateError> {
        let mut ctx = TranslationContext::new(table, ReportMode::Batch, UnionPolicy::default());
        let library = ctx.add_library("m");
        ctx.assign_file(FileId(0), library);
        let mut visitor = DeclarationVisitor::new(&mut ctx, table);
        let root = visitor.begin(library, "m");
        visitor.emit_file(FileId(0), root)?;
        Ok(visitor.finish(library, root))
    }

    fn function(members: Vec<Member>) -> SymbolTable {
        let mut table = SymbolTable::new();
        table.register(
            SymbolInfo::new("f", SymbolKind::Function, FileId(0), DeclarationPath::of_value(["f"]))
                .with_members(members),
        );
        table
    }

    #[test]
    fn test_function_reads_call_signatures() {
        let table = function(vec![Member::call(FunctionSig::new(vec![], TypeRef::void()))]);
        let text = emit(&table).unwrap();
        assert!(text.contains("@JS()\nexternal void f();\n"), "{text}");
    }

    #[test]
    fn test_function_without_signature_is_structural() {
        let table = function(vec![]);
        let err = emit(&table).unwrap_err();
        assert!(matches!(err, TranslateError::Structural { ref message, .. } if message.contains("`f`")));
    }
}
