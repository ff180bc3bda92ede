use oxc_ast::ast::Program;
use oxc_diagnostics::OxcDiagnostic;
use oxc_semantic::SemanticBuilder;

/// Errors the parser accepts but semantic analysis rejects, such as
/// conflicting `let` redeclarations.
///
/// The translator keeps its own symbol table, so the semantic model is
/// dropped and only the errors are returned.
pub fn semantic_errors<'a>(program: &'a Program<'a>) -> Vec<OxcDiagnostic> {
    SemanticBuilder::new()
        .with_check_syntax_error(true)
        .build(program)
        .errors
}
