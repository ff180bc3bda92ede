use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_diagnostics::OxcDiagnostic;
use oxc_parser::{ParseOptions, Parser, ParserReturn};
use oxc_span::SourceType;

/// Result of parsing a TypeScript declaration file.
///
/// The `Allocator` passed to [`parse_source`] owns the AST and must outlive
/// this value.
pub struct ParseResult<'a> {
    /// The parsed AST program.
    pub program: Program<'a>,
    /// Syntax errors encountered during parsing.
    pub errors: Vec<OxcDiagnostic>,
    /// Whether the parser panicked and terminated early.
    pub panicked: bool,
}

impl<'a> ParseResult<'a> {
    /// Returns `true` if parsing succeeded without errors.
    pub fn is_ok(&self) -> bool {
        !self.panicked && self.errors.is_empty()
    }

    /// Render every syntax error as a single line prefixed with `origin`.
    pub fn error_messages(&self, origin: &str) -> Vec<String> {
        self.errors.iter().map(|e| format!("{origin}: {e}")).collect()
    }
}

/// Parse TypeScript source text into an oxc AST.
///
/// `path` selects the `SourceType`. Files whose extension oxc does not
/// recognise are parsed as TypeScript definition files, which is what every
/// input to the translator is expected to be.
pub fn parse_source<'a>(
    allocator: &'a Allocator,
    source_text: &'a str,
    path: &Path,
) -> ParseResult<'a> {
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::d_ts());

    let ParserReturn {
        program,
        errors,
        panicked,
        ..
    } = Parser::new(allocator, source_text, source_type)
        .with_options(ParseOptions {
            preserve_parens: false,
            ..ParseOptions::default()
        })
        .parse();

    ParseResult {
        program,
        errors,
        panicked,
    }
}
