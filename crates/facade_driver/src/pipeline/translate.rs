use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use facade_core::{
    Diagnostic, FileId, LibraryId, ReportMode, SymbolKind, SymbolTable, TranslateError,
    TranslationContext, UnionPolicy, ident,
};
use facade_emit::DeclId;
use facade_frontend::Allocator;
use facade_frontend::{parse, semantic};
use indexmap::IndexMap;
use oxc_ast::ast::Program;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::collect::{Collector, Declared, Pass};
use super::emit::DeclarationVisitor;
use super::prelude::register_platform_types;
use super::utils::module_stem;

/// Translation options.
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Whether the first diagnostic aborts the run.
    pub report_mode: ReportMode,
    /// How unions with several concrete members are displayed.
    pub union_policy: UnionPolicy,
    /// Translate every input into one library of this name.
    pub merge_group: Option<String>,
    /// Directory the units are written to by [`translate_files`].
    pub output_dir: Option<PathBuf>,
}

/// Errors that stop a run before any output exists.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error(s):\n{}", .0.join("\n"))]
    Parse(Vec<String>),

    #[error("semantic error(s):\n{}", .0.join("\n"))]
    Semantic(Vec<String>),

    #[error(transparent)]
    Translate(#[from] TranslateError),
}

/// One input file, already read.
#[derive(Debug, Clone)]
pub struct SourceInput {
    pub path: PathBuf,
    pub text: String,
}

impl SourceInput {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// A diagnostic together with the input it was raised in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiagnostic {
    pub path: PathBuf,
    pub diagnostic: Diagnostic,
}

impl fmt::Display for FileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.diagnostic)
    }
}

/// One output library.
#[derive(Debug, Clone)]
pub struct TranslatedUnit {
    pub library: String,
    pub file_name: String,
    pub text: String,
    /// Everything reported while producing `text`. Non-empty means the text
    /// is a best-effort rendering.
    pub diagnostics: Vec<FileDiagnostic>,
    /// Why translation of this unit was abandoned. `text` is then empty and
    /// the unit is never written.
    pub failure: Option<TranslateError>,
}

impl TranslatedUnit {
    /// The aggregate failure for this unit, if anything was reported.
    pub fn status(&self) -> Result<(), TranslateError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(TranslateError::Batch {
                diagnostics: self.diagnostics.iter().map(|d| d.diagnostic.clone()).collect(),
            })
        }
    }

    /// Write the unit into `dir`, returning the written path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, DriverError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.text).map_err(|source| DriverError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Read and translate `paths`, writing the units to `options.output_dir`
/// when one is set. Abandoned units are not written.
pub fn translate_files(paths: &[PathBuf], options: &TranslateOptions) -> Result<Vec<TranslatedUnit>, DriverError> {
    let inputs = paths
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .map(|text| SourceInput::new(path.clone(), text))
                .map_err(|source| DriverError::Io {
                    path: path.clone(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let units = translate_sources(&inputs, options)?;

    if let Some(dir) = &options.output_dir {
        std::fs::create_dir_all(dir).map_err(|source| DriverError::Io {
            path: dir.clone(),
            source,
        })?;
        for unit in units.iter().filter(|unit| unit.failure.is_none()) {
            let path = unit.write_to(dir)?;
            info!(path = %path.display(), "wrote library");
        }
    }
    Ok(units)
}

/// Translate already-read sources.
///
/// Pipeline:
/// 1. Parse and check every input (oxc parser + semantic)
/// 2. Declare every symbol of every input, then define them
/// 3. Create one library per input, or one for the merge group
/// 4. Allocate names in declaration order
/// 5. Emit each library
///
/// Only unreadable or malformed input fails the whole run. An error while
/// emitting one library abandons that unit alone; see
/// [`TranslatedUnit::failure`].
pub fn translate_sources(inputs: &[SourceInput], options: &TranslateOptions) -> Result<Vec<TranslatedUnit>, DriverError> {
    let allocators: Vec<Allocator> = inputs.iter().map(|_| Allocator::default()).collect();
    let mut programs = Vec::with_capacity(inputs.len());
    for (input, allocator) in inputs.iter().zip(&allocators) {
        programs.push(parse_checked(allocator, input)?);
    }

    let modules = module_names(inputs);
    let mut table = SymbolTable::new();
    register_platform_types(&mut table);
    let mut declared = Declared::new();
    let mut lowering: Vec<Vec<Diagnostic>> = vec![Vec::new(); inputs.len()];
    for pass in [Pass::Declare, Pass::Define] {
        for (i, program) in programs.iter().enumerate() {
            let collector = Collector::new(
                &mut table,
                &mut declared,
                FileId(i as u32),
                &modules[i],
                &inputs[i].text,
                pass,
            );
            lowering[i].extend(collector.run(program));
        }
    }
    debug!(symbols = table.len(), files = inputs.len(), "collected declarations");

    // Library name → member files, in input order.
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (i, module) in modules.iter().enumerate() {
        let name = options.merge_group.clone().unwrap_or_else(|| module.clone());
        groups.entry(name).or_default().push(i);
    }

    let mut ctx = TranslationContext::new(&table, options.report_mode, options.union_policy);
    let mut libraries = Vec::with_capacity(groups.len());
    for (name, files) in &groups {
        let library = ctx.add_library(name.clone());
        for &i in files {
            ctx.assign_file(FileId(i as u32), library);
        }
        libraries.push(library);
    }
    preallocate(&mut ctx, &table)?;

    let mut units = Vec::with_capacity(groups.len());
    for ((name, files), library) in groups.iter().zip(libraries) {
        units.push(emit_library(&mut ctx, &table, inputs, &lowering, name, files, library));
    }
    Ok(units)
}

fn parse_checked<'a>(allocator: &'a Allocator, input: &'a SourceInput) -> Result<Program<'a>, DriverError> {
    let origin = input.path.display().to_string();
    let result = parse::parse_source(allocator, &input.text, &input.path);
    if !result.is_ok() {
        return Err(DriverError::Parse(result.error_messages(&origin)));
    }

    let errors = semantic::semantic_errors(&result.program);
    if !errors.is_empty() {
        return Err(DriverError::Semantic(
            errors.iter().map(|e| format!("{origin}: {e}")).collect(),
        ));
    }
    Ok(result.program)
}

/// File stems, made unique with a `_2`, `_3`, ... suffix. Every stem as
/// written is reserved first, so a suffixed name never lands on another
/// input's stem.
fn module_names(inputs: &[SourceInput]) -> Vec<String> {
    let stems: Vec<String> = inputs.iter().map(|input| module_stem(&input.path)).collect();
    let mut taken: HashSet<String> = stems.iter().cloned().collect();
    let mut seen = HashSet::new();
    stems
        .into_iter()
        .map(|stem| {
            if seen.insert(stem.clone()) {
                return stem;
            }
            let name = (2u32..)
                .map(|n| format!("{stem}_{n}"))
                .find(|candidate| !taken.contains(candidate))
                .unwrap_or_else(|| stem.clone());
            taken.insert(name.clone());
            name
        })
        .collect()
}

/// Allocate every flat name up front, in registration order, so a name
/// never depends on which declaration happened to reference it first.
fn preallocate(ctx: &mut TranslationContext<'_>, table: &SymbolTable) -> Result<(), TranslateError> {
    for (_, info) in table.iter() {
        let named = matches!(
            info.kind,
            SymbolKind::Class
                | SymbolKind::Interface
                | SymbolKind::Enum
                | SymbolKind::Function
                | SymbolKind::Variable
        );
        if !named || info.external_name.is_some() || !info.has_legal_name() {
            continue;
        }
        let Some(library) = ctx.library_of(info.file) else {
            continue;
        };
        ctx.at(info.span);
        ctx.allocate(&info.path, library)?;
    }
    Ok(())
}

fn emit_library<'s>(
    ctx: &mut TranslationContext<'s>,
    table: &'s SymbolTable,
    inputs: &[SourceInput],
    lowering: &[Vec<Diagnostic>],
    name: &str,
    files: &[usize],
    library: LibraryId,
) -> TranslatedUnit {
    let mut visitor = DeclarationVisitor::new(ctx, table);
    let root = visitor.begin(library, name);
    let mut diagnostics = Vec::new();
    let mut failure = None;

    for &i in files {
        let outcome = emit_file(&mut visitor, &lowering[i], FileId(i as u32), root);
        diagnostics.extend(visitor.context().take_diagnostics().into_iter().map(|diagnostic| FileDiagnostic {
            path: inputs[i].path.clone(),
            diagnostic,
        }));
        if let Err(error) = outcome {
            warn!(library = name, path = %inputs[i].path.display(), %error, "translation abandoned");
            failure = Some(error);
            break;
        }
    }

    let text = match failure {
        None => visitor.finish(library, root),
        Some(_) => String::new(),
    };
    info!(library = name, diagnostics = diagnostics.len(), "translated library");
    TranslatedUnit {
        library: name.to_string(),
        file_name: format!("{}.dart", ident::sanitize(name)),
        text,
        diagnostics,
        failure,
    }
}

/// Replay the lowering diagnostics of one file, then emit its declarations.
fn emit_file(
    visitor: &mut DeclarationVisitor<'_, '_>,
    lowering: &[Diagnostic],
    file: FileId,
    root: DeclId,
) -> Result<(), TranslateError> {
    for diagnostic in lowering {
        visitor.context().report(diagnostic.clone())?;
    }
    visitor.emit_file(file, root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(sources: &[(&str, &str)], options: &TranslateOptions) -> Vec<TranslatedUnit> {
        let inputs: Vec<SourceInput> = sources
            .iter()
            .map(|(path, text)| SourceInput::new(*path, *text))
            .collect();
        translate_sources(&inputs, options).unwrap()
    }

    fn translate_one(source: &str) -> TranslatedUnit {
        translate(&[("m.d.ts", source)], &TranslateOptions::default()).remove(0)
    }

    #[test]
    fn test_overloaded_function() {
        let unit = translate_one(
            "declare function f(a: string): number;\n\
             declare function f(a: string, b: number): string;\n",
        );
        let expected = "\
@JS()
library m;

import 'package:js/js.dart';

/// f(a: string): number
/// f(a: string, b: number): string
@JS()
external dynamic /*number|string*/ f(String a, [num b]);
";
        assert_eq!(unit.text, expected);
        assert!(unit.status().is_ok());
        assert_eq!(unit.file_name, "m.dart");
    }

    #[test]
    fn test_interface_with_members() {
        let unit = translate_one(
            "interface Point {\n\
               x: number;\n\
               readonly label?: string;\n\
               move(dx: number, dy?: number): Point;\n\
               [key: string]: any;\n\
             }\n",
        );
        let expected = "\
@JS()
library m;

import 'package:js/js.dart';

@JS()
@anonymous
abstract class Point {
  external num get x;
  external set x(num value);
  external String get label;
  external Point move(num dx, [num dy]);
  external dynamic operator [](String key);
  external void operator []=(String key, dynamic value);
}
";
        assert_eq!(unit.text, expected);
    }

    #[test]
    fn test_namespace_members_are_qualified() {
        let unit = translate_one(
            "declare namespace ns {\n\
               class Foo { constructor(n: number); static create(): Foo; }\n\
               function helper(): void;\n\
             }\n",
        );
        let expected = "\
@JS()
library m;

import 'package:js/js.dart';

@JS(\"ns.Foo\")
class Foo {
  external factory Foo(num n);
  external static Foo create();
}

@JS(\"ns.helper\")
external void helper();
";
        assert_eq!(unit.text, expected);
    }

    #[test]
    fn test_merge_group_renames_duplicates() {
        let options = TranslateOptions {
            merge_group: Some("facade".to_string()),
            ..TranslateOptions::default()
        };
        let units = translate(
            &[
                ("m1.d.ts", "declare class A {}"),
                ("m2.d.ts", "declare class A { other: A; }"),
            ],
            &options,
        );
        assert_eq!(units.len(), 1);
        let expected = "\
@JS()
library facade;

import 'package:js/js.dart';

@JS()
class A {
}

@JS(\"A\")
class m2_A {
  external m2_A get other;
  external set other(m2_A value);
}
";
        assert_eq!(units[0].text, expected);
        assert_eq!(units[0].file_name, "facade.dart");
    }

    #[test]
    fn test_separate_libraries_import_each_other() {
        let units = translate(
            &[
                ("base.d.ts", "interface Base { id: string; }"),
                ("app.d.ts", "interface App extends Base { run(): Promise<void>; }"),
            ],
            &TranslateOptions::default(),
        );
        assert_eq!(units.len(), 2);
        let expected = "\
@JS()
library app;

import 'package:js/js.dart';
import 'base.dart';

@JS()
@anonymous
abstract class App implements Base {
  external Future run();
}
";
        assert_eq!(units[1].text, expected);
    }

    #[test]
    fn test_union_with_one_concrete_member() {
        let unit = translate_one(
            "interface X {}\n\
             declare let value: X | undefined | any;\n",
        );
        assert!(unit.text.contains("external X /*X|undefined|any*/ get value;\n"), "{}", unit.text);
    }

    #[test]
    fn test_unresolved_reference_is_best_effort() {
        let unit = translate_one("declare function load(): Missing<string>;");
        assert!(unit.text.contains("external dynamic /*Missing<string>*/ load();\n"), "{}", unit.text);
        assert_eq!(unit.diagnostics.len(), 1);
        assert!(matches!(
            unit.diagnostics[0].diagnostic,
            Diagnostic::SymbolResolution { ref name, .. } if name == "Missing"
        ));
        assert!(matches!(unit.status(), Err(TranslateError::Batch { .. })));
    }

    #[test]
    fn test_fail_fast_aborts() {
        let options = TranslateOptions {
            report_mode: ReportMode::FailFast,
            ..TranslateOptions::default()
        };
        let unit = translate(&[("m.d.ts", "declare let x: { [K in 'a']: K };")], &options).remove(0);
        assert!(unit.text.is_empty());
        assert!(matches!(
            unit.status(),
            Err(TranslateError::Aborted(Diagnostic::Unsupported { .. }))
        ));
    }

    #[test]
    fn test_fail_fast_keeps_other_units() {
        let options = TranslateOptions {
            report_mode: ReportMode::FailFast,
            ..TranslateOptions::default()
        };
        let units = translate(
            &[
                ("a.d.ts", "declare class A {}"),
                ("b.d.ts", "declare let v: Missing;"),
            ],
            &options,
        );
        assert_eq!(units.len(), 2);
        assert!(units[0].status().is_ok());
        assert!(units[0].text.contains("class A {\n"), "{}", units[0].text);
        assert!(units[1].text.is_empty());
        assert!(matches!(
            units[1].failure,
            Some(TranslateError::Aborted(Diagnostic::SymbolResolution { ref name, .. })) if name == "Missing"
        ));
    }

    #[test]
    fn test_aliases_are_inlined() {
        let unit = translate_one(
            "type Id = string;\n\
             type Box<T> = T[];\n\
             declare function get(id: Id): Box<number>;\n",
        );
        assert!(unit.text.contains("external List<num> get(String id);\n"), "{}", unit.text);
    }

    #[test]
    fn test_unusable_member_name_becomes_stub() {
        let unit = translate_one("interface Headers { 'content-type': string; }");
        assert!(unit.text.contains("  // external String get content-type;\n"), "{}", unit.text);
    }

    #[test]
    fn test_reserved_member_name_is_escaped() {
        let unit = translate_one("interface Opts { default: boolean; }");
        assert!(unit.text.contains("  @JS(\"default\")\n  external bool get $default;\n"), "{}", unit.text);
    }

    #[test]
    fn test_parse_error() {
        let inputs = [SourceInput::new("bad.d.ts", "interface {")];
        let err = translate_sources(&inputs, &TranslateOptions::default()).unwrap_err();
        assert!(matches!(err, DriverError::Parse(ref messages) if !messages.is_empty()));
    }

    #[test]
    fn test_semantic_error_names_the_file() {
        let inputs = [SourceInput::new("dup.d.ts", "declare let a: number;\ndeclare let a: string;")];
        let err = translate_sources(&inputs, &TranslateOptions::default()).unwrap_err();
        match err {
            DriverError::Semantic(messages) => {
                assert!(!messages.is_empty());
                assert!(messages.iter().all(|m| m.starts_with("dup.d.ts: ")), "{messages:?}");
            }
            other => panic!("expected a semantic error, got {other:?}"),
        }
    }

    #[test]
    fn test_module_names_are_unique() {
        let inputs = [
            SourceInput::new("a/x.d.ts", ""),
            SourceInput::new("b/x.d.ts", ""),
            SourceInput::new("y.ts", ""),
        ];
        assert_eq!(module_names(&inputs), ["x", "x_2", "y"]);
    }

    #[test]
    fn test_module_name_suffix_avoids_other_stems() {
        let inputs = [
            SourceInput::new("a/x.d.ts", ""),
            SourceInput::new("b/x.d.ts", ""),
            SourceInput::new("x_2.d.ts", ""),
        ];
        assert_eq!(module_names(&inputs), ["x", "x_3", "x_2"]);

        let units = translate(
            &[
                ("a/x.d.ts", "declare class A {}"),
                ("b/x.d.ts", "declare class B {}"),
                ("x_2.d.ts", "declare class C {}"),
            ],
            &TranslateOptions::default(),
        );
        let libraries: Vec<&str> = units.iter().map(|unit| unit.library.as_str()).collect();
        assert_eq!(libraries, ["x", "x_3", "x_2"]);
        assert!(units[1].text.contains("class B {"));
        assert!(!units[2].text.contains("class B {"), "{}", units[2].text);
    }

    #[test]
    fn test_rest_parameter_uses_element_type() {
        let unit = translate_one("declare function f(a: string, ...xs: number[]): void;");
        assert!(unit.text.contains("external void f(String a, [num xs]);\n"), "{}", unit.text);
        assert!(unit.status().is_ok());
    }

    #[test]
    fn test_rest_overload_merged_with_plain_is_optional() {
        let unit = translate_one(
            "declare function f(...xs: number[]): void;\n\
             declare function f(a: string): void;\n",
        );
        let expected = "\
/// f(...xs: number[]): void
/// f(a: string): void
@JS()
external void f([dynamic /*number|string*/ xs_a]);
";
        assert!(unit.text.ends_with(expected), "{}", unit.text);
    }

    #[test]
    fn test_unusable_top_level_names_become_stubs() {
        let unit = translate_one(
            "declare function café(): void;\n\
             declare class Été {}\n\
             declare let ok: Été;\n",
        );
        assert!(
            unit.text.contains("/// No legal name in the target; kept for reference.\n// external void café();\n"),
            "{}",
            unit.text
        );
        assert!(unit.text.contains("// class Été {}\n"), "{}", unit.text);
        assert!(unit.text.contains("external dynamic /*Été*/ get ok;\n"), "{}", unit.text);
        assert!(!unit.text.contains("caf_"), "{}", unit.text);
    }

    #[test]
    fn test_opaque_union_imports_nothing() {
        let units = translate(
            &[
                ("a.d.ts", "interface A {}"),
                ("b.d.ts", "interface B {}"),
                ("c.d.ts", "declare let v: A | B;\ndeclare let w: A | undefined;"),
            ],
            &TranslateOptions::default(),
        );
        let text = &units[2].text;
        assert!(text.contains("external dynamic /*A|B*/ get v;\n"), "{text}");
        assert!(text.contains("external A /*A|undefined*/ get w;\n"), "{text}");
        assert!(text.contains("import 'a.dart';\n"), "{text}");
        assert!(!text.contains("import 'b.dart';"), "{text}");
    }
}
