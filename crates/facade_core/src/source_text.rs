//! Source-syntax printing of type expressions.
//!
//! Annotations describe what was lost, so they are written in the source
//! language rather than the target: `number|string`, `[A, B]`,
//! `(a: string, ...rest: any[]) => void`.

use crate::symbols::SymbolSource;
use crate::types::{FunctionSig, Member, MemberKind, Param, TypeRef};

/// Print a type as it would be written in the source.
pub fn type_text(ty: &TypeRef, symbols: &dyn SymbolSource) -> String {
    let mut out = String::new();
    write_type(&mut out, ty, symbols, false);
    out
}

/// Print a signature the way a member would declare it, e.g.
/// `foo(a: string): number`, `new (x: X): Y` or `[key: string]: V`.
pub fn member_signature_text(member: &Member, symbols: &dyn SymbolSource) -> String {
    let mut out = String::new();
    let name = member.name.as_deref().unwrap_or("");
    if member.is_static {
        out.push_str("static ");
    }
    match &member.kind {
        MemberKind::Property { ty, optional, readonly } => {
            if *readonly {
                out.push_str("readonly ");
            }
            out.push_str(name);
            if *optional {
                out.push('?');
            }
            out.push_str(": ");
            write_type(&mut out, ty, symbols, false);
        }
        MemberKind::Method { sig, optional } => {
            out.push_str(name);
            if *optional {
                out.push('?');
            }
            write_signature(&mut out, sig, symbols, ": ");
        }
        MemberKind::Call(sig) => write_signature(&mut out, sig, symbols, ": "),
        MemberKind::Construct(sig) => {
            out.push_str("new ");
            write_signature(&mut out, sig, symbols, ": ");
        }
        MemberKind::Index(sig) => {
            out.push('[');
            write_params(&mut out, &sig.params, symbols);
            out.push_str("]: ");
            write_type(&mut out, &sig.return_type, symbols, false);
        }
        MemberKind::Nested(id) => {
            out.push_str(&symbols.qualified_name(*id));
        }
    }
    out
}

/// Print a function type, e.g. `(a: string) => number`.
pub fn function_type_text(sig: &FunctionSig, symbols: &dyn SymbolSource) -> String {
    let mut out = String::new();
    write_signature(&mut out, sig, symbols, " => ");
    out
}

fn write_type(out: &mut String, ty: &TypeRef, symbols: &dyn SymbolSource, operand: bool) {
    match ty {
        TypeRef::Primitive(kind) => out.push_str(kind.keyword()),
        TypeRef::Nominal { symbol, type_args } => {
            out.push_str(&display_name(*symbol, symbols));
            write_type_args(out, type_args, symbols);
        }
        TypeRef::Alias(symbol) => out.push_str(&display_name(*symbol, symbols)),
        TypeRef::Function(sig) => {
            if operand {
                out.push('(');
            }
            write_signature(out, sig, symbols, " => ");
            if operand {
                out.push(')');
            }
        }
        TypeRef::Array(elem) => {
            write_type(out, elem, symbols, true);
            out.push_str("[]");
        }
        TypeRef::Tuple(elems) => {
            out.push('[');
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type(out, elem, symbols, false);
            }
            out.push(']');
        }
        TypeRef::Structural(members) => {
            out.push('{');
            for (i, member) in members.iter().enumerate() {
                out.push_str(if i == 0 { " " } else { "; " });
                out.push_str(&member_signature_text(member, symbols));
            }
            out.push_str(if members.is_empty() { "}" } else { " }" });
        }
        TypeRef::TypeParam(name) => out.push_str(name),
        TypeRef::Literal { text, .. } => out.push_str(text),
        TypeRef::Union(members) => write_joined(out, members, "|", symbols, operand),
        TypeRef::Intersection(members) => write_joined(out, members, "&", symbols, operand),
        TypeRef::Unresolved(text) => out.push_str(text),
    }
}

fn write_joined(
    out: &mut String,
    members: &[TypeRef],
    op: &str,
    symbols: &dyn SymbolSource,
    operand: bool,
) {
    if operand {
        out.push('(');
    }
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            out.push_str(op);
        }
        write_type(out, member, symbols, true);
    }
    if operand {
        out.push(')');
    }
}

fn write_type_args(out: &mut String, args: &[TypeRef], symbols: &dyn SymbolSource) {
    if args.is_empty() {
        return;
    }
    out.push('<');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_type(out, arg, symbols, false);
    }
    out.push('>');
}

fn write_signature(out: &mut String, sig: &FunctionSig, symbols: &dyn SymbolSource, arrow: &str) {
    if !sig.type_params.is_empty() {
        out.push('<');
        out.push_str(&sig.type_params.join(", "));
        out.push('>');
    }
    out.push('(');
    write_params(out, &sig.params, symbols);
    out.push(')');
    out.push_str(arrow);
    write_type(out, &sig.return_type, symbols, false);
}

fn write_params(out: &mut String, params: &[Param], symbols: &dyn SymbolSource) {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if param.rest {
            out.push_str("...");
        }
        out.push_str(&param.name);
        if param.optional && !param.rest {
            out.push('?');
        }
        out.push_str(": ");
        write_type(out, &param.ty, symbols, false);
    }
}

fn display_name(symbol: crate::types::SymbolId, symbols: &dyn SymbolSource) -> String {
    match symbols.symbol(symbol) {
        Some(info) => info.name.clone(),
        None => format!("<symbol {}>", symbol.0),
    }
}
