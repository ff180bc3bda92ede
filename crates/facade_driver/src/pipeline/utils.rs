use oxc_ast::ast::*;
use oxc_span::Span;

/// Name bound by a simple binding; destructuring patterns have none.
pub(crate) fn binding_name(pattern: &BindingPattern<'_>) -> Option<String> {
    match pattern {
        BindingPattern::BindingIdentifier(id) => Some(id.name.to_string()),
        _ => None,
    }
}

/// Statically known member name. Computed and `#private` keys have none.
pub(crate) fn property_key_name(key: &PropertyKey<'_>) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(id.name.to_string()),
        PropertyKey::StringLiteral(s) => Some(s.value.to_string()),
        _ => None,
    }
}

pub(crate) fn enum_member_name(name: &TSEnumMemberName<'_>) -> Option<String> {
    match name {
        TSEnumMemberName::Identifier(id) => Some(id.name.to_string()),
        TSEnumMemberName::String(s) => Some(s.value.to_string()),
        _ => None,
    }
}

pub(crate) fn ts_type_name_string(name: &TSTypeName<'_>) -> String {
    match name {
        TSTypeName::IdentifierReference(id) => id.name.to_string(),
        TSTypeName::QualifiedName(q) => {
            let left = ts_type_name_string(&q.left);
            let right = q.right.name.to_string();
            format!("{left}.{right}")
        }
        TSTypeName::ThisExpression(_) => "this".to_string(),
    }
}

/// Dotted name of an `extends` expression such as `ns.Base`.
pub(crate) fn expression_name(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::Identifier(id) => Some(id.name.to_string()),
        Expression::StaticMemberExpression(member) => {
            let object = expression_name(&member.object)?;
            Some(format!("{object}.{}", member.property.name))
        }
        _ => None,
    }
}

/// The source text covered by `span`, empty if it is out of range.
pub(crate) fn span_text(source: &str, span: Span) -> &str {
    source
        .get(span.start as usize..span.end as usize)
        .unwrap_or_default()
}

/// Module name of an input path: the file name without its TypeScript
/// extensions (`lib/dom.d.ts` → `dom`).
pub(crate) fn module_stem(path: &std::path::Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    const SUFFIXES: &[&str] = &[".d.ts", ".d.mts", ".d.cts", ".ts", ".tsx", ".mts", ".cts"];
    SUFFIXES
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .unwrap_or(&file_name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_module_stem() {
        assert_eq!(module_stem(Path::new("lib/dom.d.ts")), "dom");
        assert_eq!(module_stem(Path::new("a.ts")), "a");
        assert_eq!(module_stem(Path::new("noext")), "noext");
    }

    #[test]
    fn test_span_text_out_of_range() {
        assert_eq!(span_text("abc", Span::new(1, 3)), "bc");
        assert_eq!(span_text("abc", Span::new(2, 10)), "");
    }
}
