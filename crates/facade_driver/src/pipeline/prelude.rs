use facade_core::{SymbolInfo, SymbolTable};

/// Platform types every input may reference without declaring, and the
/// target type each one already exists as.
pub(crate) const PLATFORM_TYPES: &[(&str, &str)] = &[
    ("Promise", "Future"),
    ("PromiseLike", "Future"),
    ("Date", "DateTime"),
    ("RegExp", "RegExp"),
    ("Error", "Error"),
    ("Map", "Map"),
    ("ReadonlyMap", "Map"),
    ("Record", "Map"),
    ("Set", "Set"),
    ("ReadonlySet", "Set"),
    ("Iterable", "Iterable"),
    ("Iterator", "Iterator"),
    ("ArrayLike", "List"),
    ("Object", "Object"),
    ("Function", "Function"),
    ("String", "String"),
    ("Number", "num"),
    ("Boolean", "bool"),
];

/// Element-type wrappers lowered straight to arrays.
pub(crate) const ARRAY_TYPES: &[&str] = &["Array", "ReadonlyArray"];

/// Register every platform type. Input declarations of the same name take
/// precedence during lookup.
pub(crate) fn register_platform_types(table: &mut SymbolTable) {
    for (name, target) in PLATFORM_TYPES {
        table.register(SymbolInfo::external(*name, *target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facade_core::{FileId, SymbolKind, SymbolSource};

    #[test]
    fn test_platform_types_resolve() {
        let mut table = SymbolTable::new();
        register_platform_types(&mut table);
        let id = table
            .lookup(&["Promise".to_string()], FileId(0), SymbolKind::is_type)
            .unwrap();
        assert_eq!(
            table.symbol(id).and_then(|s| s.external_name.as_deref()),
            Some("Future")
        );
    }
}
