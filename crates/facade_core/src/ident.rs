//! Identifier validity for the target language.
//!
//! Reserved words can never be plain identifiers. Built-in identifiers are
//! legal for members and variables but not as type names. Either case is
//! repaired with a `$` prefix, which no source identifier can collide with
//! once applied consistently. Names containing characters that no identifier
//! may contain are unusable.

use crate::names::NameKind;

/// Prefix that turns a rejected-but-well-formed name into a legal one.
pub const ESCAPE_PREFIX: char = '$';

/// Words that are never valid identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "assert", "break", "case", "catch", "class", "const", "continue", "default", "do", "else",
    "enum", "extends", "false", "final", "finally", "for", "if", "in", "is", "new", "null",
    "rethrow", "return", "super", "switch", "this", "throw", "true", "try", "var", "void",
    "while", "with",
];

/// Words that may name members and variables but not types.
pub const BUILT_IN_IDENTIFIERS: &[&str] = &[
    "abstract",
    "as",
    "covariant",
    "deferred",
    "dynamic",
    "export",
    "extension",
    "external",
    "factory",
    "Function",
    "get",
    "implements",
    "import",
    "interface",
    "late",
    "library",
    "mixin",
    "operator",
    "part",
    "required",
    "set",
    "static",
    "typedef",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    /// The name can be used verbatim.
    Usable,
    /// The name must be replaced by this escaped form everywhere.
    Escaped(String),
    /// No legal rendering exists.
    Unusable,
}

impl Validity {
    /// The name to emit, or `None` when the declaration must become a stub.
    pub fn rendered(self, name: &str) -> Option<String> {
        match self {
            Validity::Usable => Some(name.to_string()),
            Validity::Escaped(escaped) => Some(escaped),
            Validity::Unusable => None,
        }
    }
}

/// Check `name` for use as an identifier of the given kind.
pub fn validate(name: &str, kind: NameKind) -> Validity {
    if name.is_empty() || !name.chars().all(is_identifier_part) {
        return Validity::Unusable;
    }

    let starts_with_digit = name.chars().next().is_some_and(|c| c.is_ascii_digit());
    let reserved = RESERVED_WORDS.contains(&name)
        || (kind == NameKind::Type && BUILT_IN_IDENTIFIERS.contains(&name));

    if starts_with_digit || reserved {
        Validity::Escaped(format!("{ESCAPE_PREFIX}{name}"))
    } else {
        Validity::Usable
    }
}

/// Shorthand for [`validate`] followed by [`Validity::rendered`].
pub fn escape(name: &str, kind: NameKind) -> Option<String> {
    validate(name, kind).rendered(name)
}

/// Whether `name` is legal verbatim.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(is_identifier_part)
        && !name.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Replace every illegal character by `_`, for synthesized names that must
/// exist even when their source name is unusable.
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if is_identifier_part(c) { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, ESCAPE_PREFIX);
    }
    out
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_are_usable() {
        assert_eq!(validate("foo", NameKind::Value), Validity::Usable);
        assert_eq!(validate("$bar_1", NameKind::Type), Validity::Usable);
    }

    #[test]
    fn test_reserved_words_are_escaped() {
        assert_eq!(
            validate("class", NameKind::Value),
            Validity::Escaped("$class".to_string())
        );
        assert_eq!(escape("default", NameKind::Type).as_deref(), Some("$default"));
    }

    #[test]
    fn test_built_in_identifiers_only_rejected_as_type_names() {
        assert_eq!(validate("get", NameKind::Value), Validity::Usable);
        assert_eq!(
            validate("get", NameKind::Type),
            Validity::Escaped("$get".to_string())
        );
        assert_eq!(validate("dynamic", NameKind::Value), Validity::Usable);
    }

    #[test]
    fn test_leading_digit_is_escaped() {
        assert_eq!(escape("2d", NameKind::Value).as_deref(), Some("$2d"));
    }

    #[test]
    fn test_illegal_characters_are_unusable() {
        assert_eq!(validate("foo-bar", NameKind::Value), Validity::Unusable);
        assert_eq!(validate("", NameKind::Value), Validity::Unusable);
        assert_eq!(escape("a b", NameKind::Type), None);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("foo-bar"), "foo_bar");
        assert_eq!(sanitize("9lives"), "$9lives");
        assert!(is_identifier(&sanitize("@scope/pkg")));
    }
}
