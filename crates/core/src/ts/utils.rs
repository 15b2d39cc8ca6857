//! Common utilities for TypeScript code generation.

use std::collections::HashSet;
use std::sync::LazyLock;

use sha2::{Digest, Sha256};

/// TypeScript reserved words that cannot be used as identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// Check if an identifier needs bracket notation (or quoting) for property/key access.
///
/// Returns true if the name:
/// - Is empty
/// - Doesn't start with a letter, underscore, or dollar sign
/// - Contains characters other than alphanumeric, underscore, or dollar sign
pub fn needs_bracket_notation(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for use in JavaScript/TypeScript string literals.
/// Escapes backslashes and double quotes.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quote a string if needed for use as a property key or enum key.
pub fn quote_if_needed(name: &str) -> String {
    if needs_bracket_notation(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// Format a property access expression (e.g., `query?.page` or `query?.["page-size"]`).
pub fn format_param_access(obj: &str, prop: &str, required: bool) -> String {
    if needs_bracket_notation(prop) {
        if required {
            format!("{}[\"{}\"]", obj, escape_js_string(prop))
        } else {
            format!("{}?.[\"{}\"]", obj, escape_js_string(prop))
        }
    } else if required {
        format!("{obj}.{prop}")
    } else {
        format!("{obj}?.{prop}")
    }
}

/// Sanitize a backend parameter name into a usable TypeScript identifier.
/// - Replaces invalid characters with `_`
/// - Prepends `_` if it starts with a digit
/// - Escapes reserved words with a `_` prefix
pub fn sanitize_ts_identifier(name: &str) -> String {
    if name.is_empty() {
        return "_empty".to_string();
    }

    let mut result: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();

    if result.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        result = format!("_{result}");
    }

    if TS_RESERVED_WORDS.contains(result.as_str()) {
        result = format!("_{result}");
    }

    result
}

/// Lowercase the first character (`Users` -> `users`).
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Stable, content-derived suffix for synthesized function names.
pub fn name_hash(qualified_name: &str) -> String {
    let digest = Sha256::digest(qualified_name.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_bracket_notation() {
        assert!(!needs_bracket_notation("foo"));
        assert!(!needs_bracket_notation("_foo"));
        assert!(!needs_bracket_notation("$foo"));
        assert!(!needs_bracket_notation("camelCase"));

        assert!(needs_bracket_notation(""));
        assert!(needs_bracket_notation("123foo"));
        assert!(needs_bracket_notation("foo-bar"));
        assert!(needs_bracket_notation("foo.bar"));
    }

    #[test]
    fn test_escape_js_string() {
        assert_eq!(escape_js_string("hello"), "hello");
        assert_eq!(escape_js_string("hel\"lo"), "hel\\\"lo");
        assert_eq!(escape_js_string("hel\\lo"), "hel\\\\lo");
    }

    #[test]
    fn test_quote_if_needed() {
        assert_eq!(quote_if_needed("foo"), "foo");
        assert_eq!(quote_if_needed("foo-bar"), "\"foo-bar\"");
        assert_eq!(quote_if_needed("123"), "\"123\"");
    }

    #[test]
    fn test_format_param_access() {
        assert_eq!(format_param_access("query", "page", true), "query.page");
        assert_eq!(format_param_access("query", "page", false), "query?.page");
        assert_eq!(
            format_param_access("query", "page-size", false),
            "query?.[\"page-size\"]"
        );
    }

    #[test]
    fn test_sanitize_ts_identifier() {
        assert_eq!(sanitize_ts_identifier("id"), "id");
        assert_eq!(sanitize_ts_identifier("userId"), "userId");
        assert_eq!(sanitize_ts_identifier("page-size"), "page_size");
        assert_eq!(sanitize_ts_identifier("1st"), "_1st");
        assert_eq!(sanitize_ts_identifier("new"), "_new");
        assert_eq!(sanitize_ts_identifier("delete"), "_delete");
    }

    #[test]
    fn test_lower_first() {
        assert_eq!(lower_first("Users"), "users");
        assert_eq!(lower_first(""), "");
    }

    #[test]
    fn test_name_hash_is_stable() {
        let first = name_hash("MyApp.User");
        assert_eq!(first.len(), 16);
        assert_eq!(first, name_hash("MyApp.User"));
        assert_ne!(first, name_hash("MyApp.Order"));
    }
}
