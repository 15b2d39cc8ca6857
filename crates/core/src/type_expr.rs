//! Parser for backend type expressions.
//!
//! Backend types are referenced by strings in the backend's own notation:
//! `MyApp.Models.User`, `System.Collections.Generic.List<MyApp.Item>`,
//! `MyApp.Item[]`, `int?`, ``Dictionary`2<string, int>``. Keyword aliases
//! are canonicalized (`int` becomes `System.Int32`), arity suffixes are
//! dropped and the `?` suffix is desugared to `System.Nullable<T>`.

use std::fmt;

use crate::error::{GenError, Result};

pub const NULLABLE: &str = "System.Nullable";

/// A parsed backend type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Named { name: String, args: Vec<TypeExpr> },
    Array(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser {
            input,
            chars: input.char_indices().peekable(),
        };
        let expr = parser.parse_expr()?;
        parser.skip_ws();
        if let Some(&(_, c)) = parser.chars.peek() {
            return Err(parser.error(format!("unexpected '{c}'")));
        }
        Ok(expr)
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Base name without generic arguments. Arrays report `[]`.
    pub fn name(&self) -> &str {
        match self {
            TypeExpr::Named { name, .. } => name,
            TypeExpr::Array(_) => "[]",
        }
    }

    pub fn args(&self) -> &[TypeExpr] {
        match self {
            TypeExpr::Named { args, .. } => args,
            TypeExpr::Array(_) => &[],
        }
    }

    /// The inner type of `System.Nullable<T>`, if this is one.
    pub fn nullable_inner(&self) -> Option<&TypeExpr> {
        match self {
            TypeExpr::Named { name, args } if name == NULLABLE && args.len() == 1 => args.first(),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeExpr::Array(inner) => write!(f, "{inner}[]"),
        }
    }
}

/// Split a qualified name into `(namespace, simple name)`.
///
/// Nested types (`Outer+Inner`) keep the `+` in the simple name; callers
/// decide how to spell it in TypeScript.
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.rfind('.') {
        Some(idx) => (Some(&name[..idx]), &name[idx + 1..]),
        None => (None, name),
    }
}

/// Map C# keyword aliases to their framework names.
pub fn canonical_alias(name: &str) -> &str {
    match name {
        "bool" => "System.Boolean",
        "byte" => "System.Byte",
        "sbyte" => "System.SByte",
        "short" => "System.Int16",
        "ushort" => "System.UInt16",
        "int" => "System.Int32",
        "uint" => "System.UInt32",
        "long" => "System.Int64",
        "ulong" => "System.UInt64",
        "float" => "System.Single",
        "double" => "System.Double",
        "decimal" => "System.Decimal",
        "string" => "System.String",
        "char" => "System.Char",
        "object" => "System.Object",
        "void" => "System.Void",
        other => other,
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> GenError {
        GenError::MalformedType {
            expr: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn skip_ws(&mut self) {
        while self.chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn parse_expr(&mut self) -> Result<TypeExpr> {
        self.skip_ws();
        let mut name = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '.' | '+' | '`') {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error("expected a type name"));
        }
        if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
            return Err(self.error(format!("invalid type name '{name}'")));
        }

        // `List`1` -> `List`
        if let Some(idx) = name.find('`') {
            let arity = &name[idx + 1..];
            if arity.is_empty() || !arity.chars().all(|c| c.is_ascii_digit()) {
                return Err(self.error(format!("invalid arity suffix in '{name}'")));
            }
            name.truncate(idx);
        }

        let mut args = Vec::new();
        self.skip_ws();
        if self.chars.peek().is_some_and(|(_, c)| *c == '<') {
            self.chars.next();
            loop {
                args.push(self.parse_expr()?);
                self.skip_ws();
                match self.chars.next() {
                    Some((_, ',')) => {}
                    Some((_, '>')) => break,
                    Some((_, c)) => return Err(self.error(format!("unexpected '{c}' in generic arguments"))),
                    None => return Err(self.error("unterminated generic argument list")),
                }
            }
        }

        let mut expr = TypeExpr::Named {
            name: canonical_alias(&name).to_string(),
            args,
        };

        loop {
            self.skip_ws();
            match self.chars.peek() {
                Some((_, '?')) => {
                    self.chars.next();
                    expr = TypeExpr::Named {
                        name: NULLABLE.to_string(),
                        args: vec![expr],
                    };
                }
                Some((_, '[')) => {
                    self.chars.next();
                    // Multi-dimensional arrays (`[,]`) are treated as flat sequences.
                    loop {
                        match self.chars.next() {
                            Some((_, ']')) => break,
                            Some((_, ',')) => {}
                            Some((_, c)) => return Err(self.error(format!("unexpected '{c}' in array rank"))),
                            None => return Err(self.error("unterminated array rank")),
                        }
                    }
                    expr = TypeExpr::Array(Box::new(expr));
                }
                _ => break,
            }
        }

        Ok(expr)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_name() {
        let expr = TypeExpr::parse("MyApp.Models.User").unwrap();
        assert_eq!(expr, TypeExpr::named("MyApp.Models.User"));
        assert_eq!(expr.to_string(), "MyApp.Models.User");
    }

    #[test]
    fn test_parse_generic_with_arity_suffix() {
        let expr = TypeExpr::parse("System.Collections.Generic.Dictionary`2<string, int>").unwrap();
        assert_eq!(expr.name(), "System.Collections.Generic.Dictionary");
        assert_eq!(
            expr.to_string(),
            "System.Collections.Generic.Dictionary<System.String, System.Int32>"
        );
    }

    #[test]
    fn test_parse_nullable_sugar() {
        let expr = TypeExpr::parse("int?").unwrap();
        assert_eq!(expr.to_string(), "System.Nullable<System.Int32>");
        assert_eq!(expr.nullable_inner(), Some(&TypeExpr::named("System.Int32")));
    }

    #[test]
    fn test_parse_arrays() {
        let expr = TypeExpr::parse("MyApp.Item[][]").unwrap();
        assert_eq!(expr.to_string(), "MyApp.Item[][]");
        let expr = TypeExpr::parse("byte[]").unwrap();
        assert_eq!(expr, TypeExpr::Array(Box::new(TypeExpr::named("System.Byte"))));
    }

    #[test]
    fn test_parse_nested_generics() {
        let expr = TypeExpr::parse("Task<List<MyApp.Page<MyApp.Item>>>").unwrap();
        assert_eq!(expr.to_string(), "Task<List<MyApp.Page<MyApp.Item>>>");
        assert_eq!(expr.args().len(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(TypeExpr::parse("").is_err());
        assert!(TypeExpr::parse("List<").is_err());
        assert!(TypeExpr::parse("List<int").is_err());
        assert!(TypeExpr::parse("Foo..Bar").is_err());
        assert!(TypeExpr::parse("Foo Bar").is_err());
        let err = TypeExpr::parse("Map<int;string>").unwrap_err();
        assert!(err.to_string().contains("Map<int;string>"));
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("MyApp.Models.User"), (Some("MyApp.Models"), "User"));
        assert_eq!(split_qualified("User"), (None, "User"));
    }
}
