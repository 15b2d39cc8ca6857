//! Backend types the client language already understands.
//!
//! Anything found here maps straight to a TypeScript primitive and never
//! becomes a node in the type graph.

use std::collections::HashMap;

use crate::type_expr::TypeExpr;

/// Coarse classification of a native type, used by route validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarClass {
    Boolean,
    Numeric,
    Text,
    Guid,
    DateTime,
    Duration,
    Bytes,
    /// Exceptions travel as their message text.
    Error,
    Object,
    Void,
}

impl ScalarClass {
    /// Whether a value of this class can be interpolated into a path segment.
    pub fn allowed_in_route(self) -> bool {
        matches!(
            self,
            ScalarClass::Boolean | ScalarClass::Numeric | ScalarClass::Text | ScalarClass::Guid
        )
    }
}

/// A backend type resolved through the native table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    /// Backend spelling, e.g. `System.DateTime` or `System.Byte[]`.
    pub backend: String,
    /// TypeScript spelling, e.g. `Date`.
    pub ts: &'static str,
    pub class: ScalarClass,
}

impl NativeType {
    pub fn is_string(&self) -> bool {
        self.backend == "System.String"
    }
}

#[derive(Debug, Clone)]
pub struct NativeTable {
    entries: HashMap<&'static str, (&'static str, ScalarClass)>,
}

impl Default for NativeTable {
    fn default() -> Self {
        let entries = [
            ("System.Object", "any", ScalarClass::Object),
            ("System.Boolean", "boolean", ScalarClass::Boolean),
            ("System.Byte", "number", ScalarClass::Numeric),
            ("System.SByte", "number", ScalarClass::Numeric),
            ("System.Int16", "number", ScalarClass::Numeric),
            ("System.UInt16", "number", ScalarClass::Numeric),
            ("System.Int32", "number", ScalarClass::Numeric),
            ("System.UInt32", "number", ScalarClass::Numeric),
            ("System.Int64", "number", ScalarClass::Numeric),
            ("System.UInt64", "number", ScalarClass::Numeric),
            ("System.Single", "number", ScalarClass::Numeric),
            ("System.Double", "number", ScalarClass::Numeric),
            ("System.Decimal", "number", ScalarClass::Numeric),
            ("System.String", "string", ScalarClass::Text),
            ("System.Char", "string", ScalarClass::Text),
            ("System.Guid", "string", ScalarClass::Guid),
            ("System.DateTime", "Date", ScalarClass::DateTime),
            ("System.DateTimeOffset", "Date", ScalarClass::DateTime),
            ("System.TimeSpan", "string", ScalarClass::Duration),
            ("System.Byte[]", "string", ScalarClass::Bytes),
            ("System.Exception", "string", ScalarClass::Error),
            ("System.Void", "void", ScalarClass::Void),
        ]
        .into_iter()
        .map(|(backend, ts, class)| (backend, (ts, class)))
        .collect();

        Self { entries }
    }
}

impl NativeTable {
    /// A bare simple name (`DateTime`, `Guid`) resolves to its `System` type.
    pub fn lookup(&self, expr: &TypeExpr) -> Option<NativeType> {
        let key = match expr {
            TypeExpr::Named { name, args } if args.is_empty() => name.clone(),
            // Only `byte[]` is native among arrays.
            TypeExpr::Array(inner) if inner.name() == "System.Byte" => "System.Byte[]".to_string(),
            _ => return None,
        };
        let (key, &(ts, class)) = match self.entries.get_key_value(key.as_str()) {
            Some(entry) => entry,
            None if !key.contains('.') => self.entries.get_key_value(format!("System.{key}").as_str())?,
            None => return None,
        };
        Some(NativeType {
            backend: key.to_string(),
            ts,
            class,
        })
    }

    pub fn contains(&self, expr: &TypeExpr) -> bool {
        self.lookup(expr).is_some()
    }

    /// `System.Object` as a native type; the spelling of anything opaque.
    pub fn object(&self) -> NativeType {
        NativeType {
            backend: "System.Object".to_string(),
            ts: "any",
            class: ScalarClass::Object,
        }
    }

    pub fn void(&self) -> NativeType {
        NativeType {
            backend: "System.Void".to_string(),
            ts: "void",
            class: ScalarClass::Void,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn lookup(expr: &str) -> Option<NativeType> {
        NativeTable::default().lookup(&TypeExpr::parse(expr).unwrap())
    }

    #[test]
    fn test_numeric_family_maps_to_number() {
        for name in ["int", "long", "System.Decimal", "double", "ushort"] {
            let native = lookup(name).unwrap();
            assert_eq!(native.ts, "number", "{name}");
            assert_eq!(native.class, ScalarClass::Numeric);
        }
    }

    #[test]
    fn test_dates_and_bytes() {
        assert_eq!(lookup("System.DateTime").unwrap().ts, "Date");
        assert_eq!(lookup("System.DateTimeOffset").unwrap().class, ScalarClass::DateTime);
        let bytes = lookup("byte[]").unwrap();
        assert_eq!(bytes.ts, "string");
        assert_eq!(bytes.backend, "System.Byte[]");
        assert!(lookup("int[]").is_none());
    }

    #[test]
    fn test_complex_types_are_not_native() {
        assert!(lookup("MyApp.User").is_none());
        assert!(lookup("System.Nullable<int>").is_none());
        assert!(lookup("List<int>").is_none());
    }

    #[test]
    fn test_route_compatibility() {
        assert!(lookup("System.Guid").unwrap().class.allowed_in_route());
        assert!(lookup("string").unwrap().class.allowed_in_route());
        assert!(!lookup("System.DateTime").unwrap().class.allowed_in_route());
        assert!(!lookup("object").unwrap().class.allowed_in_route());
        assert!(!lookup("byte[]").unwrap().class.allowed_in_route());
        assert!(!lookup("System.Exception").unwrap().class.allowed_in_route());
    }

    #[test]
    fn test_simple_names_resolve_to_system_types() {
        let created = lookup("DateTime").unwrap();
        assert_eq!(created.backend, "System.DateTime");
        assert_eq!(created.ts, "Date");
        assert_eq!(lookup("Guid").unwrap().class, ScalarClass::Guid);
        assert_eq!(lookup("TimeSpan").unwrap().backend, "System.TimeSpan");
        assert_eq!(lookup("DateTimeOffset").unwrap().class, ScalarClass::DateTime);
        assert!(lookup("Other.DateTime").is_none());
        assert!(lookup("User").is_none());
    }
}
