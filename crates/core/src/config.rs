//! Generator configuration.
//!
//! Deserialized from the `typegap.toml` sections the core cares about. Every
//! field has a default so an empty file is a valid configuration.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::Result;
use crate::ts::utils::lower_first;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    pub render: RenderConfig,
    pub enums: EnumConfig,
    pub types: TypeConfig,
    pub methods: MethodConfig,
    /// Built-in transforms to enable, by name (`moment-datetime`, `moment-timespan`).
    pub transforms: Vec<String>,
    pub custom_transforms: Vec<CustomTransformConfig>,
}

impl GeneratorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderConfig {
    /// One level of indentation.
    pub indent: String,
    /// Declare every data type inside this single namespace.
    pub type_namespace: Option<String>,
    pub promise_type: String,
    pub header: Option<String>,
    pub footer: Option<String>,
    /// Base class for the generated service classes.
    pub base_class: Option<String>,
    /// Module path the request helper (`Ajax`) is imported from.
    pub ajax_path: String,
    /// Prepend the generated-code notice.
    pub banner: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            type_namespace: None,
            promise_type: "Promise".to_string(),
            header: None,
            footer: None,
            base_class: None,
            ajax_path: "./Ajax".to_string(),
            banner: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnumOutput {
    #[default]
    Enum,
    ConstEnum,
    /// `type Color = 0 | 1 | 2`
    Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnumValueMode {
    #[default]
    Number,
    /// Values are the member names as string literals.
    String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EnumConfig {
    pub output: EnumOutput,
    pub values: EnumValueMode,
    /// Also publish non-const enums on `window` under their namespace.
    pub globals: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TypeConfig {
    /// Namespace patterns (`%` and `*` match any run of characters) that
    /// bound the walk. Empty means every catalog type is in scope.
    pub namespaces: Vec<String>,
    /// Backend type name to literal TypeScript type.
    pub overrides: BTreeMap<String, String>,
}

impl TypeConfig {
    pub fn in_boundary(&self, qualified_name: &str) -> bool {
        if self.namespaces.is_empty() {
            return true;
        }
        let namespace = crate::type_expr::split_qualified(qualified_name).0.unwrap_or("");
        self.namespaces
            .iter()
            .any(|pattern| wildcard_match(pattern, namespace))
    }
}

/// Glob match where `%` and `*` stand for any run of characters.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && matches!(pattern[p], '%' | '*') {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| matches!(c, '%' | '*'))
}

/// How action names become client method names.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodNaming {
    /// `GetUserAsync` -> `getUser`
    #[default]
    CamelCase,
    Preserve,
    #[serde(skip)]
    Custom(fn(&str) -> String),
}

impl MethodNaming {
    pub fn apply(&self, action: &str) -> String {
        match self {
            MethodNaming::CamelCase => {
                let trimmed = match action.strip_suffix("Async") {
                    Some(rest) if !rest.is_empty() => rest,
                    _ => action,
                };
                lower_first(trimmed)
            }
            MethodNaming::Preserve => action.to_string(),
            MethodNaming::Custom(f) => f(action),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MethodConfig {
    pub naming: MethodNaming,
}

/// A transform defined by snippet templates; `{value}` marks the operand.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CustomTransformConfig {
    pub name: String,
    pub types: Vec<String>,
    #[serde(default)]
    pub client_type: Option<String>,
    pub to_client: String,
    pub to_wire: String,
    #[serde(default)]
    pub import: Option<ImportConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImportConfig {
    #[serde(default)]
    pub items: Vec<String>,
    /// `import * as <namespace> from ...`
    #[serde(default)]
    pub namespace: Option<String>,
    pub from: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config.render.indent, "    ");
        assert_eq!(config.render.promise_type, "Promise");
        assert_eq!(config.render.ajax_path, "./Ajax");
        assert!(config.render.banner);
        assert_eq!(config.enums.output, EnumOutput::Enum);
        assert!(config.transforms.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let source = r#"
transforms = ["moment-datetime"]

[render]
indent = "  "
type-namespace = "Api"
base-class = "ServiceBase"

[enums]
output = "const-enum"
values = "string"

[types]
namespaces = ["MyApp.%"]
overrides = { "MyApp.Money" = "number" }

[methods]
naming = "preserve"

[[custom-transforms]]
name = "decimal"
types = ["System.Decimal"]
client-type = "Decimal"
to-client = "new Decimal({value})"
to-wire = "{value}.toString()"
import = { items = ["Decimal"], from = "decimal.js" }
"#;
        let config = GeneratorConfig::from_toml_str(source).unwrap();
        assert_eq!(config.render.indent, "  ");
        assert_eq!(config.render.type_namespace.as_deref(), Some("Api"));
        assert_eq!(config.enums.output, EnumOutput::ConstEnum);
        assert_eq!(config.enums.values, EnumValueMode::String);
        assert_eq!(config.types.overrides["MyApp.Money"], "number");
        assert_eq!(config.methods.naming.apply("GetUserAsync"), "GetUserAsync");
        assert_eq!(config.custom_transforms[0].import.as_ref().unwrap().from, "decimal.js");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(GeneratorConfig::from_toml_str("[enums]\noutput = \"flags\"").is_err());
    }

    #[test]
    fn test_method_naming() {
        let naming = MethodNaming::default();
        assert_eq!(naming.apply("GetUserAsync"), "getUser");
        assert_eq!(naming.apply("Async"), "async");
        assert_eq!(naming.apply("List"), "list");
        let custom = MethodNaming::Custom(|name| format!("do{name}"));
        assert_eq!(custom.apply("Save"), "doSave");
    }

    #[test]
    fn test_namespace_boundary() {
        let config = TypeConfig {
            namespaces: vec!["MyApp.%".to_string(), "Shared".to_string()],
            ..TypeConfig::default()
        };
        assert!(config.in_boundary("MyApp.Models.User"));
        assert!(config.in_boundary("Shared.Money"));
        assert!(!config.in_boundary("Shared.Inner.Money"));
        assert!(!config.in_boundary("Other.User"));
        assert!(!config.in_boundary("User"));
        assert!(TypeConfig::default().in_boundary("Anything.At.All"));
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("My*.Models", "MyApp.Models"));
        assert!(!wildcard_match("My*.Models", "MyApp.Views"));
    }
}
