//! Cross-boundary type transforms.
//!
//! A transform owns the conversion of one family of backend types between
//! their wire representation (JSON) and the client representation, e.g.
//! ISO date strings to `moment.Moment`. At most one transform may claim a
//! given type.

use std::fmt;

use crate::config::{CustomTransformConfig, GeneratorConfig};
use crate::error::{GenError, Result};
use crate::ts::{ImportItem, TsImport};

pub trait TypeTransform: fmt::Debug {
    fn name(&self) -> &str;

    /// Whether this transform handles the backend type with the given key.
    fn claims(&self, backend_type: &str) -> bool;

    /// Client-side spelling of claimed types, if it differs from the default.
    fn client_type(&self) -> Option<&str> {
        None
    }

    fn imports(&self) -> Vec<TsImport> {
        Vec::new()
    }

    /// Expression converting `value` from wire to client representation.
    fn to_client(&self, value: &str) -> String;

    /// Expression converting `value` from client to wire representation.
    fn to_wire(&self, value: &str) -> String;
}

fn moment_import() -> TsImport {
    TsImport {
        items: Vec::new(),
        namespace: Some("moment".to_string()),
        from: "moment".to_string(),
        type_only: false,
    }
}

/// `DateTime`/`DateTimeOffset` as `moment.Moment` in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentDateTime;

impl TypeTransform for MomentDateTime {
    fn name(&self) -> &str {
        "moment-datetime"
    }

    fn claims(&self, backend_type: &str) -> bool {
        matches!(backend_type, "System.DateTime" | "System.DateTimeOffset")
    }

    fn client_type(&self) -> Option<&str> {
        Some("moment.Moment")
    }

    fn imports(&self) -> Vec<TsImport> {
        vec![moment_import()]
    }

    fn to_client(&self, value: &str) -> String {
        format!("moment.utc({value})")
    }

    fn to_wire(&self, value: &str) -> String {
        format!("moment({value}).toISOString()")
    }
}

/// `TimeSpan` as a `moment.Moment` time of day.
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentTimeSpan;

impl TypeTransform for MomentTimeSpan {
    fn name(&self) -> &str {
        "moment-timespan"
    }

    fn claims(&self, backend_type: &str) -> bool {
        backend_type == "System.TimeSpan"
    }

    fn client_type(&self) -> Option<&str> {
        Some("moment.Moment")
    }

    fn imports(&self) -> Vec<TsImport> {
        vec![moment_import()]
    }

    fn to_client(&self, value: &str) -> String {
        format!("moment.utc({value}, \"HH:mm:ss\")")
    }

    fn to_wire(&self, value: &str) -> String {
        format!("moment({value}).format(\"HH:mm:ss\")")
    }
}

/// Transform described by snippet templates in configuration.
#[derive(Debug, Clone)]
pub struct SnippetTransform {
    config: CustomTransformConfig,
}

impl SnippetTransform {
    pub fn new(config: CustomTransformConfig) -> Self {
        Self { config }
    }
}

impl TypeTransform for SnippetTransform {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn claims(&self, backend_type: &str) -> bool {
        self.config.types.iter().any(|t| t == backend_type)
    }

    fn client_type(&self) -> Option<&str> {
        self.config.client_type.as_deref()
    }

    fn imports(&self) -> Vec<TsImport> {
        self.config
            .import
            .iter()
            .map(|import| TsImport {
                items: import
                    .items
                    .iter()
                    .map(|name| ImportItem {
                        name: name.clone(),
                        alias: None,
                    })
                    .collect(),
                namespace: import.namespace.clone(),
                from: import.from.clone(),
                type_only: false,
            })
            .collect()
    }

    fn to_client(&self, value: &str) -> String {
        self.config.to_client.replace("{value}", value)
    }

    fn to_wire(&self, value: &str) -> String {
        self.config.to_wire.replace("{value}", value)
    }
}

/// Ordered set of transforms active for one run.
#[derive(Debug, Default)]
pub struct TransformRegistry {
    transforms: Vec<Box<dyn TypeTransform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry named by a configuration.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let mut registry = Self::new();
        for name in &config.transforms {
            registry.push(builtin(name)?);
        }
        for custom in &config.custom_transforms {
            registry.push(Box::new(SnippetTransform::new(custom.clone())));
        }
        Ok(registry)
    }

    pub fn push(&mut self, transform: Box<dyn TypeTransform>) {
        self.transforms.push(transform);
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// The single transform claiming `backend_type`, if any.
    pub fn claimant(&self, backend_type: &str) -> Result<Option<&dyn TypeTransform>> {
        let mut claimants = self.transforms.iter().filter(|t| t.claims(backend_type));
        let Some(first) = claimants.next() else {
            return Ok(None);
        };
        let rest: Vec<_> = claimants.collect();
        if !rest.is_empty() {
            let names: Vec<&str> = std::iter::once(first)
                .chain(rest)
                .map(|t| t.name())
                .collect();
            return Err(GenError::ConflictingTransforms {
                type_name: backend_type.to_string(),
                claimants: names.join(", "),
            });
        }
        Ok(Some(&**first))
    }
}

pub fn builtin(name: &str) -> Result<Box<dyn TypeTransform>> {
    match name {
        "moment-datetime" => Ok(Box::new(MomentDateTime)),
        "moment-timespan" => Ok(Box::new(MomentTimeSpan)),
        other => Err(GenError::UnknownTransform(other.to_string())),
    }
}
