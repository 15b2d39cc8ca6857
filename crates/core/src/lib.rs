#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_debug_implementations)]

//! Generates a typed TypeScript client for an HTTP API from a description of
//! its controllers and the backend types they exchange.
//!
//! The pipeline walks the type graph reachable from action signatures,
//! compiles every action's route template into a URL builder, and renders
//! three files: interface declarations, enums, and proxy services.

pub mod catalog;
pub mod codegen;
pub mod compiler;
pub mod config;
pub mod error;
pub mod generator;
pub mod hubs;
pub mod model;
pub mod native;
pub mod resources;
pub mod route;
pub mod transform;
pub mod ts;
pub mod type_expr;
pub mod walker;
pub mod wrappers;

pub use catalog::{TypeCatalog, TypeProvider};
pub use config::{
    CustomTransformConfig, EnumConfig, EnumOutput, EnumValueMode, GeneratorConfig, ImportConfig, MethodConfig,
    MethodNaming, RenderConfig, TypeConfig,
};
pub use error::{Diagnostic, GenError, Result};
pub use generator::{GeneratedOutput, Generator, RouteSummary, TypeSummary};
pub use model::{
    ActionDesc, ApiDescription, BackendType, BindingMode, ControllerDesc, EnumMemberDesc, EnumValue, HttpMethod,
    HubDesc, HubMethodDesc, MemberDesc, ParamDesc, TypeKindDesc,
};
pub use transform::{MomentDateTime, MomentTimeSpan, SnippetTransform, TransformRegistry, TypeTransform};
