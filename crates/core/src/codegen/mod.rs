//! Code generation from the resolved type graph and compiled routes to
//! TypeScript modules.
//!
//! Each submodule builds a [`TsModule`](crate::ts::TsModule); text is only
//! produced when the generator renders the modules with the configured
//! indentation.

pub mod definitions;
pub mod enums;
pub mod hubs;
pub mod naming;
pub mod services;

pub use definitions::codegen_definitions;
pub use enums::codegen_enums;
pub use hubs::codegen_hubs;
pub use naming::TypeNamer;
pub use services::codegen_services;
