//! TypeScript syntax tree, emitter and helpers.

pub mod emit;
pub mod types;
pub mod utils;

pub use emit::{Emit, EmitBlock, Printer};
pub use types::{
    BinOp, ImportItem, ObjectEntry, TsClass, TsExpr, TsField, TsFunction, TsImport, TsInit, TsItem, TsLiteral,
    TsMethod, TsMethodSig, TsModule, TsNamespace, TsParam, TsPrimitive, TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind, VarKind,
    Visibility,
};
