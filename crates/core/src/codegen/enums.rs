//! Enum declarations (`enums.ts`).

use crate::config::{EnumConfig, EnumOutput, EnumValueMode};
use crate::model::EnumValue;
use crate::ts::types::{binop, ident, member};
use crate::ts::{BinOp, TsExpr, TsItem, TsLiteral, TsModule, TsNamespace, TsStmt, TsType, TsTypeDef, TypeDefKind, VarKind};
use crate::walker::{EnumDescriptor, TypeKind, TypeRegistry};

use super::naming::TypeNamer;

pub fn codegen_enums(registry: &TypeRegistry, namer: &TypeNamer<'_>, config: &EnumConfig) -> TsModule {
    let mut groups: Vec<(Option<String>, Vec<TsItem>)> = Vec::new();
    let mut globals: Vec<(Option<String>, String)> = Vec::new();

    for (_, node) in registry.iter() {
        let TypeKind::Enum(descriptor) = &node.kind else {
            continue;
        };
        let namespace = namer.namespace_of(descriptor.namespace.as_deref()).map(str::to_string);
        let item = TsItem::TypeDef(codegen_enum(descriptor, namespace.is_some(), config));
        match groups.iter_mut().find(|(ns, _)| *ns == namespace) {
            Some((_, items)) => items.push(item),
            None => groups.push((namespace.clone(), vec![item])),
        }
        if config.globals && config.output == EnumOutput::Enum {
            globals.push((namespace, descriptor.name.clone()));
        }
    }

    let mut items = Vec::new();
    for (namespace, group) in groups {
        match namespace {
            Some(name) => items.push(TsItem::Namespace(TsNamespace {
                name,
                declare: false,
                items: group,
            })),
            None => items.extend(group),
        }
    }
    if !globals.is_empty() {
        items.extend(codegen_globals(&globals));
    }
    TsModule { items }
}

fn codegen_enum(descriptor: &EnumDescriptor, exported: bool, config: &EnumConfig) -> TsTypeDef {
    let literal = |name: &str, value: &EnumValue| match (config.values, value) {
        (EnumValueMode::String, _) => TsLiteral::String(name.to_string()),
        (EnumValueMode::Number, EnumValue::Integer(n)) => TsLiteral::Int(*n),
        (EnumValueMode::Number, EnumValue::String(s)) => TsLiteral::String(s.clone()),
    };

    let kind = match config.output {
        EnumOutput::Enum | EnumOutput::ConstEnum => TypeDefKind::Enum {
            is_const: config.output == EnumOutput::ConstEnum,
            members: descriptor
                .values
                .iter()
                .map(|(name, value)| (name.clone(), literal(name, value)))
                .collect(),
        },
        EnumOutput::Type => TypeDefKind::TypeAlias {
            ty: TsType::Union(
                descriptor
                    .values
                    .iter()
                    .map(|(name, value)| TsType::Literal(literal(name, value)))
                    .collect(),
            ),
        },
    };
    TsTypeDef {
        name: descriptor.name.clone(),
        is_export: exported,
        kind,
    }
}

/// Publish enums on `window` so plain scripts can reach them.
fn codegen_globals(globals: &[(Option<String>, String)]) -> Vec<TsItem> {
    let mut items = vec![TsItem::Stmt(TsStmt::VarDecl {
        kind: VarKind::Const,
        name: "wnd".to_string(),
        ty: Some(TsType::Primitive(crate::ts::TsPrimitive::Any)),
        init: ident("window"),
    })];

    let mut declared: Vec<String> = Vec::new();
    for (namespace, _) in globals {
        let Some(namespace) = namespace else { continue };
        let mut path = String::new();
        for part in namespace.split('.') {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(part);
            if declared.contains(&path) {
                continue;
            }
            declared.push(path.clone());
            let target = ident(format!("wnd.{path}"));
            let init = binop(target.clone(), BinOp::Or, TsExpr::Object(Vec::new()));
            items.push(TsItem::Stmt(TsStmt::Expr(binop(target, BinOp::Assign, init))));
        }
    }

    for (namespace, name) in globals {
        let (target, source) = match namespace {
            Some(ns) => (format!("wnd.{ns}"), ident(format!("{ns}.{name}"))),
            None => ("wnd".to_string(), ident(name.clone())),
        };
        items.push(TsItem::Stmt(TsStmt::Expr(binop(
            member(ident(target), name.clone()),
            BinOp::Assign,
            source,
        ))));
    }
    items
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog::TypeCatalog;
    use crate::config::TypeConfig;
    use crate::model::BackendType;
    use crate::native::NativeTable;
    use crate::transform::TransformRegistry;
    use crate::walker::TypeWalker;

    fn render(config: EnumConfig, type_namespace: Option<&str>) -> String {
        let catalog = TypeCatalog::from_types(vec![
            BackendType::enumeration("MyApp.Models.Color").value("Red", 0).value("Green", 1),
            BackendType::enumeration("Size").value("Small", 10),
        ])
        .unwrap();
        let natives = NativeTable::default();
        let types = TypeConfig::default();
        let mut walker = TypeWalker::new(&catalog, &natives, &types);
        walker.resolve("MyApp.Models.Color").unwrap();
        walker.resolve("Size").unwrap();
        let registry = walker.finish();
        let transforms = TransformRegistry::new();
        let namer = TypeNamer::new(&registry, &transforms, type_namespace.map(str::to_string)).unwrap();
        codegen_enums(&registry, &namer, &config).render("    ")
    }

    #[test]
    fn test_numeric_enums() {
        let out = render(EnumConfig::default(), None);
        let expected = "namespace MyApp.Models {\n    export enum Color {\n        Red = 0,\n        Green = 1,\n    }\n}\n\nenum Size {\n    Small = 10,\n}\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_const_string_enums() {
        let config = EnumConfig {
            output: EnumOutput::ConstEnum,
            values: EnumValueMode::String,
            globals: true,
        };
        let out = render(config, None);
        assert!(out.contains("export const enum Color {\n        Red = \"Red\","));
        // const enums have no runtime object to publish
        assert!(!out.contains("wnd"));
    }

    #[test]
    fn test_type_union_output() {
        let config = EnumConfig {
            output: EnumOutput::Type,
            ..EnumConfig::default()
        };
        let out = render(config, Some("Api"));
        assert!(out.contains("namespace Api {\n    export type Color = 0 | 1;\n    export type Size = 10;\n}"));
    }

    #[test]
    fn test_window_globals() {
        let config = EnumConfig {
            globals: true,
            ..EnumConfig::default()
        };
        let out = render(config, None);
        let expected_tail = "const wnd: any = window;\nwnd.MyApp = wnd.MyApp || {};\nwnd.MyApp.Models = wnd.MyApp.Models || {};\nwnd.MyApp.Models.Color = MyApp.Models.Color;\nwnd.Size = Size;\n";
        assert!(out.ends_with(expected_tail), "{out}");
    }
}
