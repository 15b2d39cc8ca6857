//! Interface declarations for data types (`definitions.d.ts`).

use crate::error::Result;
use crate::ts::{TsItem, TsModule, TsNamespace, TsProp, TsTypeDef, TypeDefKind};
use crate::walker::{ClassDescriptor, TypeKind, TypeRegistry};

use super::naming::TypeNamer;

/// Declarations grouped by namespace, each group placed where its first type
/// was discovered.
pub fn codegen_definitions(registry: &TypeRegistry, namer: &TypeNamer<'_>) -> Result<TsModule> {
    let mut groups: Vec<(Option<String>, Vec<TsItem>)> = Vec::new();

    for (_, node) in registry.iter() {
        let TypeKind::Class(class) = &node.kind else {
            continue;
        };
        if !class.is_declaration() {
            continue;
        }
        let namespace = namer.namespace_of(class.namespace.as_deref()).map(str::to_string);
        let item = TsItem::TypeDef(codegen_interface(class, namer)?);
        match groups.iter_mut().find(|(ns, _)| *ns == namespace) {
            Some((_, items)) => items.push(item),
            None => groups.push((namespace, vec![item])),
        }
    }

    let mut items = Vec::new();
    for (namespace, group) in groups {
        match namespace {
            Some(name) => items.push(TsItem::Namespace(TsNamespace {
                name,
                declare: true,
                items: group,
            })),
            None => items.extend(group),
        }
    }
    Ok(TsModule { items })
}

fn codegen_interface(class: &ClassDescriptor, namer: &TypeNamer<'_>) -> Result<TsTypeDef> {
    let extends = class.base.as_ref().map(|base| namer.ts_type(base)).transpose()?;
    let properties = class
        .members
        .iter()
        .map(|member| {
            Ok(TsProp {
                name: member.name.clone(),
                ty: namer.ts_type(&member.ty)?,
                optional: member.optional,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TsTypeDef {
        name: class.name.clone(),
        is_export: false,
        kind: TypeDefKind::Interface {
            type_params: class.generic_params.clone(),
            extends,
            properties,
            methods: Vec::new(),
        },
    })
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

    fn render(types: Vec<BackendType>, roots: &[&str], type_namespace: Option<&str>) -> String {
        let catalog = TypeCatalog::from_types(types).unwrap();
        let natives = NativeTable::default();
        let config = TypeConfig::default();
        let mut walker = TypeWalker::new(&catalog, &natives, &config);
        for root in roots {
            walker.resolve(root).unwrap();
        }
        let registry = walker.finish();
        let transforms = TransformRegistry::new();
        let namer = TypeNamer::new(&registry, &transforms, type_namespace.map(str::to_string)).unwrap();
        codegen_definitions(&registry, &namer).unwrap().render("    ")
    }

    #[test]
    fn test_namespaced_interfaces() {
        let out = render(
            vec![
                BackendType::class("MyApp.Models.User")
                    .member("name", "string")
                    .optional_member("email", "string")
                    .member("age", "int?")
                    .member("tags", "List<string>"),
            ],
            &["MyApp.Models.User"],
            None,
        );
        let expected = "declare namespace MyApp.Models {\n    interface User {\n        name: string;\n        email?: string;\n        age?: number;\n        tags: string[];\n    }\n}\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_top_level_generic_and_base() {
        let out = render(
            vec![
                BackendType::class("Entity").member("id", "int"),
                BackendType::class("Page<T>").base("Entity").member("items", "T[]"),
                BackendType::class("Item"),
            ],
            &["Page<Item>"],
            None,
        );
        assert!(out.contains("interface Page<T> extends Entity {\n    items: T[];\n}"));
        assert!(out.contains("interface Entity {\n    id: number;\n}"));
        assert!(out.contains("interface Item {\n}"));
        assert!(!out.contains("Page<Item>"));
        assert!(!out.contains("declare"));
    }

    #[test]
    fn test_single_type_namespace() {
        let out = render(
            vec![
                BackendType::class("A.User").member("order", "B.Order"),
                BackendType::class("B.Order"),
            ],
            &["A.User"],
            Some("Api"),
        );
        assert_eq!(out.matches("declare namespace Api {").count(), 1);
        assert!(out.contains("order: Api.Order;"));
    }
}
