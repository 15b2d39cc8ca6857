//! TypeScript spelling of resolved types.

use std::collections::HashMap;

use crate::error::{GenError, Result};
use crate::native::ScalarClass;
use crate::transform::TransformRegistry;
use crate::ts::{TsPrimitive, TsType};
use crate::walker::{TypeKind, TypeRef, TypeRegistry};

#[derive(Debug)]
pub struct TypeNamer<'r> {
    registry: &'r TypeRegistry,
    transforms: &'r TransformRegistry,
    type_namespace: Option<String>,
}

impl<'r> TypeNamer<'r> {
    /// Build a namer and check that no two declared types share a name.
    pub fn new(
        registry: &'r TypeRegistry,
        transforms: &'r TransformRegistry,
        type_namespace: Option<String>,
    ) -> Result<Self> {
        let namer = Self {
            registry,
            transforms,
            type_namespace,
        };
        namer.check_collisions()?;
        Ok(namer)
    }

    fn check_collisions(&self) -> Result<()> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for (_, node) in self.registry.iter() {
            let (namespace, name) = match &node.kind {
                TypeKind::Enum(e) => (e.namespace.as_deref(), e.name.as_str()),
                TypeKind::Class(c) if c.is_declaration() => (c.namespace.as_deref(), c.name.as_str()),
                _ => continue,
            };
            let qualified = self.qualify(namespace, name);
            if let Some(first) = seen.insert(qualified.clone(), &node.key) {
                return Err(GenError::TypeNameCollision {
                    name: qualified,
                    first: first.to_string(),
                    second: node.key.clone(),
                });
            }
        }
        Ok(())
    }

    /// Namespace a declaration lands in.
    pub fn namespace_of<'a>(&'a self, namespace: Option<&'a str>) -> Option<&'a str> {
        self.type_namespace.as_deref().or(namespace)
    }

    pub fn qualify(&self, namespace: Option<&str>, name: &str) -> String {
        match self.namespace_of(namespace) {
            Some(ns) => format!("{ns}.{name}"),
            None => name.to_string(),
        }
    }

    fn client_type(&self, backend: &str) -> Result<Option<TsType>> {
        Ok(self
            .transforms
            .claimant(backend)?
            .and_then(|t| t.client_type())
            .map(|ty| TsType::Ref(ty.to_string())))
    }

    pub fn ts_type(&self, ty: &TypeRef) -> Result<TsType> {
        match ty {
            TypeRef::Native(native) => {
                if let Some(client) = self.client_type(&native.backend)? {
                    return Ok(client);
                }
                Ok(primitive(native.ts))
            }
            TypeRef::Override { ts, .. } => Ok(TsType::Ref(ts.clone())),
            TypeRef::Param(name) => Ok(TsType::Ref(name.clone())),
            TypeRef::Unknown { .. } => Ok(TsType::Primitive(TsPrimitive::Any)),
            TypeRef::Node(id) => {
                let node = self.registry.get(*id);
                if let Some(client) = self.client_type(&node.key)? {
                    return Ok(client);
                }
                match &node.kind {
                    TypeKind::Collection { element } => Ok(TsType::Array(Box::new(self.ts_type(element)?))),
                    TypeKind::Dictionary { key, value } => {
                        let numeric = matches!(key, TypeRef::Native(n) if n.class == ScalarClass::Numeric);
                        let key = if numeric { TsPrimitive::Number } else { TsPrimitive::String };
                        Ok(TsType::IndexSignature {
                            key: Box::new(TsType::Primitive(key)),
                            value: Box::new(self.ts_type(value)?),
                        })
                    }
                    TypeKind::Enum(e) => Ok(TsType::Ref(self.qualify(e.namespace.as_deref(), &e.name))),
                    TypeKind::Class(class) => {
                        let name = self.qualify(class.namespace.as_deref(), &class.name);
                        if class.generic_args.is_empty() {
                            Ok(TsType::Ref(name))
                        } else {
                            let args = class
                                .generic_args
                                .iter()
                                .map(|arg| self.ts_type(arg))
                                .collect::<Result<Vec<_>>>()?;
                            Ok(TsType::Generic { name, args })
                        }
                    }
                }
            }
        }
    }
}

fn primitive(ts: &str) -> TsType {
    match ts {
        "string" => TsType::Primitive(TsPrimitive::String),
        "number" => TsType::Primitive(TsPrimitive::Number),
        "boolean" => TsType::Primitive(TsPrimitive::Boolean),
        "void" => TsType::Primitive(TsPrimitive::Void),
        "any" => TsType::Primitive(TsPrimitive::Any),
        other => TsType::Ref(other.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog::TypeCatalog;
    use crate::config::TypeConfig;
    use crate::model::BackendType;
    use crate::native::NativeTable;
    use crate::transform::MomentDateTime;
    use crate::ts::Emit;
    use crate::walker::TypeWalker;

    fn walk(types: Vec<BackendType>, roots: &[&str]) -> (TypeRegistry, Vec<TypeRef>) {
        let catalog = TypeCatalog::from_types(types).unwrap();
        let natives = NativeTable::default();
        let config = TypeConfig::default();
        let mut walker = TypeWalker::new(&catalog, &natives, &config);
        let refs = roots.iter().map(|r| walker.resolve(r).unwrap()).collect();
        (walker.finish(), refs)
    }

    #[test]
    fn test_spells_natives_collections_and_dictionaries() {
        let (registry, refs) = walk(
            vec![BackendType::class("MyApp.Models.User")],
            &[
                "int",
                "System.DateTime",
                "List<MyApp.Models.User>",
                "Dictionary<int, string>",
                "Dictionary<System.Guid, MyApp.Models.User>",
                "Vendor.Widget",
            ],
        );
        let transforms = TransformRegistry::new();
        let namer = TypeNamer::new(&registry, &transforms, None).unwrap();
        let spelled: Vec<String> = refs.iter().map(|r| namer.ts_type(r).unwrap().emit()).collect();
        assert_eq!(
            spelled,
            vec![
                "number",
                "Date",
                "MyApp.Models.User[]",
                "{ [key: number]: string }",
                "{ [key: string]: MyApp.Models.User }",
                "any",
            ]
        );
    }

    #[test]
    fn test_transform_client_type_wins() {
        let (registry, refs) = walk(vec![], &["System.DateTime", "System.DateTime[]"]);
        let mut transforms = TransformRegistry::new();
        transforms.push(Box::new(MomentDateTime));
        let namer = TypeNamer::new(&registry, &transforms, None).unwrap();
        assert_eq!(namer.ts_type(&refs[0]).unwrap().emit(), "moment.Moment");
        assert_eq!(namer.ts_type(&refs[1]).unwrap().emit(), "moment.Moment[]");
    }

    #[test]
    fn test_generic_instantiation_and_type_namespace() {
        let (registry, refs) = walk(
            vec![
                BackendType::class("MyApp.Page<T>").member("items", "List<T>"),
                BackendType::class("MyApp.Item"),
            ],
            &["MyApp.Page<MyApp.Item>"],
        );
        let transforms = TransformRegistry::new();
        let namer = TypeNamer::new(&registry, &transforms, Some("Api".to_string())).unwrap();
        assert_eq!(namer.ts_type(&refs[0]).unwrap().emit(), "Api.Page<Api.Item>");
    }

    #[test]
    fn test_type_namespace_collision() {
        let (registry, _) = walk(
            vec![BackendType::class("Billing.Account"), BackendType::class("Crm.Account")],
            &["Billing.Account", "Crm.Account"],
        );
        let transforms = TransformRegistry::new();
        assert!(TypeNamer::new(&registry, &transforms, None).is_ok());
        let err = TypeNamer::new(&registry, &transforms, Some("Api".to_string())).unwrap_err();
        assert!(matches!(err, GenError::TypeNameCollision { ref name, .. } if name == "Api.Account"));
    }
}
