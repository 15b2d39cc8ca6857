//! Type graph walker.
//!
//! Starting from root type expressions, the walker discovers every type the
//! generated client needs and records it once in a [`TypeRegistry`]. Natives
//! (and opaque types) are carried inline in [`TypeRef`]; collections,
//! dictionaries, enums and classes become graph nodes keyed by their closed
//! signature, so cyclic models terminate and shared types are deduplicated.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::catalog::TypeProvider;
use crate::config::TypeConfig;
use crate::error::{Diagnostic, GenError, Result};
use crate::model::{BackendType, EnumValue, TypeKindDesc};
use crate::native::{NativeTable, NativeType};
use crate::type_expr::{TypeExpr, split_qualified};

/// Index of a node in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Reference from one type (or parameter) to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Primitive or string; rendered directly.
    Native(NativeType),
    Node(TypeId),
    /// Literal TypeScript type from the override table.
    Override { backend: String, ts: String },
    /// Generic parameter of an open declaration.
    Param(String),
    /// Outside the namespace boundary or not described; rendered as `any`.
    Unknown { backend: String },
}

#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Closed signature, e.g. `MyApp.Page<MyApp.Item>` or `MyApp.Item[]`.
    pub key: String,
    pub kind: TypeKind,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Collection { element: TypeRef },
    Dictionary { key: TypeRef, value: TypeRef },
    Enum(EnumDescriptor),
    Class(ClassDescriptor),
}

#[derive(Debug, Clone)]
pub struct EnumDescriptor {
    pub name: String,
    pub namespace: Option<String>,
    pub values: Vec<(String, EnumValue)>,
}

#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    pub name: String,
    pub namespace: Option<String>,
    /// Qualified backend name of the (generic) definition.
    pub definition: String,
    pub generic_params: Vec<String>,
    pub generic_args: Vec<TypeRef>,
    pub base: Option<TypeRef>,
    pub members: Vec<Member>,
}

impl ClassDescriptor {
    /// True for non-generic classes and for the open form of a generic one;
    /// these are the nodes that get an interface declaration.
    pub fn is_declaration(&self) -> bool {
        self.generic_args.len() == self.generic_params.len()
            && self
                .generic_args
                .iter()
                .zip(&self.generic_params)
                .all(|(arg, param)| matches!(arg, TypeRef::Param(p) if p == param))
    }
}

#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub ty: TypeRef,
    pub optional: bool,
}

/// Every type discovered during one generation run.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    nodes: Vec<TypeDescriptor>,
    index: HashMap<String, TypeId>,
    resolved: HashMap<String, TypeRef>,
    diagnostics: Vec<Diagnostic>,
}

impl TypeRegistry {
    pub fn get(&self, id: TypeId) -> &TypeDescriptor {
        &self.nodes[id.0]
    }

    pub fn lookup(&self, key: &str) -> Option<TypeId> {
        self.index.get(key).copied()
    }

    /// Nodes in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeDescriptor)> {
        self.nodes.iter().enumerate().map(|(i, node)| (TypeId(i), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The reference a root expression resolved to during the walk.
    pub fn reference(&self, expr: &str) -> Result<&TypeRef> {
        self.resolved.get(expr).ok_or_else(|| GenError::MalformedType {
            expr: expr.to_string(),
            reason: "type was not resolved before compilation".to_string(),
        })
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn class(&self, ty: &TypeRef) -> Option<&ClassDescriptor> {
        match ty {
            TypeRef::Node(id) => match &self.get(*id).kind {
                TypeKind::Class(class) => Some(class),
                _ => None,
            },
            _ => None,
        }
    }

    /// Members of a class including those inherited from its bases, base first.
    pub fn all_members<'a>(&'a self, class: &'a ClassDescriptor) -> Vec<&'a Member> {
        let mut chain = vec![class];
        let mut current = class;
        while let Some(base) = current.base.as_ref().and_then(|b| self.class(b)) {
            if chain.iter().any(|c| std::ptr::eq(*c, base)) {
                break;
            }
            chain.push(base);
            current = base;
        }
        chain
            .into_iter()
            .rev()
            .flat_map(|c| c.members.iter())
            .collect()
    }

    /// Stable key of a reference, used for node keys and wrapper hashing.
    pub fn key_of(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Native(native) => native.backend.clone(),
            TypeRef::Node(id) => self.get(*id).key.clone(),
            TypeRef::Override { backend, .. } | TypeRef::Unknown { backend } => backend.clone(),
            TypeRef::Param(name) => name.clone(),
        }
    }
}

const TASK_WRAPPERS: &[&str] = &["System.Threading.Tasks.Task", "System.Threading.Tasks.ValueTask"];

const ACTION_RESULT_WRAPPERS: &[&str] = &[
    "Microsoft.AspNetCore.Mvc.ActionResult",
    "System.Web.Http.Results.OkNegotiatedContentResult",
];

const OPAQUE_RESULTS: &[&str] = &[
    "Microsoft.AspNetCore.Mvc.IActionResult",
    "Microsoft.AspNetCore.Mvc.ActionResult",
    "System.Web.Http.IHttpActionResult",
    "System.Net.Http.HttpResponseMessage",
];

const GENERIC_DICTIONARIES: &[&str] = &[
    "System.Collections.Generic.Dictionary",
    "System.Collections.Generic.IDictionary",
    "System.Collections.Generic.IReadOnlyDictionary",
    "System.Collections.Generic.SortedDictionary",
    "System.Collections.Generic.SortedList",
    "System.Collections.Concurrent.ConcurrentDictionary",
    "System.Collections.Immutable.ImmutableDictionary",
];

const UNTYPED_DICTIONARIES: &[&str] = &["System.Collections.Hashtable", "System.Collections.IDictionary"];

const GENERIC_SEQUENCES: &[&str] = &[
    "System.Collections.Generic.List",
    "System.Collections.Generic.IList",
    "System.Collections.Generic.ICollection",
    "System.Collections.Generic.IEnumerable",
    "System.Collections.Generic.IReadOnlyList",
    "System.Collections.Generic.IReadOnlyCollection",
    "System.Collections.Generic.HashSet",
    "System.Collections.Generic.ISet",
    "System.Collections.Generic.SortedSet",
    "System.Collections.Generic.LinkedList",
    "System.Collections.Generic.Queue",
    "System.Collections.Generic.Stack",
    "System.Collections.ObjectModel.Collection",
    "System.Collections.ObjectModel.ReadOnlyCollection",
    "System.Collections.ObjectModel.ObservableCollection",
    "System.Collections.Immutable.ImmutableArray",
    "System.Collections.Immutable.ImmutableList",
];

const UNTYPED_SEQUENCES: &[&str] = &[
    "System.Collections.ArrayList",
    "System.Collections.IEnumerable",
    "System.Collections.ICollection",
    "System.Collections.IList",
];

/// Match a backend name against a list of well-known qualified names. A bare
/// simple name (`List`, `Task`) matches too.
fn is_known(name: &str, known: &[&str]) -> bool {
    known
        .iter()
        .any(|k| *k == name || (!name.contains('.') && split_qualified(k).1 == name))
}

type Scope = HashMap<String, TypeRef>;

pub struct TypeWalker<'a, P: TypeProvider + ?Sized> {
    provider: &'a P,
    natives: &'a NativeTable,
    config: &'a TypeConfig,
    registry: TypeRegistry,
    reported: HashSet<String>,
}

impl<P: TypeProvider + ?Sized> std::fmt::Debug for TypeWalker<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeWalker")
            .field("nodes", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl<'a, P: TypeProvider + ?Sized> TypeWalker<'a, P> {
    pub fn new(provider: &'a P, natives: &'a NativeTable, config: &'a TypeConfig) -> Self {
        Self {
            provider,
            natives,
            config,
            registry: TypeRegistry::default(),
            reported: HashSet::new(),
        }
    }

    /// Resolve a root type expression, registering everything reachable from it.
    pub fn resolve(&mut self, expr: &str) -> Result<TypeRef> {
        if let Some(resolved) = self.registry.resolved.get(expr) {
            return Ok(resolved.clone());
        }
        let parsed = TypeExpr::parse(expr)?;
        let resolved = self.resolve_expr(&parsed, &Scope::new())?;
        self.registry.resolved.insert(expr.to_string(), resolved.clone());
        Ok(resolved)
    }

    pub fn finish(self) -> TypeRegistry {
        debug!(
            nodes = self.registry.len(),
            diagnostics = self.registry.diagnostics.len(),
            "Type walk complete."
        );
        self.registry
    }

    fn resolve_expr(&mut self, expr: &TypeExpr, scope: &Scope) -> Result<TypeRef> {
        if let TypeExpr::Named { name, args } = expr {
            if args.is_empty() {
                if let Some(bound) = scope.get(name) {
                    return Ok(bound.clone());
                }
            }
        }

        if let Some(ts) = self.override_for(expr) {
            return Ok(TypeRef::Override {
                backend: expr.to_string(),
                ts,
            });
        }

        if let Some(inner) = self.unwrap_wrapper(expr) {
            return self.resolve_expr(inner, scope);
        }
        if let TypeExpr::Named { name, args } = expr {
            if args.is_empty() && is_known(name, TASK_WRAPPERS) {
                return Ok(TypeRef::Native(self.natives.void()));
            }
            if args.is_empty() && is_known(name, OPAQUE_RESULTS) {
                return Ok(TypeRef::Native(self.natives.object()));
            }
        }

        if let Some(native) = self.natives.lookup(expr) {
            return Ok(TypeRef::Native(native));
        }

        match expr {
            TypeExpr::Array(inner) => {
                let element = self.resolve_expr(inner, scope)?;
                Ok(self.collection(element))
            }
            TypeExpr::Named { name, args } => {
                if is_known(name, GENERIC_DICTIONARIES) {
                    let [key, value] = args.as_slice() else {
                        return Err(GenError::OpenGeneric {
                            type_name: expr.to_string(),
                        });
                    };
                    let key = self.resolve_expr(key, scope)?;
                    let value = self.resolve_expr(value, scope)?;
                    return Ok(self.dictionary(key, value));
                }
                if args.is_empty() && is_known(name, UNTYPED_DICTIONARIES) {
                    let key = TypeRef::Native(self.natives.object());
                    let value = TypeRef::Native(self.natives.object());
                    return Ok(self.dictionary(key, value));
                }
                if is_known(name, GENERIC_SEQUENCES) && !(args.is_empty() && is_known(name, UNTYPED_SEQUENCES)) {
                    let [element] = args.as_slice() else {
                        return Err(GenError::OpenGeneric {
                            type_name: expr.to_string(),
                        });
                    };
                    let element = self.resolve_expr(element, scope)?;
                    return Ok(self.collection(element));
                }
                if args.is_empty() && is_known(name, UNTYPED_SEQUENCES) {
                    let element = TypeRef::Native(self.natives.object());
                    return Ok(self.collection(element));
                }
                self.resolve_catalog(expr, name, args, scope)
            }
        }
    }

    fn override_for(&self, expr: &TypeExpr) -> Option<String> {
        let overrides = &self.config.overrides;
        if overrides.is_empty() {
            return None;
        }
        overrides
            .get(&expr.to_string())
            .or_else(|| overrides.get(expr.name()))
            .cloned()
    }

    fn unwrap_wrapper<'e>(&self, expr: &'e TypeExpr) -> Option<&'e TypeExpr> {
        if let Some(inner) = expr.nullable_inner() {
            return Some(inner);
        }
        match expr {
            TypeExpr::Named { name, args }
                if args.len() == 1
                    && (is_known(name, TASK_WRAPPERS) || is_known(name, ACTION_RESULT_WRAPPERS)) =>
            {
                args.first()
            }
            _ => None,
        }
    }

    fn resolve_catalog(
        &mut self,
        expr: &TypeExpr,
        name: &str,
        args: &[TypeExpr],
        scope: &Scope,
    ) -> Result<TypeRef> {
        let provider = self.provider;
        let Some(ty) = provider.find(name) else {
            return Ok(self.unknown(expr, "type is not described; rendering as any"));
        };
        if !self.config.in_boundary(name) {
            return Ok(self.unknown(expr, "type is outside the namespace boundary; rendering as any"));
        }
        if ty.synthesized {
            debug!(type_name = %name, "Skipping compiler-synthesized type.");
            return Ok(TypeRef::Native(self.natives.object()));
        }

        let mut resolved_args = Vec::with_capacity(args.len());
        for arg in args {
            resolved_args.push(self.resolve_expr(arg, scope)?);
        }
        if resolved_args.len() != ty.generic_params.len() {
            return Err(GenError::OpenGeneric {
                type_name: expr.to_string(),
            });
        }

        if ty.kind == TypeKindDesc::Enum {
            return self.enumeration(ty);
        }

        let bindings: Scope = ty
            .generic_params
            .iter()
            .cloned()
            .zip(resolved_args.iter().cloned())
            .collect();

        // A type implementing a dictionary or sequence interface is that shape.
        let interfaces = ty
            .implements
            .iter()
            .map(|i| TypeExpr::parse(i))
            .collect::<Result<Vec<_>>>()?;
        if let Some(dict) = interfaces
            .iter()
            .find(|i| is_known(i.name(), GENERIC_DICTIONARIES) && i.args().len() == 2)
        {
            return self.resolve_expr(dict, &bindings);
        }
        if let Some(seq) = interfaces
            .iter()
            .find(|i| is_known(i.name(), GENERIC_SEQUENCES) && i.args().len() == 1)
        {
            return self.resolve_expr(seq, &bindings);
        }

        self.class(ty, resolved_args, &bindings)
    }

    fn unknown(&mut self, expr: &TypeExpr, message: &str) -> TypeRef {
        let backend = expr.to_string();
        if self.reported.insert(backend.clone()) {
            warn!(type_name = %backend, "{message}");
            self.registry.diagnostics.push(Diagnostic {
                type_name: backend.clone(),
                message: message.to_string(),
            });
        }
        TypeRef::Unknown { backend }
    }

    fn intern(&mut self, key: String, kind: TypeKind) -> TypeId {
        let id = TypeId(self.registry.nodes.len());
        self.registry.index.insert(key.clone(), id);
        self.registry.nodes.push(TypeDescriptor { key, kind });
        id
    }

    fn collection(&mut self, element: TypeRef) -> TypeRef {
        let key = format!("{}[]", self.registry.key_of(&element));
        if let Some(id) = self.registry.lookup(&key) {
            return TypeRef::Node(id);
        }
        TypeRef::Node(self.intern(key, TypeKind::Collection { element }))
    }

    fn dictionary(&mut self, key: TypeRef, value: TypeRef) -> TypeRef {
        let node_key = format!(
            "System.Collections.Generic.IDictionary<{}, {}>",
            self.registry.key_of(&key),
            self.registry.key_of(&value)
        );
        if let Some(id) = self.registry.lookup(&node_key) {
            return TypeRef::Node(id);
        }
        TypeRef::Node(self.intern(node_key, TypeKind::Dictionary { key, value }))
    }

    fn enumeration(&mut self, ty: &BackendType) -> Result<TypeRef> {
        if let Some(id) = self.registry.lookup(&ty.name) {
            return Ok(TypeRef::Node(id));
        }
        let (namespace, name) = split_qualified(&ty.name);
        // `None` once an explicit value leaves no room for an implicit successor.
        let mut next = Some(0_i64);
        let values = ty
            .values
            .iter()
            .map(|v| {
                let value = match &v.value {
                    Some(EnumValue::Integer(n)) => {
                        next = n.checked_add(1);
                        EnumValue::Integer(*n)
                    }
                    Some(other) => other.clone(),
                    None => {
                        let n = next.ok_or_else(|| GenError::EnumValueOverflow {
                            type_name: ty.name.clone(),
                            member: v.name.clone(),
                        })?;
                        next = n.checked_add(1);
                        EnumValue::Integer(n)
                    }
                };
                Ok((v.name.clone(), value))
            })
            .collect::<Result<Vec<_>>>()?;
        let descriptor = EnumDescriptor {
            name: name.replace('+', "_"),
            namespace: namespace.map(str::to_string),
            values,
        };
        debug!(type_name = %ty.name, "Registered enum.");
        Ok(TypeRef::Node(self.intern(ty.name.clone(), TypeKind::Enum(descriptor))))
    }

    fn class(&mut self, ty: &BackendType, args: Vec<TypeRef>, bindings: &Scope) -> Result<TypeRef> {
        let key = if args.is_empty() {
            ty.name.clone()
        } else {
            let rendered: Vec<String> = args.iter().map(|a| self.registry.key_of(a)).collect();
            format!("{}<{}>", ty.name, rendered.join(", "))
        };
        if let Some(id) = self.registry.lookup(&key) {
            return Ok(TypeRef::Node(id));
        }

        let (namespace, name) = split_qualified(&ty.name);
        let descriptor = ClassDescriptor {
            name: name.replace('+', "_"),
            namespace: namespace.map(str::to_string),
            definition: ty.name.clone(),
            generic_params: ty.generic_params.clone(),
            generic_args: args,
            base: None,
            members: Vec::new(),
        };
        let is_declaration = descriptor.is_declaration();
        // Registered before recursing so cycles resolve to this node.
        let id = self.intern(key.clone(), TypeKind::Class(descriptor));
        debug!(type_name = %key, "Registered class.");

        if !is_declaration {
            // Make sure the generic definition itself gets declared once.
            let open = ty
                .generic_params
                .iter()
                .map(|p| (p.clone(), TypeRef::Param(p.clone())))
                .collect::<Scope>();
            let open_args = ty.generic_params.iter().map(|p| TypeRef::Param(p.clone())).collect();
            self.class(ty, open_args, &open)?;
        }

        let base = match &ty.base {
            Some(base) => match self.resolve_expr(&TypeExpr::parse(base)?, bindings)? {
                base @ TypeRef::Node(_) if self.registry.class(&base).is_some() => Some(base),
                _ => None,
            },
            None => None,
        };

        let mut members = Vec::with_capacity(ty.members.len());
        for member in ty.members.iter().filter(|m| !m.ignore && !m.is_static) {
            let expr = TypeExpr::parse(&member.ty)?;
            let optional = member.optional || expr.nullable_inner().is_some();
            let member_ty = self.resolve_expr(&expr, bindings)?;
            members.push(Member {
                name: member.name.clone(),
                ty: member_ty,
                optional,
            });
        }

        if let TypeKind::Class(class) = &mut self.registry.nodes[id.0].kind {
            class.base = base;
            class.members = members;
        }
        Ok(TypeRef::Node(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::catalog::TypeCatalog;
    use crate::model::BackendType;

    fn walk(types: Vec<BackendType>, config: &TypeConfig, roots: &[&str]) -> Result<(TypeRegistry, Vec<TypeRef>)> {
        let catalog = TypeCatalog::from_types(types)?;
        let natives = NativeTable::default();
        let mut walker = TypeWalker::new(&catalog, &natives, config);
        let mut refs = Vec::new();
        for root in roots {
            refs.push(walker.resolve(root)?);
        }
        Ok((walker.finish(), refs))
    }

    fn user_types() -> Vec<BackendType> {
        vec![
            BackendType::class("MyApp.User")
                .member("name", "string")
                .member("createdAt", "System.DateTime")
                .member("friends", "List<MyApp.User>")
                .member("manager", "MyApp.User"),
        ]
    }

    #[test]
    fn test_natives_never_become_nodes() {
        let (registry, refs) = walk(vec![], &TypeConfig::default(), &["int", "string", "System.Guid"]).unwrap();
        assert!(registry.is_empty());
        assert!(refs.iter().all(|r| matches!(r, TypeRef::Native(_))));
    }

    #[test]
    fn test_bare_system_names_are_native() {
        let (registry, refs) = walk(vec![], &TypeConfig::default(), &["DateTime", "Guid?", "List<TimeSpan>"]).unwrap();
        let TypeRef::Native(created) = &refs[0] else { panic!("expected native") };
        assert_eq!(created.backend, "System.DateTime");
        assert!(matches!(&refs[1], TypeRef::Native(n) if n.backend == "System.Guid"));
        assert_eq!(registry.len(), 1);
        assert!(registry.diagnostics().is_empty());
    }

    #[test]
    fn test_cyclic_graph_is_deduplicated() {
        let (registry, refs) = walk(
            user_types(),
            &TypeConfig::default(),
            &["MyApp.User", "Task<MyApp.User>", "MyApp.User[]"],
        )
        .unwrap();
        assert_eq!(refs[0], refs[1]);
        // User and User[] (List<User> and User[] share a node).
        assert_eq!(registry.len(), 2);
        let TypeRef::Node(id) = &refs[0] else { panic!("expected node") };
        let TypeKind::Class(class) = &registry.get(*id).kind else { panic!("expected class") };
        let names: Vec<_> = class.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["name", "createdAt", "friends", "manager"]);
        assert_eq!(class.members[3].ty, refs[0]);
    }

    #[test]
    fn test_unwraps_nullable_and_task() {
        let (_, refs) = walk(vec![], &TypeConfig::default(), &["Task<int?>", "Task", "IActionResult"]).unwrap();
        let TypeRef::Native(first) = &refs[0] else { panic!("expected native") };
        assert_eq!(first.backend, "System.Int32");
        let TypeRef::Native(second) = &refs[1] else { panic!("expected native") };
        assert_eq!(second.ts, "void");
        let TypeRef::Native(third) = &refs[2] else { panic!("expected native") };
        assert_eq!(third.ts, "any");
    }

    #[test]
    fn test_dictionary_is_checked_before_sequence() {
        let types = vec![
            BackendType::class("MyApp.Lookup")
                .implements("IEnumerable<KeyValuePair<string, int>>")
                .implements("IDictionary<string, int>"),
        ];
        let (registry, refs) = walk(types, &TypeConfig::default(), &["MyApp.Lookup"]).unwrap();
        let TypeRef::Node(id) = &refs[0] else { panic!("expected node") };
        assert!(matches!(registry.get(*id).kind, TypeKind::Dictionary { .. }));
    }

    #[test]
    fn test_open_generic_collection_is_an_error() {
        let err = walk(vec![], &TypeConfig::default(), &["System.Collections.Generic.List"]).unwrap_err();
        assert!(matches!(err, GenError::OpenGeneric { .. }));
        assert!(err.to_string().contains("System.Collections.Generic.List"));
        assert!(walk(vec![], &TypeConfig::default(), &["Dictionary<string>"]).is_err());
    }

    #[test]
    fn test_unknown_types_produce_diagnostics() {
        let config = TypeConfig {
            namespaces: vec!["MyApp".to_string()],
            ..TypeConfig::default()
        };
        let types = vec![
            BackendType::class("MyApp.Order").member("vendor", "Vendor.Thing").member("other", "Vendor.Thing"),
            BackendType::class("Vendor.Thing"),
        ];
        let (registry, _) = walk(types, &config, &["MyApp.Order", "Missing.Type"]).unwrap();
        assert_eq!(registry.diagnostics().len(), 2);
        assert_eq!(registry.diagnostics()[0].type_name, "Vendor.Thing");
    }

    #[test]
    fn test_override_short_circuits() {
        let mut config = TypeConfig::default();
        config.overrides.insert("System.DateTime".to_string(), "string".to_string());
        let (_, refs) = walk(vec![], &config, &["System.DateTime"]).unwrap();
        assert_eq!(
            refs[0],
            TypeRef::Override {
                backend: "System.DateTime".to_string(),
                ts: "string".to_string()
            }
        );
    }

    #[test]
    fn test_generic_class_registers_definition_once() {
        let types = vec![
            BackendType::class("MyApp.Page<T>").member("items", "List<T>").member("total", "int"),
            BackendType::class("MyApp.Item").member("id", "int"),
        ];
        let (registry, refs) = walk(
            types,
            &TypeConfig::default(),
            &["MyApp.Page<MyApp.Item>", "MyApp.Page<string>"],
        )
        .unwrap();
        let declarations: Vec<_> = registry
            .iter()
            .filter_map(|(_, node)| match &node.kind {
                TypeKind::Class(c) if c.is_declaration() => Some(node.key.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(declarations, vec!["MyApp.Item", "MyApp.Page<T>"]);
        let closed = registry.class(&refs[0]).unwrap();
        let TypeRef::Node(items) = &closed.members[0].ty else { panic!("expected node") };
        assert_eq!(registry.get(*items).key, "MyApp.Item[]");
    }

    #[test]
    fn test_enum_values_continue_numbering() {
        let mut color = BackendType::enumeration("MyApp.Color").value("Red", 1);
        color.values.push(crate::model::EnumMemberDesc {
            name: "Green".to_string(),
            value: None,
        });
        let (registry, refs) = walk(vec![color], &TypeConfig::default(), &["MyApp.Color"]).unwrap();
        let TypeRef::Node(id) = &refs[0] else { panic!("expected node") };
        let TypeKind::Enum(desc) = &registry.get(*id).kind else { panic!("expected enum") };
        assert_eq!(desc.values[1], ("Green".to_string(), EnumValue::Integer(2)));
    }

    #[test]
    fn test_enum_maximum_value() {
        let implicit = |name: &str| crate::model::EnumMemberDesc {
            name: name.to_string(),
            value: None,
        };
        let (registry, refs) = walk(
            vec![BackendType::enumeration("MyApp.Big").value("Min", i64::MIN).value("Max", i64::MAX)],
            &TypeConfig::default(),
            &["MyApp.Big"],
        )
        .unwrap();
        let TypeRef::Node(id) = &refs[0] else { panic!("expected node") };
        let TypeKind::Enum(desc) = &registry.get(*id).kind else { panic!("expected enum") };
        assert_eq!(desc.values[1], ("Max".to_string(), EnumValue::Integer(i64::MAX)));

        let mut big = BackendType::enumeration("MyApp.Big").value("Max", i64::MAX);
        big.values.push(implicit("Next"));
        let err = walk(vec![big], &TypeConfig::default(), &["MyApp.Big"]).unwrap_err();
        assert!(matches!(err, GenError::EnumValueOverflow { ref member, .. } if member == "Next"));

        // an explicit value after the maximum restarts numbering
        let mut big = BackendType::enumeration("MyApp.Big").value("Max", i64::MAX).value("Zero", 0);
        big.values.push(implicit("One"));
        let (registry, refs) = walk(vec![big], &TypeConfig::default(), &["MyApp.Big"]).unwrap();
        let TypeRef::Node(id) = &refs[0] else { panic!("expected node") };
        let TypeKind::Enum(desc) = &registry.get(*id).kind else { panic!("expected enum") };
        assert_eq!(desc.values[2], ("One".to_string(), EnumValue::Integer(1)));
    }

    #[test]
    fn test_ignored_and_static_members_are_skipped() {
        let mut ty = BackendType::class("MyApp.Secret").member("visible", "int");
        let mut hidden = crate::model::MemberDesc::new("hidden", "int");
        hidden.ignore = true;
        let mut shared = crate::model::MemberDesc::new("Default", "MyApp.Secret");
        shared.is_static = true;
        ty.members.push(hidden);
        ty.members.push(shared);
        let (registry, refs) = walk(vec![ty], &TypeConfig::default(), &["MyApp.Secret"]).unwrap();
        assert_eq!(registry.class(&refs[0]).unwrap().members.len(), 1);
    }

    #[test]
    fn test_all_members_includes_base() {
        let types = vec![
            BackendType::class("MyApp.Entity").member("id", "int"),
            BackendType::class("MyApp.User").base("MyApp.Entity").member("name", "string"),
        ];
        let (registry, refs) = walk(types, &TypeConfig::default(), &["MyApp.User"]).unwrap();
        let class = registry.class(&refs[0]).unwrap();
        let names: Vec<_> = registry.all_members(class).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn test_resolving_twice_is_identical() {
        let first = walk(user_types(), &TypeConfig::default(), &["MyApp.User"]).unwrap().0;
        let second = walk(user_types(), &TypeConfig::default(), &["MyApp.User"]).unwrap().0;
        let keys = |r: &TypeRegistry| r.iter().map(|(_, n)| n.key.clone()).collect::<Vec<_>>();
        assert_eq!(keys(&first), keys(&second));
    }
}
