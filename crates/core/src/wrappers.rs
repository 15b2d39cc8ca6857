//! Synthesized transform wrappers.
//!
//! A structured type with a transformable leaf somewhere inside it gets a
//! pair of functions that copy the structure and convert only those leaves.
//! Functions are named after a hash of the type's qualified key, so every
//! call site shares one definition and the output is stable across runs.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Result;
use crate::transform::{TransformRegistry, TypeTransform};
use crate::ts::types::{binop, call, ident, member};
use crate::ts::utils::name_hash;
use crate::ts::{BinOp, ObjectEntry, TsExpr, TsFunction, TsImport, TsLiteral, TsParam, TsPrimitive, TsStmt, TsType, VarKind};
use crate::walker::{TypeKind, TypeRef, TypeRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Direction {
    /// Wire representation to client representation (responses).
    ToClient,
    /// Client representation to wire representation (bodies and URL values).
    ToWire,
}

impl Direction {
    fn prefix(self) -> &'static str {
        match self {
            Direction::ToClient => "to_",
            Direction::ToWire => "from_",
        }
    }
}

#[derive(Debug)]
pub struct WrapperSet<'r> {
    registry: &'r TypeRegistry,
    transforms: &'r TransformRegistry,
    /// Per node: whether any transformable leaf is reachable.
    needs: Vec<bool>,
    requested: BTreeMap<String, (Direction, TypeRef)>,
}

impl<'r> WrapperSet<'r> {
    /// Work out which nodes need wrapping. Iterates to a fixed point so that
    /// cycles through classes settle.
    pub fn analyze(registry: &'r TypeRegistry, transforms: &'r TransformRegistry) -> Result<Self> {
        let mut set = Self {
            registry,
            transforms,
            needs: vec![false; registry.len()],
            requested: BTreeMap::new(),
        };
        if transforms.is_empty() {
            return Ok(set);
        }

        loop {
            let mut changed = false;
            for (id, node) in registry.iter() {
                if set.needs[id.index()] {
                    continue;
                }
                let need = if transforms.claimant(&node.key)?.is_some() {
                    true
                } else {
                    match &node.kind {
                        TypeKind::Collection { element } => set.ref_needs(element)?,
                        TypeKind::Dictionary { value, .. } => set.ref_needs(value)?,
                        TypeKind::Enum(_) => false,
                        TypeKind::Class(class) => {
                            let mut any = false;
                            for m in registry.all_members(class) {
                                if set.ref_needs(&m.ty)? {
                                    any = true;
                                    break;
                                }
                            }
                            any
                        }
                    }
                };
                if need {
                    set.needs[id.index()] = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        debug!(
            wrapped = set.needs.iter().filter(|n| **n).count(),
            "Wrapper analysis complete."
        );
        Ok(set)
    }

    fn ref_needs(&self, ty: &TypeRef) -> Result<bool> {
        Ok(match ty {
            TypeRef::Native(native) => self.transforms.claimant(&native.backend)?.is_some(),
            TypeRef::Node(id) => self.needs[id.index()],
            TypeRef::Override { .. } | TypeRef::Param(_) | TypeRef::Unknown { .. } => false,
        })
    }

    /// Whether values of `ty` must pass through a wrapper.
    pub fn needs(&self, ty: &TypeRef) -> Result<bool> {
        self.ref_needs(ty)
    }

    /// Transform claiming `ty` itself, as opposed to something inside it.
    fn leaf_claimant(&self, ty: &TypeRef) -> Result<Option<&'r dyn TypeTransform>> {
        match ty {
            TypeRef::Native(native) => self.transforms.claimant(&native.backend),
            TypeRef::Node(id) => self.transforms.claimant(&self.registry.get(*id).key),
            _ => Ok(None),
        }
    }

    fn function_name(&self, ty: &TypeRef, direction: Direction) -> String {
        format!("{}{}", direction.prefix(), name_hash(&self.registry.key_of(ty)))
    }

    /// Ensure a wrapper exists for `ty` and return its name, or `None` when
    /// values of `ty` pass through unchanged.
    pub fn request(&mut self, ty: &TypeRef, direction: Direction) -> Result<Option<String>> {
        if !self.needs(ty)? {
            return Ok(None);
        }
        let name = self.function_name(ty, direction);
        if self.requested.contains_key(&name) {
            return Ok(Some(name));
        }
        self.requested.insert(name.clone(), (direction, ty.clone()));
        debug!(function = %name, type_name = %self.registry.key_of(ty), "Requested wrapper.");

        if self.leaf_claimant(ty)?.is_none() {
            if let TypeRef::Node(id) = ty {
                let registry = self.registry;
                match &registry.get(*id).kind {
                    TypeKind::Collection { element } => {
                        self.request(element, direction)?;
                    }
                    TypeKind::Dictionary { value, .. } => {
                        self.request(value, direction)?;
                    }
                    TypeKind::Class(class) => {
                        for m in registry.all_members(class) {
                            self.request(&m.ty, direction)?;
                        }
                    }
                    TypeKind::Enum(_) => {}
                }
            }
        }
        Ok(Some(name))
    }

    /// `value` passed through the wrapper for `ty`, or unchanged.
    pub fn wrap(&mut self, ty: &TypeRef, direction: Direction, value: &str) -> Result<String> {
        Ok(match self.request(ty, direction)? {
            Some(name) => format!("{name}({value})"),
            None => value.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }

    /// Names of the requested wrappers, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.requested.keys().map(String::as_str)
    }

    /// Imports needed by the transforms the requested wrappers apply.
    pub fn imports(&self) -> Result<Vec<TsImport>> {
        let mut imports: Vec<TsImport> = Vec::new();
        for (_, ty) in self.requested.values() {
            if let Some(transform) = self.leaf_claimant(ty)? {
                for import in transform.imports() {
                    if !imports.contains(&import) {
                        imports.push(import);
                    }
                }
            }
        }
        Ok(imports)
    }

    /// Every requested wrapper, in name order.
    pub fn functions(&self) -> Result<Vec<TsFunction>> {
        self.requested
            .iter()
            .map(|(name, (direction, ty))| self.function(name, *direction, ty))
            .collect()
    }

    fn function(&self, name: &str, direction: Direction, ty: &TypeRef) -> Result<TsFunction> {
        let any = TsType::Primitive(TsPrimitive::Any);
        let mut body = vec![TsStmt::If {
            cond: binop(ident("value"), BinOp::LooseEqual, TsExpr::Literal(TsLiteral::Null)),
            then_body: vec![TsStmt::Return(Some(ident("value")))],
            else_body: None,
        }];

        if let Some(transform) = self.leaf_claimant(ty)? {
            let converted = match direction {
                Direction::ToClient => transform.to_client("value"),
                Direction::ToWire => transform.to_wire("value"),
            };
            body.push(TsStmt::Return(Some(TsExpr::Raw(converted))));
        } else if let TypeRef::Node(id) = ty {
            match &self.registry.get(*id).kind {
                TypeKind::Collection { element } => {
                    let callee = self.function_name(element, direction);
                    let mapper = TsExpr::Arrow {
                        params: vec![TsParam::new("item", any.clone())],
                        return_type: None,
                        body: Box::new(call(ident(callee), vec![ident("item")])),
                    };
                    body.push(TsStmt::Return(Some(call(member(ident("value"), "map"), vec![mapper]))));
                }
                TypeKind::Dictionary { value, .. } => {
                    let callee = self.function_name(value, direction);
                    let entry = |object: &str| TsExpr::Index {
                        object: Box::new(ident(object)),
                        index: Box::new(ident("key")),
                    };
                    body.push(TsStmt::VarDecl {
                        kind: VarKind::Const,
                        name: "result".to_string(),
                        ty: Some(any.clone()),
                        init: TsExpr::Object(Vec::new()),
                    });
                    body.push(TsStmt::ForOf {
                        binding: "key".to_string(),
                        iterable: call(ident("Object.keys"), vec![ident("value")]),
                        body: vec![TsStmt::Expr(binop(
                            entry("result"),
                            BinOp::Assign,
                            call(ident(callee), vec![entry("value")]),
                        ))],
                    });
                    body.push(TsStmt::Return(Some(ident("result"))));
                }
                TypeKind::Class(class) => {
                    body.push(TsStmt::VarDecl {
                        kind: VarKind::Const,
                        name: "result".to_string(),
                        ty: None,
                        init: TsExpr::Object(vec![ObjectEntry::Spread(ident("value"))]),
                    });
                    for m in self.registry.all_members(class) {
                        if !self.needs(&m.ty)? {
                            continue;
                        }
                        let callee = self.function_name(&m.ty, direction);
                        body.push(TsStmt::Expr(binop(
                            member(ident("result"), m.name.clone()),
                            BinOp::Assign,
                            call(ident(callee), vec![member(ident("value"), m.name.clone())]),
                        )));
                    }
                    body.push(TsStmt::Return(Some(ident("result"))));
                }
                TypeKind::Enum(_) => body.push(TsStmt::Return(Some(ident("value")))),
            }
        }

        Ok(TsFunction {
            name: name.to_string(),
            type_params: Vec::new(),
            params: vec![TsParam::new("value", any.clone())],
            return_type: Some(any),
            body,
            is_export: false,
        })
    }
}
