//! Real-time hub compiler.
//!
//! Resolves the method signatures of each SignalR hub against the walked type
//! graph. Client callbacks receive wire values, so their arguments go through
//! the same wrappers as action responses.

use std::collections::HashSet;

use tracing::debug;

use crate::codegen::naming::TypeNamer;
use crate::error::{GenError, Result};
use crate::model::{HubDesc, HubMethodDesc};
use crate::ts::utils::{lower_first, sanitize_ts_identifier};
use crate::ts::{TsPrimitive, TsType};
use crate::walker::TypeRegistry;
use crate::wrappers::{Direction, WrapperSet};

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledHubParam {
    pub name: String,
    pub ty: TsType,
    /// Client expression handing the argument to a client callback.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledHubMethod {
    /// Backend method name, used as the event name on the wire.
    pub name: String,
    pub method_name: String,
    pub params: Vec<CompiledHubParam>,
    /// `None` when the method returns nothing.
    pub returns: Option<TsType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledHub {
    pub name: String,
    /// Property on the aggregate `SignalR` interface.
    pub property: String,
    pub hub_name: Option<String>,
    pub server: Vec<CompiledHubMethod>,
    pub client: Option<Vec<CompiledHubMethod>>,
}

#[derive(Debug)]
pub struct HubCompiler<'c, 'r> {
    registry: &'r TypeRegistry,
    namer: &'c TypeNamer<'r>,
    wrappers: &'c mut WrapperSet<'r>,
}

impl<'c, 'r> HubCompiler<'c, 'r> {
    pub fn new(registry: &'r TypeRegistry, namer: &'c TypeNamer<'r>, wrappers: &'c mut WrapperSet<'r>) -> Self {
        Self {
            registry,
            namer,
            wrappers,
        }
    }

    /// Compile hubs in name order; two hubs may not share a class name.
    pub fn compile(&mut self, hubs: &[HubDesc]) -> Result<Vec<CompiledHub>> {
        let mut seen = HashSet::new();
        let mut sorted: Vec<&HubDesc> = hubs.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
            .into_iter()
            .map(|hub| {
                if !seen.insert(hub.name.as_str()) {
                    return Err(GenError::DuplicateHub(hub.name.clone()));
                }
                self.compile_hub(hub)
            })
            .collect()
    }

    fn compile_hub(&mut self, hub: &HubDesc) -> Result<CompiledHub> {
        let server = self.compile_methods(&hub.methods, false)?;
        let client = hub
            .client
            .as_deref()
            .map(|methods| self.compile_methods(methods, true))
            .transpose()?;
        debug!(hub = %hub.name, methods = server.len(), "Compiled hub.");
        Ok(CompiledHub {
            name: hub.name.clone(),
            property: lower_first(&hub.name),
            hub_name: hub.hub_name.clone().filter(|name| !name.is_empty()),
            server,
            client,
        })
    }

    fn compile_methods(&mut self, methods: &[HubMethodDesc], is_client: bool) -> Result<Vec<CompiledHubMethod>> {
        let mut sorted: Vec<&HubMethodDesc> = methods.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted.into_iter().map(|m| self.compile_method(m, is_client)).collect()
    }

    fn compile_method(&mut self, method: &HubMethodDesc, is_client: bool) -> Result<CompiledHubMethod> {
        let registry = self.registry;
        let params = method
            .parameters
            .iter()
            .map(|param| {
                let name = sanitize_ts_identifier(&param.name);
                let ty = registry.reference(&param.ty)?;
                let value = if is_client {
                    self.wrappers.wrap(ty, Direction::ToClient, &name)?
                } else {
                    name.clone()
                };
                Ok(CompiledHubParam {
                    ty: self.namer.ts_type(ty)?,
                    name,
                    value,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let returns = match &method.returns {
            Some(expr) if !is_client => {
                let ty = self.namer.ts_type(registry.reference(expr)?)?;
                (ty != TsType::Primitive(TsPrimitive::Void)).then_some(ty)
            }
            _ => None,
        };

        Ok(CompiledHubMethod {
            name: method.name.clone(),
            method_name: lower_first(&method.name),
            params,
            returns,
        })
    }
}
