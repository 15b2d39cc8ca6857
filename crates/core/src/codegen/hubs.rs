//! SignalR hub proxies, appended to `services.ts` when hubs are registered.

use crate::hubs::{CompiledHub, CompiledHubMethod};
use crate::ts::types::{call, ident, member, string_lit};
use crate::ts::{TsExpr, TsFunction, TsItem, TsMethodSig, TsParam, TsPrimitive, TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind};

const PROMISE: &str = "ISignalRPromise";
const CONNECTION: &str = "SignalR.Hub.Connection";
const PROXY: &str = "SignalR.Hub.Proxy";

pub fn codegen_hubs(hubs: &[CompiledHub]) -> Vec<TsItem> {
    if hubs.is_empty() {
        return Vec::new();
    }
    let mut items = vec![TsItem::TypeDef(promise_interface())];
    for hub in hubs {
        items.extend(codegen_hub(hub));
    }
    items.push(TsItem::TypeDef(interface(
        "SignalR",
        false,
        hubs.iter()
            .map(|hub| TsProp {
                name: hub.property.clone(),
                ty: TsType::Ref(format!("I{}Proxy", hub.name)),
                optional: false,
            })
            .collect(),
        Vec::new(),
    )));
    items
}

fn interface(name: impl Into<String>, is_export: bool, properties: Vec<TsProp>, methods: Vec<TsMethodSig>) -> TsTypeDef {
    TsTypeDef {
        name: name.into(),
        is_export,
        kind: TypeDefKind::Interface {
            type_params: Vec::new(),
            extends: None,
            properties,
            methods,
        },
    }
}

fn promise_of(ty: TsType) -> TsType {
    TsType::Generic {
        name: PROMISE.to_string(),
        args: vec![ty],
    }
}

/// `interface ISignalRPromise<T>` with `done` and `error` callbacks.
fn promise_interface() -> TsTypeDef {
    let callback = |name: &str, param: &str, ty: TsType| TsMethodSig {
        name: name.to_string(),
        params: vec![TsParam::new(
            "cb",
            TsType::Function {
                params: vec![TsParam::new(param, ty)],
                return_type: Box::new(TsType::Primitive(TsPrimitive::Any)),
            },
        )],
        return_type: promise_of(TsType::Ref("T".to_string())),
    };
    TsTypeDef {
        name: PROMISE.to_string(),
        is_export: false,
        kind: TypeDefKind::Interface {
            type_params: vec!["T".to_string()],
            extends: None,
            properties: Vec::new(),
            methods: vec![
                callback("done", "result", TsType::Ref("T".to_string())),
                callback("error", "error", TsType::Primitive(TsPrimitive::Any)),
            ],
        },
    }
}

fn signature(method: &CompiledHubMethod, is_client: bool) -> TsMethodSig {
    let void = TsType::Primitive(TsPrimitive::Void);
    TsMethodSig {
        name: method.method_name.clone(),
        params: method
            .params
            .iter()
            .map(|p| TsParam::new(p.name.clone(), p.ty.clone()))
            .collect(),
        return_type: match &method.returns {
            Some(ty) if !is_client => promise_of(ty.clone()),
            _ => void,
        },
    }
}

fn codegen_hub(hub: &CompiledHub) -> Vec<TsItem> {
    let name = &hub.name;
    let client_name = format!("I{name}Client");
    let mut items = Vec::new();

    let client_methods = hub
        .client
        .iter()
        .flatten()
        .map(|m| signature(m, true))
        .collect();
    if hub.client.is_none() {
        items.push(TsItem::Raw(format!(
            "/* {client_name} has no methods as hub {name} has no typed client contract */"
        )));
    }
    items.push(TsItem::TypeDef(interface(client_name.clone(), true, Vec::new(), client_methods)));

    items.push(match &hub.hub_name {
        Some(hub_name) => TsItem::Function(TsFunction {
            name: format!("{name}Client_CreateHubProxy"),
            type_params: Vec::new(),
            params: vec![TsParam::new("connection", TsType::Ref(CONNECTION.to_string()))],
            return_type: Some(TsType::Ref(PROXY.to_string())),
            body: vec![TsStmt::Return(Some(call(
                member(ident("connection"), "createHubProxy"),
                vec![string_lit(hub_name.clone())],
            )))],
            is_export: true,
        }),
        None => TsItem::Raw(format!(
            "/* function {name}Client_CreateHubProxy not generated as hub {name} has no hub name */"
        )),
    });

    items.push(match &hub.client {
        Some(methods) => TsItem::Function(TsFunction {
            name: format!("{name}Client_BindProxy"),
            type_params: Vec::new(),
            params: vec![
                TsParam::new("proxy", TsType::Ref(PROXY.to_string())),
                TsParam::new("client", TsType::Ref(client_name.clone())),
            ],
            return_type: Some(TsType::Primitive(TsPrimitive::Void)),
            body: methods.iter().map(bind_callback).collect(),
            is_export: true,
        }),
        None => TsItem::Raw(format!(
            "/* function {name}Client_BindProxy not generated as hub {name} has no typed client contract */"
        )),
    });

    items.push(TsItem::TypeDef(interface(
        format!("I{name}"),
        false,
        Vec::new(),
        hub.server.iter().map(|m| signature(m, false)).collect(),
    )));
    items.push(TsItem::TypeDef(interface(
        format!("I{name}Proxy"),
        false,
        vec![
            TsProp {
                name: "server".to_string(),
                ty: TsType::Ref(format!("I{name}")),
                optional: false,
            },
            TsProp {
                name: "client".to_string(),
                ty: TsType::Ref(client_name),
                optional: false,
            },
        ],
        Vec::new(),
    )));
    items
}

/// `proxy.on("Name", (a, b) => client.name(a, b));`
fn bind_callback(method: &CompiledHubMethod) -> TsStmt {
    let handler = TsExpr::Arrow {
        params: method
            .params
            .iter()
            .map(|p| TsParam {
                name: p.name.clone(),
                ty: None,
                optional: false,
            })
            .collect(),
        return_type: None,
        body: Box::new(call(
            member(ident("client"), method.method_name.clone()),
            method.params.iter().map(|p| TsExpr::Raw(p.value.clone())).collect(),
        )),
    };
    TsStmt::Expr(call(
        member(ident("proxy"), "on"),
        vec![string_lit(method.name.clone()), handler],
    ))
}
