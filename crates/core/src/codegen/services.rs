//! Proxy services (`services.ts`).
//!
//! Layout, top to bottom: request helper import, transform imports, the URL
//! helper snippet, wrapper functions, the `Endpoints` map, the aggregate
//! `Services` class, one class per controller and any hub proxies.

use crate::compiler::{CompiledAction, CompiledController, CompiledParam};
use crate::config::RenderConfig;
use crate::error::Result;
use crate::hubs::CompiledHub;
use crate::resources;
use crate::ts::types::{binop, call, ident, member, string_lit, this_member};
use crate::ts::{
    BinOp, ImportItem, TsClass, TsExpr, TsField, TsImport, TsInit, TsItem, TsLiteral, TsMethod, TsModule, TsParam,
    TsPrimitive, TsStmt, TsType, VarKind, Visibility,
};
use crate::wrappers::WrapperSet;

use super::hubs::codegen_hubs;

const AJAX: &str = "Ajax";
const AJAX_SETTINGS: &str = "IExtendedAjaxSettings";

pub fn codegen_services(
    controllers: &[CompiledController],
    hubs: &[CompiledHub],
    wrappers: &WrapperSet<'_>,
    render: &RenderConfig,
) -> Result<TsModule> {
    let mut items = vec![TsItem::Import(TsImport {
        items: vec![
            ImportItem {
                name: AJAX.to_string(),
                alias: None,
            },
            ImportItem {
                name: AJAX_SETTINGS.to_string(),
                alias: None,
            },
        ],
        namespace: None,
        from: render.ajax_path.clone(),
        type_only: false,
    })];
    items.extend(wrappers.imports()?.into_iter().map(TsItem::Import));

    items.push(TsItem::Raw(resources::load(resources::URL_HELPERS)?));
    items.extend(wrappers.functions()?.into_iter().map(TsItem::Function));

    items.push(codegen_endpoints(controllers));
    items.push(TsItem::Class(codegen_aggregate(controllers)));
    for controller in controllers {
        items.push(TsItem::Class(codegen_controller(controller, render)));
    }
    items.extend(codegen_hubs(hubs));
    Ok(TsModule { items })
}

fn settings_param(name: &str) -> TsParam {
    TsParam::optional(name, TsType::Ref(AJAX_SETTINGS.to_string()))
}

/// Parameters in declared order. An optional parameter followed by a
/// required one cannot use `?`, so it becomes `T | undefined` instead.
fn signature<'a>(params: impl IntoIterator<Item = &'a CompiledParam>) -> Vec<TsParam> {
    let params: Vec<&CompiledParam> = params.into_iter().collect();
    let last_required = params.iter().rposition(|p| !p.optional);
    params
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let trailing = last_required.is_none_or(|last| index > last);
            let ty = if p.optional && !trailing {
                TsType::Union(vec![p.ty.clone(), TsType::Primitive(TsPrimitive::Undefined)])
            } else {
                p.ty.clone()
            };
            TsParam {
                name: p.name.clone(),
                ty: Some(ty),
                optional: p.optional && trailing,
            }
        })
        .collect()
}

fn url_signature(action: &CompiledAction) -> Vec<TsParam> {
    signature(action.url_params())
}

/// `export const Endpoints = { Users: { getUser: (id: number): string => ... } }`
fn codegen_endpoints(controllers: &[CompiledController]) -> TsItem {
    let entries = controllers
        .iter()
        .map(|controller| {
            let actions = controller
                .actions
                .iter()
                .map(|action| {
                    let builder = TsExpr::Arrow {
                        params: url_signature(action),
                        return_type: Some(TsType::Primitive(TsPrimitive::String)),
                        body: Box::new(action.url.expression()),
                    };
                    (action.method_name.clone(), TsInit::Expr(builder))
                })
                .collect();
            (controller.property.clone(), TsInit::Object(actions))
        })
        .collect();
    TsItem::Const {
        name: "Endpoints".to_string(),
        is_export: true,
        ty: None,
        init: TsInit::Object(entries),
    }
}

fn service_constructor_params() -> Vec<TsParam> {
    vec![
        TsParam::new("hostname", TsType::Primitive(TsPrimitive::String)),
        settings_param("ajaxDefaults"),
    ]
}

fn codegen_aggregate(controllers: &[CompiledController]) -> TsClass {
    let fields = controllers
        .iter()
        .map(|c| TsField {
            name: c.property.clone(),
            ty: TsType::Ref(c.class_name.clone()),
            visibility: Visibility::Public,
            readonly: true,
        })
        .collect();
    let body = controllers
        .iter()
        .map(|c| {
            let service = TsExpr::New {
                callee: Box::new(ident(c.class_name.clone())),
                args: vec![ident("hostname"), ident("ajaxDefaults")],
            };
            TsStmt::Expr(binop(this_member(c.property.clone()), BinOp::Assign, service))
        })
        .collect();
    TsClass {
        name: "Services".to_string(),
        extends: None,
        is_export: true,
        fields,
        constructor: Some((service_constructor_params(), body)),
        methods: Vec::new(),
    }
}

fn codegen_controller(controller: &CompiledController, render: &RenderConfig) -> TsClass {
    let (fields, constructor_body) = match &render.base_class {
        Some(_) => (
            Vec::new(),
            vec![TsStmt::Expr(call(
                ident("super"),
                vec![ident("hostname"), ident("ajaxDefaults")],
            ))],
        ),
        None => {
            let fields = vec![
                TsField {
                    name: "_hostname".to_string(),
                    ty: TsType::Primitive(TsPrimitive::String),
                    visibility: Visibility::Private,
                    readonly: false,
                },
                TsField {
                    name: "_ajax".to_string(),
                    ty: TsType::Ref(AJAX.to_string()),
                    visibility: Visibility::Private,
                    readonly: false,
                },
            ];
            let hostname = TsExpr::Ternary {
                cond: Box::new(call(member(ident("hostname"), "endsWith"), vec![string_lit("/")])),
                then_expr: Box::new(ident("hostname")),
                else_expr: Box::new(binop(ident("hostname"), BinOp::Add, string_lit("/"))),
            };
            let ajax = TsExpr::New {
                callee: Box::new(ident(AJAX)),
                args: vec![ident("ajaxDefaults")],
            };
            let body = vec![
                TsStmt::Expr(binop(this_member("_hostname"), BinOp::Assign, hostname)),
                TsStmt::Expr(binop(this_member("_ajax"), BinOp::Assign, ajax)),
            ];
            (fields, body)
        }
    };

    TsClass {
        name: controller.class_name.clone(),
        extends: render.base_class.clone(),
        is_export: true,
        fields,
        constructor: Some((service_constructor_params(), constructor_body)),
        methods: controller
            .actions
            .iter()
            .map(|action| codegen_method(controller, action, render))
            .collect(),
    }
}

fn codegen_method(controller: &CompiledController, action: &CompiledAction, render: &RenderConfig) -> TsMethod {
    let mut params = signature(&action.params);
    params.push(settings_param("ajaxOptions"));

    let endpoint = call(
        member(member(ident("Endpoints"), controller.property.clone()), action.method_name.clone()),
        action.url_params().map(|p| ident(p.name.clone())).collect(),
    );
    let url = TsStmt::VarDecl {
        kind: VarKind::Const,
        name: "url".to_string(),
        ty: None,
        init: binop(this_member("_hostname"), BinOp::Add, endpoint),
    };

    let body = action
        .body
        .as_ref()
        .map_or(TsExpr::Literal(TsLiteral::Null), |b| TsExpr::Raw(b.clone()));
    let mut request = call(
        member(this_member("_ajax"), action.http_method.helper_method()),
        vec![ident("url"), body, ident("ajaxOptions")],
    );
    if let Some(wrapper) = &action.response_wrapper {
        request = call(member(request, "then"), vec![ident(wrapper.clone())]);
    }

    TsMethod {
        name: action.method_name.clone(),
        params,
        return_type: Some(TsType::Generic {
            name: render.promise_type.clone(),
            args: vec![action.returns.clone()],
        }),
        body: vec![url, TsStmt::Return(Some(request))],
        visibility: Visibility::Public,
    }
}
