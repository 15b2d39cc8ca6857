//! Route/action compiler.
//!
//! Turns one controller action into everything the renderer needs: the
//! resolved template, the client signature, which parameter (if any) is the
//! request body, and the URL as ordered path parts and query triples. All
//! HTTP-level validation happens here.

use std::collections::HashMap;

use tracing::debug;

use crate::codegen::naming::TypeNamer;
use crate::config::MethodNaming;
use crate::error::{GenError, Result};
use crate::model::{ActionDesc, BindingMode, ControllerDesc, HttpMethod, ParamDesc};
use crate::route::{Segment, Token, parse_template, resolve_template};
use crate::ts::types::{binop, call, ident, string_lit};
use crate::ts::utils::{format_param_access, sanitize_ts_identifier};
use crate::ts::{BinOp, TsExpr, TsLiteral, TsPrimitive, TsType};
use crate::type_expr::TypeExpr;
use crate::walker::{TypeKind, TypeRef, TypeRegistry};
use crate::wrappers::{Direction, WrapperSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    Route,
    Query,
    Body,
    /// A class parameter spread into one optional query value per member.
    FlattenedQuery,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledParam {
    /// Identifier in the client signature.
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
    pub role: ParamRole,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathPart {
    Literal(String),
    Placeholder {
        name: String,
        /// Client expression producing the segment value.
        value: String,
        optional: bool,
        catch_all: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPart {
    pub value: String,
    pub name: String,
    pub optional: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlTemplate {
    pub path: Vec<PathPart>,
    pub query: Vec<QueryPart>,
}

impl UrlTemplate {
    /// Plain string concatenation suffices when every path value is required
    /// and there is no query string.
    pub fn is_concatenable(&self) -> bool {
        self.query.is_empty()
            && self
                .path
                .iter()
                .all(|part| !matches!(part, PathPart::Placeholder { optional: true, .. }))
    }

    /// Client expression building the relative URL.
    pub fn expression(&self) -> TsExpr {
        if self.is_concatenable() {
            self.concatenation()
        } else {
            self.build_url_call()
        }
    }

    fn concatenation(&self) -> TsExpr {
        let mut pieces: Vec<TsExpr> = Vec::new();
        let mut literal = String::new();
        for part in &self.path {
            match part {
                PathPart::Literal(text) => literal.push_str(text),
                PathPart::Placeholder { value, catch_all, .. } => {
                    pieces.push(string_lit(std::mem::take(&mut literal)));
                    pieces.push(encode(value, *catch_all));
                }
            }
        }
        pieces.push(string_lit(literal));

        let mut pieces = pieces.into_iter();
        let first = pieces.next().unwrap_or_else(|| string_lit(""));
        pieces.fold(first, |acc, piece| binop(acc, BinOp::Add, piece))
    }

    fn build_url_call(&self) -> TsExpr {
        let path = self
            .path
            .iter()
            .map(|part| match part {
                PathPart::Literal(text) => string_lit(text.clone()),
                PathPart::Placeholder {
                    name,
                    value,
                    optional,
                    catch_all,
                } => {
                    let mut entry = vec![TsExpr::Raw(value.clone()), string_lit(name.clone())];
                    if *optional || *catch_all {
                        entry.push(TsExpr::Literal(TsLiteral::Bool(*optional)));
                    }
                    if *catch_all {
                        entry.push(TsExpr::Literal(TsLiteral::Bool(true)));
                    }
                    TsExpr::Array(entry)
                }
            })
            .collect();
        let query = self
            .query
            .iter()
            .map(|q| {
                TsExpr::Array(vec![
                    TsExpr::Raw(q.value.clone()),
                    string_lit(q.name.clone()),
                    TsExpr::Literal(TsLiteral::Bool(q.optional)),
                ])
            })
            .collect();
        call(
            ident("_build_url"),
            vec![string_lit(""), TsExpr::Array(path), TsExpr::Array(query)],
        )
    }
}

fn encode(value: &str, catch_all: bool) -> TsExpr {
    let function = if catch_all { "encodeURI" } else { "encodeURIComponent" };
    call(ident(function), vec![TsExpr::Raw(value.to_string())])
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledAction {
    /// Backend action name.
    pub action: String,
    pub method_name: String,
    pub http_method: HttpMethod,
    pub template: String,
    pub params: Vec<CompiledParam>,
    /// Client expression sent as the request body.
    pub body: Option<String>,
    pub url: UrlTemplate,
    /// Payload type, before wrapping in the promise type.
    pub returns: TsType,
    /// Wrapper converting the response to its client representation.
    pub response_wrapper: Option<String>,
}

impl CompiledAction {
    /// Parameters the URL depends on, i.e. everything except the body.
    pub fn url_params(&self) -> impl Iterator<Item = &CompiledParam> {
        self.params.iter().filter(|p| p.role != ParamRole::Body)
    }

    pub fn body_param(&self) -> Option<&CompiledParam> {
        self.params.iter().find(|p| p.role == ParamRole::Body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledController {
    /// Backend controller name.
    pub name: String,
    /// Key in `Endpoints` and property on the aggregate `Services` class.
    pub property: String,
    pub class_name: String,
    pub actions: Vec<CompiledAction>,
}

struct Param<'a> {
    desc: &'a ParamDesc,
    ident: String,
    ty: TypeRef,
}

#[derive(Debug)]
pub struct RouteCompiler<'c, 'r> {
    registry: &'r TypeRegistry,
    namer: &'c TypeNamer<'r>,
    wrappers: &'c mut WrapperSet<'r>,
    naming: &'c MethodNaming,
}

impl<'c, 'r> RouteCompiler<'c, 'r> {
    pub fn new(
        registry: &'r TypeRegistry,
        namer: &'c TypeNamer<'r>,
        wrappers: &'c mut WrapperSet<'r>,
        naming: &'c MethodNaming,
    ) -> Self {
        Self {
            registry,
            namer,
            wrappers,
            naming,
        }
    }

    /// Compile every action of a controller, in description order.
    pub fn compile_controller(&mut self, controller: &ControllerDesc) -> Result<CompiledController> {
        let display = controller.display_name();
        let mut actions: Vec<CompiledAction> = Vec::with_capacity(controller.actions.len());
        let mut routes: HashMap<(HttpMethod, String), &str> = HashMap::new();
        let mut methods: HashMap<String, &str> = HashMap::new();

        for action in &controller.actions {
            let compiled = self.compile_action(controller, action)?;

            let route_key = (compiled.http_method, normalize_template(&compiled.template)?);
            if let Some(first) = routes.insert(route_key, &action.name) {
                return Err(GenError::DuplicateRoute {
                    controller: controller.name.clone(),
                    method: compiled.http_method.as_str(),
                    template: compiled.template.clone(),
                    first: first.to_string(),
                    second: action.name.clone(),
                });
            }
            if let Some(first) = methods.insert(compiled.method_name.clone(), &action.name) {
                return Err(GenError::DuplicateMethod {
                    controller: controller.name.clone(),
                    method_name: compiled.method_name.clone(),
                    first: first.to_string(),
                    second: action.name.clone(),
                });
            }
            actions.push(compiled);
        }

        debug!(controller = %controller.name, actions = actions.len(), "Compiled controller.");
        Ok(CompiledController {
            name: controller.name.clone(),
            property: display.to_string(),
            class_name: format!("{display}Service"),
            actions,
        })
    }

    pub fn compile_action(&mut self, controller: &ControllerDesc, action: &ActionDesc) -> Result<CompiledAction> {
        let template = resolve_template(
            controller.route.as_deref(),
            action.route.as_deref(),
            controller.display_name(),
            &action.name,
        );
        let segments = parse_template(&template)?;
        let tokens: Vec<&Token> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Token(t) => Some(t),
                Segment::Literal(_) => None,
            })
            .collect();

        let params = action
            .parameters
            .iter()
            .map(|desc| {
                Ok(Param {
                    desc,
                    ident: sanitize_ts_identifier(&desc.name),
                    ty: self.registry.reference(&desc.ty)?.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let is_route = |p: &Param<'_>| tokens.iter().any(|t| t.name.eq_ignore_ascii_case(&p.desc.name));

        // Body selection.
        let candidates: Vec<usize> = params
            .iter()
            .enumerate()
            .filter(|(_, p)| !is_route(*p) && p.desc.binding != BindingMode::FromUri)
            .filter(|(_, p)| p.desc.binding == BindingMode::FromBody || self.is_complex(&p.ty))
            .map(|(i, _)| i)
            .collect();
        if candidates.len() > 1 {
            let names: Vec<&str> = candidates.iter().map(|&i| params[i].desc.name.as_str()).collect();
            return Err(GenError::AmbiguousBody {
                action: action.name.clone(),
                candidates: names.join(", "),
                template,
            });
        }
        let mut body_index = candidates.first().copied();
        let mut flattened: Option<usize> = None;
        if let Some(index) = body_index {
            if !action.method.allows_body() {
                let param = &params[index];
                let flattenable = params.len() == 1
                    && param.desc.binding != BindingMode::FromBody
                    && self.registry.class(&param.ty).is_some();
                if !flattenable {
                    return Err(GenError::GetWithBody {
                        action: action.name.clone(),
                        param: param.desc.name.clone(),
                        template,
                    });
                }
                debug!(action = %action.name, param = %param.desc.name, "Flattening GET parameter into query.");
                body_index = None;
                flattened = Some(index);
            }
        }

        // Path.
        let mut path = Vec::with_capacity(segments.len());
        let mut previous_optional: Option<&str> = None;
        let mut route_indices = Vec::new();
        for segment in &segments {
            let token = match segment {
                Segment::Literal(text) => {
                    path.push(PathPart::Literal(text.clone()));
                    continue;
                }
                Segment::Token(token) => token,
            };
            let index = self.match_token(action, &template, token, &params)?;
            let param = &params[index];
            self.check_route_param(action, &template, token, param)?;

            if token.optional {
                previous_optional = Some(&token.name);
            } else if let Some(previous) = previous_optional {
                return Err(GenError::RequiredAfterOptional {
                    action: action.name.clone(),
                    token: token.name.clone(),
                    previous: previous.to_string(),
                    template,
                });
            }

            route_indices.push(index);
            path.push(PathPart::Placeholder {
                name: param.ident.clone(),
                value: self.wrappers.wrap(&param.ty, Direction::ToWire, &param.ident)?,
                optional: token.optional,
                catch_all: token.catch_all,
            });
        }

        // Query and signature, in parameter order.
        let mut query = Vec::new();
        let mut compiled_params = Vec::with_capacity(params.len());
        let mut body = None;
        for (index, param) in params.iter().enumerate() {
            let role = if route_indices.contains(&index) {
                ParamRole::Route
            } else if body_index == Some(index) {
                body = Some(self.wrappers.wrap(&param.ty, Direction::ToWire, &param.ident)?);
                ParamRole::Body
            } else if flattened == Some(index) {
                self.flatten(param, &mut query)?;
                ParamRole::FlattenedQuery
            } else {
                query.push(QueryPart {
                    value: self.wrappers.wrap(&param.ty, Direction::ToWire, &param.ident)?,
                    name: param.desc.name.clone(),
                    optional: param.desc.optional,
                });
                ParamRole::Query
            };
            compiled_params.push(CompiledParam {
                name: param.ident.clone(),
                ty: self.namer.ts_type(&param.ty)?,
                optional: param.desc.optional,
                role,
            });
        }

        let (returns, response_wrapper) = match &action.returns {
            Some(expr) => {
                let ty = self.registry.reference(expr)?.clone();
                (self.namer.ts_type(&ty)?, self.wrappers.request(&ty, Direction::ToClient)?)
            }
            None => (TsType::Primitive(TsPrimitive::Void), None),
        };

        let compiled = CompiledAction {
            action: action.name.clone(),
            method_name: self.naming.apply(&action.name),
            http_method: action.method,
            template,
            params: compiled_params,
            body,
            url: UrlTemplate { path, query },
            returns,
            response_wrapper,
        };
        debug!(
            action = %compiled.action,
            method = compiled.http_method.as_str(),
            template = %compiled.template,
            "Compiled action."
        );
        Ok(compiled)
    }

    /// Whether a parameter of this type would travel in the request body.
    fn is_complex(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Node(id) => match &self.registry.get(*id).kind {
                TypeKind::Class(_) | TypeKind::Dictionary { .. } => true,
                TypeKind::Collection { element } => self.is_complex(element),
                TypeKind::Enum(_) => false,
            },
            TypeRef::Unknown { .. } => true,
            TypeRef::Native(_) | TypeRef::Override { .. } | TypeRef::Param(_) => false,
        }
    }

    fn match_token(&self, action: &ActionDesc, template: &str, token: &Token, params: &[Param<'_>]) -> Result<usize> {
        let matches: Vec<usize> = params
            .iter()
            .enumerate()
            .filter(|(_, p)| p.desc.name.eq_ignore_ascii_case(&token.name))
            .map(|(i, _)| i)
            .collect();
        match matches.as_slice() {
            [index] => Ok(*index),
            [] => Err(GenError::UnmatchedRouteToken {
                action: action.name.clone(),
                token: token.name.clone(),
                available: params.iter().map(|p| p.desc.name.as_str()).collect::<Vec<_>>().join(", "),
                template: template.to_string(),
            }),
            many => Err(GenError::AmbiguousRouteToken {
                action: action.name.clone(),
                token: token.name.clone(),
                matches: many
                    .iter()
                    .map(|&i| params[i].desc.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                template: template.to_string(),
            }),
        }
    }

    fn check_route_param(&self, action: &ActionDesc, template: &str, token: &Token, param: &Param<'_>) -> Result<()> {
        let allowed = match &param.ty {
            TypeRef::Native(native) => native.class.allowed_in_route(),
            TypeRef::Override { .. } => true,
            TypeRef::Node(id) => matches!(self.registry.get(*id).kind, TypeKind::Enum(_)),
            TypeRef::Param(_) | TypeRef::Unknown { .. } => false,
        };
        if !allowed {
            return Err(GenError::UnsupportedRouteType {
                action: action.name.clone(),
                param: param.desc.name.clone(),
                type_name: param.desc.ty.clone(),
                template: template.to_string(),
            });
        }

        let mismatch = |token_kind, param_kind| GenError::OptionalityMismatch {
            action: action.name.clone(),
            token: token.name.clone(),
            param: param.desc.name.clone(),
            token_kind,
            param_kind,
            template: template.to_string(),
        };
        match (token.optional, param.desc.optional) {
            (true, false) if !token.has_default && !self.inherently_nullable(param)? => {
                Err(mismatch("optional", "required"))
            }
            (false, true) => Err(mismatch("required", "optional")),
            _ => Ok(()),
        }
    }

    fn inherently_nullable(&self, param: &Param<'_>) -> Result<bool> {
        if TypeExpr::parse(&param.desc.ty)?.nullable_inner().is_some() {
            return Ok(true);
        }
        Ok(matches!(&param.ty, TypeRef::Native(native) if native.is_string()))
    }

    fn flatten(&mut self, param: &Param<'_>, query: &mut Vec<QueryPart>) -> Result<()> {
        let registry = self.registry;
        let Some(class) = registry.class(&param.ty) else {
            return Ok(());
        };
        for member in registry.all_members(class) {
            let access = format_param_access(&param.ident, &member.name, false);
            query.push(QueryPart {
                value: self.wrappers.wrap(&member.ty, Direction::ToWire, &access)?,
                name: member.name.clone(),
                optional: true,
            });
        }
        Ok(())
    }
}

/// Template identity for duplicate detection: literals compare
/// case-insensitively and token names do not matter.
fn normalize_template(template: &str) -> Result<String> {
    let mut normalized = String::new();
    for segment in parse_template(template)? {
        match segment {
            Segment::Literal(text) => normalized.push_str(&text.to_ascii_lowercase()),
            Segment::Token(token) if token.optional => normalized.push_str("{}?"),
            Segment::Token(_) => normalized.push_str("{}"),
        }
    }
    Ok(normalized.trim_matches('/').to_string())
}
