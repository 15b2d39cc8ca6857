//! Description of the backend surface.
//!
//! These structs are the materialized form of what the server's object model
//! exposes: controllers with their actions, and a catalog of data types. They
//! deserialize from the JSON/TOML description documents the CLI reads and can
//! also be assembled in code with the builder helpers.

use serde::{Deserialize, Serialize};

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    #[serde(alias = "get", alias = "Get")]
    Get,
    #[serde(alias = "post", alias = "Post")]
    Post,
    #[serde(alias = "put", alias = "Put")]
    Put,
    #[serde(alias = "patch", alias = "Patch")]
    Patch,
    #[serde(alias = "delete", alias = "Delete")]
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Name of the request helper method that issues this verb.
    pub fn helper_method(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    pub fn allows_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

/// Explicit binding annotation on a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingMode {
    #[default]
    Unspecified,
    #[serde(alias = "FromBody")]
    FromBody,
    #[serde(alias = "FromUri", alias = "from-query", alias = "FromQuery")]
    FromUri,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDesc {
    pub name: String,
    /// Backend type expression.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub binding: BindingMode,
}

impl ParamDesc {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            optional: false,
            binding: BindingMode::Unspecified,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn binding(mut self, binding: BindingMode) -> Self {
        self.binding = binding;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDesc {
    pub name: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// Route fragment relative to the controller template, or absolute when
    /// it starts with `~` or `/`.
    #[serde(default)]
    pub route: Option<String>,
    /// Return type expression; `None` means no payload.
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParamDesc>,
}

impl ActionDesc {
    pub fn new(name: impl Into<String>, method: HttpMethod, route: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            route: Some(route.into()),
            returns: None,
            parameters: Vec::new(),
        }
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    pub fn param(mut self, param: ParamDesc) -> Self {
        self.parameters.push(param);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerDesc {
    pub name: String,
    /// Controller route template; `None` falls back to `api/[controller]`.
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionDesc>,
}

impl ControllerDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route: None,
            actions: Vec::new(),
        }
    }

    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn action(mut self, action: ActionDesc) -> Self {
        self.actions.push(action);
        self
    }

    /// Name with a trailing `Controller` suffix removed.
    pub fn display_name(&self) -> &str {
        match self.name.strip_suffix("Controller") {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => &self.name,
        }
    }
}

/// One method of a real-time hub, on either side of the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubMethodDesc {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParamDesc>,
    /// `None` means the method returns nothing.
    #[serde(default)]
    pub returns: Option<String>,
}

impl HubMethodDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            returns: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.parameters.push(ParamDesc::new(name, ty));
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.returns = Some(ty.into());
        self
    }
}

/// A SignalR hub: server methods the client may invoke and, for hubs with a
/// typed client contract, the callbacks the server invokes on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubDesc {
    /// Hub class name.
    pub name: String,
    /// Connection name from the hub's name attribute.
    #[serde(default)]
    pub hub_name: Option<String>,
    #[serde(default)]
    pub methods: Vec<HubMethodDesc>,
    /// Client contract; `None` when the hub has no typed client.
    #[serde(default)]
    pub client: Option<Vec<HubMethodDesc>>,
}

impl HubDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hub_name: None,
            methods: Vec::new(),
            client: None,
        }
    }

    pub fn hub_name(mut self, hub_name: impl Into<String>) -> Self {
        self.hub_name = Some(hub_name.into());
        self
    }

    pub fn method(mut self, method: HubMethodDesc) -> Self {
        self.methods.push(method);
        self
    }

    pub fn client_method(mut self, method: HubMethodDesc) -> Self {
        self.client.get_or_insert_with(Vec::new).push(method);
        self
    }

    /// Every type expression the hub mentions.
    pub fn type_exprs(&self) -> impl Iterator<Item = &str> {
        self.methods
            .iter()
            .chain(self.client.iter().flatten())
            .flat_map(|m| m.parameters.iter().map(|p| p.ty.as_str()).chain(m.returns.as_deref()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKindDesc {
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDesc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub optional: bool,
    /// Excluded from generation (the backend's ignore attribute).
    #[serde(default)]
    pub ignore: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

impl MemberDesc {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            optional: false,
            ignore: false,
            is_static: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Integer(i64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMemberDesc {
    pub name: String,
    /// Explicit value; omitted values continue from the previous integer.
    #[serde(default)]
    pub value: Option<EnumValue>,
}

/// One entry of the type catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackendType {
    /// Qualified name, optionally with generic parameters (`MyApp.Page<T>`).
    pub name: String,
    #[serde(default)]
    pub kind: TypeKindDesc,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub generic_params: Vec<String>,
    /// Implemented interfaces, used to detect dictionary and sequence types.
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberDesc>,
    #[serde(default)]
    pub values: Vec<EnumMemberDesc>,
    /// Compiler-generated type; never emitted.
    #[serde(default)]
    pub synthesized: bool,
}

impl BackendType {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKindDesc::Enum,
            ..Self::default()
        }
    }

    pub fn member(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.members.push(MemberDesc::new(name, ty));
        self
    }

    pub fn optional_member(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        let mut member = MemberDesc::new(name, ty);
        member.optional = true;
        self.members.push(member);
        self
    }

    pub fn value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.values.push(EnumMemberDesc {
            name: name.into(),
            value: Some(EnumValue::Integer(value)),
        });
        self
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn generic_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generic_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn implements(mut self, iface: impl Into<String>) -> Self {
        self.implements.push(iface.into());
        self
    }
}

/// A complete description document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescription {
    #[serde(default)]
    pub types: Vec<BackendType>,
    /// Extra type expressions to generate even if no action references them.
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(default)]
    pub controllers: Vec<ControllerDesc>,
    #[serde(default)]
    pub hubs: Vec<HubDesc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_suffix() {
        assert_eq!(ControllerDesc::new("UsersController").display_name(), "Users");
        assert_eq!(ControllerDesc::new("Users").display_name(), "Users");
        assert_eq!(ControllerDesc::new("Controller").display_name(), "Controller");
    }

    #[test]
    fn test_deserialize_description() {
        let json = r#"{
            "types": [
                { "name": "MyApp.User", "members": [{ "name": "name", "type": "string" }] },
                { "name": "MyApp.Color", "kind": "enum", "values": [{ "name": "Red" }, { "name": "Blue", "value": 4 }] }
            ],
            "controllers": [{
                "name": "UsersController",
                "actions": [{
                    "name": "GetUser",
                    "method": "get",
                    "route": "{id}",
                    "returns": "MyApp.User",
                    "parameters": [{ "name": "id", "type": "int", "binding": "FromUri" }]
                }]
            }]
        }"#;
        let desc: ApiDescription = serde_json::from_str(json).unwrap();
        assert_eq!(desc.types.len(), 2);
        assert_eq!(desc.types[1].kind, TypeKindDesc::Enum);
        assert_eq!(desc.types[1].values[1].value, Some(EnumValue::Integer(4)));
        let action = &desc.controllers[0].actions[0];
        assert_eq!(action.method, HttpMethod::Get);
        assert_eq!(action.parameters[0].binding, BindingMode::FromUri);
        assert!(desc.controllers[0].route.is_none());
    }

    #[test]
    fn test_deserialize_hub() {
        let json = r#"{ "hubs": [{
            "name": "ChatHub",
            "hub_name": "chat",
            "methods": [{ "name": "Send", "parameters": [{ "name": "text", "type": "string" }], "returns": "int" }],
            "client": [{ "name": "Receive", "parameters": [{ "name": "message", "type": "Chat.Message" }] }]
        }] }"#;
        let desc: ApiDescription = serde_json::from_str(json).unwrap();
        let hub = &desc.hubs[0];
        assert_eq!(hub.hub_name.as_deref(), Some("chat"));
        assert_eq!(hub.client.as_ref().unwrap()[0].name, "Receive");
        let exprs: Vec<&str> = hub.type_exprs().collect();
        assert_eq!(exprs, vec!["string", "int", "Chat.Message"]);
        assert!(HubDesc::new("PlainHub").client.is_none());
    }

    #[test]
    fn test_http_method_body_policy() {
        assert!(!HttpMethod::Get.allows_body());
        assert!(HttpMethod::Post.allows_body());
        assert!(HttpMethod::Delete.allows_body());
        assert_eq!(HttpMethod::Patch.helper_method(), "patch");
    }
}
