//! Generation errors.
//!
//! Every structural contract violation aborts the run with one of these
//! variants. Unsupported types are not errors; they surface as
//! [`Diagnostic`]s and render as `any`.

use std::fmt;

/// Result alias used throughout the generator.
pub type Result<T, E = GenError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("Malformed type expression '{expr}': {reason}")]
    MalformedType { expr: String, reason: String },

    #[error("Generic type '{type_name}' has no resolvable generic arguments")]
    OpenGeneric { type_name: String },

    #[error("Malformed route template '{template}': {reason}")]
    MalformedRoute { template: String, reason: String },

    #[error(
        "Action '{action}' has more than one parameter that could bind to the request body \
         ({candidates}); mark one with FromBody or the others with FromUri (at {template})"
    )]
    AmbiguousBody {
        action: String,
        candidates: String,
        template: String,
    },

    #[error("Action '{action}' is a GET request but parameter '{param}' binds to the request body (at {template})")]
    GetWithBody {
        action: String,
        param: String,
        template: String,
    },

    #[error(
        "Route token '{token}' in action '{action}' does not match any parameter \
         (available: {available}) (at {template})"
    )]
    UnmatchedRouteToken {
        action: String,
        token: String,
        available: String,
        template: String,
    },

    #[error("Route token '{token}' in action '{action}' matches more than one parameter ({matches}) (at {template})")]
    AmbiguousRouteToken {
        action: String,
        token: String,
        matches: String,
        template: String,
    },

    #[error(
        "Route token '{token}' in action '{action}' is {token_kind} but parameter '{param}' is {param_kind} (at {template})"
    )]
    OptionalityMismatch {
        action: String,
        token: String,
        param: String,
        token_kind: &'static str,
        param_kind: &'static str,
        template: String,
    },

    #[error("Parameter '{param}' of action '{action}' has type '{type_name}' which cannot be a route segment (at {template})")]
    UnsupportedRouteType {
        action: String,
        param: String,
        type_name: String,
        template: String,
    },

    #[error(
        "Required route token '{token}' in action '{action}' follows optional token '{previous}' (at {template})"
    )]
    RequiredAfterOptional {
        action: String,
        token: String,
        previous: String,
        template: String,
    },

    #[error(
        "Controller '{controller}' maps {method} {template} to both '{first}' and '{second}'"
    )]
    DuplicateRoute {
        controller: String,
        method: &'static str,
        template: String,
        first: String,
        second: String,
    },

    #[error("Controller '{controller}' produces method '{method_name}' for both '{first}' and '{second}'")]
    DuplicateMethod {
        controller: String,
        method_name: String,
        first: String,
        second: String,
    },

    #[error("Type '{type_name}' is claimed by more than one transform: {claimants}")]
    ConflictingTransforms {
        type_name: String,
        claimants: String,
    },

    #[error("Types '{first}' and '{second}' both render as '{name}'")]
    TypeNameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("Enum '{type_name}' member '{member}' follows the largest possible value and has no implicit value")]
    EnumValueOverflow { type_name: String, member: String },

    #[error("Hub '{0}' is registered more than once")]
    DuplicateHub(String),

    #[error("Unknown transform '{0}'")]
    UnknownTransform(String),

    #[error("Missing embedded resource '{0}'")]
    MissingResource(String),

    #[error("Failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// A non-fatal finding produced while walking types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Backend name of the type the finding is about.
    pub type_name: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}
