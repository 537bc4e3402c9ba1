//! Typed route attributes.
//!
//! A router definition may attach metadata to each terminal route: the operation
//! description, the handler that serves it, and hints about the request and response
//! payload types. The visitor receives them together with the route-begin event and
//! copies what it needs onto the [`RouteDescriptor`](crate::descriptor::RouteDescriptor).

use crate::descriptor::HandlerReference;
use serde::{Deserialize, Serialize};

/// Metadata attached to a terminal route.
///
/// Every field is optional; an empty set of attributes produces a bare descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteAttributes {
    /// Operation description merged into the generated document
    pub operation: Option<OperationMetadata>,
    /// Type (or module path) owning the handler
    pub bean_class: Option<String>,
    /// Name of the handler function or method
    pub bean_method: Option<String>,
    /// Parameter type signatures of the handler
    pub parameter_types: Vec<String>,
    /// Request body description
    pub request_body: Option<RequestBodyMetadata>,
    /// Type of the request payload
    pub request_type: Option<TypeHint>,
    /// Type of the response payload
    pub response_type: Option<TypeHint>,
}

impl RouteAttributes {
    /// The handler reference described by these attributes, if any handler field is set.
    pub fn handler_reference(&self) -> Option<HandlerReference> {
        if self.bean_class.is_none() && self.bean_method.is_none() && self.parameter_types.is_empty()
        {
            return None;
        }
        Some(HandlerReference {
            bean_class: self.bean_class.clone(),
            bean_method: self.bean_method.clone(),
            parameter_types: self.parameter_types.clone(),
        })
    }
}

/// Description of an API operation, supplied by whoever registers the route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationMetadata {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<ParameterMetadata>,
    pub deprecated: bool,
}

impl OperationMetadata {
    /// Create metadata carrying only an operation id
    pub fn with_id(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: Some(operation_id.into()),
            ..Self::default()
        }
    }
}

/// A parameter declared on an operation.
///
/// Path parameters may omit the name; they are then bound to the path variables of the
/// route in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub example: Option<String>,
}

/// The location where a parameter value is read from in an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

/// Request body description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestBodyMetadata {
    pub description: Option<String>,
    pub required: Option<bool>,
}

/// Payload type hint: a single object or an array of objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeHint {
    Type(String),
    Array(String),
}

impl TypeHint {
    /// Name of the (item) type
    pub fn type_name(&self) -> &str {
        match self {
            TypeHint::Type(name) | TypeHint::Array(name) => name,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeHint::Array(_))
    }
}
