//! Route descriptors produced by the route visitor.
//!
//! A [`RouteDescriptor`] is the flattened form of one terminal route: a path, the HTTP
//! methods it answers, the media types it consumes and produces, the extra headers and
//! query parameters it requires, plus whatever metadata the route registration attached.

use crate::attributes::{OperationMetadata, RequestBodyMetadata, TypeHint};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// HTTP methods a route may be registered for.
///
/// The declaration order is the order used when two descriptors are compared by their
/// first method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl HttpMethod {
    /// Get the HTTP method as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Whether the method can appear on a descriptor. TRACE has no documented mapping.
    pub fn is_documented(&self) -> bool {
        !matches!(self, HttpMethod::Trace)
    }
}

/// Identification of the handler serving a route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerReference {
    pub bean_class: Option<String>,
    pub bean_method: Option<String>,
    pub parameter_types: Vec<String>,
}

/// One emitted HTTP route.
///
/// Media type and header lists keep discovery order and are never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// The URL path pattern (e.g. "/users/{id}")
    pub path: String,
    pub methods: Vec<HttpMethod>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    /// Extra header constraints rendered as `name=value`
    pub headers: Vec<String>,
    pub query_params: BTreeMap<String, String>,
    pub operation: Option<OperationMetadata>,
    pub handler: Option<HandlerReference>,
    pub request_body: Option<RequestBodyMetadata>,
    pub request_type: Option<TypeHint>,
    pub response_type: Option<TypeHint>,
}

impl RouteDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a descriptor with a path and a method list
    pub fn with_path(path: impl Into<String>, methods: &[HttpMethod]) -> Self {
        let mut descriptor = Self {
            path: path.into(),
            ..Self::default()
        };
        descriptor.set_methods(methods);
        descriptor
    }

    /// Replace the method list. Undocumented methods and duplicates are dropped; the
    /// remaining methods keep the caller's order.
    pub fn set_methods(&mut self, methods: &[HttpMethod]) {
        self.methods.clear();
        for method in methods {
            if !method.is_documented() {
                debug!("Dropping undocumented method {} on {}", method.as_str(), self.path);
                continue;
            }
            if !self.methods.contains(method) {
                self.methods.push(*method);
            }
        }
    }

    pub fn add_consumes(&mut self, media_type: &str) {
        if !media_type.trim().is_empty() {
            self.consumes.push(media_type.to_string());
        }
    }

    pub fn add_produces(&mut self, media_type: &str) {
        if !media_type.trim().is_empty() {
            self.produces.push(media_type.to_string());
        }
    }

    pub fn extend_consumes(&mut self, media_types: &[String]) {
        media_types.iter().for_each(|m| self.add_consumes(m));
    }

    pub fn extend_produces(&mut self, media_types: &[String]) {
        media_types.iter().for_each(|m| self.add_produces(m));
    }

    pub fn add_header(&mut self, header: &str) {
        if !header.trim().is_empty() {
            self.headers.push(header.to_string());
        }
    }

    pub fn add_query_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query_params.insert(name.into(), value.into());
    }

    /// Identifier of the attached operation, if any
    pub fn operation_id(&self) -> Option<&str> {
        self.operation.as_ref().and_then(|op| op.operation_id.as_deref())
    }

    /// A descriptor is meaningful when it has a path or can be traced back to a handler
    /// or operation.
    pub fn has_identity(&self) -> bool {
        !self.path.is_empty() || self.handler.is_some() || self.operation.is_some()
    }

    /// Ordering used for deterministic listings.
    ///
    /// Compares the path, then the first method, then the operation id. A descriptor
    /// lacking a method (or an operation id) sorts before one that has it.
    pub fn documentation_order(&self, other: &Self) -> Ordering {
        self.path
            .cmp(&other.path)
            .then_with(|| self.methods.first().cmp(&other.methods.first()))
            .then_with(|| self.operation_id().cmp(&other.operation_id()))
    }
}

/// Stable sort of descriptors into documentation order
pub fn sort_routes(routes: &mut [RouteDescriptor]) {
    routes.sort_by(RouteDescriptor::documentation_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_methods_drops_trace_and_duplicates() {
        let mut descriptor = RouteDescriptor::new();
        descriptor.set_methods(&[
            HttpMethod::Post,
            HttpMethod::Trace,
            HttpMethod::Get,
            HttpMethod::Post,
        ]);
        assert_eq!(descriptor.methods, vec![HttpMethod::Post, HttpMethod::Get]);
    }

    #[test]
    fn test_add_consumes_accumulates_in_call_order() {
        let mut accumulated = RouteDescriptor::with_path("/users", &[HttpMethod::Post]);
        accumulated.add_consumes("application/json");
        accumulated.add_consumes("application/xml");

        let direct = RouteDescriptor {
            consumes: vec!["application/json".to_string(), "application/xml".to_string()],
            ..RouteDescriptor::with_path("/users", &[HttpMethod::Post])
        };

        assert_eq!(accumulated, direct);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let mut descriptor = RouteDescriptor::new();
        descriptor.add_consumes("  ");
        descriptor.add_produces("");
        descriptor.add_header(" ");
        assert!(descriptor.consumes.is_empty());
        assert!(descriptor.produces.is_empty());
        assert!(descriptor.headers.is_empty());
    }

    #[test]
    fn test_extend_keeps_duplicates() {
        let mut descriptor = RouteDescriptor::new();
        descriptor.add_produces("application/json");
        descriptor.extend_produces(&["application/json".to_string(), "text/plain".to_string()]);
        assert_eq!(
            descriptor.produces,
            vec!["application/json", "application/json", "text/plain"]
        );
    }

    #[test]
    fn test_extend_skips_blank_values() {
        let mut descriptor = RouteDescriptor::new();
        descriptor.extend_produces(&["".to_string(), "application/json".to_string()]);
        descriptor.extend_consumes(&[" ".to_string()]);
        assert_eq!(descriptor.produces, vec!["application/json"]);
        assert!(descriptor.consumes.is_empty());
    }

    #[test]
    fn test_identity() {
        assert!(!RouteDescriptor::new().has_identity());
        assert!(RouteDescriptor::with_path("/users", &[]).has_identity());

        let mut handled = RouteDescriptor::new();
        handled.handler = Some(HandlerReference::default());
        assert!(handled.has_identity());
    }

    #[test]
    fn test_order_by_path() {
        let a = RouteDescriptor::with_path("/a", &[]);
        let b = RouteDescriptor::with_path("/b", &[]);
        assert_eq!(a.documentation_order(&b), Ordering::Less);
        assert_eq!(b.documentation_order(&a), Ordering::Greater);
    }

    #[test]
    fn test_order_by_first_method() {
        let get = RouteDescriptor::with_path("/a", &[HttpMethod::Get]);
        let post = RouteDescriptor::with_path("/a", &[HttpMethod::Post]);
        assert_eq!(get.documentation_order(&post), Ordering::Less);
    }

    #[test]
    fn test_order_by_operation_id() {
        let mut first = RouteDescriptor::with_path("/a", &[HttpMethod::Get]);
        first.operation = Some(OperationMetadata::with_id("alpha"));
        let mut second = RouteDescriptor::with_path("/a", &[HttpMethod::Get]);
        second.operation = Some(OperationMetadata::with_id("beta"));
        assert_eq!(first.documentation_order(&second), Ordering::Less);
    }

    #[test]
    fn test_missing_method_sorts_first() {
        let bare = RouteDescriptor::with_path("/a", &[]);
        let get = RouteDescriptor::with_path("/a", &[HttpMethod::Get]);
        assert_eq!(bare.documentation_order(&get), Ordering::Less);
    }

    #[test]
    fn test_sort_routes_is_stable() {
        let mut first = RouteDescriptor::with_path("/a", &[HttpMethod::Get]);
        first.add_produces("application/json");
        let mut second = RouteDescriptor::with_path("/a", &[HttpMethod::Get]);
        second.add_produces("application/xml");
        let mut routes = vec![
            RouteDescriptor::with_path("/b", &[HttpMethod::Get]),
            first.clone(),
            second.clone(),
        ];

        sort_routes(&mut routes);

        assert_eq!(routes[0], first);
        assert_eq!(routes[1], second);
        assert_eq!(routes[2].path, "/b");
    }

    #[test]
    fn test_equality_covers_handler() {
        let mut a = RouteDescriptor::with_path("/a", &[HttpMethod::Get]);
        let b = a.clone();
        a.handler = Some(HandlerReference {
            bean_class: Some("UserHandler".to_string()),
            ..HandlerReference::default()
        });
        assert_ne!(a, b);
        assert_eq!(a.documentation_order(&b), Ordering::Equal);
    }
}
