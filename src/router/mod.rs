//! Functional router definitions.
//!
//! A router definition is a tree of terminal routes and nested scopes, each guarded by a
//! [`RequestPredicate`]. Walking the tree reports every route and predicate to a
//! [`RouteEventSink`] in depth-first order, which is what the
//! [`RouteVisitor`](crate::visitor::RouteVisitor) consumes.
//!
//! # Example
//!
//! ```
//! use openapi_from_routes::attributes::{OperationMetadata, RouteAttributes};
//! use openapi_from_routes::router::{RequestPredicate, RouterDefinition, RouterFunction};
//!
//! let definition = RouterDefinition::new(vec![RouterFunction::nest(
//!     RequestPredicate::path("/api"),
//!     vec![RouterFunction::route(
//!         RequestPredicate::get("/users"),
//!         RouteAttributes {
//!             operation: Some(OperationMetadata::with_id("listUsers")),
//!             ..RouteAttributes::default()
//!         },
//!     )],
//! )]);
//!
//! let routes = definition.collect_routes().unwrap();
//! assert_eq!(routes[0].path, "/api/users");
//! ```

pub mod predicate;

pub use predicate::RequestPredicate;

use crate::attributes::RouteAttributes;
use crate::descriptor::RouteDescriptor;
use crate::error::Result;
use crate::visitor::{RouteEvent, RouteEventSink, RouteVisitor};
use log::debug;
use serde::{Deserialize, Serialize};

/// A node of the routing tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouterFunction {
    /// A terminal route mapping a predicate to a handler
    Route {
        predicate: RequestPredicate,
        #[serde(default)]
        attributes: RouteAttributes,
    },
    /// A scope whose predicate applies to all of its routes
    Nest {
        predicate: RequestPredicate,
        routes: Vec<RouterFunction>,
    },
}

impl RouterFunction {
    pub fn route(predicate: RequestPredicate, attributes: RouteAttributes) -> Self {
        RouterFunction::Route {
            predicate,
            attributes,
        }
    }

    pub fn nest(predicate: RequestPredicate, routes: Vec<RouterFunction>) -> Self {
        RouterFunction::Nest { predicate, routes }
    }

    pub fn accept_visitor(&self, sink: &mut dyn RouteEventSink) -> Result<()> {
        match self {
            RouterFunction::Route {
                predicate,
                attributes,
            } => {
                sink.visit(RouteEvent::Route(attributes.clone()))?;
                predicate.accept_visitor(sink)
            }
            RouterFunction::Nest { predicate, routes } => {
                sink.visit(RouteEvent::StartNested)?;
                predicate.accept_visitor(sink)?;
                for route in routes {
                    route.accept_visitor(sink)?;
                }
                sink.visit(RouteEvent::EndNested)
            }
        }
    }

    /// Traverse this registration with a fresh visitor and return its finalized
    /// descriptors.
    pub fn collect_routes(&self) -> Result<Vec<RouteDescriptor>> {
        let mut visitor = RouteVisitor::new();
        self.accept_visitor(&mut visitor)?;
        visitor.finalize();
        Ok(visitor.into_descriptors())
    }
}

/// A router file: a list of top-level registrations, each traversed on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterDefinition {
    #[serde(default)]
    pub name: Option<String>,
    pub routes: Vec<RouterFunction>,
}

impl RouterDefinition {
    pub fn new(routes: Vec<RouterFunction>) -> Self {
        Self { name: None, routes }
    }

    /// Collect the descriptors of every registration, in declaration order.
    ///
    /// Scope state never crosses registrations: a nest only prefixes its own routes.
    /// The first failing registration fails the whole definition.
    pub fn collect_routes(&self) -> Result<Vec<RouteDescriptor>> {
        let mut routes = Vec::new();
        for route in &self.routes {
            routes.extend(route.collect_routes()?);
        }
        debug!(
            "Router {} produced {} routes",
            self.name.as_deref().unwrap_or("<unnamed>"),
            routes.len()
        );
        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{OperationMetadata, TypeHint};
    use crate::descriptor::HttpMethod;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn operation(id: &str) -> RouteAttributes {
        RouteAttributes {
            operation: Some(OperationMetadata::with_id(id)),
            ..RouteAttributes::default()
        }
    }

    fn json() -> RequestPredicate {
        RequestPredicate::accept(&["application/json"])
    }

    #[test]
    fn test_flat_user_router() {
        let definition = RouterDefinition::new(vec![
            RouterFunction::route(
                RequestPredicate::get("/api/user/index").and(json()),
                RouteAttributes {
                    response_type: Some(TypeHint::Array("User".to_string())),
                    ..operation("getAllUsers")
                },
            ),
            RouterFunction::route(
                RequestPredicate::post("/api/user/post").and(json()),
                operation("saveUser"),
            ),
            RouterFunction::route(
                RequestPredicate::delete("/api/user/delete/{id}").and(json()),
                RouteAttributes {
                    bean_class: Some("UserRepository".to_string()),
                    bean_method: Some("deleteUser".to_string()),
                    ..RouteAttributes::default()
                },
            ),
        ]);

        let routes = definition.collect_routes().unwrap();

        assert_eq!(routes.len(), 3);
        assert_eq!(routes[0].path, "/api/user/index");
        assert_eq!(routes[0].methods, vec![HttpMethod::Get]);
        assert_eq!(routes[0].produces, vec!["application/json"]);
        assert_eq!(routes[0].operation_id(), Some("getAllUsers"));
        assert_eq!(routes[1].methods, vec![HttpMethod::Post]);
        assert_eq!(
            routes[2].handler.as_ref().and_then(|h| h.bean_method.as_deref()),
            Some("deleteUser")
        );
    }

    #[test]
    fn test_nested_router_prefix_and_accept() {
        let definition = RouterDefinition::new(vec![RouterFunction::nest(
            RequestPredicate::path("/api").and(json()),
            vec![
                RouterFunction::route(RequestPredicate::get("/users"), operation("listUsers")),
                RouterFunction::route(RequestPredicate::post("/users"), operation("createUser")),
            ],
        )]);

        let routes = definition.collect_routes().unwrap();

        assert_eq!(routes.len(), 2);
        for route in &routes {
            assert_eq!(route.path, "/api/users");
            assert_eq!(route.produces, vec!["application/json"]);
        }
    }

    #[test]
    fn test_nested_or_paths_expand() {
        let definition = RouterDefinition::new(vec![RouterFunction::nest(
            RequestPredicate::path("/v1").or(RequestPredicate::path("/v2")),
            vec![RouterFunction::route(
                RequestPredicate::get("/status"),
                operation("status"),
            )],
        )]);

        let routes = definition.collect_routes().unwrap();
        let paths: Vec<_> = routes.iter().map(|r| r.path.as_str()).collect();

        assert_eq!(paths, vec!["/v1/status", "/v2/status"]);
    }

    #[test]
    fn test_sibling_nests_keep_their_own_prefix() {
        let definition = RouterDefinition::new(vec![
            RouterFunction::nest(
                RequestPredicate::path("/api"),
                vec![RouterFunction::route(
                    RequestPredicate::get("/users"),
                    operation("listUsers"),
                )],
            ),
            RouterFunction::nest(
                RequestPredicate::path("/admin"),
                vec![RouterFunction::route(
                    RequestPredicate::get("/stats"),
                    operation("stats"),
                )],
            ),
        ]);

        let routes = definition.collect_routes().unwrap();
        let paths: Vec<_> = routes.iter().map(|r| r.path.as_str()).collect();

        assert_eq!(paths, vec!["/api/users", "/admin/stats"]);
    }

    #[test]
    fn test_or_route_does_not_leak_into_next_nest() {
        let definition = RouterDefinition::new(vec![
            RouterFunction::route(
                RequestPredicate::method(HttpMethod::Get)
                    .and(RequestPredicate::path("/a").or(RequestPredicate::path("/b"))),
                operation("either"),
            ),
            RouterFunction::nest(
                RequestPredicate::path("/api"),
                vec![RouterFunction::route(
                    RequestPredicate::get("/users"),
                    operation("listUsers"),
                )],
            ),
        ]);

        let routes = definition.collect_routes().unwrap();
        let paths: Vec<_> = routes.iter().map(|r| r.path.as_str()).collect();

        assert_eq!(paths, vec!["/b", "/api/users"]);
    }

    #[test]
    fn test_sibling_nests_keep_their_own_accept() {
        let definition = RouterDefinition::new(vec![
            RouterFunction::nest(
                RequestPredicate::path("/api").and(json()),
                vec![RouterFunction::route(
                    RequestPredicate::get("/users"),
                    operation("listUsers"),
                )],
            ),
            RouterFunction::nest(
                RequestPredicate::path("/files"),
                vec![RouterFunction::route(
                    RequestPredicate::get("/report"),
                    operation("report"),
                )],
            ),
        ]);

        let routes = definition.collect_routes().unwrap();

        assert_eq!(routes[0].produces, vec!["application/json"]);
        assert!(routes[1].produces.is_empty());
    }

    #[test]
    fn test_route_header_and_query_param() {
        let definition = RouterDefinition::new(vec![RouterFunction::route(
            RequestPredicate::get("/search")
                .and(RequestPredicate::Header {
                    name: "X-Tenant".to_string(),
                    value: "acme".to_string(),
                })
                .and(RequestPredicate::QueryParam {
                    name: "q".to_string(),
                    value: "term".to_string(),
                }),
            RouteAttributes::default(),
        )]);

        let routes = definition.collect_routes().unwrap();

        assert_eq!(routes[0].headers, vec!["X-Tenant=acme"]);
        assert_eq!(routes[0].query_params.get("q").map(String::as_str), Some("term"));
    }

    #[test]
    fn test_header_on_nest_is_rejected() {
        let definition = RouterDefinition::new(vec![RouterFunction::nest(
            RequestPredicate::Header {
                name: "X-Tenant".to_string(),
                value: "acme".to_string(),
            },
            vec![RouterFunction::route(
                RequestPredicate::get("/users"),
                RouteAttributes::default(),
            )],
        )]);

        let err = definition.collect_routes().unwrap_err();
        assert!(matches!(err, Error::InvalidSequence { .. }));
    }

    #[test]
    fn test_deserialize_definition_yaml() {
        let yaml = r#"
name: users
routes:
  - nest:
      predicate:
        path: /api
      routes:
        - route:
            predicate:
              and:
                - method: [GET]
                - path: /users/{id}
            attributes:
              operation:
                operation_id: getUserById
              response_type:
                type: User
"#;
        let definition: RouterDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(definition.name.as_deref(), Some("users"));

        let routes = definition.collect_routes().unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path, "/api/users/{id}");
        assert_eq!(routes[0].operation_id(), Some("getUserById"));
        assert_eq!(routes[0].response_type, Some(TypeHint::Type("User".to_string())));
    }
}
