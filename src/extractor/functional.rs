use crate::descriptor::{sort_routes, RouteDescriptor};
use crate::extractor::RouteExtractor;
use crate::parser::ParsedFile;
use log::{debug, warn};

/// Functional router extractor: one visitor traversal per definition file
pub struct FunctionalRouteExtractor;

impl RouteExtractor for FunctionalRouteExtractor {
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteDescriptor> {
        let mut routes = Vec::new();

        for parsed_file in parsed_files {
            match parsed_file.definition.collect_routes() {
                Ok(collected) => {
                    debug!(
                        "Collected {} routes from {}",
                        collected.len(),
                        parsed_file.display_name()
                    );
                    routes.extend(collected);
                }
                Err(e) => {
                    warn!("Skipping router {}: {}", parsed_file.display_name(), e);
                }
            }
        }

        sort_routes(&mut routes);
        routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::RouteAttributes;
    use crate::descriptor::HttpMethod;
    use crate::router::{RequestPredicate, RouterDefinition, RouterFunction};
    use std::path::PathBuf;

    fn parsed(name: &str, routes: Vec<RouterFunction>) -> ParsedFile {
        ParsedFile {
            path: PathBuf::from(format!("{}.yaml", name)),
            definition: RouterDefinition {
                name: Some(name.to_string()),
                routes,
            },
        }
    }

    #[test]
    fn test_routes_from_all_files_sorted() {
        let orders = parsed(
            "orders",
            vec![
                RouterFunction::route(RequestPredicate::post("/orders"), RouteAttributes::default()),
                RouterFunction::route(RequestPredicate::get("/orders"), RouteAttributes::default()),
            ],
        );
        let users = parsed(
            "users",
            vec![RouterFunction::route(
                RequestPredicate::get("/api/users"),
                RouteAttributes::default(),
            )],
        );

        let routes = FunctionalRouteExtractor.extract_routes(&[orders, users]);

        let listing: Vec<_> = routes
            .iter()
            .map(|r| (r.path.as_str(), r.methods[0]))
            .collect();
        assert_eq!(
            listing,
            vec![
                ("/api/users", HttpMethod::Get),
                ("/orders", HttpMethod::Get),
                ("/orders", HttpMethod::Post),
            ]
        );
    }

    #[test]
    fn test_nested_prefix_does_not_leak_across_files() {
        let api = parsed(
            "api",
            vec![RouterFunction::nest(
                RequestPredicate::path("/api"),
                vec![RouterFunction::route(
                    RequestPredicate::get("/users"),
                    RouteAttributes::default(),
                )],
            )],
        );
        let health = parsed(
            "health",
            vec![RouterFunction::route(
                RequestPredicate::get("/health"),
                RouteAttributes::default(),
            )],
        );

        let routes = FunctionalRouteExtractor.extract_routes(&[api, health]);
        let paths: Vec<_> = routes.iter().map(|r| r.path.as_str()).collect();

        assert_eq!(paths, vec!["/api/users", "/health"]);
    }

    #[test]
    fn test_failed_traversal_is_skipped() {
        let broken = parsed(
            "broken",
            vec![RouterFunction::nest(
                RequestPredicate::QueryParam {
                    name: "q".to_string(),
                    value: "x".to_string(),
                },
                vec![],
            )],
        );
        let health = parsed(
            "health",
            vec![RouterFunction::route(
                RequestPredicate::get("/health"),
                RouteAttributes::default(),
            )],
        );

        let routes = FunctionalRouteExtractor.extract_routes(&[broken, health]);

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path, "/health");
    }
}
