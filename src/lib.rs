//! OpenAPI from routes - OpenAPI documentation from functional router definitions.
//!
//! A functional router is a tree of request predicates (method, path, header, media type
//! and query constraints combined with AND, OR and NOT) whose leaves are handler routes.
//! This library walks such trees with an event-driven visitor, flattens every leaf into a
//! [`descriptor::RouteDescriptor`], and assembles the descriptors into an OpenAPI 3.0
//! document.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans a directory for router definition files
//! 2. [`parser`] - Loads YAML/JSON files into [`router::RouterDefinition`]s
//! 3. [`router`] - Router trees and the predicates that emit visitor events
//! 4. [`visitor`] - Folds the event stream into route descriptors
//! 5. [`extractor`] - Runs one visitor traversal per definition and sorts the result
//! 6. [`group`] - Optional filtering of routes into a named group
//! 7. [`schema_generator`] - Converts payload type hints to OpenAPI schemas
//! 8. [`openapi_builder`] - Constructs the complete OpenAPI document
//! 9. [`customizer`] - Operation and document hooks
//! 10. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_routes::{
//!     extractor::{functional::FunctionalRouteExtractor, RouteExtractor},
//!     openapi_builder::OpenApiBuilder,
//!     parser::DefinitionParser,
//!     scanner::FileScanner,
//!     schema_generator::SchemaGenerator,
//!     serializer::serialize_yaml,
//! };
//! use std::path::PathBuf;
//!
//! let scan_result = FileScanner::new(PathBuf::from("./routes")).scan().unwrap();
//!
//! let parsed_files: Vec<_> = DefinitionParser::parse_files(&scan_result.definition_files)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .collect();
//!
//! let routes = FunctionalRouteExtractor.extract_routes(&parsed_files);
//!
//! let mut schema_gen = SchemaGenerator::new();
//! let mut builder = OpenApiBuilder::new();
//! for route in &routes {
//!     builder.add_route(route, &mut schema_gen);
//! }
//! let document = builder.build(schema_gen);
//!
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod attributes;
pub mod cli;
pub mod customizer;
pub mod descriptor;
pub mod error;
pub mod extractor;
pub mod group;
pub mod openapi_builder;
pub mod parser;
pub mod router;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod visitor;
