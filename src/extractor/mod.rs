//! Route extraction from loaded router definitions.
//!
//! An extractor turns the definitions found in a project into a flat, deterministically
//! ordered list of [`RouteDescriptor`]s ready for the document builder.
//!
//! # Example
//!
//! ```no_run
//! use openapi_from_routes::extractor::{functional::FunctionalRouteExtractor, RouteExtractor};
//! use openapi_from_routes::parser::DefinitionParser;
//! use std::path::Path;
//!
//! let parsed = DefinitionParser::parse_file(Path::new("routes/users.yaml")).unwrap();
//! let routes = FunctionalRouteExtractor.extract_routes(&[parsed]);
//! println!("Found {} routes", routes.len());
//! ```

pub mod functional;

use crate::descriptor::RouteDescriptor;
use crate::parser::ParsedFile;

/// Trait for extracting route descriptors from parsed definition files.
pub trait RouteExtractor {
    /// Extracts all routes from the parsed files.
    ///
    /// A definition that cannot be traversed is skipped; the others still contribute
    /// their routes.
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteDescriptor>;
}
