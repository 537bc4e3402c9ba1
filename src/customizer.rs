//! Hooks for adjusting the generated document.
//!
//! An [`OperationCustomizer`] sees each operation as it is built, together with the
//! descriptor it came from. An [`OpenApiCustomizer`] sees the finished document.

use crate::descriptor::RouteDescriptor;
use crate::openapi_builder::{Components, OpenApiDocument, Operation};
use crate::schema_generator::Schema;
use log::debug;
use std::collections::BTreeMap;

/// Adjusts a finished document.
pub trait OpenApiCustomizer {
    fn customize(&self, document: &mut OpenApiDocument);
}

/// Adjusts one operation before it is stored in the document.
pub trait OperationCustomizer {
    fn customize(&self, operation: Operation, route: &RouteDescriptor) -> Operation;
}

/// Registers the hypermedia `Link` and `Links` component schemas.
///
/// `Links` is a map from relation name to `Link`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HateoasLinksCustomizer;

const LINK_STRING_FIELDS: &[&str] = &[
    "href",
    "hreflang",
    "title",
    "type",
    "deprecation",
    "profile",
    "name",
];

impl HateoasLinksCustomizer {
    fn link_schema() -> Schema {
        let mut properties: BTreeMap<String, Schema> = LINK_STRING_FIELDS
            .iter()
            .map(|field| (field.to_string(), Schema::of_type("string")))
            .collect();
        properties.insert("templated".to_string(), Schema::of_type("boolean"));

        Schema {
            properties: Some(properties),
            ..Schema::of_type("object")
        }
    }

    fn links_schema() -> Schema {
        Schema {
            additional_properties: Some(Box::new(Schema::reference("Link"))),
            ..Schema::of_type("object")
        }
    }
}

impl OpenApiCustomizer for HateoasLinksCustomizer {
    fn customize(&self, document: &mut OpenApiDocument) {
        debug!("Registering HATEOAS link schemas");
        let schemas = document
            .components
            .get_or_insert_with(Components::default)
            .schemas
            .get_or_insert_with(BTreeMap::new);
        schemas.insert("Link".to_string(), Self::link_schema());
        schemas.insert("Links".to_string(), Self::links_schema());
    }
}
