use crate::attributes::TypeHint;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of references into the components section
pub const COMPONENTS_REF: &str = "#/components/schemas/";

/// Schema generator - converts payload type hints to OpenAPI schemas
///
/// Primitive type names become inline schemas. Any other name becomes a reference to a
/// component, and a placeholder object schema is registered for it.
#[derive(Debug, Default)]
pub struct SchemaGenerator {
    schemas: BTreeMap<String, Schema>,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "float", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Value schema for map types
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    /// Reference to another schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Schema {
    pub fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Reference to the component schema called `name`
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", COMPONENTS_REF, name)),
            ..Self::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of_type("array")
        }
    }
}

impl SchemaGenerator {
    pub fn new() -> Self {
        debug!("Initializing SchemaGenerator");
        Self::default()
    }

    /// Generate a schema for a type hint
    pub fn generate_schema(&mut self, hint: &TypeHint) -> Schema {
        debug!("Generating schema for type: {}", hint.type_name());
        let item = self.named_schema(hint.type_name());
        if hint.is_array() {
            Schema::array(item)
        } else {
            item
        }
    }

    /// Schema for a plain string value, used for path, query and header parameters
    pub fn string_schema() -> Schema {
        Schema::of_type("string")
    }

    /// All component schemas registered so far
    pub fn get_schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }

    fn named_schema(&mut self, type_name: &str) -> Schema {
        if let Some(primitive) = primitive_schema(type_name) {
            return primitive;
        }

        let component = short_name(type_name);
        self.schemas
            .entry(component.to_string())
            .or_insert_with(|| {
                debug!("Registering component schema: {}", component);
                Schema::of_type("object")
            });
        Schema::reference(component)
    }
}

fn primitive_schema(type_name: &str) -> Option<Schema> {
    let schema = match type_name {
        "String" | "string" | "str" | "&str" | "char" => Schema::of_type("string"),
        "i8" | "i16" | "i32" | "u8" | "u16" | "u32" | "int" | "Integer" => {
            Schema::of_type("integer").with_format("int32")
        }
        "i64" | "u64" | "isize" | "usize" | "long" | "Long" => {
            Schema::of_type("integer").with_format("int64")
        }
        "f32" | "float" | "Float" => Schema::of_type("number").with_format("float"),
        "f64" | "double" | "Double" => Schema::of_type("number").with_format("double"),
        "bool" | "boolean" | "Boolean" => Schema::of_type("boolean"),
        "Uuid" | "UUID" | "uuid" => Schema::of_type("string").with_format("uuid"),
        "DateTime" | "OffsetDateTime" | "LocalDateTime" | "date-time" => {
            Schema::of_type("string").with_format("date-time")
        }
        _ => return None,
    };
    Some(schema)
}

/// Last segment of a qualified type name (`a.b.User` or `a::b::User`)
fn short_name(type_name: &str) -> &str {
    type_name
        .rsplit(|c| c == '.' || c == ':')
        .next()
        .unwrap_or(type_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primitive_types() {
        let mut generator = SchemaGenerator::new();

        let string = generator.generate_schema(&TypeHint::Type("String".to_string()));
        assert_eq!(string.schema_type.as_deref(), Some("string"));

        let long = generator.generate_schema(&TypeHint::Type("i64".to_string()));
        assert_eq!(long.schema_type.as_deref(), Some("integer"));
        assert_eq!(long.format.as_deref(), Some("int64"));

        let flag = generator.generate_schema(&TypeHint::Type("boolean".to_string()));
        assert_eq!(flag.schema_type.as_deref(), Some("boolean"));

        assert!(generator.get_schemas().is_empty());
    }

    #[test]
    fn test_named_type_registers_component() {
        let mut generator = SchemaGenerator::new();

        let schema = generator.generate_schema(&TypeHint::Type("User".to_string()));

        assert_eq!(schema.reference.as_deref(), Some("#/components/schemas/User"));
        assert_eq!(
            generator.get_schemas().get("User"),
            Some(&Schema::of_type("object"))
        );
    }

    #[test]
    fn test_array_of_named_type() {
        let mut generator = SchemaGenerator::new();

        let schema = generator.generate_schema(&TypeHint::Array("User".to_string()));

        assert_eq!(schema.schema_type.as_deref(), Some("array"));
        assert_eq!(schema.items, Some(Box::new(Schema::reference("User"))));
    }

    #[test]
    fn test_qualified_names_shortened() {
        let mut generator = SchemaGenerator::new();

        generator.generate_schema(&TypeHint::Type("com.example.model.Order".to_string()));
        generator.generate_schema(&TypeHint::Type("crate::model::Invoice".to_string()));

        let names: Vec<_> = generator.get_schemas().keys().cloned().collect();
        assert_eq!(names, vec!["Invoice", "Order"]);
    }

    #[test]
    fn test_component_registered_once() {
        let mut generator = SchemaGenerator::new();
        generator.generate_schema(&TypeHint::Type("User".to_string()));
        generator.generate_schema(&TypeHint::Array("User".to_string()));
        assert_eq!(generator.get_schemas().len(), 1);
    }

    #[test]
    fn test_serialized_field_names() {
        let schema = Schema {
            additional_properties: Some(Box::new(Schema::reference("Link"))),
            ..Schema::of_type("object")
        };
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["type"], "object");
        assert_eq!(json["additionalProperties"]["$ref"], "#/components/schemas/Link");
        assert!(json.get("items").is_none());
    }
}
