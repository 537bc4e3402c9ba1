use crate::attributes::ParameterLocation;
use crate::customizer::OperationCustomizer;
use crate::descriptor::{HttpMethod, RouteDescriptor};
use crate::schema_generator::{Schema, SchemaGenerator};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Media type assumed for a request body when the route declares none
const DEFAULT_CONSUMES: &str = "application/json";
/// Media type assumed for a response when the route declares none
const DEFAULT_PRODUCES: &str = "*/*";

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Paths collection (URL path -> PathItem)
    paths: BTreeMap<String, PathItem>,
    operation_customizers: Vec<Arc<dyn OperationCustomizer>>,
    /// Operation ids handed out so far
    operation_ids: HashSet<String>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    /// The operation registered for `method`
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Trace => None,
        }
    }

    /// Slot holding the operation for `method`; `None` for methods a path item cannot hold
    fn operation_slot(&mut self, method: HttpMethod) -> Option<&mut Option<Operation>> {
        match method {
            HttpMethod::Get => Some(&mut self.get),
            HttpMethod::Head => Some(&mut self.head),
            HttpMethod::Post => Some(&mut self.post),
            HttpMethod::Put => Some(&mut self.put),
            HttpMethod::Patch => Some(&mut self.patch),
            HttpMethod::Delete => Some(&mut self.delete),
            HttpMethod::Options => Some(&mut self.options),
            HttpMethod::Trace => None,
        }
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Parameters (path, query, header)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses
    pub responses: BTreeMap<String, Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header, cookie)
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter schema
    pub schema: Schema,
    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl Parameter {
    fn new(name: &str, location: ParameterLocation, required: bool) -> Self {
        Self {
            name: name.to_string(),
            location: location.as_str().to_string(),
            required,
            schema: SchemaGenerator::string_schema(),
            description: None,
            example: None,
        }
    }

    fn is(&self, name: &str, location: ParameterLocation) -> bool {
        self.name == name && self.location == location.as_str()
    }
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Request body description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the request body is required
    pub required: bool,
    /// Content types and their schemas
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type, absent when the payload type is unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Schema definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<BTreeMap<String, Schema>>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    /// API paths
    pub paths: BTreeMap<String, PathItem>,
    /// Components (schemas, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiDocument {
    /// Number of operations across all paths
    pub fn operation_count(&self) -> usize {
        self.paths
            .values()
            .map(|item| {
                [
                    &item.get,
                    &item.put,
                    &item.post,
                    &item.delete,
                    &item.options,
                    &item.head,
                    &item.patch,
                ]
                .iter()
                .filter(|op| op.is_some())
                .count()
            })
            .sum()
    }
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "Generated API".to_string(),
                version: "1.0.0".to_string(),
                description: Some("API documentation generated from router definitions".to_string()),
            },
            paths: BTreeMap::new(),
            operation_customizers: Vec::new(),
            operation_ids: HashSet::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Register a hook run on every operation before it is stored
    pub fn add_operation_customizer(&mut self, customizer: Arc<dyn OperationCustomizer>) {
        self.operation_customizers.push(customizer);
    }

    /// Add a route to the OpenAPI document, one operation per HTTP method
    pub fn add_route(&mut self, route: &RouteDescriptor, schema_gen: &mut SchemaGenerator) {
        if route.path.is_empty() {
            if route.has_identity() {
                warn!("Skipping route {} without a path", Self::route_label(route));
            } else {
                warn!("Skipping route without path, handler or operation");
            }
            return;
        }
        if route.methods.is_empty() {
            warn!("Skipping route {} without an HTTP method", route.path);
            return;
        }

        let openapi_path = Self::convert_path_format(&route.path);

        for method in &route.methods {
            debug!("Adding route: {} {}", method.as_str(), route.path);

            let operation = self.build_operation(route, *method, &openapi_path, schema_gen);
            let operation = self
                .operation_customizers
                .iter()
                .fold(operation, |operation, customizer| customizer.customize(operation, route));

            let path_item = self.paths.entry(openapi_path.clone()).or_default();
            if let Some(slot) = path_item.operation_slot(*method) {
                if slot.is_some() {
                    warn!("Replacing {} operation on {}", method.as_str(), openapi_path);
                }
                *slot = Some(operation);
            }
        }
    }

    fn build_operation(
        &mut self,
        route: &RouteDescriptor,
        method: HttpMethod,
        openapi_path: &str,
        schema_gen: &mut SchemaGenerator,
    ) -> Operation {
        let metadata = route.operation.as_ref();

        let base_id = route
            .operation_id()
            .or_else(|| route.handler.as_ref().and_then(|h| h.bean_method.as_deref()))
            .map(str::to_string)
            .unwrap_or_else(|| Self::default_operation_id(method, openapi_path));
        let operation_id = self.unique_operation_id(base_id);

        let tags = match metadata {
            Some(m) if !m.tags.is_empty() => m.tags.clone(),
            _ => route
                .handler
                .as_ref()
                .and_then(|h| h.bean_class.as_deref())
                .map(|class| vec![Self::default_tag(class)])
                .unwrap_or_default(),
        };

        let parameters = Self::build_parameters(route, openapi_path);

        let request_body = match method {
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => {
                Self::build_request_body(route, schema_gen)
            }
            _ => None,
        };

        let mut responses = BTreeMap::new();
        responses.insert("200".to_string(), Self::build_response(route, schema_gen));

        Operation {
            tags,
            summary: metadata
                .and_then(|m| m.summary.clone())
                .or_else(|| Some(format!("{} {}", method.as_str(), route.path))),
            description: metadata.and_then(|m| m.description.clone()),
            operation_id: Some(operation_id),
            parameters: if parameters.is_empty() {
                None
            } else {
                Some(parameters)
            },
            request_body,
            responses,
            deprecated: metadata.filter(|m| m.deprecated).map(|_| true),
        }
    }

    /// Path variables are always present; declared parameters refine or extend them, and
    /// route constraints fill in whatever is still missing.
    fn build_parameters(route: &RouteDescriptor, openapi_path: &str) -> Vec<Parameter> {
        let path_variables = Self::path_variables(openapi_path);
        let mut parameters: Vec<Parameter> = path_variables
            .iter()
            .map(|name| Parameter::new(name, ParameterLocation::Path, true))
            .collect();

        if let Some(metadata) = &route.operation {
            let mut unnamed_path = path_variables.iter();

            for declared in &metadata.parameters {
                let name = match (&declared.name, declared.location) {
                    (Some(name), _) => name.clone(),
                    (None, ParameterLocation::Path) => match unnamed_path.next() {
                        Some(variable) => variable.clone(),
                        None => {
                            warn!("Ignoring unnamed path parameter on {}: no variable left", route.path);
                            continue;
                        }
                    },
                    (None, location) => {
                        warn!("Ignoring unnamed {} parameter on {}", location.as_str(), route.path);
                        continue;
                    }
                };

                let index = match parameters.iter().position(|p| p.is(&name, declared.location)) {
                    Some(index) => index,
                    None => {
                        let required = declared.location == ParameterLocation::Path;
                        parameters.push(Parameter::new(&name, declared.location, required));
                        parameters.len() - 1
                    }
                };

                let parameter = &mut parameters[index];
                if declared.description.is_some() {
                    parameter.description = declared.description.clone();
                }
                if declared.example.is_some() {
                    parameter.example = declared.example.clone();
                }
                // path parameters stay required
                if let Some(required) = declared.required {
                    if declared.location != ParameterLocation::Path {
                        parameter.required = required;
                    }
                }
            }
        }

        for (name, value) in &route.query_params {
            Self::push_constraint(&mut parameters, name, ParameterLocation::Query, value);
        }
        for header in &route.headers {
            let (name, value) = header.split_once('=').unwrap_or((header.as_str(), ""));
            Self::push_constraint(&mut parameters, name, ParameterLocation::Header, value);
        }

        parameters
    }

    fn push_constraint(
        parameters: &mut Vec<Parameter>,
        name: &str,
        location: ParameterLocation,
        value: &str,
    ) {
        if parameters.iter().any(|p| p.is(name, location)) {
            return;
        }
        let mut parameter = Parameter::new(name, location, true);
        if !value.is_empty() {
            parameter.example = Some(value.to_string());
        }
        parameters.push(parameter);
    }

    fn build_request_body(
        route: &RouteDescriptor,
        schema_gen: &mut SchemaGenerator,
    ) -> Option<RequestBody> {
        if route.request_type.is_none() && route.request_body.is_none() && route.consumes.is_empty() {
            return None;
        }

        let schema = route
            .request_type
            .as_ref()
            .map(|hint| schema_gen.generate_schema(hint));
        let metadata = route.request_body.as_ref();

        Some(RequestBody {
            description: metadata.and_then(|m| m.description.clone()),
            required: metadata.and_then(|m| m.required).unwrap_or(true),
            content: Self::content(&route.consumes, DEFAULT_CONSUMES, schema),
        })
    }

    fn build_response(route: &RouteDescriptor, schema_gen: &mut SchemaGenerator) -> Response {
        let content = if route.response_type.is_some() || !route.produces.is_empty() {
            let schema = route
                .response_type
                .as_ref()
                .map(|hint| schema_gen.generate_schema(hint));
            Some(Self::content(&route.produces, DEFAULT_PRODUCES, schema))
        } else {
            None
        };

        Response {
            description: "Successful response".to_string(),
            content,
        }
    }

    /// One content entry per media type, or a single entry for `default`
    fn content(
        media_types: &[String],
        default: &str,
        schema: Option<Schema>,
    ) -> BTreeMap<String, MediaType> {
        let mut content = BTreeMap::new();
        if media_types.is_empty() {
            content.insert(default.to_string(), MediaType { schema });
        } else {
            for media_type in media_types {
                content.insert(
                    media_type.clone(),
                    MediaType {
                        schema: schema.clone(),
                    },
                );
            }
        }
        content
    }

    fn unique_operation_id(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.operation_ids.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.operation_ids.insert(candidate.clone());
        candidate
    }

    fn default_operation_id(method: HttpMethod, openapi_path: &str) -> String {
        let words: Vec<String> = openapi_path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                segment
                    .chars()
                    .filter(|c| *c != '{' && *c != '}')
                    .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                    .collect()
            })
            .collect();

        let method = method.as_str().to_lowercase();
        if words.is_empty() {
            method
        } else {
            format!("{}_{}", method, words.join("_"))
        }
    }

    /// Kebab-case tag from the short name of a handler type (`UserHandler` -> `user-handler`)
    fn default_tag(bean_class: &str) -> String {
        let short = bean_class
            .rsplit(|c| c == '.' || c == ':')
            .next()
            .unwrap_or(bean_class);
        let chars: Vec<char> = short.chars().collect();

        let mut tag = String::new();
        for (i, c) in chars.iter().enumerate() {
            if i > 0 && c.is_uppercase() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
                if !prev.is_uppercase() || next_is_lower {
                    tag.push('-');
                }
            }
            tag.extend(c.to_lowercase());
        }
        tag
    }

    fn route_label(route: &RouteDescriptor) -> String {
        route
            .operation_id()
            .or_else(|| route.handler.as_ref().and_then(|h| h.bean_method.as_deref()))
            .or_else(|| route.handler.as_ref().and_then(|h| h.bean_class.as_deref()))
            .unwrap_or("<unnamed>")
            .to_string()
    }

    /// Convert path format to OpenAPI `{param}` format
    ///
    /// Accepts `:param`, `{param}`, `{param:regex}` and `{*param}` segments.
    fn convert_path_format(path: &str) -> String {
        let converted_parts: Vec<String> = path
            .split('/')
            .map(|part| {
                if let Some(name) = part.strip_prefix(':') {
                    format!("{{{}}}", name)
                } else if let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                    let name = inner.trim_start_matches('*');
                    let name = name.split(':').next().unwrap_or(name);
                    format!("{{{}}}", name)
                } else {
                    part.to_string()
                }
            })
            .collect();

        converted_parts.join("/")
    }

    /// Names of the `{param}` segments of an OpenAPI path, in order
    fn path_variables(openapi_path: &str) -> Vec<String> {
        openapi_path
            .split('/')
            .filter_map(|part| part.strip_prefix('{').and_then(|p| p.strip_suffix('}')))
            .map(str::to_string)
            .collect()
    }

    /// Build the final OpenAPI document
    pub fn build(self, schema_gen: SchemaGenerator) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        // Collect all schemas from the schema generator
        let schemas = schema_gen.get_schemas();
        let components = if !schemas.is_empty() {
            Some(Components {
                schemas: Some(schemas.clone()),
            })
        } else {
            None
        };

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.info,
            paths: self.paths,
            components,
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}
