//! Named subsets of the documented routes.
//!
//! A [`GroupedOpenApi`] selects the descriptors that belong to one document by path,
//! handler package, media type and header, and carries the customizers applied to that
//! document.
//!
//! # Example
//!
//! ```
//! use openapi_from_routes::descriptor::{HttpMethod, RouteDescriptor};
//! use openapi_from_routes::group::GroupedOpenApi;
//!
//! let group = GroupedOpenApi::builder()
//!     .group("users")
//!     .paths_to_match(["/api/users/**"])
//!     .build()
//!     .unwrap();
//!
//! assert!(group.matches(&RouteDescriptor::with_path("/api/users/{id}", &[HttpMethod::Get])));
//! assert!(!group.matches(&RouteDescriptor::with_path("/api/orders", &[HttpMethod::Get])));
//! ```

use crate::customizer::{OpenApiCustomizer, OperationCustomizer};
use crate::descriptor::RouteDescriptor;
use crate::error::{Error, Result};
use crate::openapi_builder::OpenApiDocument;
use log::{debug, trace};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// A named route group with its filters and customizers.
pub struct GroupedOpenApi {
    group: String,
    paths_to_match: Vec<AntPattern>,
    paths_to_exclude: Vec<AntPattern>,
    packages_to_scan: Vec<String>,
    packages_to_exclude: Vec<String>,
    produces_to_match: Vec<String>,
    consumes_to_match: Vec<String>,
    headers_to_match: Vec<String>,
    open_api_customizers: Vec<Arc<dyn OpenApiCustomizer>>,
    operation_customizers: Vec<Arc<dyn OperationCustomizer>>,
}

/// Builder for [`GroupedOpenApi`].
#[derive(Default)]
pub struct GroupedOpenApiBuilder {
    group: Option<String>,
    paths_to_match: Vec<String>,
    paths_to_exclude: Vec<String>,
    packages_to_scan: Vec<String>,
    packages_to_exclude: Vec<String>,
    produces_to_match: Vec<String>,
    consumes_to_match: Vec<String>,
    headers_to_match: Vec<String>,
    open_api_customizers: Vec<Arc<dyn OpenApiCustomizer>>,
    operation_customizers: Vec<Arc<dyn OperationCustomizer>>,
}

fn strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl GroupedOpenApiBuilder {
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Ant-style patterns a route path must match
    pub fn paths_to_match<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths_to_match = strings(paths);
        self
    }

    /// Ant-style patterns excluding route paths; checked before the match list
    pub fn paths_to_exclude<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths_to_exclude = strings(paths);
        self
    }

    pub fn packages_to_scan<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages_to_scan = strings(packages);
        self
    }

    pub fn packages_to_exclude<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages_to_exclude = strings(packages);
        self
    }

    pub fn produces_to_match<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces_to_match = strings(media_types);
        self
    }

    pub fn consumes_to_match<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes_to_match = strings(media_types);
        self
    }

    /// Header names, or `name=value` constraints, a route must declare
    pub fn headers_to_match<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers_to_match = strings(headers);
        self
    }

    pub fn add_open_api_customizer(mut self, customizer: Arc<dyn OpenApiCustomizer>) -> Self {
        self.open_api_customizers.push(customizer);
        self
    }

    pub fn add_operation_customizer(mut self, customizer: Arc<dyn OperationCustomizer>) -> Self {
        self.operation_customizers.push(customizer);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGroup`] when the name is missing or blank, when the
    /// group has neither a filter nor a customizer, or when a path pattern does not
    /// compile.
    pub fn build(self) -> Result<GroupedOpenApi> {
        let group = match self.group {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(Error::InvalidGroup("group name is required".to_string())),
        };

        let has_filter = [
            &self.paths_to_match,
            &self.paths_to_exclude,
            &self.packages_to_scan,
            &self.packages_to_exclude,
            &self.produces_to_match,
            &self.consumes_to_match,
            &self.headers_to_match,
        ]
        .iter()
        .any(|list| !list.is_empty());
        let has_customizer =
            !self.open_api_customizers.is_empty() || !self.operation_customizers.is_empty();

        if !has_filter && !has_customizer {
            return Err(Error::InvalidGroup(format!(
                "group '{}' needs at least one filter or customizer",
                group
            )));
        }

        Ok(GroupedOpenApi {
            paths_to_match: compile_patterns(&self.paths_to_match)?,
            paths_to_exclude: compile_patterns(&self.paths_to_exclude)?,
            group,
            packages_to_scan: self.packages_to_scan,
            packages_to_exclude: self.packages_to_exclude,
            produces_to_match: self.produces_to_match,
            consumes_to_match: self.consumes_to_match,
            headers_to_match: self.headers_to_match,
            open_api_customizers: self.open_api_customizers,
            operation_customizers: self.operation_customizers,
        })
    }
}

impl GroupedOpenApi {
    pub fn builder() -> GroupedOpenApiBuilder {
        GroupedOpenApiBuilder::default()
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Whether a descriptor belongs to this group
    pub fn matches(&self, route: &RouteDescriptor) -> bool {
        let matched = self.is_path_to_match(&route.path)
            && self.is_package_to_scan(route)
            && any_shared(&self.produces_to_match, &route.produces)
            && any_shared(&self.consumes_to_match, &route.consumes)
            && self.is_header_to_match(&route.headers);
        trace!("Group {} {} {}", self.group, if matched { "keeps" } else { "drops" }, route.path);
        matched
    }

    /// The matching descriptors, in input order
    pub fn filter(&self, routes: Vec<RouteDescriptor>) -> Vec<RouteDescriptor> {
        let total = routes.len();
        let kept: Vec<RouteDescriptor> = routes.into_iter().filter(|r| self.matches(r)).collect();
        debug!("Group {} kept {} of {} routes", self.group, kept.len(), total);
        kept
    }

    pub fn operation_customizers(&self) -> &[Arc<dyn OperationCustomizer>] {
        &self.operation_customizers
    }

    /// Runs the group's document customizers in registration order
    pub fn customize(&self, document: &mut OpenApiDocument) {
        for customizer in &self.open_api_customizers {
            customizer.customize(document);
        }
    }

    fn is_path_to_match(&self, path: &str) -> bool {
        if self.paths_to_exclude.iter().any(|p| p.matches(path)) {
            return false;
        }
        self.paths_to_match.is_empty() || self.paths_to_match.iter().any(|p| p.matches(path))
    }

    fn is_package_to_scan(&self, route: &RouteDescriptor) -> bool {
        let bean_class = route.handler.as_ref().and_then(|h| h.bean_class.as_deref());
        let package = match bean_class {
            Some(class) => package_of(class),
            None => return self.packages_to_scan.is_empty(),
        };

        if self.packages_to_exclude.iter().any(|p| in_package(&package, p)) {
            return false;
        }
        self.packages_to_scan.is_empty()
            || self.packages_to_scan.iter().any(|p| in_package(&package, p))
    }

    fn is_header_to_match(&self, headers: &[String]) -> bool {
        if self.headers_to_match.is_empty() {
            return true;
        }
        headers.iter().any(|header| {
            let name = header.split_once('=').map_or(header.as_str(), |(name, _)| name);
            self.headers_to_match
                .iter()
                .any(|wanted| wanted == header || wanted.eq_ignore_ascii_case(name))
        })
    }
}

impl fmt::Debug for GroupedOpenApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupedOpenApi")
            .field("group", &self.group)
            .field("paths_to_match", &sources(&self.paths_to_match))
            .field("paths_to_exclude", &sources(&self.paths_to_exclude))
            .field("packages_to_scan", &self.packages_to_scan)
            .field("packages_to_exclude", &self.packages_to_exclude)
            .field("produces_to_match", &self.produces_to_match)
            .field("consumes_to_match", &self.consumes_to_match)
            .field("headers_to_match", &self.headers_to_match)
            .field("open_api_customizers", &self.open_api_customizers.len())
            .field("operation_customizers", &self.operation_customizers.len())
            .finish()
    }
}

/// Empty filter passes; otherwise at least one value must be shared
fn any_shared(filter: &[String], values: &[String]) -> bool {
    filter.is_empty() || values.iter().any(|v| filter.contains(v))
}

/// Package of a qualified type name, normalized to `.` separators
fn package_of(bean_class: &str) -> String {
    let normalized = bean_class.replace("::", ".");
    match normalized.rsplit_once('.') {
        Some((package, _)) => package.to_string(),
        None => String::new(),
    }
}

fn in_package(package: &str, wanted: &str) -> bool {
    let wanted = wanted.replace("::", ".");
    package == wanted || package.starts_with(&format!("{}.", wanted))
}

/// An Ant-style path pattern compiled to an anchored regex.
///
/// `?` matches one character and `*` any run of characters within a segment. `**`
/// matches any number of segments. `{var}` and `{var:regex}` match a non-empty run of
/// characters within a segment, so they may share the segment with literal text.
#[derive(Debug, Clone)]
struct AntPattern {
    source: String,
    regex: Regex,
}

impl AntPattern {
    fn compile(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&ant_to_regex(pattern)).map_err(|e| {
            Error::InvalidGroup(format!("invalid path pattern '{}': {}", pattern, e))
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<AntPattern>> {
    patterns.iter().map(|p| AntPattern::compile(p)).collect()
}

fn sources(patterns: &[AntPattern]) -> Vec<&str> {
    patterns.iter().map(|p| p.source.as_str()).collect()
}

fn ant_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            // a whole `/**` segment may also match nothing
            '/' if chars[i + 1..].starts_with(&['*', '*'])
                && matches!(chars.get(i + 3), None | Some(&'/')) =>
            {
                out.push_str("(?:/.*)?");
                i += 3;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                out.push_str(".*");
                i += 2;
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '{' => match closing_brace(&chars, i) {
                Some(end) => {
                    out.push_str("[^/]+");
                    i = end + 1;
                }
                None => {
                    out.push_str(r"\{");
                    i += 1;
                }
            },
            c => {
                let mut buf = [0; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                i += 1;
            }
        }
    }

    out.push('$');
    out
}

/// Index of the brace closing the one at `open`, skipping braces nested in a
/// variable's own regex.
fn closing_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in chars[open..].iter().enumerate() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}
