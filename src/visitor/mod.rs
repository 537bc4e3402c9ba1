//! Route visitor: turns routing-predicate events into route descriptors.
//!
//! A functional router is a tree of routes and nested scopes whose predicates combine
//! paths, methods, headers and query parameters with AND / OR / negate. Whoever walks
//! that tree reports what it sees as a stream of [`RouteEvent`]s; the [`RouteVisitor`]
//! reacts to each one and, once the traversal is over, [`RouteVisitor::finalize`] folds
//! the scope-level constraints into every descriptor collected so far.
//!
//! # Example
//!
//! ```
//! use openapi_from_routes::attributes::RouteAttributes;
//! use openapi_from_routes::descriptor::HttpMethod;
//! use openapi_from_routes::visitor::RouteVisitor;
//!
//! let mut visitor = RouteVisitor::new();
//! visitor.enter_and();
//! visitor.path("/api").unwrap();
//! visitor.begin_route(RouteAttributes::default());
//! visitor.method(&[HttpMethod::Get]);
//! visitor.path("/users").unwrap();
//! visitor.finalize();
//!
//! let routes = visitor.into_descriptors();
//! assert_eq!(routes[0].path, "/api/users");
//! ```

pub mod media_type;

use crate::attributes::RouteAttributes;
use crate::descriptor::{HttpMethod, RouteDescriptor};
use crate::error::{Error, Result};
use log::{debug, trace};
use media_type::{parse_media_types, ACCEPT, CONTENT_TYPE};

/// One step of a routing-predicate traversal.
///
/// `PathExtension`, `Param`, the AND / OR separators and ends, the negate markers and
/// `EndNested` are reserved: the visitor accepts them and leaves its state unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteEvent {
    /// A terminal route starts; its attributes are attached to the new descriptor
    Route(RouteAttributes),
    Method(Vec<HttpMethod>),
    Path(String),
    Header { name: String, value: String },
    QueryParam { name: String, value: String },
    /// Opens an OR scope
    StartOr,
    /// Opens a nested scope whose predicate is AND-combined with its routes
    StartNested,
    PathExtension(String),
    Param { name: String, value: String },
    StartAnd,
    And,
    EndAnd,
    Or,
    EndOr,
    StartNegate,
    EndNegate,
    EndNested,
}

impl RouteEvent {
    fn name(&self) -> &'static str {
        match self {
            RouteEvent::Route(_) => "route",
            RouteEvent::Method(_) => "method",
            RouteEvent::Path(_) => "path",
            RouteEvent::Header { .. } => "header",
            RouteEvent::QueryParam { .. } => "query_param",
            RouteEvent::StartOr => "start_or",
            RouteEvent::StartNested => "start_nested",
            RouteEvent::PathExtension(_) => "path_extension",
            RouteEvent::Param { .. } => "param",
            RouteEvent::StartAnd => "start_and",
            RouteEvent::And => "and",
            RouteEvent::EndAnd => "end_and",
            RouteEvent::Or => "or",
            RouteEvent::EndOr => "end_or",
            RouteEvent::StartNegate => "start_negate",
            RouteEvent::EndNegate => "end_negate",
            RouteEvent::EndNested => "end_nested",
        }
    }
}

/// Receiver of traversal events.
pub trait RouteEventSink {
    /// Handle one event. An error aborts the traversal.
    fn visit(&mut self, event: RouteEvent) -> Result<()>;
}

/// State machine collecting [`RouteDescriptor`]s from one traversal.
///
/// One visitor serves exactly one top-level traversal; call [`reset`](Self::reset)
/// before reusing it.
#[derive(Debug, Default)]
pub struct RouteVisitor {
    descriptors: Vec<RouteDescriptor>,
    pending_or_paths: Vec<String>,
    pending_and_paths: Vec<String>,
    pending_accept_headers: Vec<String>,
    pending_content_type_headers: Vec<String>,
    in_or_scope: bool,
    in_and_scope: bool,
    /// Index of the terminal route being built
    current: Option<usize>,
}

impl RouteVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new terminal route
    pub fn begin_route(&mut self, attributes: RouteAttributes) {
        let handler = attributes.handler_reference();
        let descriptor = RouteDescriptor {
            operation: attributes.operation,
            handler,
            request_body: attributes.request_body,
            request_type: attributes.request_type,
            response_type: attributes.response_type,
            ..RouteDescriptor::default()
        };
        debug!(
            "Route #{} started (operation: {:?})",
            self.descriptors.len(),
            descriptor.operation_id()
        );
        self.descriptors.push(descriptor);
        self.current = Some(self.descriptors.len() - 1);
    }

    /// Set the methods of the current route; ignored between routes.
    pub fn method(&mut self, methods: &[HttpMethod]) {
        match self.current_mut() {
            Some(descriptor) => descriptor.set_methods(methods),
            None => trace!("Method predicate outside of a route ignored"),
        }
    }

    pub fn path(&mut self, pattern: &str) -> Result<()> {
        if let Some(descriptor) = self.current_mut() {
            descriptor.path = pattern.to_string();
        } else if self.in_or_scope {
            debug!("Pending OR path: {}", pattern);
            self.pending_or_paths.push(pattern.to_string());
        } else if self.in_and_scope {
            debug!("Pending AND path: {}", pattern);
            self.pending_and_paths.push(pattern.to_string());
        } else {
            return Err(Error::invalid_sequence(
                "path",
                "received outside of a route and of any scope",
            ));
        }
        Ok(())
    }

    pub fn header(&mut self, name: &str, value: &str) -> Result<()> {
        if name.eq_ignore_ascii_case(ACCEPT) {
            let media_types = parse_media_types(ACCEPT, value)?;
            match self.current_mut() {
                Some(descriptor) => media_types.iter().for_each(|m| descriptor.add_produces(m)),
                None => self.pending_accept_headers.extend(media_types),
            }
        } else if name.eq_ignore_ascii_case(CONTENT_TYPE) {
            let media_types = parse_media_types(CONTENT_TYPE, value)?;
            match self.current_mut() {
                Some(descriptor) => media_types.iter().for_each(|m| descriptor.add_consumes(m)),
                None => self.pending_content_type_headers.extend(media_types),
            }
        } else {
            let descriptor = self
                .current_mut()
                .ok_or_else(|| Error::invalid_sequence("header", "received outside of a route"))?;
            descriptor.add_header(&format!("{}={}", name, value));
        }
        Ok(())
    }

    pub fn query_param(&mut self, name: &str, value: &str) -> Result<()> {
        let descriptor = self.current_mut().ok_or_else(|| {
            Error::invalid_sequence("query_param", "received outside of a route")
        })?;
        descriptor.add_query_param(name, value);
        Ok(())
    }

    pub fn enter_or(&mut self) {
        debug!("Entering OR scope");
        self.in_or_scope = true;
    }

    /// Enter a nested scope. The previous terminal route, if any, is complete.
    pub fn enter_and(&mut self) {
        debug!("Entering nested scope");
        self.in_and_scope = true;
        self.current = None;
    }

    /// Fold the pending scope state into the collected descriptors.
    ///
    /// Pending AND paths are concatenated and prefixed to every path; pending OR paths
    /// then replace every descriptor with one copy per fragment; pending Accept and
    /// Content-Type media types are appended to every descriptor. Each pending list is
    /// consumed once, so a second call without new events changes nothing.
    pub fn finalize(&mut self) {
        self.current = None;

        if !self.pending_and_paths.is_empty() {
            let prefix = self.pending_and_paths.concat();
            debug!("Prefixing {} routes with {}", self.descriptors.len(), prefix);
            for descriptor in &mut self.descriptors {
                descriptor.path = format!("{}{}", prefix, descriptor.path);
            }
            self.pending_and_paths.clear();
        }

        if !self.pending_or_paths.is_empty() {
            let fragments = &self.pending_or_paths;
            let expanded: Vec<RouteDescriptor> = self
                .descriptors
                .iter()
                .flat_map(|descriptor| {
                    fragments.iter().map(move |fragment| RouteDescriptor {
                        path: format!("{}{}", fragment, descriptor.path),
                        ..descriptor.clone()
                    })
                })
                .collect();
            debug!(
                "Expanded {} routes over {} OR paths into {}",
                self.descriptors.len(),
                self.pending_or_paths.len(),
                expanded.len()
            );
            self.descriptors = expanded;
            self.pending_or_paths.clear();
        }

        if !self.pending_accept_headers.is_empty() {
            let produces = std::mem::take(&mut self.pending_accept_headers);
            for descriptor in &mut self.descriptors {
                descriptor.extend_produces(&produces);
            }
        }

        if !self.pending_content_type_headers.is_empty() {
            let consumes = std::mem::take(&mut self.pending_content_type_headers);
            for descriptor in &mut self.descriptors {
                descriptor.extend_consumes(&consumes);
            }
        }
    }

    /// Descriptors collected so far
    pub fn descriptors(&self) -> &[RouteDescriptor] {
        &self.descriptors
    }

    /// Hand the collected descriptors to the caller
    pub fn into_descriptors(self) -> Vec<RouteDescriptor> {
        self.descriptors
    }

    /// Drop all state so the visitor can serve another traversal
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn current_mut(&mut self) -> Option<&mut RouteDescriptor> {
        self.current.and_then(|idx| self.descriptors.get_mut(idx))
    }
}

impl RouteEventSink for RouteVisitor {
    fn visit(&mut self, event: RouteEvent) -> Result<()> {
        match event {
            RouteEvent::Route(attributes) => self.begin_route(attributes),
            RouteEvent::Method(methods) => self.method(&methods),
            RouteEvent::Path(pattern) => self.path(&pattern)?,
            RouteEvent::Header { name, value } => self.header(&name, &value)?,
            RouteEvent::QueryParam { name, value } => self.query_param(&name, &value)?,
            RouteEvent::StartOr => self.enter_or(),
            RouteEvent::StartNested => self.enter_and(),
            reserved => trace!("Reserved event {} ignored", reserved.name()),
        }
        Ok(())
    }
}
