use crate::descriptor::HttpMethod;
use crate::error::Result;
use crate::visitor::media_type::{format_media_types, ACCEPT, CONTENT_TYPE};
use crate::visitor::{RouteEvent, RouteEventSink};
use log::debug;
use serde::{Deserialize, Serialize};

/// A composable request predicate.
///
/// In a definition file each predicate is a single-key map, e.g.
/// `{ and: [ { method: [GET] }, { path: /users } ] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPredicate {
    Method(Vec<HttpMethod>),
    Path(String),
    Header { name: String, value: String },
    Accept(Vec<String>),
    ContentType(Vec<String>),
    QueryParam { name: String, value: String },
    PathExtension(String),
    Param { name: String, value: String },
    And(Vec<RequestPredicate>),
    Or(Vec<RequestPredicate>),
    Negate(Box<RequestPredicate>),
}

impl RequestPredicate {
    pub fn path(pattern: impl Into<String>) -> Self {
        RequestPredicate::Path(pattern.into())
    }

    pub fn method(method: HttpMethod) -> Self {
        RequestPredicate::Method(vec![method])
    }

    pub fn accept(media_types: &[&str]) -> Self {
        RequestPredicate::Accept(media_types.iter().map(|m| m.to_string()).collect())
    }

    pub fn content_type(media_types: &[&str]) -> Self {
        RequestPredicate::ContentType(media_types.iter().map(|m| m.to_string()).collect())
    }

    pub fn get(pattern: impl Into<String>) -> Self {
        Self::method(HttpMethod::Get).and(Self::path(pattern))
    }

    pub fn post(pattern: impl Into<String>) -> Self {
        Self::method(HttpMethod::Post).and(Self::path(pattern))
    }

    pub fn put(pattern: impl Into<String>) -> Self {
        Self::method(HttpMethod::Put).and(Self::path(pattern))
    }

    pub fn delete(pattern: impl Into<String>) -> Self {
        Self::method(HttpMethod::Delete).and(Self::path(pattern))
    }

    /// Combine with another predicate; both must match
    pub fn and(self, other: RequestPredicate) -> Self {
        match self {
            RequestPredicate::And(mut operands) => {
                operands.push(other);
                RequestPredicate::And(operands)
            }
            first => RequestPredicate::And(vec![first, other]),
        }
    }

    /// Combine with another predicate; either may match
    pub fn or(self, other: RequestPredicate) -> Self {
        match self {
            RequestPredicate::Or(mut operands) => {
                operands.push(other);
                RequestPredicate::Or(operands)
            }
            first => RequestPredicate::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        RequestPredicate::Negate(Box::new(self))
    }

    /// Report this predicate to `sink`, depth-first.
    pub fn accept_visitor(&self, sink: &mut dyn RouteEventSink) -> Result<()> {
        match self {
            RequestPredicate::Method(methods) => sink.visit(RouteEvent::Method(methods.clone())),
            RequestPredicate::Path(pattern) => sink.visit(RouteEvent::Path(pattern.clone())),
            RequestPredicate::Header { name, value } => sink.visit(RouteEvent::Header {
                name: name.clone(),
                value: value.clone(),
            }),
            RequestPredicate::Accept(media_types) => media_header(sink, ACCEPT, media_types),
            RequestPredicate::ContentType(media_types) => {
                media_header(sink, CONTENT_TYPE, media_types)
            }
            RequestPredicate::QueryParam { name, value } => sink.visit(RouteEvent::QueryParam {
                name: name.clone(),
                value: value.clone(),
            }),
            RequestPredicate::PathExtension(extension) => {
                sink.visit(RouteEvent::PathExtension(extension.clone()))
            }
            RequestPredicate::Param { name, value } => sink.visit(RouteEvent::Param {
                name: name.clone(),
                value: value.clone(),
            }),
            RequestPredicate::And(operands) => combine(
                sink,
                operands,
                RouteEvent::StartAnd,
                RouteEvent::And,
                RouteEvent::EndAnd,
            ),
            RequestPredicate::Or(operands) => combine(
                sink,
                operands,
                RouteEvent::StartOr,
                RouteEvent::Or,
                RouteEvent::EndOr,
            ),
            RequestPredicate::Negate(inner) => {
                sink.visit(RouteEvent::StartNegate)?;
                inner.accept_visitor(sink)?;
                sink.visit(RouteEvent::EndNegate)
            }
        }
    }
}

fn media_header(sink: &mut dyn RouteEventSink, name: &str, media_types: &[String]) -> Result<()> {
    if media_types.is_empty() {
        debug!("Empty {} predicate skipped", name);
        return Ok(());
    }
    sink.visit(RouteEvent::Header {
        name: name.to_string(),
        value: format_media_types(media_types),
    })
}

fn combine(
    sink: &mut dyn RouteEventSink,
    operands: &[RequestPredicate],
    start: RouteEvent,
    separator: RouteEvent,
    end: RouteEvent,
) -> Result<()> {
    sink.visit(start)?;
    for (idx, operand) in operands.iter().enumerate() {
        if idx > 0 {
            sink.visit(separator.clone())?;
        }
        operand.accept_visitor(sink)?;
    }
    sink.visit(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Records every event it receives
    #[derive(Default)]
    struct Recorder {
        events: Vec<RouteEvent>,
    }

    impl RouteEventSink for Recorder {
        fn visit(&mut self, event: RouteEvent) -> Result<()> {
            self.events.push(event);
            Ok(())
        }
    }

    #[test]
    fn test_get_emits_and_sequence() {
        let mut recorder = Recorder::default();
        RequestPredicate::get("/users")
            .accept_visitor(&mut recorder)
            .unwrap();

        assert_eq!(
            recorder.events,
            vec![
                RouteEvent::StartAnd,
                RouteEvent::Method(vec![HttpMethod::Get]),
                RouteEvent::And,
                RouteEvent::Path("/users".to_string()),
                RouteEvent::EndAnd,
            ]
        );
    }

    #[test]
    fn test_and_chain_is_flattened() {
        let predicate = RequestPredicate::get("/users").and(RequestPredicate::accept(&[
            "application/json",
            "application/xml",
        ]));
        match &predicate {
            RequestPredicate::And(operands) => assert_eq!(operands.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }

        let mut recorder = Recorder::default();
        predicate.accept_visitor(&mut recorder).unwrap();
        assert_eq!(
            recorder.events[5],
            RouteEvent::Header {
                name: "Accept".to_string(),
                value: "[application/json, application/xml]".to_string(),
            }
        );
    }

    #[test]
    fn test_or_and_negate_events() {
        let predicate = RequestPredicate::path("/a")
            .or(RequestPredicate::path("/b"))
            .and(RequestPredicate::PathExtension("json".to_string()).negate());
        let mut recorder = Recorder::default();
        predicate.accept_visitor(&mut recorder).unwrap();

        assert_eq!(
            recorder.events,
            vec![
                RouteEvent::StartAnd,
                RouteEvent::StartOr,
                RouteEvent::Path("/a".to_string()),
                RouteEvent::Or,
                RouteEvent::Path("/b".to_string()),
                RouteEvent::EndOr,
                RouteEvent::And,
                RouteEvent::StartNegate,
                RouteEvent::PathExtension("json".to_string()),
                RouteEvent::EndNegate,
                RouteEvent::EndAnd,
            ]
        );
    }

    #[test]
    fn test_empty_accept_emits_nothing() {
        let mut recorder = Recorder::default();
        RequestPredicate::Accept(Vec::new())
            .accept_visitor(&mut recorder)
            .unwrap();
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn test_deserialize_predicate_yaml() {
        let yaml = r#"
and:
  - method: [GET, HEAD]
  - path: /api/user/{id}
  - accept: [application/json]
  - query_param: { name: verbose, value: "true" }
"#;
        let predicate: RequestPredicate = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            predicate,
            RequestPredicate::And(vec![
                RequestPredicate::Method(vec![HttpMethod::Get, HttpMethod::Head]),
                RequestPredicate::path("/api/user/{id}"),
                RequestPredicate::accept(&["application/json"]),
                RequestPredicate::QueryParam {
                    name: "verbose".to_string(),
                    value: "true".to_string(),
                },
            ])
        );
    }
}
