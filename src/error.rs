use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An event arrived while the state it depends on was absent.
    #[error("invalid event sequence: {event} {reason}")]
    InvalidSequence {
        event: &'static str,
        reason: &'static str,
    },

    /// A bracketed multi-value Accept/Content-Type header could not be split.
    #[error("malformed {header} header value: {value:?}")]
    MalformedHeaderValue { header: String, value: String },

    /// A group was configured without a name or without any filter.
    #[error("invalid group configuration: {0}")]
    InvalidGroup(String),
}

impl Error {
    pub(crate) fn invalid_sequence(event: &'static str, reason: &'static str) -> Self {
        Error::InvalidSequence { event, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_sequence_message() {
        let err = Error::invalid_sequence("header", "received outside of a route");
        assert_eq!(
            err.to_string(),
            "invalid event sequence: header received outside of a route"
        );
    }

    #[test]
    fn test_malformed_header_message() {
        let err = Error::MalformedHeaderValue {
            header: "Accept".to_string(),
            value: "a, b".to_string(),
        };
        assert_eq!(err.to_string(), "malformed Accept header value: \"a, b\"");
    }

    #[test]
    fn test_group_error_message() {
        let err = Error::InvalidGroup("group name is required".to_string());
        assert_eq!(
            err.to_string(),
            "invalid group configuration: group name is required"
        );
    }
}
