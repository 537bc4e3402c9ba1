//! Accept / Content-Type header values.
//!
//! A predicate over several media types renders its value as a bracketed list,
//! `"[application/json, application/xml]"`; a single media type is rendered bare.

use crate::error::{Error, Result};

pub const ACCEPT: &str = "Accept";
pub const CONTENT_TYPE: &str = "Content-Type";

/// Split a header value into its media types.
///
/// A value containing a comma must be wrapped in brackets; its entries are separated
/// by `", "`.
pub fn parse_media_types(header: &str, value: &str) -> Result<Vec<String>> {
    if !value.contains(',') {
        return Ok(vec![value.to_string()]);
    }

    let inner = value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| Error::MalformedHeaderValue {
            header: header.to_string(),
            value: value.to_string(),
        })?;

    Ok(inner.split(", ").map(str::to_string).collect())
}

/// Render media types the way a predicate reports them: bare for one, bracketed for more.
pub fn format_media_types(media_types: &[String]) -> String {
    match media_types {
        [single] => single.clone(),
        _ => format!("[{}]", media_types.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_media_type() {
        let types = parse_media_types(ACCEPT, "application/json").unwrap();
        assert_eq!(types, vec!["application/json"]);
    }

    #[test]
    fn test_bracketed_list() {
        let types = parse_media_types(ACCEPT, "[application/json, application/xml]").unwrap();
        assert_eq!(types, vec!["application/json", "application/xml"]);
    }

    #[test]
    fn test_unbalanced_brackets_rejected() {
        let err = parse_media_types(CONTENT_TYPE, "[application/json, text/plain").unwrap_err();
        assert_eq!(
            err,
            Error::MalformedHeaderValue {
                header: "Content-Type".to_string(),
                value: "[application/json, text/plain".to_string(),
            }
        );
    }

    #[test]
    fn test_unbracketed_list_rejected() {
        assert!(parse_media_types(ACCEPT, "application/json, text/plain").is_err());
    }

    #[test]
    fn test_format_matches_parse() {
        let many = vec!["application/json".to_string(), "text/plain".to_string()];
        assert_eq!(format_media_types(&many), "[application/json, text/plain]");
        assert_eq!(format_media_types(&many[..1]), "application/json");
        assert_eq!(
            parse_media_types(ACCEPT, &format_media_types(&many)).unwrap(),
            many
        );
    }
}
